pub mod boxscore;
pub mod gamesheet;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use encoding_rs::Encoding;
use scraper::Html;

use crate::document;
use crate::error::{Error, Result};
use crate::paths;
use crate::records::{PlayerGameRecord, TeamGameResultRecord};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Outcome of mining one stored page. The batch driver decides what each tag means:
/// skipped pages are logged and passed over, failures stop the run.
#[derive(Debug)]
pub enum Mined<T> {
    Records(Vec<T>),
    Skipped(String),
    Failed(Error),
}

/// `encoding` must be the one the page was stored with.
pub fn mine_boxscore(path: &Path, encoding: &'static Encoding) -> Mined<PlayerGameRecord> {
    mine(path, encoding, boxscore::extract)
}

pub fn mine_gamesheet(path: &Path, encoding: &'static Encoding) -> Mined<TeamGameResultRecord> {
    mine(path, encoding, gamesheet::extract)
}

/// Load → extract, with malformed pages turned into `Skipped`.
fn mine<T>(
    path: &Path,
    encoding: &'static Encoding,
    extract: fn(&Html, NaiveDate) -> Result<Vec<T>>,
) -> Mined<T> {
    let Some(date) = paths::page_date(path) else {
        return Mined::Skipped(format!("no date in file name {}", path.display()));
    };
    let doc = match document::load_with(path, encoding) {
        Ok(doc) => doc,
        Err(e) => return Mined::Failed(e),
    };
    match extract(&doc, date) {
        Ok(records) => Mined::Records(records),
        Err(Error::MalformedInput(reason)) => Mined::Skipped(reason),
        Err(e) => Mined::Failed(e),
    }
}

/// Mine many pages. Each page is parsed independently, so this runs in parallel
/// when the `rayon` feature is on; output order always follows `paths`.
#[cfg(feature = "rayon")]
pub fn mine_all<T, F>(paths: &[PathBuf], miner: F) -> Vec<(PathBuf, Mined<T>)>
where
    T: Send,
    F: Fn(&Path) -> Mined<T> + Sync,
{
    paths
        .par_iter()
        .map(|p| (p.clone(), miner(p)))
        .collect()
}

#[cfg(not(feature = "rayon"))]
pub fn mine_all<T, F>(paths: &[PathBuf], miner: F) -> Vec<(PathBuf, Mined<T>)>
where
    T: Send,
    F: Fn(&Path) -> Mined<T> + Sync,
{
    paths.iter().map(|p| (p.clone(), miner(p))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};

    fn copy_fixture(dir: &Path, fixture: &str, name: &str) -> PathBuf {
        let dest = dir.join(name);
        std::fs::copy(format!("tests/fixtures/{}", fixture), &dest).unwrap();
        dest
    }

    #[test]
    fn date_comes_from_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let p = copy_fixture(dir.path(), "boxscore.txt", "2017-02-04-abilene-christian.txt");
        let Mined::Records(records) = mine_boxscore(&p, UTF_8) else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 14);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2017, 2, 4).unwrap());
    }

    #[test]
    fn malformed_page_is_skipped_not_failed() {
        let dir = tempfile::tempdir().unwrap();
        // a gamesheet has no boxscore heading
        let p = copy_fixture(dir.path(), "gamesheet.txt", "2017-02-04-wrong-kind.txt");
        assert!(matches!(mine_boxscore(&p, UTF_8), Mined::Skipped(_)));
    }

    #[test]
    fn unreadable_page_fails() {
        let p = PathBuf::from("tests/fixtures/2017-2-4-missing.txt");
        assert!(matches!(mine_gamesheet(&p, UTF_8), Mined::Failed(Error::Io(_))));
    }

    #[test]
    fn batch_keeps_going_past_bad_pages() {
        let dir = tempfile::tempdir().unwrap();
        let pages = vec![
            copy_fixture(dir.path(), "boxscore.txt", "2017-2-4.txt"),
            copy_fixture(dir.path(), "gamesheet.txt", "2017-2-5.txt"),
            copy_fixture(dir.path(), "gamesheet.txt", "undated.txt"),
        ];
        let mined = mine_all(&pages, |p| mine_gamesheet(p, UTF_8));

        assert_eq!(mined.len(), 3);
        assert!(matches!(mined[0].1, Mined::Skipped(_)));
        assert!(matches!(&mined[1].1, Mined::Records(r) if r.len() == 3));
        assert!(matches!(mined[2].1, Mined::Skipped(_)));
        assert_eq!(mined[1].0, pages[1]);
    }

    #[test]
    fn pages_decode_with_their_stored_encoding() {
        let raw = std::fs::read_to_string("tests/fixtures/boxscore.txt").unwrap();
        let raw = raw
            .replace("Jaylen Franklin", "Jos\u{e9} Franklin")
            .replace("Sam Houston State vs.", "Sam\u{a0}Houston State vs.");
        let (bytes, _, unmappable) = WINDOWS_1252.encode(&raw);
        assert!(!unmappable);

        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("2017-02-04-abilene-christian.txt");
        std::fs::write(&p, &bytes).unwrap();

        let Mined::Records(records) = mine_boxscore(&p, WINDOWS_1252) else {
            panic!("expected records");
        };
        assert!(records.iter().any(|r| r.player == "Jos\u{e9} Franklin"));
        assert!(records
            .iter()
            .all(|r| r.team == "Sam Houston State" || r.team == "Abilene Christian"));

        // the same bytes read as UTF-8 lose the accented name
        let Mined::Records(garbled) = mine_boxscore(&p, UTF_8) else {
            panic!("expected records");
        };
        assert!(!garbled.iter().any(|r| r.player == "Jos\u{e9} Franklin"));
    }
}
