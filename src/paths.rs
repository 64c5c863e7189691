use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::config::PAGE_SUFFIX;

static DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})").unwrap());

/// Daily scoreboard listing every completed game.
pub fn gamesheet_url(root_url: &str, date: NaiveDate) -> String {
    format!(
        "{}cbb/boxscores/index.cgi?year={}&month={}&day={}",
        root_url,
        date.year(),
        date.month(),
        date.day()
    )
}

pub fn gamesheet_path(html_dir: impl AsRef<Path>, date: NaiveDate) -> PathBuf {
    html_dir.as_ref().join("gamesheets").join(format!(
        "{}-{}-{}{}",
        date.year(),
        date.month(),
        date.day(),
        PAGE_SUFFIX
    ))
}

/// `.../2017-02-04-acu.html` → `{html_dir}/boxscores/2017-02-04-acu.txt`
pub fn boxscore_path(html_dir: impl AsRef<Path>, url: &str) -> PathBuf {
    let last = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .trim();
    let stem = last.strip_suffix(".html").unwrap_or(last);
    html_dir
        .as_ref()
        .join("boxscores")
        .join(format!("{}{}", stem, PAGE_SUFFIX))
}

/// Game date encoded at the front of a stored page's file name.
pub fn page_date(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let caps = DATE_PREFIX_RE.captures(name)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}
