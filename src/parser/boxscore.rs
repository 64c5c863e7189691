use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{Error, Result};
use crate::records::{PlayerGameRecord, Role};

static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static TBODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static STAT_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static NAME_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());

const HEADING_MARKER: &str = "Box Score,";
const TEAM_SEPARATOR: &str = " vs. ";

/// Data rows before this index are starters.
pub const STARTERS: usize = 5;

/// MP through PTS.
pub const STAT_COLUMNS: usize = 22;

/// A player row as it appears in the table, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub name: String,
    pub cells: Vec<String>,
}

/// All player records on a boxscore page: home table first, then away.
///
/// The home team's table is the second-to-last `tbody` on the page and the away
/// team's is the last one. Position is all that decides the side.
pub fn extract(doc: &Html, date: NaiveDate) -> Result<Vec<PlayerGameRecord>> {
    let heading: String = doc
        .select(&HEADING)
        .next()
        .ok_or_else(|| Error::malformed("boxscore has no heading"))?
        .text()
        .collect();
    let (away_team, home_team) = team_names(&heading)?;

    let tables: Vec<ElementRef> = doc.select(&TBODY).collect();
    let [.., home_table, away_table] = tables.as_slice() else {
        return Err(Error::malformed(format!(
            "expected at least two stat tables, found {}",
            tables.len()
        )));
    };

    let mut records = team_records(*home_table, date, &home_team)?;
    records.extend(team_records(*away_table, date, &away_team)?);
    Ok(records)
}

/// `"<Away> vs. <Home> Box Score, <date>"` → `(away, home)`.
pub fn team_names(heading: &str) -> Result<(String, String)> {
    let (teams, _) = heading.split_once(HEADING_MARKER).ok_or_else(|| {
        Error::malformed(format!("heading lacks '{}': {:?}", HEADING_MARKER, heading))
    })?;
    let (away, home) = teams.split_once(TEAM_SEPARATOR).ok_or_else(|| {
        Error::malformed(format!("heading lacks team separator: {:?}", heading))
    })?;

    let (away, home) = (away.trim(), home.trim());
    if away.is_empty() || home.is_empty() {
        return Err(Error::malformed(format!(
            "empty team name in heading: {:?}",
            heading
        )));
    }
    Ok((away.to_string(), home.to_string()))
}

/// Role by position among a team's data rows.
pub fn role_at(index: usize) -> Role {
    if index < STARTERS {
        Role::Starter
    } else {
        Role::Reserve
    }
}

/// Pair rows with their roles. Positions count data rows only, shifted by `offset`.
pub fn assign_roles(rows: Vec<RawRow>, offset: usize) -> Vec<(Role, RawRow)> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| (role_at(i + offset), row))
        .collect()
}

/// Rows carrying at least one stat cell. Header rows (`th` only) are dropped here.
pub fn table_rows(table: ElementRef) -> Result<Vec<RawRow>> {
    let mut rows = Vec::new();
    for tr in table.select(&ROW) {
        let cells: Vec<String> = tr.select(&STAT_CELL).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        let name = tr
            .select(&NAME_CELL)
            .next()
            .map(cell_text)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::malformed("player row without a name cell"))?;
        rows.push(RawRow { name, cells });
    }
    Ok(rows)
}

fn team_records(table: ElementRef, date: NaiveDate, team: &str) -> Result<Vec<PlayerGameRecord>> {
    let mut records = Vec::new();
    for (role, row) in assign_roles(table_rows(table)?, 0) {
        // "Did Not Play" and similar rows span the stat columns with one cell.
        if row.cells.len() != STAT_COLUMNS {
            debug!(
                team,
                player = %row.name,
                cells = row.cells.len(),
                "Skipping row without full stats"
            );
            continue;
        }
        records.push(player_record(date, team, role, &row)?);
    }
    Ok(records)
}

fn player_record(
    date: NaiveDate,
    team: &str,
    role: Role,
    row: &RawRow,
) -> Result<PlayerGameRecord> {
    let c = &row.cells;
    let count = |i: usize| parse_count(&row.name, &c[i]);
    let pct = |i: usize| parse_pct(&row.name, &c[i]);

    Ok(PlayerGameRecord {
        date,
        team: team.to_string(),
        player: row.name.clone(),
        role,
        mp: count(0)?,
        fg: count(1)?,
        fga: count(2)?,
        fg_pct: pct(3)?,
        two_p: count(4)?,
        two_pa: count(5)?,
        two_p_pct: pct(6)?,
        three_p: count(7)?,
        three_pa: count(8)?,
        three_p_pct: pct(9)?,
        ft: count(10)?,
        fta: count(11)?,
        ft_pct: pct(12)?,
        orb: count(13)?,
        drb: count(14)?,
        trb: count(15)?,
        ast: count(16)?,
        stl: count(17)?,
        blk: count(18)?,
        tov: count(19)?,
        pf: count(20)?,
        pts: count(21)?,
    })
}

fn cell_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Blank counts are zero.
fn parse_count(player: &str, raw: &str) -> Result<u32> {
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|_| Error::malformed(format!("{}: bad count {:?}", player, raw)))
}

/// Blank percentages (no attempts) stay empty.
fn parse_pct(player: &str, raw: &str) -> Result<Option<f64>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| Error::malformed(format!("{}: bad percentage {:?}", player, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::normalize;

    fn fixture() -> Html {
        let raw = std::fs::read_to_string("tests/fixtures/boxscore.txt").unwrap();
        Html::parse_document(&normalize(&raw))
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 2, 4).unwrap()
    }

    #[test]
    fn heading_split() {
        let heading = "Sam Houston State vs. Abilene Christian Box Score, February 4, 2017";
        let (away, home) = team_names(heading).unwrap();
        assert_eq!(away, "Sam Houston State");
        assert_eq!(home, "Abilene Christian");
    }

    #[test]
    fn malformed_headings() {
        assert!(team_names("Sam Houston State vs. Abilene Christian, February 4, 2017").is_err());
        assert!(team_names("Sam Houston State at Abilene Christian Box Score, Feb 4").is_err());
        assert!(team_names(" vs. Abilene Christian Box Score, February 4, 2017").is_err());
    }

    #[test]
    fn role_boundary() {
        assert_eq!(role_at(4), Role::Starter);
        assert_eq!(role_at(5), Role::Reserve);

        let rows: Vec<RawRow> = (0..3)
            .map(|i| RawRow {
                name: format!("p{}", i),
                cells: vec![],
            })
            .collect();
        let roles: Vec<Role> = assign_roles(rows, 4).into_iter().map(|(r, _)| r).collect();
        assert_eq!(roles, vec![Role::Starter, Role::Reserve, Role::Reserve]);
    }

    #[test]
    fn fixture_counts_and_sides() {
        let records = extract(&fixture(), date()).unwrap();
        // 7 + 7 players; the away "Did Not Play" row is dropped
        assert_eq!(records.len(), 14);

        let home: Vec<_> = records.iter().filter(|r| r.team == "Abilene Christian").collect();
        let away: Vec<_> = records.iter().filter(|r| r.team == "Sam Houston State").collect();
        assert_eq!(home.len(), 7);
        assert_eq!(away.len(), 7);
        // home table comes first
        assert_eq!(records[0].team, "Abilene Christian");
        assert!(records.iter().all(|r| r.date == date()));
    }

    #[test]
    fn fixture_roles_follow_row_order() {
        let records = extract(&fixture(), date()).unwrap();
        let home: Vec<_> = records.iter().filter(|r| r.team == "Abilene Christian").collect();
        assert!(home[..5].iter().all(|r| r.role == Role::Starter));
        assert!(home[5..].iter().all(|r| r.role == Role::Reserve));
        assert_eq!(home[4].player, "Jaren Lewis");
        assert_eq!(home[5].player, "Hayden Farquhar");
    }

    #[test]
    fn fixture_stat_values() {
        let records = extract(&fixture(), date()).unwrap();
        let r = records.iter().find(|r| r.player == "Jaylen Franklin").unwrap();
        assert_eq!(r.mp, 34);
        assert_eq!((r.fg, r.fga), (6, 12));
        assert_eq!(r.fg_pct, Some(0.5));
        assert_eq!((r.three_p, r.three_pa), (2, 5));
        assert_eq!(r.ft_pct, None);
        assert_eq!(r.pts, 14);
    }

    #[test]
    fn single_table_is_malformed() {
        let doc = Html::parse_document(concat!(
            "<h1>A vs. B Box Score, February 4, 2017</h1>",
            "<table><tbody><tr><th>x</th><td>1</td></tr></tbody></table>",
        ));
        assert!(matches!(extract(&doc, date()), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn extraction_is_repeatable() {
        let doc = fixture();
        assert_eq!(extract(&doc, date()).unwrap(), extract(&doc, date()).unwrap());
    }
}
