use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::records::TeamGameResultRecord;
use crate::table::Table;

pub const FIRST_TEAM_ID: u32 = 1000;
pub const FIRST_GAME_ID: u32 = 10000;
pub const MATCHUP_SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamIdRow {
    #[serde(rename = "TeamName")]
    pub team: String,
    #[serde(rename = "TeamID")]
    pub id: u32,
}

impl Table for TeamIdRow {
    const COLUMNS: &'static [&'static str] = &["TeamName", "TeamID"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameIdRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "TeamName")]
    pub team: String,
    #[serde(rename = "GameID")]
    pub id: u32,
}

impl Table for GameIdRow {
    const COLUMNS: &'static [&'static str] = &["Date", "TeamName", "GameID"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    #[serde(rename = "Team1")]
    pub team1: String,
    #[serde(rename = "Team2")]
    pub team2: String,
    #[serde(rename = "TeamID1")]
    pub team_id1: u32,
    #[serde(rename = "TeamID2")]
    pub team_id2: u32,
    #[serde(rename = "MatchupID")]
    pub id: String,
}

impl Table for Matchup {
    const COLUMNS: &'static [&'static str] = &["Team1", "Team2", "TeamID1", "TeamID2", "MatchupID"];
}

/// Team ID table. Row order is the order IDs were assigned and is what
/// decides which team comes first in a matchup.
#[derive(Debug, Clone, Default)]
pub struct TeamIds {
    rows: Vec<TeamIdRow>,
    index: HashMap<String, usize>,
}

impl TeamIds {
    /// Every team on either side of a result, sorted by name, numbered from 1000.
    pub fn assign(results: &[TeamGameResultRecord]) -> Self {
        let names: BTreeSet<&str> = results
            .iter()
            .flat_map(|g| [g.winning_team.as_str(), g.losing_team.as_str()])
            .collect();
        let rows = names
            .into_iter()
            .zip(FIRST_TEAM_ID..)
            .map(|(team, id)| TeamIdRow {
                team: team.to_string(),
                id,
            })
            .collect();
        Self::from_rows(rows)
    }

    /// Keep a previously written table as-is.
    pub fn from_rows(rows: Vec<TeamIdRow>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.team.clone(), i))
            .collect();
        Self { rows, index }
    }

    pub fn id(&self, team: &str) -> Option<u32> {
        self.index.get(team).map(|&i| self.rows[i].id)
    }

    pub fn rows(&self) -> &[TeamIdRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One ID per game in input order, from 10000; two rows per game, winner first.
pub fn game_ids(results: &[TeamGameResultRecord]) -> Vec<GameIdRow> {
    results
        .iter()
        .zip(FIRST_GAME_ID..)
        .flat_map(|(g, id)| {
            [
                GameIdRow {
                    date: g.date,
                    team: g.winning_team.clone(),
                    id,
                },
                GameIdRow {
                    date: g.date,
                    team: g.losing_team.clone(),
                    id,
                },
            ]
        })
        .collect()
}

/// Every unordered pair of distinct teams, in ID-table order.
pub fn matchups(ids: &TeamIds) -> Vec<Matchup> {
    ids.rows()
        .iter()
        .tuple_combinations()
        .map(|(a, b)| Matchup {
            team1: a.team.clone(),
            team2: b.team.clone(),
            team_id1: a.id,
            team_id2: b.id,
            id: format!("{}{}{}", a.id, MATCHUP_SEPARATOR, b.id),
        })
        .collect()
}

/// Matchup ID for two teams in either argument order, as `matchups` wrote it.
pub fn matchup_id(ids: &TeamIds, a: &str, b: &str) -> Option<String> {
    let (ia, ib) = (*ids.index.get(a)?, *ids.index.get(b)?);
    if ia == ib {
        return None;
    }
    let (first, second) = if ia < ib { (ia, ib) } else { (ib, ia) };
    Some(format!(
        "{}{}{}",
        ids.rows[first].id, MATCHUP_SEPARATOR, ids.rows[second].id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::testutil::game;
    use std::collections::HashSet;

    fn results() -> Vec<TeamGameResultRecord> {
        vec![
            game(4, "Sam Houston State", 71, "Abilene Christian", 64),
            game(4, "Michigan State", 64, "Ohio State", 58),
            game(5, "Ball State", 80, "Michigan State", 77),
            game(6, "Abilene Christian", 66, "Ohio State", 60),
        ]
    }

    #[test]
    fn team_ids_sorted_from_1000() {
        let ids = TeamIds::assign(&results());
        let names: Vec<&str> = ids.rows().iter().map(|r| r.team.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Abilene Christian",
                "Ball State",
                "Michigan State",
                "Ohio State",
                "Sam Houston State",
            ]
        );
        assert_eq!(ids.id("Abilene Christian"), Some(1000));
        assert_eq!(ids.id("Sam Houston State"), Some(1004));
        assert_eq!(ids.id("Drake"), None);
    }

    #[test]
    fn game_ids_two_rows_per_game() {
        let rows = game_ids(&results());
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].id, 10000);
        assert_eq!(rows[1].id, 10000);
        assert_eq!(rows[0].team, "Sam Houston State");
        assert_eq!(rows[7].id, 10003);
    }

    #[test]
    fn matchup_count_and_uniqueness() {
        let ids = TeamIds::assign(&results());
        let m = matchups(&ids);
        let n = ids.len();
        assert_eq!(m.len(), n * (n - 1) / 2);
        let unique: HashSet<&str> = m.iter().map(|x| x.id.as_str()).collect();
        assert_eq!(unique.len(), m.len());
        assert_eq!(m[0].id, "1000_1001");
        assert!(m.iter().all(|x| x.team1 != x.team2));
    }

    #[test]
    fn lookup_agrees_with_table_order() {
        // file order deliberately not alphabetical
        let ids = TeamIds::from_rows(vec![
            TeamIdRow { team: "Ohio State".into(), id: 1000 },
            TeamIdRow { team: "Ball State".into(), id: 1001 },
            TeamIdRow { team: "Drake".into(), id: 1002 },
        ]);
        let table = matchups(&ids);
        assert_eq!(table[0].team1, "Ohio State");
        for m in &table {
            assert_eq!(matchup_id(&ids, &m.team2, &m.team1).as_deref(), Some(m.id.as_str()));
            assert_eq!(matchup_id(&ids, &m.team1, &m.team2).as_deref(), Some(m.id.as_str()));
        }
        assert_eq!(matchup_id(&ids, "Drake", "Drake"), None);
        assert_eq!(matchup_id(&ids, "Drake", "Iowa"), None);
    }

    #[test]
    fn lookup_from_written_team_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teams.tsv");
        let assigned = TeamIds::assign(&results());
        crate::table::write_table(&path, assigned.rows()).unwrap();

        let reloaded = TeamIds::from_rows(crate::table::read_table(&path).unwrap());
        assert_eq!(reloaded.rows(), assigned.rows());
        for m in matchups(&assigned) {
            assert_eq!(matchup_id(&reloaded, &m.team2, &m.team1), Some(m.id));
        }
    }
}
