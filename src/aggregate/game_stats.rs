use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::records::{PlayerGameRecord, StatLine, TeamGameResultRecord};
use crate::table::Table;

/// Five players on the floor for two 20-minute halves.
pub const REGULATION_MINUTES: i32 = 200;
/// Five players for one 5-minute overtime.
pub const OVERTIME_MINUTES: i32 = 25;

/// One side of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamOutcome {
    pub date: NaiveDate,
    pub team: String,
    pub score: u32,
    /// Positive for the winner, the negated margin for the loser.
    pub score_diff: i32,
    pub win: bool,
}

/// A team's summed box score for one game joined with how the game ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonGameStat {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "MP")]
    pub mp: u32,
    #[serde(rename = "FG")]
    pub fg: u32,
    #[serde(rename = "FGA")]
    pub fga: u32,
    #[serde(rename = "FGpct")]
    pub fg_pct: f64,
    #[serde(rename = "2P")]
    pub two_p: u32,
    #[serde(rename = "2PA")]
    pub two_pa: u32,
    #[serde(rename = "2Ppct")]
    pub two_p_pct: f64,
    #[serde(rename = "3P")]
    pub three_p: u32,
    #[serde(rename = "3PA")]
    pub three_pa: u32,
    #[serde(rename = "3Ppct")]
    pub three_p_pct: f64,
    #[serde(rename = "FT")]
    pub ft: u32,
    #[serde(rename = "FTA")]
    pub fta: u32,
    #[serde(rename = "FTpct")]
    pub ft_pct: f64,
    #[serde(rename = "ORB")]
    pub orb: u32,
    #[serde(rename = "DRB")]
    pub drb: u32,
    #[serde(rename = "TRB")]
    pub trb: u32,
    #[serde(rename = "AST")]
    pub ast: u32,
    #[serde(rename = "STL")]
    pub stl: u32,
    #[serde(rename = "BLK")]
    pub blk: u32,
    #[serde(rename = "TOV")]
    pub tov: u32,
    #[serde(rename = "PF")]
    pub pf: u32,
    #[serde(rename = "PTS")]
    pub pts: u32,
    #[serde(rename = "NumOT")]
    pub num_ot: i32,
    #[serde(rename = "Score")]
    pub score: u32,
    #[serde(rename = "ScoreDiff")]
    pub score_diff: i32,
    #[serde(rename = "Win")]
    pub win: bool,
}

impl SeasonGameStat {
    fn new(line: StatLine, num_ot: i32, outcome: &TeamOutcome) -> Self {
        Self {
            date: outcome.date,
            team: outcome.team.clone(),
            mp: line.mp,
            fg: line.fg,
            fga: line.fga,
            fg_pct: line.fg_pct(),
            two_p: line.two_p,
            two_pa: line.two_pa,
            two_p_pct: line.two_p_pct(),
            three_p: line.three_p,
            three_pa: line.three_pa,
            three_p_pct: line.three_p_pct(),
            ft: line.ft,
            fta: line.fta,
            ft_pct: line.ft_pct(),
            orb: line.orb,
            drb: line.drb,
            trb: line.trb,
            ast: line.ast,
            stl: line.stl,
            blk: line.blk,
            tov: line.tov,
            pf: line.pf,
            pts: line.pts,
            num_ot,
            score: outcome.score,
            score_diff: outcome.score_diff,
            win: outcome.win,
        }
    }

    pub fn line(&self) -> StatLine {
        StatLine {
            mp: self.mp,
            fg: self.fg,
            fga: self.fga,
            two_p: self.two_p,
            two_pa: self.two_pa,
            three_p: self.three_p,
            three_pa: self.three_pa,
            ft: self.ft,
            fta: self.fta,
            orb: self.orb,
            drb: self.drb,
            trb: self.trb,
            ast: self.ast,
            stl: self.stl,
            blk: self.blk,
            tov: self.tov,
            pf: self.pf,
            pts: self.pts,
        }
    }
}

impl Table for SeasonGameStat {
    #[rustfmt::skip]
    const COLUMNS: &'static [&'static str] = &[
        "Date", "Team", "MP",
        "FG", "FGA", "FGpct",
        "2P", "2PA", "2Ppct",
        "3P", "3PA", "3Ppct",
        "FT", "FTA", "FTpct",
        "ORB", "DRB", "TRB",
        "AST", "STL", "BLK",
        "TOV", "PF", "PTS",
        "NumOT", "Score", "ScoreDiff", "Win",
    ];
}

/// Completed overtime periods implied by total team minutes. Floor division,
/// so a short minutes total comes out negative.
pub fn overtime_periods(minutes: u32) -> i32 {
    (minutes as i32 - REGULATION_MINUTES).div_euclid(OVERTIME_MINUTES)
}

/// Two rows per game: winner then loser.
pub fn team_outcomes(results: &[TeamGameResultRecord]) -> Vec<TeamOutcome> {
    results
        .iter()
        .flat_map(|g| {
            let margin = g.margin();
            [
                TeamOutcome {
                    date: g.date,
                    team: g.winning_team.clone(),
                    score: g.winning_score,
                    score_diff: margin,
                    win: true,
                },
                TeamOutcome {
                    date: g.date,
                    team: g.losing_team.clone(),
                    score: g.losing_score,
                    score_diff: -margin,
                    win: false,
                },
            ]
        })
        .collect()
}

/// Sum player lines per `(date, team)` and join each sum to its game result.
///
/// Output is ordered by date, then team. Every summed game must have exactly one
/// result; results without box scores are not an error and produce no row.
pub fn game_stats(
    players: &[PlayerGameRecord],
    results: &[TeamGameResultRecord],
) -> Result<Vec<SeasonGameStat>> {
    let mut sums: BTreeMap<(NaiveDate, &str), StatLine> = BTreeMap::new();
    for p in players {
        *sums.entry((p.date, p.team.as_str())).or_default() += p.line();
    }

    let mut outcomes: HashMap<(NaiveDate, String), TeamOutcome> = HashMap::new();
    for outcome in team_outcomes(results) {
        let key = (outcome.date, outcome.team.clone());
        if outcomes.contains_key(&key) {
            let (date, team) = key;
            return Err(Error::DuplicateResult { date, team });
        }
        outcomes.insert(key, outcome);
    }

    let mut stats = Vec::with_capacity(sums.len());
    for ((date, team), line) in sums {
        let outcome = outcomes
            .get(&(date, team.to_string()))
            .ok_or_else(|| Error::MissingResult {
                date,
                team: team.to_string(),
            })?;
        let num_ot = overtime_periods(line.mp);
        if num_ot < 0 {
            return Err(Error::NegativeOvertime {
                date,
                team: team.to_string(),
                minutes: line.mp,
            });
        }
        stats.push(SeasonGameStat::new(line, num_ot, outcome));
    }
    Ok(stats)
}
