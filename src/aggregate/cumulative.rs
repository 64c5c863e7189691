use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::game_stats::SeasonGameStat;
use crate::records::StatLine;
use crate::table::Table;

/// Season-to-date totals for one team, through `date` inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonCumulativeStat {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Games")]
    pub games: u32,
    #[serde(rename = "CumMP")]
    pub mp: u32,
    #[serde(rename = "CumFG")]
    pub fg: u32,
    #[serde(rename = "CumFGA")]
    pub fga: u32,
    #[serde(rename = "CumFGpct")]
    pub fg_pct: f64,
    #[serde(rename = "Cum2P")]
    pub two_p: u32,
    #[serde(rename = "Cum2PA")]
    pub two_pa: u32,
    #[serde(rename = "Cum2Ppct")]
    pub two_p_pct: f64,
    #[serde(rename = "Cum3P")]
    pub three_p: u32,
    #[serde(rename = "Cum3PA")]
    pub three_pa: u32,
    #[serde(rename = "Cum3Ppct")]
    pub three_p_pct: f64,
    #[serde(rename = "CumFT")]
    pub ft: u32,
    #[serde(rename = "CumFTA")]
    pub fta: u32,
    #[serde(rename = "CumFTpct")]
    pub ft_pct: f64,
    #[serde(rename = "CumORB")]
    pub orb: u32,
    #[serde(rename = "CumDRB")]
    pub drb: u32,
    #[serde(rename = "CumTRB")]
    pub trb: u32,
    #[serde(rename = "CumAST")]
    pub ast: u32,
    #[serde(rename = "CumSTL")]
    pub stl: u32,
    #[serde(rename = "CumBLK")]
    pub blk: u32,
    #[serde(rename = "CumTOV")]
    pub tov: u32,
    #[serde(rename = "CumPF")]
    pub pf: u32,
    #[serde(rename = "CumPTS")]
    pub pts: u32,
    #[serde(rename = "CumNumOT")]
    pub num_ot: i32,
    #[serde(rename = "CumScore")]
    pub score: u32,
    #[serde(rename = "CumScoreDiff")]
    pub score_diff: i32,
    #[serde(rename = "CumWin")]
    pub wins: u32,
}

impl Table for SeasonCumulativeStat {
    #[rustfmt::skip]
    const COLUMNS: &'static [&'static str] = &[
        "Date", "Team", "Games", "CumMP",
        "CumFG", "CumFGA", "CumFGpct",
        "Cum2P", "Cum2PA", "Cum2Ppct",
        "Cum3P", "Cum3PA", "Cum3Ppct",
        "CumFT", "CumFTA", "CumFTpct",
        "CumORB", "CumDRB", "CumTRB",
        "CumAST", "CumSTL", "CumBLK",
        "CumTOV", "CumPF", "CumPTS",
        "CumNumOT", "CumScore", "CumScoreDiff", "CumWin",
    ];
}

#[derive(Debug, Default)]
struct Running {
    games: u32,
    line: StatLine,
    num_ot: i32,
    score: u32,
    score_diff: i32,
    wins: u32,
}

impl Running {
    fn add(&mut self, g: &SeasonGameStat) {
        self.games += 1;
        self.line += g.line();
        self.num_ot += g.num_ot;
        self.score += g.score;
        self.score_diff += g.score_diff;
        self.wins += u32::from(g.win);
    }

    fn snapshot(&self, date: NaiveDate, team: &str) -> SeasonCumulativeStat {
        let l = &self.line;
        SeasonCumulativeStat {
            date,
            team: team.to_string(),
            games: self.games,
            mp: l.mp,
            fg: l.fg,
            fga: l.fga,
            fg_pct: l.fg_pct(),
            two_p: l.two_p,
            two_pa: l.two_pa,
            two_p_pct: l.two_p_pct(),
            three_p: l.three_p,
            three_pa: l.three_pa,
            three_p_pct: l.three_p_pct(),
            ft: l.ft,
            fta: l.fta,
            ft_pct: l.ft_pct(),
            orb: l.orb,
            drb: l.drb,
            trb: l.trb,
            ast: l.ast,
            stl: l.stl,
            blk: l.blk,
            tov: l.tov,
            pf: l.pf,
            pts: l.pts,
            num_ot: self.num_ot,
            score: self.score,
            score_diff: self.score_diff,
            wins: self.wins,
        }
    }
}

/// Running totals per team in date order. Totals reset for every team.
/// Percentages come from the running makes and attempts (NaN while attempts are zero).
///
/// Output is ordered by date, then team, matching `game_stats`.
pub fn cumulative_stats(games: &[SeasonGameStat]) -> Vec<SeasonCumulativeStat> {
    let by_team = games
        .iter()
        .sorted_by(|a, b| (&a.team, a.date).cmp(&(&b.team, b.date)))
        .group_by(|g| g.team.as_str());

    let mut out = Vec::with_capacity(games.len());
    for (team, rows) in &by_team {
        let mut running = Running::default();
        for g in rows {
            running.add(g);
            out.push(running.snapshot(g.date, team));
        }
    }

    out.sort_by(|a, b| (a.date, &a.team).cmp(&(b.date, &b.team)));
    out
}
