use std::ops::AddAssign;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Starters are the first five data rows of a team table; everyone after is a reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Starter,
    Reserve,
}

/// One player's line in one game. Unique by `(date, team, player)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "IsStarter")]
    pub role: Role,
    #[serde(rename = "MP")]
    pub mp: u32,
    #[serde(rename = "FG")]
    pub fg: u32,
    #[serde(rename = "FGA")]
    pub fga: u32,
    #[serde(rename = "FGpct")]
    pub fg_pct: Option<f64>,
    #[serde(rename = "2P")]
    pub two_p: u32,
    #[serde(rename = "2PA")]
    pub two_pa: u32,
    #[serde(rename = "2Ppct")]
    pub two_p_pct: Option<f64>,
    #[serde(rename = "3P")]
    pub three_p: u32,
    #[serde(rename = "3PA")]
    pub three_pa: u32,
    #[serde(rename = "3Ppct")]
    pub three_p_pct: Option<f64>,
    #[serde(rename = "FT")]
    pub ft: u32,
    #[serde(rename = "FTA")]
    pub fta: u32,
    #[serde(rename = "FTpct")]
    pub ft_pct: Option<f64>,
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
}

impl PlayerGameRecord {
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

impl Table for PlayerGameRecord {
    #[rustfmt::skip]
    const COLUMNS: &'static [&'static str] = &[
        "Date", "Team", "Player", "IsStarter", "MP",
        "FG", "FGA", "FGpct",
        "2P", "2PA", "2Ppct",
        "3P", "3PA", "3Ppct",
        "FT", "FTA", "FTpct",
        "ORB", "DRB", "TRB",
        "AST", "STL", "BLK",
        "TOV", "PF", "PTS",
    ];
}

/// One completed game from a gamesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamGameResultRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "WinningTeam")]
    pub winning_team: String,
    #[serde(rename = "WinningScore")]
    pub winning_score: u32,
    #[serde(rename = "LosingTeam")]
    pub losing_team: String,
    #[serde(rename = "LosingScore")]
    pub losing_score: u32,
}

impl TeamGameResultRecord {
    pub fn margin(&self) -> i32 {
        self.winning_score as i32 - self.losing_score as i32
    }
}

impl Table for TeamGameResultRecord {
    const COLUMNS: &'static [&'static str] =
        &["Date", "WinningTeam", "WinningScore", "LosingTeam", "LosingScore"];
}

/// The additive counting columns shared by player, game and season rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatLine {
    pub mp: u32,
    pub fg: u32,
    pub fga: u32,
    pub two_p: u32,
    pub two_pa: u32,
    pub three_p: u32,
    pub three_pa: u32,
    pub ft: u32,
    pub fta: u32,
    pub orb: u32,
    pub drb: u32,
    pub trb: u32,
    pub ast: u32,
    pub stl: u32,
    pub blk: u32,
    pub tov: u32,
    pub pf: u32,
    pub pts: u32,
}

impl StatLine {
    pub fn fg_pct(&self) -> f64 {
        ratio(self.fg, self.fga)
    }

    pub fn two_p_pct(&self) -> f64 {
        ratio(self.two_p, self.two_pa)
    }

    pub fn three_p_pct(&self) -> f64 {
        ratio(self.three_p, self.three_pa)
    }

    pub fn ft_pct(&self) -> f64 {
        ratio(self.ft, self.fta)
    }
}

impl AddAssign for StatLine {
    fn add_assign(&mut self, o: Self) {
        self.mp += o.mp;
        self.fg += o.fg;
        self.fga += o.fga;
        self.two_p += o.two_p;
        self.two_pa += o.two_pa;
        self.three_p += o.three_p;
        self.three_pa += o.three_pa;
        self.ft += o.ft;
        self.fta += o.fta;
        self.orb += o.orb;
        self.drb += o.drb;
        self.trb += o.trb;
        self.ast += o.ast;
        self.stl += o.stl;
        self.blk += o.blk;
        self.tov += o.tov;
        self.pf += o.pf;
        self.pts += o.pts;
    }
}

/// Made / attempted. Zero attempts yields NaN, never zero and never a panic.
pub fn ratio(made: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        f64::NAN
    } else {
        f64::from(made) / f64::from(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_zero_attempts_is_nan() {
        assert!(ratio(0, 0).is_nan());
        assert_eq!(ratio(3, 4), 0.75);
        assert_eq!(ratio(0, 4), 0.0);
    }

    #[test]
    fn stat_lines_add() {
        let mut a = StatLine {
            fg: 3,
            fga: 7,
            pts: 8,
            ..Default::default()
        };
        a += StatLine {
            fg: 2,
            fga: 3,
            pts: 5,
            ..Default::default()
        };
        assert_eq!((a.fg, a.fga, a.pts), (5, 10, 13));
        assert_eq!(a.fg_pct(), 0.5);
        assert!(a.ft_pct().is_nan());
    }

    #[test]
    fn margin_is_winner_minus_loser() {
        let r = TeamGameResultRecord {
            date: NaiveDate::from_ymd_opt(2017, 2, 4).unwrap(),
            winning_team: "Abilene Christian".into(),
            winning_score: 71,
            losing_team: "Sam Houston State".into(),
            losing_score: 64,
        };
        assert_eq!(r.margin(), 7);
    }

    #[test]
    fn player_columns_are_fixed() {
        assert_eq!(PlayerGameRecord::COLUMNS.len(), 26);
        assert_eq!(PlayerGameRecord::COLUMNS[3], "IsStarter");
        assert_eq!(PlayerGameRecord::COLUMNS[25], "PTS");
    }
}
