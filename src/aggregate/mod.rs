pub mod cumulative;
pub mod game_stats;
pub mod ids;

pub use cumulative::{cumulative_stats, SeasonCumulativeStat};
pub use game_stats::{game_stats, overtime_periods, team_outcomes, SeasonGameStat, TeamOutcome};
pub use ids::{game_ids, matchup_id, matchups, GameIdRow, Matchup, TeamIdRow, TeamIds};

use crate::error::Result;
use crate::records::{PlayerGameRecord, TeamGameResultRecord};

/// Everything derived from one season's player and result tables.
#[derive(Debug, Clone)]
pub struct Season {
    pub games: Vec<SeasonGameStat>,
    pub cumulative: Vec<SeasonCumulativeStat>,
}

/// Recompute the season from scratch. Same inputs, same outputs.
pub fn season(players: &[PlayerGameRecord], results: &[TeamGameResultRecord]) -> Result<Season> {
    let games = game_stats(players, results)?;
    let cumulative = cumulative_stats(&games);
    Ok(Season { games, cumulative })
}


#[cfg(test)]
mod tests {
    use super::testutil::{game, player};
    use super::*;

    #[test]
    fn rerun_is_deterministic() {
        let players = vec![
            player(4, "Abilene Christian", 200, 25, 55, 6, 18, 15, 20, 71),
            player(4, "Sam Houston State", 200, 24, 60, 4, 20, 12, 15, 64),
        ];
        let results = vec![game(4, "Abilene Christian", 71, "Sam Houston State", 64)];

        let a = season(&players, &results).unwrap();
        let b = season(&players, &results).unwrap();
        assert_eq!(a.games, b.games);
        assert_eq!(a.cumulative, b.cumulative);
        // every (date, team) of the player rows shows up exactly once
        assert_eq!(a.games.len(), 2);
    }
}
