use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::records::TeamGameResultRecord;

static SUMMARIES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".game_summaries").unwrap());
static SUMMARY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.game_summary.nohover").unwrap());
static WINNER: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".winner").unwrap());
static LOSER: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".loser").unwrap());
static TEAM_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static SCORE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".right").unwrap());
static GAMELINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".gamelink").unwrap());

/// One record per completed game on the page.
///
/// Summary blocks without a winner row are placeholders (postponed or not yet
/// final) and are left out. A block that does not resolve is logged and dropped
/// without affecting the rest of the page; only a missing summaries container
/// fails the whole page.
pub fn extract(doc: &Html, date: NaiveDate) -> Result<Vec<TeamGameResultRecord>> {
    let container = doc
        .select(&SUMMARIES)
        .next()
        .ok_or_else(|| Error::malformed("gamesheet has no game summaries"))?;

    let mut games = Vec::new();
    for (i, block) in container.select(&SUMMARY).enumerate() {
        match game_from_block(block, date) {
            Ok(Some(game)) => games.push(game),
            Ok(None) => debug!(block = i, "No winner in summary block, skipping"),
            Err(e) => warn!(block = i, error = %e, "Unreadable summary block, skipping"),
        }
    }
    Ok(games)
}

/// `None` when the block has no winner row.
pub fn game_from_block(
    block: ElementRef,
    date: NaiveDate,
) -> Result<Option<TeamGameResultRecord>> {
    let Some(winner) = block.select(&WINNER).next() else {
        return Ok(None);
    };
    let loser = block
        .select(&LOSER)
        .next()
        .ok_or_else(|| Error::malformed("summary block has a winner but no loser"))?;

    let (winning_team, winning_score) = side(winner)?;
    let (losing_team, losing_score) = side(loser)?;
    Ok(Some(TeamGameResultRecord {
        date,
        winning_team,
        winning_score,
        losing_team,
        losing_score,
    }))
}

/// Absolute boxscore URLs linked from the day's summaries.
pub fn boxscore_links(doc: &Html, root_url: &str) -> Vec<String> {
    doc.select(&GAMELINK)
        .filter_map(|cell| cell.select(&TEAM_LINK).next())
        .filter_map(|a| a.value().attr("href"))
        .map(|href| {
            if href.starts_with("http") {
                href.to_string()
            } else {
                format!(
                    "{}/{}",
                    root_url.trim_end_matches('/'),
                    href.trim_start_matches('/')
                )
            }
        })
        .collect()
}

fn side(row: ElementRef) -> Result<(String, u32)> {
    let team = row
        .select(&TEAM_LINK)
        .next()
        .map(text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::malformed("summary row without a team link"))?;
    let raw = row
        .select(&SCORE)
        .next()
        .map(text)
        .ok_or_else(|| Error::malformed(format!("no score for {}", team)))?;
    let score = raw
        .parse()
        .map_err(|_| Error::malformed(format!("bad score {:?} for {}", raw, team)))?;
    Ok((team, score))
}

fn text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
