use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use cbb_miner::aggregate::{self, TeamIdRow, TeamIds};
use cbb_miner::config::Settings;
use cbb_miner::fetcher::{FetchOutcome, PageFetcher};
use cbb_miner::parser::{self, gamesheet, Mined};
use cbb_miner::records::{PlayerGameRecord, TeamGameResultRecord};
use cbb_miner::table::{self, Table, TableWriter, WriteMode};
use cbb_miner::{document, paths};

const CHUNK_SIZE: usize = 500;

const PLAYERS_TABLE: &str = "boxscores.tsv";
const RESULTS_TABLE: &str = "gamesheets.tsv";
const TEAMS_TABLE: &str = "teams.tsv";
const GAMES_TABLE: &str = "games.tsv";
const MATCHUPS_TABLE: &str = "matchups.tsv";
const GAME_STATS_TABLE: &str = "season-game-stats.tsv";
const CUM_STATS_TABLE: &str = "season-cum-stats.tsv";

#[derive(Parser)]
#[command(
    name = "cbb_miner",
    about = "College basketball box score miner for sports-reference.com"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one day's gamesheet and every box score it links to
    Fetch {
        /// Game day, e.g. 2017-02-04
        #[arg(short, long)]
        date: NaiveDate,
        /// Use the alternate request header profile
        #[arg(long)]
        vpn: bool,
        /// Seconds to wait before each request (overrides CBB_CRAWL_DELAY)
        #[arg(long)]
        delay: Option<f64>,
        /// Re-download pages that already exist on disk
        #[arg(long)]
        overwrite: bool,
    },
    /// Extract player rows from stored box score pages
    MineBoxscores(MineArgs),
    /// Extract game results from stored gamesheet pages
    MineGamesheets(MineArgs),
    /// Write team, game and matchup ID tables from mined game results
    Ids {
        /// Game results table (default: <data_dir>/gamesheets.tsv)
        #[arg(long)]
        results: Option<PathBuf>,
    },
    /// Print the matchup ID for two teams from a written team ID table
    Matchup {
        team_a: String,
        team_b: String,
        /// Team ID table (default: <data_dir>/teams.tsv)
        #[arg(long)]
        teams: Option<PathBuf>,
    },
    /// Write per-game and season-to-date team stat tables
    Aggregate {
        /// Player rows table (default: <data_dir>/boxscores.tsv)
        #[arg(long)]
        players: Option<PathBuf>,
        /// Game results table (default: <data_dir>/gamesheets.tsv)
        #[arg(long)]
        results: Option<PathBuf>,
    },
}

#[derive(Args)]
struct MineArgs {
    /// Directory of stored pages (default: <html_dir>/boxscores or <html_dir>/gamesheets)
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Output table (default: under <data_dir>)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Add rows to an existing table instead of refusing to touch it
    #[arg(long)]
    append: bool,
}

impl MineArgs {
    fn mode(&self) -> WriteMode {
        if self.append {
            WriteMode::Append
        } else {
            WriteMode::CreateNew
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load().context("loading settings")?;
    let html_dir = PathBuf::from(&settings.html_dir);
    let data_dir = PathBuf::from(&settings.data_dir);

    let result = match cli.command {
        Commands::Fetch {
            date,
            vpn,
            delay,
            overwrite,
        } => {
            settings.use_vpn |= vpn;
            if let Some(delay) = delay {
                settings.crawl_delay = delay;
            }
            let counts = fetch_day(&settings, date, overwrite)?;
            println!(
                "Done: {} links ({} stored, {} already on disk, {} errors).",
                counts.links, counts.stored, counts.skipped, counts.errors
            );
            Ok(())
        }
        Commands::MineBoxscores(args) => {
            let dir = args.dir.clone().unwrap_or_else(|| html_dir.join("boxscores"));
            let out = args.output.clone().unwrap_or_else(|| data_dir.join(PLAYERS_TABLE));
            let encoding = settings.fetch_config()?.encoding();
            let counts = mine_dir(&dir, &out, args.mode(), |p| parser::mine_boxscore(p, encoding))?;
            counts.print(&out);
            Ok(())
        }
        Commands::MineGamesheets(args) => {
            let dir = args.dir.clone().unwrap_or_else(|| html_dir.join("gamesheets"));
            let out = args.output.clone().unwrap_or_else(|| data_dir.join(RESULTS_TABLE));
            let encoding = settings.fetch_config()?.encoding();
            let counts =
                mine_dir(&dir, &out, args.mode(), |p| parser::mine_gamesheet(p, encoding))?;
            counts.print(&out);
            Ok(())
        }
        Commands::Ids { results } => {
            let results_path = results.unwrap_or_else(|| data_dir.join(RESULTS_TABLE));
            let results: Vec<TeamGameResultRecord> = table::read_table(&results_path)
                .with_context(|| format!("reading {}", results_path.display()))?;

            let teams = TeamIds::assign(&results);
            let games = aggregate::game_ids(&results);
            let matchups = aggregate::matchups(&teams);
            write_output(&data_dir.join(TEAMS_TABLE), teams.rows())?;
            write_output(&data_dir.join(GAMES_TABLE), &games)?;
            write_output(&data_dir.join(MATCHUPS_TABLE), &matchups)?;
            println!(
                "Wrote {} teams, {} games, {} matchups.",
                teams.len(),
                results.len(),
                matchups.len()
            );
            Ok(())
        }
        Commands::Matchup {
            team_a,
            team_b,
            teams,
        } => {
            let teams_path = teams.unwrap_or_else(|| data_dir.join(TEAMS_TABLE));
            let rows: Vec<TeamIdRow> = table::read_table(&teams_path)
                .with_context(|| format!("reading {}", teams_path.display()))?;
            let ids = TeamIds::from_rows(rows);
            let id = aggregate::matchup_id(&ids, &team_a, &team_b).with_context(|| {
                format!(
                    "no matchup for {:?} and {:?} in {}",
                    team_a,
                    team_b,
                    teams_path.display()
                )
            })?;
            println!("{}", id);
            Ok(())
        }
        Commands::Aggregate { players, results } => {
            let players_path = players.unwrap_or_else(|| data_dir.join(PLAYERS_TABLE));
            let results_path = results.unwrap_or_else(|| data_dir.join(RESULTS_TABLE));
            let players: Vec<PlayerGameRecord> = table::read_table(&players_path)
                .with_context(|| format!("reading {}", players_path.display()))?;
            let results: Vec<TeamGameResultRecord> = table::read_table(&results_path)
                .with_context(|| format!("reading {}", results_path.display()))?;
            info!(players = players.len(), results = results.len(), "Loaded mined tables");

            let season = aggregate::season(&players, &results)?;
            write_output(&data_dir.join(GAME_STATS_TABLE), &season.games)?;
            write_output(&data_dir.join(CUM_STATS_TABLE), &season.cumulative)?;
            println!(
                "Wrote {} team games and {} season-to-date rows.",
                season.games.len(),
                season.cumulative.len()
            );
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

#[derive(Default)]
struct FetchCounts {
    links: usize,
    stored: usize,
    skipped: usize,
    errors: usize,
}

/// Gamesheet first, then each linked box score. Strictly one request at a time.
fn fetch_day(settings: &Settings, date: NaiveDate, overwrite: bool) -> anyhow::Result<FetchCounts> {
    let fetcher = PageFetcher::new(settings.fetch_config()?)?;
    let html_dir = Path::new(&settings.html_dir);

    let sheet_url = paths::gamesheet_url(&settings.root_url, date);
    let sheet_path = paths::gamesheet_path(html_dir, date);
    match fetcher
        .fetch(&sheet_url, &sheet_path, overwrite)
        .with_context(|| format!("fetching gamesheet for {}", date))?
    {
        FetchOutcome::Stored(page) => info!(path = %page.path.display(), "Gamesheet stored"),
        FetchOutcome::Skipped(path) => info!(path = %path.display(), "Gamesheet already on disk"),
    }

    let doc = document::load_with(&sheet_path, fetcher.config().encoding())
        .with_context(|| format!("loading {}", sheet_path.display()))?;
    let links = gamesheet::boxscore_links(&doc, &settings.root_url);
    let mut counts = FetchCounts {
        links: links.len(),
        ..Default::default()
    };

    let pb = progress_bar(links.len());
    for url in &links {
        let dest = paths::boxscore_path(html_dir, url);
        match fetcher.fetch(url, &dest, overwrite) {
            Ok(FetchOutcome::Stored(_)) => counts.stored += 1,
            Ok(FetchOutcome::Skipped(_)) => counts.skipped += 1,
            Err(e) => {
                warn!(%url, error = %e, "Box score fetch failed");
                counts.errors += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(counts)
}

#[derive(Default)]
struct MineCounts {
    pages: usize,
    rows: usize,
    skipped: usize,
}

impl MineCounts {
    fn print(&self, out: &Path) {
        println!(
            "Mined {} pages into {} rows ({} skipped) -> {}",
            self.pages,
            self.rows,
            self.skipped,
            out.display()
        );
    }
}

/// Extract every stored page in `dir` and write the rows through one writer.
/// Skipped pages are logged; the first hard failure stops the run.
fn mine_dir<T, F>(dir: &Path, out: &Path, mode: WriteMode, miner: F) -> anyhow::Result<MineCounts>
where
    T: Table + Send,
    F: Fn(&Path) -> Mined<T> + Sync,
{
    let pages = list_pages(dir)?;
    if pages.is_empty() {
        println!("No stored pages in {}.", dir.display());
        return Ok(MineCounts::default());
    }
    info!(dir = %dir.display(), pages = pages.len(), "Mining pages");

    let mut writer = TableWriter::<T>::open(out, mode)
        .with_context(|| format!("opening {}", out.display()))?;
    let mut counts = MineCounts {
        pages: pages.len(),
        ..Default::default()
    };

    let pb = progress_bar(pages.len());
    for chunk in pages.chunks(CHUNK_SIZE) {
        for (path, mined) in parser::mine_all(chunk, &miner) {
            match mined {
                Mined::Records(rows) => writer.write_all(&rows)?,
                Mined::Skipped(reason) => {
                    warn!(path = %path.display(), %reason, "Skipping page");
                    counts.skipped += 1;
                }
                Mined::Failed(e) => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("mining {}", path.display())));
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    counts.rows = writer.finish()?;
    Ok(counts)
}

/// Stored pages in `dir`, sorted by file name.
fn list_pages(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut pages = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}

fn write_output<R: Table>(path: &Path, rows: &[R]) -> anyhow::Result<()> {
    let n = table::write_table(path, rows).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), rows = n, "Wrote table");
    Ok(())
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
