use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{} already exists and overwrite was not requested", path.display())]
    OverwriteConflict { path: PathBuf },

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("No game result for {team} on {date}")]
    MissingResult { date: NaiveDate, team: String },

    #[error("More than one game result for {team} on {date}")]
    DuplicateResult { date: NaiveDate, team: String },

    #[error("Negative overtime count for {team} on {date} ({minutes} minutes played)")]
    NegativeOvertime {
        date: NaiveDate,
        team: String,
        minutes: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
