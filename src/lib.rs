//! Fetch sports-reference college basketball pages, mine player box scores and
//! daily game results out of them, and roll those up into season tables.

pub mod aggregate;
pub mod config;
pub mod document;
pub mod error;
pub mod fetcher;
pub mod parser;
pub mod paths;
pub mod records;
pub mod table;

pub use error::{Error, Result};
