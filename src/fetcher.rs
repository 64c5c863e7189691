use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use scraper::Html;
use tracing::{debug, info};

use crate::config::{FetchConfig, PAGE_SUFFIX};
use crate::error::{Error, Result};

/// A page written to disk by this fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    pub path: PathBuf,
    /// Provenance marker written on the first line. Not a dedup key.
    pub lineage_id: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Stored(StoredPage),
    /// Destination already existed and overwrite was not requested; no request was made.
    Skipped(PathBuf),
}

/// Sequential, polite page fetcher. One session, reused for every request.
pub struct PageFetcher {
    client: reqwest::blocking::Client,
    config: FetchConfig,
}

impl PageFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .default_headers(config.profile().header_map())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn set_crawl_delay(&mut self, secs: f64) -> Result<()> {
        self.config.set_crawl_delay(secs)
    }

    /// Fetch `url` into `dest` unless `dest` already exists.
    ///
    /// Sleeps for the crawl delay before the request. Connection failures are
    /// returned as-is; retrying is the caller's decision.
    pub fn fetch(&self, url: &str, dest: &Path, overwrite: bool) -> Result<FetchOutcome> {
        check_destination(dest)?;

        if dest.exists() && !overwrite {
            debug!(path = %dest.display(), "Already fetched, skipping");
            return Ok(FetchOutcome::Skipped(dest.to_path_buf()));
        }
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::thread::sleep(self.config.crawl_delay());

        let body = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|source| Error::Network {
                url: url.to_string(),
                source,
            })?;

        let lineage_id = new_lineage_id();
        let bytes = render_stored_page(&lineage_id, &body, &self.config);
        std::fs::write(dest, &bytes)?;

        info!(url, path = %dest.display(), bytes = bytes.len(), "Saved page");
        Ok(FetchOutcome::Stored(StoredPage {
            path: dest.to_path_buf(),
            lineage_id,
            bytes: bytes.len(),
        }))
    }
}

fn check_destination(dest: &Path) -> Result<()> {
    match dest.to_str() {
        Some(s) if s.ends_with(PAGE_SUFFIX) => Ok(()),
        _ => Err(Error::Config(format!(
            "destination {} must end in {}",
            dest.display(),
            PAGE_SUFFIX
        ))),
    }
}

/// 120 random bits as hex, e.g. `0x3f9c...`.
pub fn new_lineage_id() -> String {
    let bits: u128 = rand::thread_rng().gen::<u128>() >> 8;
    format!("{:#x}", bits)
}

/// ID comment line, then the re-serialized markup, encoded as configured.
fn render_stored_page(lineage_id: &str, body: &str, config: &FetchConfig) -> Vec<u8> {
    let markup = Html::parse_document(body).html();
    let text = format!("<!--ID: {}-->\n{}", lineage_id, markup);
    let (encoded, _, _) = config.encoding().encode(&text);
    encoded.into_owned()
}
