use std::time::Duration;

use encoding_rs::Encoding;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONNECTION, USER_AGENT};
use serde::Deserialize;

use crate::error::{Error, Result};

pub const ROOT_URL: &str = "https://www.sports-reference.com/";
pub const DEFAULT_CRAWL_DELAY_SECS: f64 = 5.0;
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Stored pages must carry this suffix.
pub const PAGE_SUFFIX: &str = ".txt";

const DEFAULT_USER_AGENT: &str = "cbb_miner/0.1";
const VPN_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Runtime settings: defaults, then `cbb_miner.toml`, then `CBB_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub root_url: String,
    pub html_dir: String,
    pub data_dir: String,
    /// Seconds to sleep before every request (CBB_CRAWL_DELAY)
    pub crawl_delay: f64,
    /// Label understood by encoding_rs, e.g. "utf-8", "latin1" (CBB_ENCODING)
    pub encoding: String,
    /// Send the alternate header profile (CBB_USE_VPN)
    pub use_vpn: bool,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let built = config::Config::builder()
            .set_default("root_url", ROOT_URL)
            .and_then(|b| b.set_default("html_dir", "html"))
            .and_then(|b| b.set_default("data_dir", "data"))
            .and_then(|b| b.set_default("crawl_delay", DEFAULT_CRAWL_DELAY_SECS))
            .and_then(|b| b.set_default("encoding", DEFAULT_ENCODING))
            .and_then(|b| b.set_default("use_vpn", false))
            .map_err(|e| Error::Config(e.to_string()))?
            .add_source(config::File::with_name("cbb_miner").required(false))
            .add_source(config::Environment::with_prefix("CBB"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        built
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))
    }

    pub fn fetch_config(&self) -> Result<FetchConfig> {
        let profile = if self.use_vpn {
            HeaderProfile::Vpn
        } else {
            HeaderProfile::Default
        };
        FetchConfig::new(profile, &self.encoding, self.crawl_delay)
    }
}

/// Which fixed set of request headers the session sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderProfile {
    #[default]
    Default,
    Vpn,
}

impl HeaderProfile {
    pub fn header_map(self) -> HeaderMap {
        let agent = match self {
            HeaderProfile::Default => DEFAULT_USER_AGENT,
            HeaderProfile::Vpn => VPN_USER_AGENT,
        };
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(agent));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers
    }
}

/// Everything a fetch needs, validated up front so bad values fail before any I/O.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    profile: HeaderProfile,
    encoding: &'static Encoding,
    crawl_delay: Duration,
}

impl FetchConfig {
    pub fn new(profile: HeaderProfile, encoding: &str, crawl_delay_secs: f64) -> Result<Self> {
        let label = encoding;
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| Error::Config(format!("unknown encoding '{}'", label)))?;
        // UTF-16 and the replacement encoding only encode as UTF-8.
        if encoding.output_encoding() != encoding {
            return Err(Error::Config(format!(
                "encoding '{}' cannot be used to store pages",
                label
            )));
        }
        Ok(Self {
            profile,
            encoding,
            crawl_delay: delay_from_secs(crawl_delay_secs)?,
        })
    }

    pub fn set_crawl_delay(&mut self, secs: f64) -> Result<()> {
        self.crawl_delay = delay_from_secs(secs)?;
        Ok(())
    }

    pub fn profile(&self) -> HeaderProfile {
        self.profile
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn crawl_delay(&self) -> Duration {
        self.crawl_delay
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            profile: HeaderProfile::Default,
            encoding: encoding_rs::UTF_8,
            crawl_delay: Duration::from_secs_f64(DEFAULT_CRAWL_DELAY_SECS),
        }
    }
}

fn delay_from_secs(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::Config(format!(
            "crawl delay must be a non-negative number of seconds, got {}",
            secs
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = FetchConfig::default();
        assert_eq!(cfg.crawl_delay(), Duration::from_secs(5));
        assert_eq!(cfg.encoding(), encoding_rs::UTF_8);
        assert_eq!(cfg.profile(), HeaderProfile::Default);
    }

    #[test]
    fn encoding_labels() {
        let cfg = FetchConfig::new(HeaderProfile::Default, "latin1", 0.0).unwrap();
        assert_eq!(cfg.encoding(), encoding_rs::WINDOWS_1252);
        assert!(matches!(
            FetchConfig::new(HeaderProfile::Default, "klingon-8", 1.0),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn decode_only_encodings_rejected() {
        for label in ["utf-16", "utf-16be", "iso-2022-kr"] {
            let result = FetchConfig::new(HeaderProfile::Default, label, 0.0);
            assert!(matches!(result, Err(Error::Config(_))), "{} should be rejected", label);
        }
    }

    #[test]
    fn negative_delay_rejected() {
        assert!(matches!(
            FetchConfig::new(HeaderProfile::Vpn, "utf-8", -1.0),
            Err(Error::Config(_))
        ));
        let mut cfg = FetchConfig::default();
        assert!(cfg.set_crawl_delay(f64::NAN).is_err());
        cfg.set_crawl_delay(0.25).unwrap();
        assert_eq!(cfg.crawl_delay(), Duration::from_millis(250));
    }

    #[test]
    fn profiles_differ_only_in_agent() {
        let a = HeaderProfile::Default.header_map();
        let b = HeaderProfile::Vpn.header_map();
        assert_ne!(a.get(USER_AGENT), b.get(USER_AGENT));
        assert_eq!(a.get(ACCEPT), b.get(ACCEPT));
    }
}
