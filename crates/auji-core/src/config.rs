use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::ingest::DEFAULT_SOURCE;

/// Runtime knobs shared by the CLI and the server.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Where raw listing pages are dumped when no postings are found.
    pub debug_dir: PathBuf,
    /// Upper bound on waiting for rendered listing content.
    pub page_timeout: Duration,
    /// Minimum delay between two navigations to the same host.
    pub page_delay: Duration,
    /// Source recorded on postings that do not name one.
    pub default_source: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            debug_dir: PathBuf::from("logs"),
            page_timeout: Duration::from_secs(25),
            page_delay: Duration::from_millis(700),
            default_source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Read configuration from environment variables, falling back to defaults.
    ///
    /// - `AUJI_DEBUG_DIR` (defaults to `logs`)
    /// - `AUJI_PAGE_TIMEOUT_SECS` (defaults to 25)
    /// - `AUJI_PAGE_DELAY_MS` (defaults to 700)
    /// - `AUJI_DEFAULT_SOURCE` (defaults to `vodafone`)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let debug_dir = lookup("AUJI_DEBUG_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.debug_dir);

        let page_timeout = match lookup("AUJI_PAGE_TIMEOUT_SECS") {
            None => defaults.page_timeout,
            Some(raw) => {
                let secs = parse_number(&raw, "AUJI_PAGE_TIMEOUT_SECS")?;
                if secs == 0 {
                    return Err(AppError::ConfigError(
                        "AUJI_PAGE_TIMEOUT_SECS must be at least 1".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
        };

        let page_delay = match lookup("AUJI_PAGE_DELAY_MS") {
            None => defaults.page_delay,
            Some(raw) => Duration::from_millis(parse_number(&raw, "AUJI_PAGE_DELAY_MS")?),
        };

        let default_source = lookup("AUJI_DEFAULT_SOURCE")
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.default_source);

        Ok(Self {
            debug_dir,
            page_timeout,
            page_delay,
            default_source,
        })
    }
}

fn parse_number(raw: &str, key: &str) -> Result<u64, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!("Invalid {key} '{raw}': must be a non-negative integer"))
    })
}
