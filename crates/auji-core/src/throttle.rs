//! Per-host pacing for listing and detail navigations.
//!
//! Career portals rate-limit aggressively, so consecutive page loads against
//! the same host are spaced by at least `min_delay`. Hosts are paced
//! independently, which lets a Vodafone run and a Mostaql run proceed side by
//! side.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

use crate::error::AppError;
use crate::traits::Fetcher;

/// A [`Fetcher`] wrapper that spaces requests to the same host.
#[derive(Clone)]
pub struct ThrottledFetcher<F> {
    inner: F,
    min_delay: Duration,
    /// Earliest instant the next request to each host may start.
    next_slot: Arc<Mutex<HashMap<String, Instant>>>,
}

impl<F: Fetcher> ThrottledFetcher<F> {
    pub fn new(inner: F, min_delay: Duration) -> Self {
        Self {
            inner,
            min_delay,
            next_slot: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn host_key(url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let host = url.host_str()?;
        Some(match url.port_or_known_default() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }

    /// Reserve the next slot for `url`'s host and sleep until it opens.
    async fn pace(&self, url: &str) {
        if self.min_delay.is_zero() {
            return;
        }
        let Some(host) = Self::host_key(url) else {
            return;
        };

        let start = {
            let mut slots = self.next_slot.lock().await;
            let now = Instant::now();
            let start = slots.get(&host).copied().filter(|t| *t > now).unwrap_or(now);
            slots.insert(host.clone(), start + self.min_delay);
            start
        };

        if start > Instant::now() {
            tracing::debug!(%host, wait_ms = %(start - Instant::now()).as_millis(), "Pacing request");
            tokio::time::sleep_until(start).await;
        }
    }
}

impl<F: Fetcher> Fetcher for ThrottledFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.pace(url).await;
        self.inner.fetch(url).await
    }

    async fn fetch_rendered(&self, url: &str, wait_for: &str) -> Result<String, AppError> {
        self.pace(url).await;
        self.inner.fetch_rendered(url, wait_for).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockFetcher;

    type Throttled = ThrottledFetcher<MockFetcher>;

    #[test]
    fn test_host_key() {
        assert_eq!(
            Throttled::host_key("https://mostaql.com/projects?page=2"),
            Some("mostaql.com:443".to_string())
        );
        assert_eq!(
            Throttled::host_key("http://localhost:8080/x"),
            Some("localhost:8080".to_string())
        );
        assert_eq!(Throttled::host_key("not a url"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_host_is_spaced() {
        let fetcher = ThrottledFetcher::new(MockFetcher::new("ok"), Duration::from_secs(2));
        let start = Instant::now();
        for page in 1..=3 {
            fetcher
                .fetch(&format!("https://jobs.vodafone.com/careers?page={page}"))
                .await
                .unwrap();
        }
        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hosts_are_paced_independently() {
        let fetcher = ThrottledFetcher::new(MockFetcher::new("ok"), Duration::from_secs(2));
        let start = Instant::now();
        fetcher.fetch("https://jobs.vodafone.com/a").await.unwrap();
        fetcher.fetch("https://mostaql.com/b").await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let fetcher = ThrottledFetcher::new(
            MockFetcher::with_error(AppError::HttpError("503".into())),
            Duration::ZERO,
        );
        let err = fetcher.fetch("https://mostaql.com").await.unwrap_err();
        assert!(matches!(err, AppError::HttpError(_)));
    }
}
