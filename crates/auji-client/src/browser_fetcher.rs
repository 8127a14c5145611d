use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use auji_core::{AppError, Fetcher};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tokio::sync::Mutex;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Headless-browser fetcher using Chromium via the Chrome DevTools Protocol.
///
/// Both career portals build their listings client-side, so this is the
/// fetcher real runs use. All clones share one Chromium process, and the
/// session lock allows a single navigation at a time: each call opens a
/// tab, waits (bounded) for the expected content, scrolls once to trigger
/// lazy loading, reads the DOM and closes the tab.
///
/// The session lives until [`close`](Self::close) is called.
#[derive(Clone)]
pub struct BrowserFetcher {
    session: Arc<Mutex<Option<Browser>>>,
    timeout: Duration,
    render_wait: Duration,
}

impl BrowserFetcher {
    /// Launch with a 25 s navigation timeout and a 10 s render wait.
    pub async fn launch() -> Result<Self, AppError> {
        Self::with_timeouts(Duration::from_secs(25), Duration::from_secs(10)).await
    }

    /// `timeout` bounds the whole navigation; `render_wait` bounds the wait
    /// for `wait_for` to appear, after which whatever rendered is returned.
    pub async fn with_timeouts(timeout: Duration, render_wait: Duration) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();

        if let Some(bin) = find_chrome_binary() {
            tracing::info!(binary = %bin.display(), "Using Chrome binary");
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .arg("--lang=ar,en-US")
            .window_size(1366, 900)
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled for the connection to make progress.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::warn!(error = %e, "Browser CDP handler error");
                    break;
                }
            }
        });

        Ok(Self {
            session: Arc::new(Mutex::new(Some(browser))),
            timeout,
            render_wait,
        })
    }

    /// Shut the browser down. Later fetches fail with `BrowserError`.
    pub async fn close(&self) -> Result<(), AppError> {
        let Some(mut browser) = self.session.lock().await.take() else {
            return Ok(());
        };
        browser
            .close()
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to close browser: {e}")))?;
        browser
            .wait()
            .await
            .map_err(|e| AppError::BrowserError(format!("Browser did not exit: {e}")))?;
        tracing::debug!("Browser closed");
        Ok(())
    }

    async fn navigate(&self, url: &str, wait_for: &str) -> Result<String, AppError> {
        let session = self.session.lock().await;
        let browser = session
            .as_ref()
            .ok_or_else(|| AppError::BrowserError("Browser session is closed".into()))?;

        let page = browser
            .new_page(url)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to navigate to {url}: {e}")))?;
        let _tab = TabGuard::new(page.clone(), |page: Page| {
            async move {
                if let Err(e) = page.close().await {
                    tracing::debug!(error = %e, "Failed to close tab");
                }
            }
            .boxed()
        });

        self.read_rendered(&page, url, wait_for).await
    }

    async fn read_rendered(&self, page: &Page, url: &str, wait_for: &str) -> Result<String, AppError> {
        let appeared = tokio::time::timeout(self.render_wait, async {
            while page.find_element(wait_for).await.is_err() {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;
        if appeared.is_err() {
            tracing::warn!(url, wait_for, "Expected content did not render, extracting anyway");
        }

        if let Err(e) = page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
        {
            tracing::debug!(url, error = %e, "Scroll failed");
        }

        page.content()
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to read page content: {e}")))
    }
}

impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.fetch_rendered(url, "body").await
    }

    async fn fetch_rendered(&self, url: &str, wait_for: &str) -> Result<String, AppError> {
        tokio::time::timeout(self.timeout, self.navigate(url, wait_for))
            .await
            .map_err(|_| AppError::Timeout(self.timeout.as_secs()))?
    }
}

/// Holds a handle to an open tab and closes it when dropped.
///
/// Dropping covers every exit path, including the fetch future being
/// cancelled by its timeout halfway through a navigation.
struct TabGuard<T, C>
where
    T: Send + 'static,
    C: FnOnce(T) -> BoxFuture<'static, ()>,
{
    tab: Option<T>,
    close: Option<C>,
}

impl<T, C> TabGuard<T, C>
where
    T: Send + 'static,
    C: FnOnce(T) -> BoxFuture<'static, ()>,
{
    fn new(tab: T, close: C) -> Self {
        Self {
            tab: Some(tab),
            close: Some(close),
        }
    }
}

impl<T, C> Drop for TabGuard<T, C>
where
    T: Send + 'static,
    C: FnOnce(T) -> BoxFuture<'static, ()>,
{
    fn drop(&mut self) {
        let (Some(tab), Some(close)) = (self.tab.take(), self.close.take()) else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(close(tab));
            }
            Err(_) => tracing::warn!("No runtime to close browser tab on"),
        }
    }
}

/// Locate a real Chrome/Chromium binary, honouring `CHROME_BIN`.
///
/// The snap wrapper at `/snap/bin/chromium` drops unknown flags and breaks
/// headless mode, so the binary inside the snap is preferred. `None` lets
/// chromiumoxide do its own lookup.
fn find_chrome_binary() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CHROME_BIN").map(PathBuf::from)
        && path.exists()
    {
        return Some(path);
    }

    [
        "/snap/chromium/current/usr/lib/chromium-browser/chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}
