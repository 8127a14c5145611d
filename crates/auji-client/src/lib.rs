#[cfg(feature = "browser")]
pub mod browser_fetcher;
pub mod cleaner;
pub mod fetcher;
pub mod sources;

#[cfg(feature = "browser")]
pub use browser_fetcher::BrowserFetcher;
pub use cleaner::HtmdCleaner;
pub use fetcher::ReqwestFetcher;
pub use sources::{AnyScraper, MostaqlScraper, VodafoneScraper, to_apply_url};
