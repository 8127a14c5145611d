/// Smoke test for `BrowserFetcher` against a live listing.
///
/// Renders the first Mostaql marketing page and prints what the extractor
/// finds. Run with:
///   cargo run -p auji-client --example listing_smoke --features browser
use auji_client::{BrowserFetcher, MostaqlScraper};
use auji_core::{CategorySelection, SourceScraper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let fetcher = BrowserFetcher::launch().await?;
    let scraper = MostaqlScraper::new("logs");
    let plan = scraper.plan(&CategorySelection::Direct("marketing".into()), 1)?;

    let result = scraper.scrape(&fetcher, &plan[0]).await;
    fetcher.close().await?;

    let extracted = result?;
    for warning in &extracted.warnings {
        println!("warning: {warning}");
    }
    for posting in &extracted.value {
        println!(
            "{} | {} | {}",
            posting.title,
            posting.company,
            posting.detail_url.as_deref().unwrap_or("-")
        );
    }
    println!("{} posting(s)", extracted.value.len());
    Ok(())
}
