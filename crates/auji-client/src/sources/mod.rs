//! Career portal extractors.
//!
//! Each source turns a rendered listing page into [`Posting`]s. Parsing is
//! synchronous and never holds a parsed document across an `.await`; the
//! async shells only fetch, then hand owned HTML to the parsers.
//!
//! [`Posting`]: auji_core::Posting

pub mod mostaql;
pub mod vodafone;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use auji_core::{
    AppError, CategorySelection, Extracted, Fetcher, PageRequest, Posting, Source, SourceScraper,
};
use regex::Regex;
use scraper::{ElementRef, Selector};

pub use mostaql::{MostaqlPage, MostaqlScraper};
pub use vodafone::{VodafoneScraper, to_apply_url};

/// Any supported source, chosen at runtime from a [`Source`].
#[derive(Clone)]
pub enum AnyScraper {
    Vodafone(VodafoneScraper),
    Mostaql(MostaqlScraper),
}

impl AnyScraper {
    pub fn for_source(source: Source, debug_dir: impl Into<PathBuf>) -> Self {
        match source {
            Source::Vodafone => AnyScraper::Vodafone(VodafoneScraper::new(debug_dir)),
            Source::Mostaql => AnyScraper::Mostaql(MostaqlScraper::new(debug_dir)),
        }
    }
}

impl SourceScraper for AnyScraper {
    fn source(&self) -> Source {
        match self {
            AnyScraper::Vodafone(s) => s.source(),
            AnyScraper::Mostaql(s) => s.source(),
        }
    }

    fn plan(&self, selection: &CategorySelection, pages: u32) -> Result<Vec<PageRequest>, AppError> {
        match self {
            AnyScraper::Vodafone(s) => s.plan(selection, pages),
            AnyScraper::Mostaql(s) => s.plan(selection, pages),
        }
    }

    async fn scrape<F: Fetcher>(
        &self,
        fetcher: &F,
        request: &PageRequest,
    ) -> Result<Extracted<Vec<Posting>>, AppError> {
        match self {
            AnyScraper::Vodafone(s) => s.scrape(fetcher, request).await,
            AnyScraper::Mostaql(s) => s.scrape(fetcher, request).await,
        }
    }

    async fn fetch_description<F: Fetcher>(
        &self,
        fetcher: &F,
        detail_url: &str,
    ) -> Result<Option<String>, AppError> {
        match self {
            AnyScraper::Vodafone(s) => s.fetch_description(fetcher, detail_url).await,
            AnyScraper::Mostaql(s) => s.fetch_description(fetcher, detail_url).await,
        }
    }
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Text of an element with runs of whitespace collapsed to one space.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// First element matching any of `selectors`, tried in order. The root
/// itself counts as a match.
pub(crate) fn first_match<'a>(root: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|sel| {
        if sel.matches(&root) {
            Some(root)
        } else {
            root.select(sel).next()
        }
    })
}

/// Resolve a possibly relative href against `origin` (`https://host`).
pub(crate) fn absolutize(origin: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with('/') && !href.starts_with("//") {
        format!("{origin}{href}")
    } else {
        href.to_string()
    }
}

/// Write a listing page that yielded nothing to `<dir>/<source>/<label>.html`.
///
/// Dumping is best effort: a failure is logged and `None` returned.
pub(crate) async fn dump_page(dir: &Path, source: &str, label: &str, html: &str) -> Option<PathBuf> {
    let folder = dir.join(source);
    let path = folder.join(format!("{label}.html"));
    let written = async {
        tokio::fs::create_dir_all(&folder).await?;
        tokio::fs::write(&path, html).await
    }
    .await;

    match written {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Dumped empty listing page");
            Some(path)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not dump listing page");
            None
        }
    }
}
