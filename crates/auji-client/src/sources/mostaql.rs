//! Mostaql (freelance marketplace) listing extractor.
//!
//! Listings are Arabic. A run maps the requested profiles onto one Mostaql
//! category expression (`marketing`, `development` or both), and every
//! project title is classified back into a profile category.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::LazyLock;

use auji_core::{
    AppError, Category, CategorySelection, EmploymentType, ExtractWarning, Extracted, Fetcher,
    PageRequest, Posting, Source, SourceContext, SourceScraper, classify,
    parse_relative_time_arabic,
};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{absolutize, dump_page, element_text, selector};

const ORIGIN: &str = "https://mostaql.com";
const LISTING_PATH: &str = "https://mostaql.com/projects";
/// Company recorded when the project owner cannot be found.
const UNKNOWN_OWNER: &str = "مستقل";

/// Project title anchors, newest markup first.
const LINK_CSS: &str = r#"div.card-title h2 a.anchor, h2 a[href*="/project/"], h3 a[href*="/project/"]"#;

static LINK: LazyLock<Selector> = LazyLock::new(|| selector(LINK_CSS));
static META_LIST: LazyLock<Selector> =
    LazyLock::new(|| selector("ul.project_meta, ul.list-meta-items"));
static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li"));
static ICON: LazyLock<Selector> = LazyLock::new(|| selector("i"));
static BDI: LazyLock<Selector> = LazyLock::new(|| selector("bdi"));
static ANY_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static PROFILE_LINK: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[href*="/u/"]"#));

/// Ancestor levels searched for a project's metadata list.
const META_DEPTH: usize = 4;

/// Tokens marking the relative post-time item of a project card.
const POSTED_TOKENS: [&str; 9] = [
    "منذ", "قبل", "دقيقة", "دقائق", "ساعة", "ساعات", "يوم", "أيام", "أسبوع",
];

/// Mostaql category expression for a set of profiles.
///
/// Marketing alone maps to `marketing`, data/ML alone to `development`, both
/// to `development,marketing`. Nothing recognised falls back to `marketing`.
pub fn category_expression<'a>(categories: impl IntoIterator<Item = &'a Category>) -> &'static str {
    let mut marketing = false;
    let mut development = false;
    for category in categories {
        match category {
            Category::DigitalMarketing => marketing = true,
            Category::DataAnalysis | Category::MachineLearning => development = true,
            Category::Other(_) => {}
        }
    }
    match (marketing, development) {
        (true, true) => "development,marketing",
        (false, true) => "development",
        _ => "marketing",
    }
}

fn context_for(expression: &str) -> SourceContext {
    let parts: HashSet<&str> = expression.split(',').map(str::trim).collect();
    match (parts.contains("marketing"), parts.contains("development")) {
        (true, false) => SourceContext::MarketingOnly,
        (false, true) => SourceContext::DevelopmentOnly,
        _ => SourceContext::Mixed,
    }
}

/// Listing URL for a category expression and 1-based page.
pub fn listing_url(expression: &str, page: u32) -> Result<String, AppError> {
    let mut url = Url::parse(LISTING_PATH)
        .map_err(|e| AppError::Generic(format!("Invalid listing URL: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("category", expression);
        query.append_pair("sort", "latest");
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
    }
    Ok(url.into())
}

/// A parsed Mostaql listing page.
pub struct MostaqlPage {
    document: Html,
}

impl MostaqlPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// True when no project anchor matched at all.
    pub fn is_empty(&self) -> bool {
        self.document.select(&LINK).next().is_none()
    }

    /// Postings on the page, in document order, deduplicated by link.
    ///
    /// The iterator is lazy and each call starts over, yielding the same
    /// postings for the same markup.
    pub fn postings<'a>(&'a self, request: &'a PageRequest) -> impl Iterator<Item = Posting> + 'a {
        let mut seen = HashSet::new();
        self.document
            .select(&LINK)
            .filter_map(move |anchor| {
                let title = element_text(&anchor);
                let href = anchor.value().attr("href").map(str::trim).unwrap_or_default();
                if title.is_empty() || href.is_empty() {
                    return None;
                }
                let link = absolutize(ORIGIN, href);
                if !seen.insert(link.clone()) {
                    return None;
                }
                Some(build_posting(anchor, title, link, request))
            })
    }
}

fn build_posting(anchor: ElementRef<'_>, title: String, link: String, request: &PageRequest) -> Posting {
    let (owner, posted_text) = meta_list(anchor)
        .map(read_meta)
        .unwrap_or((None, None));

    let mut posting = Posting::new(title, Source::Mostaql.as_str());
    posting.category = Some(classify(&posting.title, &request.active, request.context));
    posting.company = owner.unwrap_or_else(|| UNKNOWN_OWNER.to_string());
    posting.detail_url = Some(link.clone());
    posting.apply_url = Some(link.clone());
    posting.url = Some(link);
    posting.employment_type = Some(EmploymentType::Freelance.into());
    posting.posted_at = parse_relative_time_arabic(posted_text.as_deref());
    posting
}

/// Metadata list of a project: searched under the anchor and its nearest
/// ancestors, then under the enclosing card-title container.
fn meta_list(anchor: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let near = std::iter::once(anchor)
        .chain(anchor.ancestors().filter_map(ElementRef::wrap))
        .take(META_DEPTH);
    for node in near {
        if let Some(ul) = node.select(&META_LIST).next() {
            return Some(ul);
        }
    }

    let card = anchor.ancestors().filter_map(ElementRef::wrap).find(|el| {
        el.value()
            .classes()
            .any(|c| c == "card-title" || c == "card-title_wrapper")
    })?;
    card.select(&META_LIST).next()
}

/// Owner name and posted-time text from a metadata list.
fn read_meta(ul: ElementRef<'_>) -> (Option<String>, Option<String>) {
    let mut owner = None;
    let mut posted = None;

    for li in ul.select(&LIST_ITEM) {
        if owner.is_none() {
            let user_icon = li
                .select(&ICON)
                .next()
                .is_some_and(|i| i.value().classes().any(|c| c.contains("fa-user")));
            let name_el = if user_icon {
                li.select(&BDI).next().or_else(|| li.select(&ANY_LINK).next())
            } else {
                li.select(&PROFILE_LINK).next()
            };
            owner = name_el
                .map(|el| element_text(&el))
                .filter(|name| !name.is_empty());
        }
        if posted.is_none() {
            let text = element_text(&li);
            if POSTED_TOKENS.iter().any(|t| text.contains(t)) {
                posted = Some(text);
            }
        }
    }

    (owner, posted)
}

/// Scraper for Mostaql project listings.
#[derive(Debug, Clone)]
pub struct MostaqlScraper {
    debug_dir: PathBuf,
}

impl MostaqlScraper {
    pub fn new(debug_dir: impl Into<PathBuf>) -> Self {
        Self {
            debug_dir: debug_dir.into(),
        }
    }
}

impl SourceScraper for MostaqlScraper {
    fn source(&self) -> Source {
        Source::Mostaql
    }

    fn plan(&self, selection: &CategorySelection, pages: u32) -> Result<Vec<PageRequest>, AppError> {
        let active = selection.active_set();
        let expression = match selection {
            CategorySelection::Profiles(_) => category_expression(active.iter()).to_string(),
            CategorySelection::Direct(expr) => {
                let expr = expr.trim().to_lowercase();
                if expr.is_empty() {
                    return Err(AppError::InvalidRequest(
                        "Mostaql category expression is empty".into(),
                    ));
                }
                expr
            }
        };
        let context = context_for(&expression);

        (1..=pages)
            .map(|page| {
                Ok(PageRequest {
                    url: listing_url(&expression, page)?,
                    page,
                    label: format!("page{page}_{}", expression.replace(',', "_")),
                    category: None,
                    context,
                    active: active.clone(),
                })
            })
            .collect()
    }

    async fn scrape<F: Fetcher>(
        &self,
        fetcher: &F,
        request: &PageRequest,
    ) -> Result<Extracted<Vec<Posting>>, AppError> {
        let html = fetcher.fetch_rendered(&request.url, LINK_CSS).await?;
        let (postings, has_anchors) = extract_listing(&html, request);
        if has_anchors {
            return Ok(Extracted::clean(postings));
        }

        let dump_path = dump_page(&self.debug_dir, "mostaql", &request.label, &html).await;
        Ok(Extracted::with_warnings(
            Vec::new(),
            vec![ExtractWarning::NoAnchors {
                page: request.url.clone(),
                dump_path,
            }],
        ))
    }
}

fn extract_listing(html: &str, request: &PageRequest) -> (Vec<Posting>, bool) {
    let page = MostaqlPage::parse(html);
    (page.postings(request).collect(), !page.is_empty())
}
