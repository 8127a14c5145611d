//! Vodafone careers portal extractor.
//!
//! Each search profile has a fixed search URL on `jobs.vodafone.com`. Cards
//! give title, location and posted time; the detail page of every card is
//! opened for the apply link and the requirements text.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::LazyLock;

use auji_core::{
    AppError, Category, CategorySelection, EmploymentType, ExtractWarning, Extracted, Fetcher,
    PageRequest, Posting, Source, SourceContext, SourceScraper, TITLE_PLACEHOLDER, canonicalize,
    classify, parse_relative_time_english,
};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{absolutize, dump_page, element_text, first_match, selector};
use crate::cleaner::HtmdCleaner;

const HOST: &str = "jobs.vodafone.com";
const ORIGIN: &str = "https://jobs.vodafone.com";
const DEFAULT_DOMAIN: &str = "vodafone.com";
/// Results per search page; the `start` parameter advances by this much.
const PAGE_SIZE: u32 = 20;
/// Requirements text is cut after this many lines.
const MAX_REQUIREMENT_LINES: usize = 120;

/// Search URL of each canonical profile.
fn search_link(category: &Category) -> Option<&'static str> {
    match category {
        Category::MachineLearning => Some(
            "https://jobs.vodafone.com/careers?domain=vodafone.com&query=Machine+Learning&start=0&pid=563018687504927&sort_by=solr",
        ),
        Category::DigitalMarketing => Some(
            "https://jobs.vodafone.com/careers?domain=vodafone.com&query=Digital+Marketing&start=0&pid=563018675569773&sort_by=solr",
        ),
        Category::DataAnalysis => Some(
            "https://jobs.vodafone.com/careers?domain=vodafone.com&query=Data+Analysis&start=0&pid=563018687504917&sort_by=solr",
        ),
        Category::Other(_) => None,
    }
}

fn slug(category: Option<&Category>) -> &'static str {
    match category {
        Some(Category::MachineLearning) => "ml",
        Some(Category::DigitalMarketing) => "dm",
        Some(Category::DataAnalysis) => "da",
        _ => "url",
    }
}

/// Rendered listing is ready once any of these shows up.
const LISTING_READY_CSS: &str =
    ".cardContainer-GcY1a, li.search-result-item, .job-card, [data-ph-at-id='job-title']";

static CARD: LazyLock<Selector> =
    LazyLock::new(|| selector(".cardContainer-GcY1a, li.search-result-item, .job-card"));
static CARD_FALLBACK: LazyLock<Selector> =
    LazyLock::new(|| selector("[data-ph-at-id='job-title'], a[href*='/careers/job/']"));

fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter().map(|css| selector(css)).collect()
}

static TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[data-ph-at-id="job-title"]"#,
        r#"[data-ph-id*="job-title"]"#,
        r#"[data-ph-id*="jobTitle"]"#,
        "a[aria-label]",
        "a[title]",
        ".job-title",
        "h3",
        "h2",
        "a.r-link",
    ])
});
static LOCATION: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&["[data-ph-at-job-location]", ".fieldValue-3kEar", ".location"]));
static POSTED: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[data-ph-at-id="job-posted"]"#,
        "[data-ph-at-job-posted]",
        ".subData-13Lm1",
        ".posted, time",
    ])
});
static DETAIL_LINK: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&["a.r-link", r#"a[href*="/careers/job/"]"#, r#"a[href*="/job/"]"#])
});
static APPLY_BUTTON: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"a[href*="/careers/apply"]"#, "a[role='button']"]));
static TEXT_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| selector("section, article, .phs-text, .content, .job"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));

/// Card lines that are labels rather than a title.
static CARD_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(apply|job id|posted|location)\b").expect("valid regex"));
static JOB_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/job/(\d+)").expect("valid regex"));
static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\n•;\t]").expect("valid regex"));
static BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(cookie|policy|reject|non[- ]?essential|partners)").expect("valid regex")
});

// ---------------------------------------------------------------------------
// URLs
// ---------------------------------------------------------------------------

/// Canonical apply URL for a detail or apply link.
///
/// Apply links keep their `pid`; detail links of the form `/job/<id>` are
/// rebuilt as `/careers/apply?pid=<id>`. The `domain` parameter is kept or
/// defaulted to `vodafone.com`. Links matching neither shape come back
/// unchanged.
pub fn to_apply_url(raw: &str) -> String {
    let raw = raw.trim();
    let Some(parsed) = Url::parse(raw)
        .ok()
        .or_else(|| Url::parse(ORIGIN).ok()?.join(raw).ok())
    else {
        return raw.to_string();
    };

    let origin = parsed.origin().ascii_serialization();
    let query_value = |key: &str| {
        parsed
            .query_pairs()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.into_owned())
    };
    let domain = query_value("domain").unwrap_or_else(|| DEFAULT_DOMAIN.to_string());

    if parsed.path().contains("apply") {
        return match query_value("pid") {
            Some(pid) => format!("{origin}/careers/apply?pid={pid}&domain={domain}"),
            None => format!("{origin}{}?domain={domain}", parsed.path()),
        };
    }

    match JOB_ID.captures(parsed.path()).and_then(|c| c.get(1)) {
        Some(id) => format!(
            "{origin}/careers/apply?pid={}&domain={domain}",
            id.as_str()
        ),
        None => raw.to_string(),
    }
}

/// Search URL for a 1-based results page.
fn page_url(search: &str, page: u32) -> Result<String, AppError> {
    if page <= 1 {
        return Ok(search.to_string());
    }
    let mut url = Url::parse(search)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid search URL {search}: {e}")))?;
    let start = ((page - 1) * PAGE_SIZE).to_string();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "start")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("start", &start);
    Ok(url.into())
}

/// Accept a caller-supplied search URL only if it points at the careers host.
fn validate_search_url(raw: &str) -> Result<String, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::InvalidRequest(format!("Invalid Vodafone URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str() != Some(HOST) {
        return Err(AppError::InvalidRequest(format!(
            "Vodafone searches must target {HOST}, got {raw}"
        )));
    }
    Ok(url.into())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Fields read from one listing card, before its detail page is visited.
#[derive(Debug, Clone, PartialEq)]
struct CardDraft {
    title: String,
    location: Option<String>,
    posted_text: Option<String>,
    detail_url: Option<String>,
}

/// Cards of a listing page, deduplicated by detail link. `None` when the
/// page has no card markup at all.
fn parse_cards(html: &str) -> Option<Vec<CardDraft>> {
    let document = Html::parse_document(html);
    let mut cards: Vec<ElementRef<'_>> = document.select(&CARD).collect();
    if cards.is_empty() {
        cards = document.select(&CARD_FALLBACK).collect();
    }
    if cards.is_empty() {
        return None;
    }

    let mut seen = HashSet::new();
    Some(
        cards
            .into_iter()
            .map(read_card)
            .filter(|draft| match &draft.detail_url {
                Some(link) => seen.insert(link.clone()),
                None => true,
            })
            .collect(),
    )
}

fn read_card(card: ElementRef<'_>) -> CardDraft {
    let text_of = |list: &[Selector]| {
        first_match(card, list)
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
    };

    CardDraft {
        title: card_title(card),
        location: text_of(&LOCATION),
        posted_text: text_of(&POSTED),
        detail_url: first_match(card, &DETAIL_LINK)
            .and_then(|a| a.value().attr("href"))
            .filter(|href| !href.trim().is_empty())
            .map(|href| absolutize(ORIGIN, href)),
    }
}

/// Title from the first selector giving at least three characters, else the
/// first substantial text line that is not a label, else the placeholder.
fn card_title(card: ElementRef<'_>) -> String {
    let long_enough = |t: &String| t.chars().count() >= 3;

    let from_selectors = TITLE.iter().find_map(|sel| {
        let el = first_match(card, std::slice::from_ref(sel))?;
        let attrs = ["aria-label", "title"]
            .into_iter()
            .filter_map(|name| el.value().attr(name))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string);
        attrs.or_else(|| Some(element_text(&el))).filter(long_enough)
    });
    if let Some(title) = from_selectors {
        return title;
    }

    card.text()
        .flat_map(str::lines)
        .map(str::trim)
        .map(str::to_string)
        .find(|line| long_enough(line) && !CARD_NOISE.is_match(line))
        .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string())
}

/// What a detail page contributes to a posting.
#[derive(Debug, Clone, Default, PartialEq)]
struct DetailPage {
    apply_url: Option<String>,
    requirements: Option<String>,
}

fn parse_detail(html: &str, cleaner: &HtmdCleaner) -> DetailPage {
    let document = Html::parse_document(html);
    let apply_url = first_match(document.root_element(), &APPLY_BUTTON)
        .and_then(|a| a.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .map(|href| absolutize(ORIGIN, href));

    DetailPage {
        apply_url,
        requirements: requirements_text(&document, cleaner),
    }
}

/// Requirement-like lines of a detail page, with consent-banner text removed.
fn requirements_text(document: &Html, cleaner: &HtmdCleaner) -> Option<String> {
    let mut blocks: Vec<ElementRef<'_>> = document.select(&TEXT_BLOCKS).collect();
    if blocks.is_empty() {
        blocks = document.select(&BODY).collect();
    }

    let raw = blocks
        .iter()
        .map(|block| {
            cleaner
                .to_text(&block.html())
                .unwrap_or_else(|_| block.text().collect::<Vec<_>>().join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n");

    let lines: Vec<String> = LINE_BREAKS
        .split(&raw)
        .map(HtmdCleaner::plain_line)
        .filter(|line| !line.is_empty() && !BOILERPLATE.is_match(line))
        .take(MAX_REQUIREMENT_LINES)
        .collect();

    (!lines.is_empty()).then(|| lines.join("\n"))
}

// ---------------------------------------------------------------------------
// Scraper
// ---------------------------------------------------------------------------

/// Scraper for Vodafone career searches.
#[derive(Clone)]
pub struct VodafoneScraper {
    debug_dir: PathBuf,
    cleaner: HtmdCleaner,
}

impl VodafoneScraper {
    pub fn new(debug_dir: impl Into<PathBuf>) -> Self {
        Self {
            debug_dir: debug_dir.into(),
            cleaner: HtmdCleaner::new(),
        }
    }

    /// Visit a card's detail page and build the final posting.
    async fn complete<F: Fetcher>(
        &self,
        fetcher: &F,
        card: CardDraft,
        request: &PageRequest,
        warnings: &mut Vec<ExtractWarning>,
    ) -> Posting {
        let mut detail = DetailPage::default();
        match &card.detail_url {
            Some(link) => match fetcher.fetch_rendered(link, "body").await {
                Ok(html) => detail = parse_detail(&html, &self.cleaner),
                Err(e) => warnings.push(ExtractWarning::DetailUnavailable {
                    url: link.clone(),
                    error: e.to_string(),
                }),
            },
            None => warnings.push(ExtractWarning::MissingField {
                field: "link",
                item: card.title.clone(),
            }),
        }

        let canonical = detail
            .apply_url
            .as_deref()
            .or(card.detail_url.as_deref())
            .map(to_apply_url);

        let mut posting = Posting::new(card.title, Source::Vodafone.as_str());
        posting.company = "Vodafone".to_string();
        posting.location = card.location;
        posting.description = detail.requirements;
        posting.detail_url = card.detail_url;
        posting.apply_url = canonical.clone();
        posting.url = canonical;
        posting.employment_type = Some(EmploymentType::FullTime.into());
        posting.category = request
            .category
            .as_ref()
            .map(|c| classify(c.as_str(), &request.active, request.context));
        posting.posted_at = Some(parse_relative_time_english(card.posted_text.as_deref()));
        posting
    }
}

impl SourceScraper for VodafoneScraper {
    fn source(&self) -> Source {
        Source::Vodafone
    }

    fn plan(&self, selection: &CategorySelection, pages: u32) -> Result<Vec<PageRequest>, AppError> {
        let active = selection.active_set();
        let targets: Vec<(Option<Category>, String)> = match selection {
            CategorySelection::Profiles(_) => active
                .iter()
                .filter_map(|c| search_link(c).map(|link| (Some(c.clone()), link.to_string())))
                .collect(),
            CategorySelection::Direct(expr) if expr.trim().starts_with("http") => {
                vec![(None, validate_search_url(expr)?)]
            }
            CategorySelection::Direct(expr) => {
                let category = canonicalize(expr).ok_or_else(|| {
                    AppError::InvalidRequest("Vodafone category is empty".into())
                })?;
                let link = search_link(&category).ok_or_else(|| {
                    AppError::InvalidRequest(format!("No Vodafone search for category {category}"))
                })?;
                vec![(Some(category), link.to_string())]
            }
        };

        if targets.is_empty() {
            tracing::warn!(run_key = %selection.run_key(), "No Vodafone search matches the selected profiles");
        }

        let mut requests = Vec::with_capacity(targets.len() * pages as usize);
        for page in 1..=pages {
            for (category, search) in &targets {
                requests.push(PageRequest {
                    url: page_url(search, page)?,
                    page,
                    label: format!("vodafone_{}_p{page}", slug(category.as_ref())),
                    category: category.clone(),
                    context: SourceContext::Labelled,
                    active: active.clone(),
                });
            }
        }
        Ok(requests)
    }

    async fn scrape<F: Fetcher>(
        &self,
        fetcher: &F,
        request: &PageRequest,
    ) -> Result<Extracted<Vec<Posting>>, AppError> {
        let html = fetcher.fetch_rendered(&request.url, LISTING_READY_CSS).await?;

        let Some(cards) = parse_cards(&html) else {
            let dump_path = dump_page(&self.debug_dir, "vodafone", &request.label, &html).await;
            return Ok(Extracted::with_warnings(
                Vec::new(),
                vec![ExtractWarning::NoAnchors {
                    page: request.url.clone(),
                    dump_path,
                }],
            ));
        };

        let mut warnings = Vec::new();
        let mut postings = Vec::with_capacity(cards.len());
        for card in cards {
            postings.push(self.complete(fetcher, card, request, &mut warnings).await);
        }
        Ok(Extracted::with_warnings(postings, warnings))
    }

    async fn fetch_description<F: Fetcher>(
        &self,
        fetcher: &F,
        detail_url: &str,
    ) -> Result<Option<String>, AppError> {
        let html = fetcher.fetch_rendered(detail_url, "body").await?;
        Ok(parse_detail(&html, &self.cleaner).requirements)
    }
}

#[cfg(test)]
mod tests {
    use auji_core::testutil::MockFetcher;

    use super::*;

    const LISTING: &str = r#"
    <html><body><ul>
      <li class="search-result-item">
        <a class="r-link" href="/careers/job/563018686752862?domain=vodafone.com"
           aria-label="Senior Data Analyst">Senior Data Analyst</a>
        <span data-ph-at-job-location>Cairo, Egypt</span>
        <span data-ph-at-id="job-posted">Posted 3 days ago</span>
      </li>
      <li class="search-result-item">
        <a href="https://jobs.vodafone.com/careers/job/563018686752862?domain=vodafone.com">duplicate</a>
      </li>
      <li class="search-result-item">
        <div><span>Job ID 42</span><span>BI Developer</span></div>
        <a href="/careers/job/777">Go</a>
      </li>
      <li class="search-result-item"><span>Apply</span></li>
    </ul></body></html>
    "#;

    const DETAIL: &str = r#"
    <html><body>
      <div id="cookie-banner"><p>We use cookies. Reject non-essential</p></div>
      <section>
        <h2>Requirements</h2>
        <ul><li>SQL; Python</li><li>Power BI • Tableau</li></ul>
        <p>Read our privacy policy</p>
      </section>
      <a href="/careers/apply?pid=563018686752862&amp;domain=vodafone.com">Apply now</a>
    </body></html>
    "#;

    #[test]
    fn test_to_apply_url() {
        assert_eq!(
            to_apply_url("https://jobs.vodafone.com/careers/job/563018686752862"),
            "https://jobs.vodafone.com/careers/apply?pid=563018686752862&domain=vodafone.com"
        );
        assert_eq!(
            to_apply_url("https://jobs.vodafone.com/careers/apply?domain=vodafone.co.uk&pid=9"),
            "https://jobs.vodafone.com/careers/apply?pid=9&domain=vodafone.co.uk"
        );
        assert_eq!(
            to_apply_url("https://jobs.vodafone.com/careers/apply"),
            "https://jobs.vodafone.com/careers/apply?domain=vodafone.com"
        );
        assert_eq!(
            to_apply_url("/careers/job/123?domain=vodafone.com"),
            "https://jobs.vodafone.com/careers/apply?pid=123&domain=vodafone.com"
        );
        assert_eq!(
            to_apply_url("https://jobs.vodafone.com/careers"),
            "https://jobs.vodafone.com/careers"
        );
    }

    #[test]
    fn test_page_url_sets_start_offset() {
        let base = search_link(&Category::DataAnalysis).unwrap();
        assert_eq!(page_url(base, 1).unwrap(), base);
        let second = page_url(base, 3).unwrap();
        assert!(second.contains("start=40"));
        assert!(!second.contains("start=0"));
        assert!(second.contains("query=Data+Analysis"));
        assert!(second.contains("pid=563018687504917"));
    }

    #[test]
    fn test_plan_for_profiles() {
        let scraper = VodafoneScraper::new("logs");
        let selection = CategorySelection::Profiles(vec![
            "تعلم آلي".into(),
            "Digital Marketing".into(),
            "UX Design".into(),
        ]);
        let plan = scraper.plan(&selection, 2).unwrap();
        assert_eq!(plan.len(), 4);
        assert!(plan.iter().all(|r| r.context == SourceContext::Labelled));
        assert_eq!(plan[0].page, 1);
        assert_eq!(plan[2].page, 2);
        let labels: Vec<_> = plan.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            ["vodafone_dm_p1", "vodafone_ml_p1", "vodafone_dm_p2", "vodafone_ml_p2"]
        );
    }

    #[test]
    fn test_plan_direct() {
        let scraper = VodafoneScraper::new("logs");
        let by_name = scraper
            .plan(&CategorySelection::Direct("محلل بيانات".into()), 1)
            .unwrap();
        assert_eq!(by_name[0].category, Some(Category::DataAnalysis));

        let url = "https://jobs.vodafone.com/careers?domain=vodafone.com&query=SQL";
        let by_url = scraper
            .plan(&CategorySelection::Direct(url.into()), 1)
            .unwrap();
        assert_eq!(by_url[0].url, url);
        assert_eq!(by_url[0].category, None);

        for bad in ["https://evil.example/careers", "Basket Weaving"] {
            assert!(matches!(
                scraper.plan(&CategorySelection::Direct(bad.into()), 1),
                Err(AppError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn test_profile_and_direct_plans_share_listing() {
        let scraper = VodafoneScraper::new("logs");
        let urls = |selection: CategorySelection| -> Vec<String> {
            scraper
                .plan(&selection, 2)
                .unwrap()
                .into_iter()
                .map(|r| r.url)
                .collect()
        };
        assert_eq!(
            urls(CategorySelection::Profiles(vec!["محلل بيانات".into()])),
            urls(CategorySelection::Direct("Data Analysis".into()))
        );
    }

    #[test]
    fn test_parse_cards() {
        let cards = parse_cards(LISTING).unwrap();
        assert_eq!(cards.len(), 3);

        assert_eq!(cards[0].title, "Senior Data Analyst");
        assert_eq!(cards[0].location.as_deref(), Some("Cairo, Egypt"));
        assert_eq!(cards[0].posted_text.as_deref(), Some("Posted 3 days ago"));
        assert_eq!(
            cards[0].detail_url.as_deref(),
            Some("https://jobs.vodafone.com/careers/job/563018686752862?domain=vodafone.com")
        );

        assert_eq!(cards[1].title, "BI Developer");
        assert_eq!(
            cards[1].detail_url.as_deref(),
            Some("https://jobs.vodafone.com/careers/job/777")
        );

        assert_eq!(cards[2].title, TITLE_PLACEHOLDER);
        assert_eq!(cards[2].detail_url, None);

        assert!(parse_cards("<html><body><p>maintenance</p></body></html>").is_none());
    }

    #[test]
    fn test_parse_detail() {
        let detail = parse_detail(DETAIL, &HtmdCleaner::new());
        assert_eq!(
            detail.apply_url.as_deref(),
            Some("https://jobs.vodafone.com/careers/apply?pid=563018686752862&domain=vodafone.com")
        );
        let text = detail.requirements.unwrap();
        let lines: Vec<&str> = text.lines().collect();
        for expected in ["Requirements", "SQL", "Python", "Power BI", "Tableau"] {
            assert!(lines.contains(&expected), "missing {expected:?} in {lines:?}");
        }
        assert!(!text.to_lowercase().contains("cookie"));
        assert!(!text.to_lowercase().contains("policy"));
    }

    #[test]
    fn test_requirements_are_capped() {
        let items: String = (0..200).map(|i| format!("<li>Skill {i}</li>")).collect();
        let html = format!("<html><body><article><ul>{items}</ul></article></body></html>");
        let detail = parse_detail(&html, &HtmdCleaner::new());
        assert_eq!(detail.requirements.unwrap().lines().count(), MAX_REQUIREMENT_LINES);
    }

    #[tokio::test]
    async fn test_scrape_tolerates_detail_failures() {
        let scraper = VodafoneScraper::new("logs");
        let request = scraper
            .plan(&CategorySelection::Direct("Data Analysis".into()), 1)
            .unwrap()
            .remove(0);
        let fetcher = MockFetcher::with_responses(vec![
            Ok(LISTING.to_string()),
            Ok(DETAIL.to_string()),
            Err(AppError::Timeout(10)),
        ]);

        let extracted = scraper.scrape(&fetcher, &request).await.unwrap();
        let postings = extracted.value;
        assert_eq!(postings.len(), 3);

        let first = &postings[0];
        assert_eq!(first.company, "Vodafone");
        assert_eq!(first.category, Some(Category::DataAnalysis));
        assert_eq!(
            first.apply_url.as_deref(),
            Some("https://jobs.vodafone.com/careers/apply?pid=563018686752862&domain=vodafone.com")
        );
        assert_eq!(first.url, first.apply_url);
        assert!(first.description.as_deref().unwrap().contains("Tableau"));
        assert_eq!(
            first.employment_type.as_ref().and_then(|l| l.canonical()),
            Some(EmploymentType::FullTime)
        );

        let second = &postings[1];
        assert_eq!(second.description, None);
        assert_eq!(
            second.apply_url.as_deref(),
            Some("https://jobs.vodafone.com/careers/apply?pid=777&domain=vodafone.com")
        );

        let third = &postings[2];
        assert!(!third.has_identity());

        assert!(matches!(
            &extracted.warnings[..],
            [
                ExtractWarning::DetailUnavailable { .. },
                ExtractWarning::MissingField { field: "link", .. }
            ]
        ));
    }

    #[tokio::test]
    async fn test_scrape_dumps_page_without_cards() {
        let dir = tempfile::tempdir().unwrap();
        let scraper = VodafoneScraper::new(dir.path());
        let req = scraper
            .plan(&CategorySelection::Direct("Machine Learning".into()), 1)
            .unwrap()
            .remove(0);
        let fetcher = MockFetcher::new("<html><body>Access denied</body></html>");

        let extracted = scraper.scrape(&fetcher, &req).await.unwrap();
        assert!(extracted.value.is_empty());
        match &extracted.warnings[..] {
            [ExtractWarning::NoAnchors { page, dump_path: Some(path) }] => {
                assert_eq!(page, &req.url);
                assert!(path.starts_with(dir.path().join("vodafone")));
                assert!(std::fs::read_to_string(path).unwrap().contains("Access denied"));
            }
            other => panic!("unexpected warnings: {other:?}"),
        }
        assert_eq!(fetcher.requested(), [req.url.clone()]);
    }

    #[tokio::test]
    async fn test_fetch_description() {
        let scraper = VodafoneScraper::new("logs");
        let fetcher = MockFetcher::new(DETAIL);
        let text = scraper
            .fetch_description(&fetcher, "https://jobs.vodafone.com/careers/job/1")
            .await
            .unwrap()
            .unwrap();
        assert!(text.contains("SQL"));
    }
}
