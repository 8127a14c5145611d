use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::canonicalize;

/// Placeholder title used when a card yields no usable title text.
pub const TITLE_PLACEHOLDER: &str = "N/A";

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Origin system of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Vodafone,
    Mostaql,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Vodafone => "vodafone",
            Source::Mostaql => "mostaql",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vodafone" => Ok(Source::Vodafone),
            "mostaql" => Ok(Source::Mostaql),
            _ => Err(format!("Unknown source: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Employment type
// ---------------------------------------------------------------------------

/// Canonical employment types understood by the read-side filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Internship,
    Freelance,
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 4] = [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::Internship,
        EmploymentType::Freelance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::PartTime => "part_time",
            EmploymentType::Internship => "internship",
            EmploymentType::Freelance => "freelance",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of employment-type normalization: either a canonical value or the
/// lowercased input that no alias matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EmploymentLabel {
    Canonical(EmploymentType),
    Other(String),
}

impl EmploymentLabel {
    pub fn as_str(&self) -> &str {
        match self {
            EmploymentLabel::Canonical(t) => t.as_str(),
            EmploymentLabel::Other(s) => s,
        }
    }

    pub fn canonical(&self) -> Option<EmploymentType> {
        match self {
            EmploymentLabel::Canonical(t) => Some(*t),
            EmploymentLabel::Other(_) => None,
        }
    }
}

impl From<EmploymentType> for EmploymentLabel {
    fn from(t: EmploymentType) -> Self {
        EmploymentLabel::Canonical(t)
    }
}

impl From<String> for EmploymentLabel {
    fn from(s: String) -> Self {
        crate::normalize::normalize_employment_type(Some(&s))
            .unwrap_or(EmploymentLabel::Other(s))
    }
}

impl From<EmploymentLabel> for String {
    fn from(label: EmploymentLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for EmploymentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Canonical taxonomy label. Names outside the fixed set pass through as
/// `Other` so the taxonomy can grow without a code change on the read side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    DigitalMarketing,
    DataAnalysis,
    MachineLearning,
    Other(String),
}

impl Category {
    pub const CANONICAL: [Category; 3] = [
        Category::DigitalMarketing,
        Category::DataAnalysis,
        Category::MachineLearning,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::DigitalMarketing => "Digital Marketing",
            Category::DataAnalysis => "Data Analysis",
            Category::MachineLearning => "Machine Learning",
            Category::Other(s) => s,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        canonicalize(&s).unwrap_or(Category::Other(s))
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        canonicalize(s).unwrap_or_else(|| Category::Other(s.to_string()))
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Posting / JobRecord
// ---------------------------------------------------------------------------

/// A candidate posting produced by a source extractor. Never persisted as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    /// Free text: requirements / responsibilities.
    pub description: Option<String>,
    pub detail_url: Option<String>,
    pub apply_url: Option<String>,
    /// Legacy generic url, still used as the last identity fallback.
    pub url: Option<String>,
    /// Origin system. Empty means unspecified; ingestion fills in the default.
    pub source: String,
    pub category: Option<Category>,
    pub employment_type: Option<EmploymentLabel>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl Posting {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: String::new(),
            location: None,
            description: None,
            detail_url: None,
            apply_url: None,
            url: None,
            source: source.into(),
            category: None,
            employment_type: None,
            posted_at: None,
        }
    }

    /// Value of one identity field, treating empty strings as absent.
    pub fn identity(&self, field: IdentityField) -> Option<&str> {
        let value = match field {
            IdentityField::DetailUrl => self.detail_url.as_deref(),
            IdentityField::ApplyUrl => self.apply_url.as_deref(),
            IdentityField::LegacyUrl => self.url.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// True when at least one identity field is present.
    pub fn has_identity(&self) -> bool {
        IdentityField::PRIORITY
            .iter()
            .any(|f| self.identity(*f).is_some())
    }

    /// The source, or `None` when unspecified.
    pub fn source_scope(&self) -> Option<&str> {
        Some(self.source.trim()).filter(|s| !s.is_empty())
    }
}

/// Fields used to recognise a posting seen before, in lookup priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityField {
    DetailUrl,
    ApplyUrl,
    LegacyUrl,
}

impl IdentityField {
    pub const PRIORITY: [IdentityField; 3] = [
        IdentityField::DetailUrl,
        IdentityField::ApplyUrl,
        IdentityField::LegacyUrl,
    ];

    /// Column name in the `jobs` table.
    pub fn column(&self) -> &'static str {
        match self {
            IdentityField::DetailUrl => "detail_url",
            IdentityField::ApplyUrl => "apply_url",
            IdentityField::LegacyUrl => "url",
        }
    }
}

/// A persisted job posting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub detail_url: Option<String>,
    pub apply_url: Option<String>,
    pub url: Option<String>,
    pub source: String,
    pub category: Option<Category>,
    pub employment_type: Option<EmploymentLabel>,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn identity(&self, field: IdentityField) -> Option<&str> {
        match field {
            IdentityField::DetailUrl => self.detail_url.as_deref(),
            IdentityField::ApplyUrl => self.apply_url.as_deref(),
            IdentityField::LegacyUrl => self.url.as_deref(),
        }
    }

    /// The best link to open this job: apply, then legacy url, then detail.
    pub fn best_link(&self) -> Option<&str> {
        self.apply_url
            .as_deref()
            .or(self.url.as_deref())
            .or(self.detail_url.as_deref())
    }
}

/// Field-level update computed by the identity resolver. `None` means
/// "leave the stored value alone".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobChanges {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub detail_url: Option<String>,
    pub apply_url: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub category: Option<Category>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl JobChanges {
    pub fn is_empty(&self) -> bool {
        *self == JobChanges::default()
    }

    /// Apply the changes onto a record in memory.
    pub fn apply_to(&self, record: &mut JobRecord) {
        if let Some(v) = &self.title {
            record.title = v.clone();
        }
        if let Some(v) = &self.company {
            record.company = v.clone();
        }
        if let Some(v) = &self.location {
            record.location = Some(v.clone());
        }
        if let Some(v) = &self.description {
            record.description = Some(v.clone());
        }
        if let Some(v) = &self.detail_url {
            record.detail_url = Some(v.clone());
        }
        if let Some(v) = &self.apply_url {
            record.apply_url = Some(v.clone());
        }
        if let Some(v) = &self.url {
            record.url = Some(v.clone());
        }
        if let Some(v) = &self.source {
            record.source = v.clone();
        }
        if let Some(v) = &self.category {
            record.category = Some(v.clone());
        }
        if let Some(v) = self.posted_at {
            record.posted_at = Some(v);
        }
    }
}

/// Read-side query over stored jobs.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub categories: Vec<Category>,
    pub source: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub posted_after: Option<DateTime<Utc>>,
    /// Only jobs whose description is null or empty.
    pub missing_description: bool,
    pub limit: Option<usize>,
    pub offset: usize,
}

/// A user-facing search profile (read-only for the core).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProfile {
    pub name: String,
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Extraction results
// ---------------------------------------------------------------------------

/// A recovered, non-fatal problem met while extracting.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractWarning {
    /// No anchor selector matched; the raw page was dumped (if a path is set).
    NoAnchors {
        page: String,
        dump_path: Option<std::path::PathBuf>,
    },
    /// A detail page could not be fetched; detail fields defaulted to null.
    DetailUnavailable { url: String, error: String },
    /// A sub-field could not be found for one posting.
    MissingField { field: &'static str, item: String },
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractWarning::NoAnchors { page, dump_path } => match dump_path {
                Some(p) => write!(f, "no postings found on {page} (dumped to {})", p.display()),
                None => write!(f, "no postings found on {page}"),
            },
            ExtractWarning::DetailUnavailable { url, error } => {
                write!(f, "detail page {url} unavailable: {error}")
            }
            ExtractWarning::MissingField { field, item } => {
                write!(f, "missing {field} for {item}")
            }
        }
    }
}

/// A best-effort result: the payload plus every sub-failure that was
/// recovered locally.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub value: T,
    pub warnings: Vec<ExtractWarning>,
}

impl<T> Extracted<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<ExtractWarning>) -> Self {
        Self { value, warnings }
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extracted<U> {
        Extracted {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Counts returned by one `ingest` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub inserted: usize,
    pub updated: usize,
    /// Candidates dropped because they carried no identity field.
    pub skipped: usize,
}

impl IngestReport {
    /// Records touched (inserted + updated).
    pub fn saved(&self) -> usize {
        self.inserted + self.updated
    }

    pub fn absorb(&mut self, other: IngestReport) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.skipped += other.skipped;
    }
}

/// Aggregate result of one run (all pages × targets of one source).
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub fetched: usize,
    pub pages: usize,
    pub report: IngestReport,
    pub warnings: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ignores_blank_values() {
        let mut p = Posting::new("Analyst", "vodafone");
        p.detail_url = Some("  ".into());
        p.apply_url = Some("https://jobs.vodafone.com/careers/apply?pid=1".into());
        assert_eq!(p.identity(IdentityField::DetailUrl), None);
        assert!(p.has_identity());

        let bare = Posting::new("Analyst", "vodafone");
        assert!(!bare.has_identity());
    }

    #[test]
    fn test_source_scope() {
        assert_eq!(Posting::new("x", " ").source_scope(), None);
        assert_eq!(Posting::new("x", "mostaql").source_scope(), Some("mostaql"));
    }

    #[test]
    fn test_category_serde_uses_display_names() {
        let json = serde_json::to_string(&Category::MachineLearning).unwrap();
        assert_eq!(json, "\"Machine Learning\"");
        let back: Category = serde_json::from_str("\"تسويق رقمي\"").unwrap();
        assert_eq!(back, Category::DigitalMarketing);
        let other: Category = serde_json::from_str("\"Design\"").unwrap();
        assert_eq!(other, Category::Other("Design".into()));
    }

    #[test]
    fn test_employment_label_from_string() {
        assert_eq!(
            EmploymentLabel::from("Full-Time".to_string()),
            EmploymentLabel::Canonical(EmploymentType::FullTime)
        );
        assert_eq!(
            EmploymentLabel::from("seasonal".to_string()),
            EmploymentLabel::Other("seasonal".into())
        );
    }

    #[test]
    fn test_source_round_trip() {
        for s in [Source::Vodafone, Source::Mostaql] {
            assert_eq!(s.as_str().parse::<Source>().unwrap(), s);
        }
        assert!("linkedin".parse::<Source>().is_err());
    }

    #[test]
    fn test_report_saved_and_absorb() {
        let mut total = IngestReport::default();
        total.absorb(IngestReport {
            inserted: 2,
            updated: 1,
            skipped: 1,
        });
        total.absorb(IngestReport {
            inserted: 0,
            updated: 3,
            skipped: 0,
        });
        assert_eq!(total.saved(), 6);
        assert_eq!(total.skipped, 1);
    }
}
