//! Category classification: canonical alias table plus title keyword heuristics.
//!
//! Tables are immutable statics. Extending the taxonomy means shipping a new
//! build, never patching the tables at runtime.

use std::collections::BTreeSet;

use crate::models::Category;

/// Bilingual and historical labels that map onto a canonical category.
fn canonical_alias(name: &str) -> Option<Category> {
    match name {
        "Digital Marketing" | "تسويق رقمي" => Some(Category::DigitalMarketing),
        "Machine Learning" | "تعلم آلي" | "مهندس تعلم آلي" | "مهندس برمجيات تعلم آلي" => {
            Some(Category::MachineLearning)
        }
        // older rows were stored under the generic software-engineer label
        "مهندس برمجيات" => Some(Category::MachineLearning),
        "Data Analysis" | "محلل بيانات" => Some(Category::DataAnalysis),
        _ => None,
    }
}

static ML_KEYWORDS: &[&str] = &[
    "machine learning",
    "deep learning",
    "pytorch",
    "tensorflow",
    "ml",
    "ai",
    "nlp",
    "computer vision",
    "تعلم آلي",
    "ذكاء اصطناعي",
    "رؤية حاسوبية",
];

static DA_KEYWORDS: &[&str] = &[
    "data analysis",
    "analyst",
    "power bi",
    "tableau",
    "excel",
    "sql",
    "etl",
    "dashboard",
    "تحليل بيانات",
    "محلل بيانات",
    "باور بي آي",
    "تابلو",
    "لوحات تحكم",
];

static MARKETING_KEYWORDS: &[&str] = &[
    "marketing",
    "social",
    "smm",
    "seo",
    "sem",
    "ads",
    "brand",
    "branding",
    "content",
    "copy",
    "copywriting",
    "facebook",
    "instagram",
    "tiktok",
    "campaign",
    "manager social",
    "digital",
    "تسويق",
    "إعلانات",
    "محتوى",
    "إدارة صفحات",
    "حملات",
];

/// Narrows the category space according to what the source can yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceContext {
    /// The source supplies an explicit category label; canonicalize it.
    Labelled,
    /// Only marketing listings were requested.
    MarketingOnly,
    /// Only development listings were requested (ML or data analysis).
    DevelopmentOnly,
    /// Development and marketing listings are mixed on the page.
    Mixed,
}

/// Canonicalized set of active search profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSet(BTreeSet<Category>);

impl ActiveSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .filter_map(|n| canonicalize(n.as_ref()))
                .collect(),
        )
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.0.contains(category)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }
}

impl FromIterator<Category> for ActiveSet {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Map a free-text profile or category name onto the taxonomy.
///
/// Known labels (English, Arabic, historical) resolve to their canonical
/// category; anything else passes through trimmed as [`Category::Other`].
/// Blank input yields `None`.
pub fn canonicalize(name: &str) -> Option<Category> {
    let n = name.trim();
    if n.is_empty() {
        return None;
    }
    Some(canonical_alias(n).unwrap_or_else(|| Category::Other(n.to_string())))
}

/// Classify a label or posting title.
///
/// Deterministic: the same input and active set always produce the same
/// category, which keeps repeated ingestion runs stable.
pub fn classify(label_or_title: &str, active: &ActiveSet, context: SourceContext) -> Category {
    let t = label_or_title.to_lowercase();
    let ml = active.contains(&Category::MachineLearning);
    let da = active.contains(&Category::DataAnalysis);
    let dm = active.contains(&Category::DigitalMarketing);

    match context {
        SourceContext::Labelled => {
            canonicalize(label_or_title).unwrap_or(Category::DigitalMarketing)
        }
        SourceContext::MarketingOnly => Category::DigitalMarketing,
        SourceContext::DevelopmentOnly => {
            if ml && contains_any(&t, ML_KEYWORDS) {
                Category::MachineLearning
            } else if da && contains_any(&t, DA_KEYWORDS) {
                Category::DataAnalysis
            } else if ml && !da {
                Category::MachineLearning
            } else {
                Category::DataAnalysis
            }
        }
        SourceContext::Mixed => {
            if contains_any(&t, MARKETING_KEYWORDS) {
                Category::DigitalMarketing
            } else if ml && contains_any(&t, ML_KEYWORDS) {
                Category::MachineLearning
            } else if da && contains_any(&t, DA_KEYWORDS) {
                Category::DataAnalysis
            } else if dm {
                Category::DigitalMarketing
            } else if ml && !da {
                Category::MachineLearning
            } else if da {
                Category::DataAnalysis
            } else {
                Category::DigitalMarketing
            }
        }
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| contains_term(text, k))
}

/// Substring match, except that short Latin terms (`ml`, `ai`, `sql`, ...)
/// must stand on word boundaries so "email" does not read as "ai".
fn contains_term(text: &str, term: &str) -> bool {
    let short_latin = term.len() <= 3 && term.chars().all(|c| c.is_ascii_alphabetic());
    if !short_latin {
        return text.contains(term);
    }
    text.match_indices(term).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
