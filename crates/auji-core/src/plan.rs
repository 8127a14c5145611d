//! What a single run asks a source for: the category selection and the
//! page requests it expands into.

use serde::{Deserialize, Serialize};

use crate::classify::{ActiveSet, SourceContext, canonicalize};
use crate::models::Category;

/// Profiles used when neither the caller nor the profile store names any.
pub const DEFAULT_PROFILES: [&str; 3] = ["Digital Marketing", "Data Analysis", "Machine Learning"];

/// Which categories a run targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySelection {
    /// Search profile names (English, Arabic or historical aliases).
    /// An empty list means "use the active profiles".
    Profiles(Vec<String>),
    /// A source-specific category expression passed through as is.
    Direct(String),
}

impl CategorySelection {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, CategorySelection::Profiles(names) if names.iter().all(|n| n.trim().is_empty()))
    }

    /// Key used to keep two runs for the same categories from overlapping.
    ///
    /// Profile names are canonicalized and sorted, so `["تسويق رقمي"]` and
    /// `["Digital Marketing"]` share a key.
    pub fn run_key(&self) -> String {
        match self {
            CategorySelection::Profiles(names) => {
                let active = ActiveSet::from_names(names);
                let parts: Vec<&str> = active.iter().map(Category::as_str).collect();
                parts.join("+")
            }
            CategorySelection::Direct(expr) => match canonicalize(expr) {
                Some(Category::Other(_)) | None => expr.trim().to_lowercase(),
                Some(category) => category.as_str().to_string(),
            },
        }
    }

    /// The canonical categories of a profile selection (empty for direct runs).
    pub fn active_set(&self) -> ActiveSet {
        match self {
            CategorySelection::Profiles(names) => ActiveSet::from_names(names),
            CategorySelection::Direct(expr) => canonicalize(expr).into_iter().collect(),
        }
    }
}

/// One listing page to fetch and extract.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub url: String,
    /// 1-based page number.
    pub page: u32,
    /// Short name for logs and debug dumps, e.g. `mostaql_marketing_p2`.
    pub label: String,
    /// Category the source assigns to every posting on this page, if any.
    pub category: Option<Category>,
    pub context: SourceContext,
    pub active: ActiveSet,
}
