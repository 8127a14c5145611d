//! Recognising postings seen before and computing non-destructive merges.

use crate::error::AppError;
use crate::models::{IdentityField, JobChanges, JobRecord, Posting, TITLE_PLACEHOLDER};
use crate::traits::JobStore;

/// Find the stored record a candidate refers to.
///
/// Identity fields are tried in priority order (detail_url, apply_url, url);
/// the first hit wins. Lookups are scoped to the candidate's source unless the
/// source is blank.
pub async fn resolve_identity<S: JobStore>(
    store: &S,
    candidate: &Posting,
) -> Result<Option<JobRecord>, AppError> {
    let scope = candidate.source_scope();
    for field in IdentityField::PRIORITY {
        let Some(value) = candidate.identity(field) else {
            continue;
        };
        if let Some(found) = store.find_by(field, value, scope).await? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Changes to apply to `existing` so it reflects `candidate`.
///
/// Only the updatable fields are considered and only non-empty candidate
/// values are taken. The title placeholder never replaces a stored title.
pub fn merge_changes(existing: &JobRecord, candidate: &Posting) -> JobChanges {
    let title = non_empty(&candidate.title)
        .filter(|t| *t != TITLE_PLACEHOLDER || existing.title.trim().is_empty());

    JobChanges {
        title: title.map(str::to_string),
        company: non_empty(&candidate.company).map(str::to_string),
        location: opt_non_empty(&candidate.location),
        description: opt_non_empty(&candidate.description),
        detail_url: opt_non_empty(&candidate.detail_url),
        apply_url: opt_non_empty(&candidate.apply_url),
        url: opt_non_empty(&candidate.url),
        source: non_empty(&candidate.source).map(str::to_string),
        category: candidate
            .category
            .clone()
            .filter(|c| !c.as_str().trim().is_empty()),
        posted_at: candidate.posted_at,
    }
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|v| !v.trim().is_empty())
}

fn opt_non_empty(s: &Option<String>) -> Option<String> {
    s.as_deref().and_then(non_empty).map(str::to_string)
}
