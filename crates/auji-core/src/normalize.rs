//! Pure text normalizers: employment types, digits and relative post times.
//!
//! Every function here is total. Unparseable input degrades to a default
//! instead of an error so one odd card never aborts an extraction.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use regex::Regex;

use crate::models::{EmploymentLabel, EmploymentType};

/// Alias table for employment types, keyed by trimmed lowercase label.
static EMPLOYMENT_ALIASES: &[(&str, EmploymentType)] = &[
    // Arabic labels
    ("دوام كامل", EmploymentType::FullTime),
    ("دوام جزئي", EmploymentType::PartTime),
    ("تدريب", EmploymentType::Internship),
    ("عمل حر", EmploymentType::Freelance),
    // English canonical + variants
    ("full_time", EmploymentType::FullTime),
    ("full-time", EmploymentType::FullTime),
    ("full time", EmploymentType::FullTime),
    ("part_time", EmploymentType::PartTime),
    ("part-time", EmploymentType::PartTime),
    ("part time", EmploymentType::PartTime),
    ("intern", EmploymentType::Internship),
    ("internship", EmploymentType::Internship),
    ("freelance", EmploymentType::Freelance),
    ("contract", EmploymentType::Freelance),
    ("gig", EmploymentType::Freelance),
];

/// Normalize a free-text employment type.
///
/// Known aliases map to a canonical [`EmploymentType`]; any other non-empty
/// input comes back lowercased as [`EmploymentLabel::Other`]. Empty or absent
/// input yields `None`.
pub fn normalize_employment_type(raw: Option<&str>) -> Option<EmploymentLabel> {
    let s = raw?.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }
    let label = EMPLOYMENT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == s)
        .map(|(_, t)| EmploymentLabel::Canonical(*t))
        .unwrap_or(EmploymentLabel::Other(s));
    Some(label)
}

/// All aliases known to the normalizer (used by the read side to build filters).
pub fn employment_aliases() -> impl Iterator<Item = (&'static str, EmploymentType)> {
    EMPLOYMENT_ALIASES.iter().copied()
}

/// Replace Arabic-Indic digits (`٠`–`٩`) and their extended Persian forms
/// (`۰`–`۹`) with ASCII digits.
pub fn to_ascii_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            other => other,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Relative time (Arabic)
// ---------------------------------------------------------------------------

static AR_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:دقيقة|دقائق)").expect("valid regex"));
static AR_HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:ساعة|ساعات)").expect("valid regex"));
static AR_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:يوم|أيام)").expect("valid regex"));

const AR_WEEK: &str = "أسبوع";

/// Parse Arabic relative post time ("منذ 3 ساعات") against the current clock.
pub fn parse_relative_time_arabic(text: Option<&str>) -> Option<DateTime<Utc>> {
    parse_relative_time_arabic_at(text, Utc::now())
}

/// Parse Arabic relative post time against an explicit `now`.
///
/// Minutes, hours, days and the week token are tried in that order. Text that
/// matches none of them is treated as "just posted" and returns `now`;
/// absent or blank text returns `None`.
pub fn parse_relative_time_arabic_at(
    text: Option<&str>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let text = text.map(str::trim).filter(|t| !t.is_empty())?;
    let t = to_ascii_digits(text);

    let units: [(&Regex, fn(i64) -> Option<TimeDelta>); 3] = [
        (&AR_MINUTES, TimeDelta::try_minutes),
        (&AR_HOURS, TimeDelta::try_hours),
        (&AR_DAYS, TimeDelta::try_days),
    ];
    for (re, unit) in units {
        if let Some(n) = capture_number(re, &t) {
            return Some(ago(now, unit(n)));
        }
    }
    if t.contains(AR_WEEK) {
        return Some(now - TimeDelta::days(7));
    }
    Some(now)
}

// ---------------------------------------------------------------------------
// Relative time (English)
// ---------------------------------------------------------------------------

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("valid regex"));

/// Parse English relative post time ("Posted 3 days ago") against the current clock.
pub fn parse_relative_time_english(text: Option<&str>) -> DateTime<Utc> {
    parse_relative_time_english_at(text, Utc::now())
}

/// Parse English relative post time against an explicit `now`.
///
/// Singular forms ("a day ago") count as one unit, plural forms read the first
/// number in the text. Falls back to an ISO `YYYY-MM-DD` date and finally to
/// `now`; absent input also yields `now`.
pub fn parse_relative_time_english_at(text: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return now;
    };
    let t = to_ascii_digits(raw).to_lowercase();

    let units: [(&str, &str, fn(i64) -> Option<TimeDelta>); 3] = [
        ("day ago", "days ago", TimeDelta::try_days),
        ("hour ago", "hours ago", TimeDelta::try_hours),
        ("minute ago", "minutes ago", TimeDelta::try_minutes),
    ];
    for (singular, plural, unit) in units {
        if t.contains(singular) {
            return ago(now, unit(1));
        }
        if t.contains(plural) {
            return match capture_number(&FIRST_NUMBER, &t) {
                Some(n) => ago(now, unit(n)),
                None => now,
            };
        }
    }

    NaiveDate::parse_from_str(&t, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

/// `now - delta`, saturating to `now` when the delta is out of range.
fn ago(now: DateTime<Utc>, delta: Option<TimeDelta>) -> DateTime<Utc> {
    delta
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(now)
}

fn capture_number(re: &Regex, text: &str) -> Option<i64> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}
