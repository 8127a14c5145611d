use std::sync::{Arc, LazyLock};

use auji_core::AppError;
use htmd::HtmlToMarkdown;
use regex::Regex;

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*+]\s+|\d+\.\s+|#{1,6}(?:\s+|$)|>\s*)+").expect("valid regex"));
static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid regex"));
static MD_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([\\`*_{}\[\]()#+\-.!>|~])").expect("valid regex"));

/// Turns detail-page HTML into plain text lines.
///
/// Conversion goes through Markdown so block structure (paragraphs, list
/// items, headings) survives as line breaks; [`HtmdCleaner::plain_line`]
/// then strips the Markdown syntax again.
#[derive(Clone)]
pub struct HtmdCleaner {
    converter: Arc<HtmlToMarkdown>,
}

impl HtmdCleaner {
    pub fn new() -> Self {
        let converter = HtmlToMarkdown::builder()
            .skip_tags(vec![
                "script", "style", "noscript", "iframe", "svg", "button", "form", "img",
            ])
            .build();

        Self {
            converter: Arc::new(converter),
        }
    }

    /// Convert an HTML fragment to line-oriented Markdown.
    pub fn to_text(&self, html: &str) -> Result<String, AppError> {
        self.converter
            .convert(html)
            .map_err(|e| AppError::ExtractionError(format!("HTML conversion failed: {e}")))
    }

    /// One Markdown line reduced to its visible text.
    pub fn plain_line(line: &str) -> String {
        let line = LIST_MARKER.replace(line.trim(), "");
        let line = MD_LINK.replace_all(&line, "$1");
        let line = line.replace("**", "").replace("__", "");
        MD_ESCAPE.replace_all(&line, "$1").trim().to_string()
    }
}

impl Default for HtmdCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_become_lines() {
        let cleaner = HtmdCleaner::new();
        let text = cleaner
            .to_text("<h2>Role</h2><p>Build models</p><ul><li>Python</li><li>SQL</li></ul>")
            .unwrap();
        let lines: Vec<String> = text
            .lines()
            .map(HtmdCleaner::plain_line)
            .filter(|l| !l.is_empty())
            .collect();
        assert_eq!(lines, vec!["Role", "Build models", "Python", "SQL"]);
    }

    #[test]
    fn test_strips_scripts() {
        let cleaner = HtmdCleaner::new();
        let text = cleaner
            .to_text("<p>Content</p><script>track()</script>")
            .unwrap();
        assert!(text.contains("Content"));
        assert!(!text.contains("track"));
    }

    #[test]
    fn test_plain_line() {
        assert_eq!(HtmdCleaner::plain_line("*   **Power BI** skills"), "Power BI skills");
        assert_eq!(HtmdCleaner::plain_line("1. [Apply](/careers/apply)"), "Apply");
        assert_eq!(HtmdCleaner::plain_line(r"machine\_learning"), "machine_learning");
        assert_eq!(HtmdCleaner::plain_line("### "), "");
    }
}
