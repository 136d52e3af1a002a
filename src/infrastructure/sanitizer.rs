//! Summary sanitizer
//!
//! A pure, order-sensitive transform over the synthesized summary. The rule
//! list is data: each pattern, matched case-insensitively, truncates the text
//! from its first match point onward. Applied after parsing, before the
//! verdict is stored anywhere.

use once_cell::sync::Lazy;
use regex::Regex;

/// Filler openers stripped from the start of a summary
static LEADING_FILLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(The project|This project|The codebase)\s+").unwrap());

/// Forbidden sentence-start patterns, applied in this order; each match cuts
/// the tail of the text from the match point
const TRUNCATION_PATTERNS: &[&str] = &[
    r"Recent commits",
    r"The codebase contains",
    r"The codebase lacks",
    r"Akash Agrawal",
    r"Agrawal",
    r"structure is organized",
    r"complexity is uncertain",
    r"mentions of file-names",
    r"\(recent commits\)",
    r"ongoing development",
    r"improvements in documentation",
    r"This project consists of",
    r"The project consists of",
    r"This project integrates",
];

static TRUNCATION_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    TRUNCATION_PATTERNS
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
        .collect()
});

/// Deterministic post-processor for synthesized summaries
#[derive(Debug, Default, Clone, Copy)]
pub struct SummarySanitizer;

impl SummarySanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Sanitize a summary: strip one leading filler opener, truncate at the
    /// first match of each forbidden pattern in order, trim, and capitalize
    /// the first character
    pub fn sanitize(&self, summary: &str) -> String {
        let mut text = LEADING_FILLER.replace(summary, "").into_owned();

        for rule in TRUNCATION_RULES.iter() {
            if let Some(found) = rule.find(&text) {
                text.truncate(found.start());
            }
        }

        let mut text = text.trim().to_string();
        if let Some(first) = text.chars().next() {
            if first.is_lowercase() {
                let upper: String = first.to_uppercase().collect();
                text.replace_range(..first.len_utf8(), &upper);
            }
        }
        text
    }
}
