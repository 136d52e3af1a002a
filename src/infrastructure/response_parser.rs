//! Synthesis output parsing
//!
//! Models wrap JSON in markdown code fences despite being told not to; the
//! markers are stripped before structured parsing. A body that still fails to
//! parse is a stage failure, never a partial result.

use crate::domain::{CouncilVerdict, GatewayError};

/// Parse the chairman's raw output into a verdict
pub fn parse_verdict(content: &str) -> Result<CouncilVerdict, GatewayError> {
    let trimmed = content.trim();
    if let Ok(verdict) = serde_json::from_str::<CouncilVerdict>(trimmed) {
        return Ok(verdict);
    }

    let stripped = strip_code_fences(trimmed);
    serde_json::from_str(&stripped).map_err(|e| {
        GatewayError::invalid_response(format!(
            "synthesis output is not valid JSON ({}): {}",
            e,
            preview(trimmed)
        ))
    })
}

/// Remove markdown fence markers, keeping whatever they wrapped
pub fn strip_code_fences(content: &str) -> String {
    content
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn preview(content: &str) -> String {
    content.chars().take(100).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"ai_summary": "A tool.", "ai_tags": ["a", "b", "c"], "complexity_score": 5}"#;

    #[test]
    fn test_parse_raw_json() {
        let verdict = parse_verdict(VALID).unwrap();
        assert_eq!(verdict.ai_summary, "A tool.");
        assert_eq!(verdict.ai_tags.len(), 3);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", VALID);
        let verdict = parse_verdict(&fenced).unwrap();
        assert_eq!(verdict.complexity_score, 5);
    }

    #[test]
    fn test_parse_fence_without_language_tag() {
        let fenced = format!("```\n{}\n```", VALID);
        assert!(parse_verdict(&fenced).is_ok());
    }

    #[test]
    fn test_parse_inline_fence_markers() {
        // Some models emit fences with no newline at all
        let fenced = format!("```json{}```", VALID);
        assert!(parse_verdict(&fenced).is_ok());
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        let err = parse_verdict("I could not produce JSON, sorry.").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let err = parse_verdict(r#"{"ai_summary": "only a summary"}"#).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }
}
