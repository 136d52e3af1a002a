//! Portfolio project records and council output
//!
//! The project document is produced by an external data-collection step; the
//! record type round-trips every field it does not understand so rewriting
//! the document never loses data.

use serde::{Deserialize, Serialize};

/// A commit descriptor as captured by the data collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// A top-level file entry of a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// One portfolio project record
///
/// Only the fields the pipeline reads or writes are modeled; everything else
/// (stars, topics, language bytes, ...) passes through `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,

    #[serde(default, rename = "recentCommits")]
    pub recent_commits: Vec<Commit>,

    #[serde(default)]
    pub files: Vec<ProjectFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_score: Option<u8>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Project {
    /// Apply a council verdict to this record
    pub fn apply_verdict(&mut self, verdict: CouncilVerdict) {
        self.ai_summary = Some(verdict.ai_summary);
        self.ai_tags = Some(verdict.ai_tags);
        self.complexity_score = Some(verdict.complexity_score);
    }

    /// Whether the record already carries a generated summary
    pub fn has_summary(&self) -> bool {
        self.ai_summary.is_some()
    }
}

/// Final output of the council for one project
///
/// Aliases accept the short field names some models emit despite the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilVerdict {
    #[serde(alias = "summary")]
    pub ai_summary: String,

    #[serde(alias = "tags")]
    pub ai_tags: Vec<String>,

    #[serde(alias = "complexity")]
    pub complexity_score: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_roundtrip_preserves_unknown_fields() {
        let raw = serde_json::json!({
            "name": "demo",
            "readme": "# Demo",
            "recentCommits": [{"date": "2024-01-01T00:00:00Z", "message": "init", "author": "a"}],
            "files": [{"name": "src", "type": "dir", "path": "src"}],
            "stars": 42,
            "topics": ["rust"]
        });

        let project: Project = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(project.name, "demo");
        assert_eq!(project.recent_commits.len(), 1);
        assert_eq!(project.extra.get("stars"), Some(&serde_json::json!(42)));

        let back = serde_json::to_value(&project).unwrap();
        assert_eq!(back.get("stars"), raw.get("stars"));
        assert_eq!(back.get("topics"), raw.get("topics"));
    }

    #[test]
    fn test_apply_verdict() {
        let mut project: Project = serde_json::from_value(serde_json::json!({
            "name": "demo"
        }))
        .unwrap();
        assert!(!project.has_summary());

        project.apply_verdict(CouncilVerdict {
            ai_summary: "Does things.".to_string(),
            ai_tags: vec!["rust".to_string(), "cli".to_string(), "llm".to_string()],
            complexity_score: 6,
        });

        assert!(project.has_summary());
        assert_eq!(project.complexity_score, Some(6));
    }

    #[test]
    fn test_verdict_accepts_short_aliases() {
        let verdict: CouncilVerdict = serde_json::from_str(
            r#"{"summary": "s", "tags": ["a", "b", "c"], "complexity": 4}"#,
        )
        .unwrap();
        assert_eq!(verdict.ai_summary, "s");
        assert_eq!(verdict.complexity_score, 4);
    }
}
