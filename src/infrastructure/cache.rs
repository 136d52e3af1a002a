//! Change-detection cache
//!
//! Maps project name to the fingerprint of its generation inputs and the
//! verdict produced from them. A hit requires exact fingerprint equality;
//! any change to the readme, commit list, or file-name list invalidates the
//! entry. Persisted as a flat JSON map so it survives across runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::domain::{CouncilVerdict, Project};

/// One persisted cache record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Fingerprint of the inputs the result was generated from
    pub fingerprint: String,
    /// The cached verdict
    pub result: CouncilVerdict,
    /// When the entry was written
    pub last_updated: DateTime<Utc>,
}

/// Persistent verdict cache keyed by project name
#[derive(Debug)]
pub struct SummaryCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl SummaryCache {
    /// Load the cache from disk; a missing or unreadable file yields an
    /// empty cache rather than a failed run
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cache file is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    /// Create an empty cache bound to a path
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Look up a cached verdict; hits require exact fingerprint equality
    pub fn lookup(&self, name: &str, fingerprint: &str) -> Option<&CouncilVerdict> {
        self.entries
            .get(name)
            .filter(|entry| entry.fingerprint == fingerprint)
            .map(|entry| &entry.result)
    }

    /// Store a verdict under a project name
    pub fn store(&mut self, name: &str, fingerprint: String, result: CouncilVerdict) {
        self.entries.insert(
            name.to_string(),
            CacheEntry {
                fingerprint,
                result,
                last_updated: Utc::now(),
            },
        );
    }

    /// Raw entry access (used to detect staleness reasons in logs and tests)
    pub fn entry(&self, name: &str) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache back to its file
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create cache directory {}", parent.display())
                })?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.entries)
            .context("failed to serialize cache")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write cache file {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Fingerprint of a project's generation inputs
///
/// SHA-256 over a canonical JSON serialization of (readme, ordered commit
/// list, ordered file-name list). Field order is fixed by construction, so
/// equal inputs always hash equally; reordering a sequence changes the hash.
pub fn content_fingerprint(project: &Project) -> String {
    let file_names: Vec<&str> = project.files.iter().map(|f| f.name.as_str()).collect();
    let input = serde_json::json!({
        "readme": project.readme.as_deref().unwrap_or(""),
        "commits": project.recent_commits,
        "files": file_names,
    });

    let mut hasher = Sha256::new();
    hasher.update(input.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Project;

    fn verdict() -> CouncilVerdict {
        CouncilVerdict {
            ai_summary: "Summarized.".to_string(),
            ai_tags: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            complexity_score: 3,
        }
    }

    fn project(readme: &str) -> Project {
        serde_json::from_value(serde_json::json!({
            "name": "demo",
            "readme": readme,
            "recentCommits": [{"message": "init"}],
            "files": [{"name": "src"}, {"name": "Cargo.toml"}],
        }))
        .unwrap()
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(
            content_fingerprint(&project("readme")),
            content_fingerprint(&project("readme"))
        );
    }

    #[test]
    fn test_fingerprint_changes_with_any_input() {
        let base = content_fingerprint(&project("readme"));
        assert_ne!(base, content_fingerprint(&project("readme v2")));

        let mut reordered = project("readme");
        reordered.files.reverse();
        // Sequence order participates in the hash
        assert_ne!(base, content_fingerprint(&reordered));

        let mut more_commits = project("readme");
        more_commits.recent_commits.push(crate::domain::Commit {
            date: None,
            message: "fix".to_string(),
            author: None,
        });
        assert_ne!(base, content_fingerprint(&more_commits));
    }

    #[test]
    fn test_lookup_requires_exact_fingerprint() {
        let mut cache = SummaryCache::empty("unused.json");
        cache.store("demo", "fp-1".to_string(), verdict());

        assert!(cache.lookup("demo", "fp-1").is_some());
        assert!(cache.lookup("demo", "fp-2").is_none());
        assert!(cache.lookup("other", "fp-1").is_none());
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = SummaryCache::empty(&path);
        cache.store("demo", "fp-1".to_string(), verdict());
        cache.persist().unwrap();

        let reloaded = SummaryCache::load(&path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(
            reloaded.lookup("demo", "fp-1").map(|v| v.complexity_score),
            Some(3)
        );
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let cache = SummaryCache::load("definitely/not/there.json");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = SummaryCache::load(&path);
        assert!(cache.is_empty());
    }
}
