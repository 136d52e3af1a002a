//! Project document persistence
//!
//! Reads and writes the ordered project-details JSON document produced by
//! the external data collector. An unreadable input document is the one
//! failure that aborts a whole run.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::Project;

/// Load the ordered project records
pub fn load_projects(path: &Path) -> Result<Vec<Project>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read project document {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse project document {}", path.display()))
}

/// Write the records back, preserving their order
pub fn save_projects(path: &Path, projects: &[Project]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
    }
    let raw = serde_json::to_string_pretty(projects).context("failed to serialize projects")?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write project document {}", path.display()))?;
    Ok(())
}
