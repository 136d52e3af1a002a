//! Batch orchestration over the project document
//!
//! Processes records strictly one at a time: skip, replay from cache, or
//! convene the council, then move on. One project's failure never aborts the
//! rest of the batch.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::application::council::Council;
use crate::domain::Project;
use crate::infrastructure::cache::{SummaryCache, content_fingerprint};
use crate::infrastructure::store;

/// Caller-selected behavior for one run
#[derive(Debug, Clone, Default)]
pub struct ChronicleOptions {
    /// Regenerate even when a summary exists or the cache has a fresh entry
    pub force: bool,
    /// Limit the run to a single project name
    pub project_filter: Option<String>,
    /// Target-audience text; disables the cache entirely for this run
    pub job_context: Option<String>,
}

/// Outcome counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChronicleReport {
    /// Verdicts produced by fresh council runs
    pub generated: usize,
    /// Verdicts replayed from the cache
    pub from_cache: usize,
    /// Records left untouched because a summary already existed
    pub skipped: usize,
    /// Projects whose pipeline aborted
    pub failed: usize,
}

impl ChronicleReport {
    /// Whether any record was modified and the document needs saving
    pub fn modified(&self) -> bool {
        self.generated + self.from_cache > 0
    }
}

/// One sequential pass over the project document
pub struct ChronicleRun {
    council: Council,
    cache: SummaryCache,
    options: ChronicleOptions,
    project_cooldown: Duration,
    cache_modified: bool,
}

impl ChronicleRun {
    pub fn new(
        council: Council,
        cache: SummaryCache,
        options: ChronicleOptions,
        project_cooldown: Duration,
    ) -> Self {
        Self {
            council,
            cache,
            options,
            project_cooldown,
            cache_modified: false,
        }
    }

    /// Process every record in order, mutating matched records in place
    pub async fn execute(&mut self, projects: &mut [Project]) -> ChronicleReport {
        let mut report = ChronicleReport::default();
        // Context-tailored runs are never cached, never read from cache
        let cache_enabled = !self.options.force && self.options.job_context.is_none();

        for project in projects.iter_mut() {
            if let Some(filter) = &self.options.project_filter {
                if project.name != *filter {
                    continue;
                }
            }

            // An existing summary is expensive; only a forced run replaces it
            if project.has_summary() && !self.options.force {
                debug!(project = %project.name, "Skipping, summary exists");
                report.skipped += 1;
                continue;
            }

            let fingerprint = content_fingerprint(project);

            if cache_enabled {
                if let Some(cached) = self.cache.lookup(&project.name, &fingerprint) {
                    info!(project = %project.name, "Inputs unchanged, replaying cached verdict");
                    project.apply_verdict(cached.clone());
                    report.from_cache += 1;
                    continue;
                }
            }

            match self
                .council
                .convene(project, self.options.job_context.as_deref())
                .await
            {
                Ok(verdict) => {
                    project.apply_verdict(verdict.clone());
                    if cache_enabled {
                        self.cache.store(&project.name, fingerprint, verdict);
                        self.cache_modified = true;
                    }
                    report.generated += 1;
                    self.cooldown().await;
                }
                Err(e) => {
                    warn!(project = %project.name, error = format!("{:#}", e), "Council failed, record left unchanged");
                    report.failed += 1;
                }
            }
        }

        info!(
            generated = report.generated,
            from_cache = report.from_cache,
            skipped = report.skipped,
            failed = report.failed,
            "Chronicle run finished"
        );
        report
    }

    /// The cache as left by the run
    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    /// Whether this run stored any cache entry
    ///
    /// Tailored (job-context) and forced runs never store, so the cache file
    /// must not be rewritten for them even when verdicts were generated.
    pub fn cache_modified(&self) -> bool {
        self.cache_modified
    }

    /// Write the run's outputs: the document when any record changed, the
    /// cache file only when this run stored entries. Both suppressed by
    /// dry-run.
    pub fn persist(
        &self,
        output: &Path,
        projects: &[Project],
        report: &ChronicleReport,
        dry_run: bool,
    ) -> Result<()> {
        if dry_run {
            info!("Dry run, skipping persistence");
            return Ok(());
        }
        if report.modified() {
            info!(path = %output.display(), "Saving updated project document");
            store::save_projects(output, projects)?;
        }
        if self.cache_modified {
            info!(path = %self.cache.path().display(), "Saving cache");
            self.cache.persist()?;
        }
        Ok(())
    }

    async fn cooldown(&self) {
        if !self.project_cooldown.is_zero() {
            debug!(seconds = self.project_cooldown.as_secs(), "Per-project cooldown");
            sleep(self.project_cooldown).await;
        }
    }
}
