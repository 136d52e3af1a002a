//! The council pipeline
//!
//! Three sequential generation stages per project: a technical analysis, an
//! impact pitch, and a JSON synthesis. Each stage tries the caller's provider
//! once and the fixed fallback provider once; a stage that fails both aborts
//! the project's run with nothing applied.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::{CouncilVerdict, GatewayError, GenerationRequest, Project};
use crate::infrastructure::gateway::TextGenerator;
use crate::infrastructure::response_parser::parse_verdict;
use crate::infrastructure::{PromptBuilder, SummarySanitizer};

/// Provider selection and pacing for one council
#[derive(Debug, Clone)]
pub struct CouncilConfig {
    /// Provider tried first for every stage
    pub provider: String,
    /// Provider retried once after the primary fails a stage
    pub fallback_provider: String,
    /// Pause between stages (quota protection, may be zero)
    pub stage_cooldown: Duration,
}

/// Runs the three-stage pipeline for one project at a time
pub struct Council {
    generator: Arc<dyn TextGenerator>,
    sanitizer: SummarySanitizer,
    config: CouncilConfig,
}

impl Council {
    pub fn new(generator: Arc<dyn TextGenerator>, config: CouncilConfig) -> Self {
        Self {
            generator,
            sanitizer: SummarySanitizer::new(),
            config,
        }
    }

    /// Convene the council for a project
    ///
    /// Returns the sanitized verdict, or an error if any stage failed on both
    /// the primary and the fallback provider. The project record itself is
    /// never touched here.
    pub async fn convene(
        &self,
        project: &Project,
        job_context: Option<&str>,
    ) -> Result<CouncilVerdict> {
        info!(project = %project.name, "Convening council");
        let context = PromptBuilder::project_context(project);

        debug!(project = %project.name, "Stage 1: technical analysis");
        let analysis = self
            .run_stage("analysis", PromptBuilder::analysis_request(&context))
            .await
            .context("analysis stage failed")?;
        self.cooldown().await;

        debug!(project = %project.name, "Stage 2: impact pitch");
        let pitch = self
            .run_stage("pitch", PromptBuilder::pitch_request(&context, job_context))
            .await
            .context("pitch stage failed")?;
        self.cooldown().await;

        debug!(project = %project.name, "Stage 3: synthesis");
        let raw = self
            .run_stage(
                "synthesis",
                PromptBuilder::synthesis_request(&context, &analysis, &pitch, job_context),
            )
            .await
            .context("synthesis stage failed")?;

        let mut verdict = parse_verdict(&raw).context("synthesis stage failed")?;
        verdict.ai_summary = self.sanitizer.sanitize(&verdict.ai_summary);

        info!(
            project = %project.name,
            tags = verdict.ai_tags.len(),
            complexity = verdict.complexity_score,
            "Council reached a verdict"
        );
        Ok(verdict)
    }

    /// One stage: primary provider, then a single fallback attempt
    async fn run_stage(
        &self,
        stage: &str,
        request: GenerationRequest,
    ) -> Result<String, GatewayError> {
        match self
            .generator
            .generate(&self.config.provider, request.clone())
            .await
        {
            Ok(text) => Ok(text),
            Err(primary_err) => {
                if self.config.provider == self.config.fallback_provider {
                    return Err(primary_err);
                }
                warn!(
                    stage,
                    provider = %self.config.provider,
                    fallback = %self.config.fallback_provider,
                    error = %primary_err,
                    "Primary provider failed, retrying against fallback"
                );
                self.generator
                    .generate(&self.config.fallback_provider, request)
                    .await
            }
        }
    }

    async fn cooldown(&self) {
        if !self.config.stage_cooldown.is_zero() {
            debug!(seconds = self.config.stage_cooldown.as_secs(), "Inter-stage cooldown");
            sleep(self.config.stage_cooldown).await;
        }
    }
}
