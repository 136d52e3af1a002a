//! Run configuration
//!
//! Built once in `main` and passed read-only into the pipeline. Every value
//! can be overridden from a JSON config file; the defaults reproduce the
//! built-in provider table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A configured LLM provider endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Chat-completion endpoint URL
    pub url: String,

    /// Environment variable holding the bearer credential
    pub env_key: String,

    /// Credential override; falls back to `env_key` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Candidate models, tried in order when one fails
    pub models: Vec<String>,

    /// Extra request headers (attribution headers for OpenRouter)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_headers: Vec<(String, String)>,

    /// Repetition penalty, only sent where the provider accepts it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f64>,
}

impl ProviderSpec {
    /// Resolve the credential: explicit key first, then the environment
    pub fn resolve_credential(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.env_key).ok())
    }
}

/// Retry tuning for the provider gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per model before giving up on it
    pub max_attempts: u32,
    /// Base delay for exponential rate-limit backoff (milliseconds)
    pub base_delay_ms: u64,
    /// Fixed delay after a transient failure (milliseconds)
    pub transient_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 10_000,
            transient_delay_ms: 1_000,
        }
    }
}

impl RetryConfig {
    /// Backoff before retrying a rate-limited attempt
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(1u64 << attempt.min(16)))
    }

    /// Delay before retrying a transient failure
    pub fn transient_delay(&self) -> Duration {
        Duration::from_millis(self.transient_delay_ms)
    }
}

/// Quota-protection pauses; correctness never depends on them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// Pause between council stages (seconds)
    pub stage_seconds: u64,
    /// Pause after each fully processed project (seconds)
    pub project_seconds: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            stage_seconds: 15,
            project_seconds: 30,
        }
    }
}

impl CooldownConfig {
    pub fn stage(&self) -> Duration {
        Duration::from_secs(self.stage_seconds)
    }

    pub fn project(&self) -> Duration {
        Duration::from_secs(self.project_seconds)
    }

    /// Disable all pauses (used by tests)
    pub fn none() -> Self {
        Self {
            stage_seconds: 0,
            project_seconds: 0,
        }
    }
}

/// Default file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub cache: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("project-details.json"),
            cache: PathBuf::from("summary_cache.json"),
        }
    }
}

/// Immutable application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChroniclerConfig {
    /// Provider used when the CLI does not select one
    pub default_provider: String,

    /// Provider retried once after a stage's primary call fails
    pub fallback_provider: String,

    /// Provider table, id -> endpoint/credential/models
    pub providers: BTreeMap<String, ProviderSpec>,

    pub retry: RetryConfig,

    pub cooldown: CooldownConfig,

    pub paths: PathsConfig,

    /// HTTP request timeout (seconds)
    pub request_timeout_seconds: u64,

    /// Policy flag read by the external statistics collector: whether PR and
    /// issue activity counts toward per-language statistics.
    pub attribute_prs_to_languages: bool,
}

impl Default for ChroniclerConfig {
    fn default() -> Self {
        Self {
            default_provider: "openrouter".to_string(),
            fallback_provider: "groq".to_string(),
            providers: default_providers(),
            retry: RetryConfig::default(),
            cooldown: CooldownConfig::default(),
            paths: PathsConfig::default(),
            request_timeout_seconds: 120,
            attribute_prs_to_languages: true,
        }
    }
}

impl ChroniclerConfig {
    /// Load configuration, optionally overridden from a JSON file
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                let config: Self = serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?;
                Ok(config)
            }
        }
    }

    /// Look up a provider by identifier
    pub fn provider(&self, id: &str) -> Option<&ProviderSpec> {
        self.providers.get(id)
    }
}

fn default_providers() -> BTreeMap<String, ProviderSpec> {
    let mut providers = BTreeMap::new();

    providers.insert(
        "openrouter".to_string(),
        ProviderSpec {
            url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            env_key: "OPENROUTER_API_KEY".to_string(),
            api_key: None,
            models: vec![
                "google/gemini-2.0-flash-exp:free".to_string(),
                "meta-llama/llama-3.2-11b-vision-instruct:free".to_string(),
            ],
            extra_headers: vec![
                (
                    "HTTP-Referer".to_string(),
                    "https://github.com/akashagl92/Portfolio-Fetch".to_string(),
                ),
                ("X-Title".to_string(), "Portfolio Chronicler".to_string()),
            ],
            repetition_penalty: Some(1.0),
        },
    );

    providers.insert(
        "gemini".to_string(),
        ProviderSpec {
            url: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
                .to_string(),
            env_key: "GEMINI_API_KEY".to_string(),
            api_key: None,
            models: vec!["gemini-2.5-flash".to_string()],
            extra_headers: Vec::new(),
            repetition_penalty: None,
        },
    );

    providers.insert(
        "groq".to_string(),
        ProviderSpec {
            url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            env_key: "GROQ_API_KEY".to_string(),
            api_key: None,
            models: vec!["llama-3.3-70b-versatile".to_string()],
            extra_headers: Vec::new(),
            repetition_penalty: None,
        },
    );

    providers.insert(
        "xai".to_string(),
        ProviderSpec {
            url: "https://api.x.ai/v1/chat/completions".to_string(),
            env_key: "XAI_API_KEY".to_string(),
            api_key: None,
            models: vec!["grok-2-1212".to_string(), "grok-beta".to_string()],
            extra_headers: Vec::new(),
            repetition_penalty: None,
        },
    );

    providers
}
