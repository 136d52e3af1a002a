//! Chronicler: an LLM "council" that writes portfolio project summaries.
//!
//! Reads a JSON document of project records, runs three generation stages per
//! project (technical analysis, impact pitch, JSON synthesis) against a
//! configurable provider with per-model retry and cross-provider fallback,
//! sanitizes the result, and writes the document back. A fingerprint cache
//! skips projects whose inputs have not changed.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{ChronicleOptions, ChronicleReport, ChronicleRun, Council, CouncilConfig};
pub use config::ChroniclerConfig;
pub use domain::{ChatMessage, CouncilVerdict, GatewayError, GenerationRequest, Project, Role};
pub use infrastructure::{HttpGateway, SummaryCache, TextGenerator};
