//! Infrastructure: HTTP gateway, prompt templates, parsing, sanitization,
//! and persistence

pub mod cache;
pub mod gateway;
pub mod prompts;
pub mod response_parser;
pub mod sanitizer;
pub mod store;

pub use cache::{CacheEntry, SummaryCache, content_fingerprint};
pub use gateway::{HttpGateway, TextGenerator};
pub use prompts::PromptBuilder;
pub use sanitizer::SummarySanitizer;
