//! Common test utilities and mock implementations

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use chronicler::domain::{GatewayError, GenerationRequest, Project};
use chronicler::infrastructure::gateway::TextGenerator;

/// Scripted generator for driving the pipeline without a network
///
/// Calls to providers in `fail_providers` always fail; every other call pops
/// the next scripted result. Every invocation is captured for verification.
pub struct MockGenerator {
    responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    fail_providers: HashSet<String>,
    /// Captured (provider, request) pairs, in call order
    pub calls: Arc<Mutex<Vec<(String, GenerationRequest)>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fail_providers: HashSet::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue successful responses, served in order
    pub fn with_responses<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = self.responses.get_mut();
        for response in responses {
            queue.push_back(Ok(response.into()));
        }
        self
    }

    /// Queue a scripted failure
    pub fn with_failure(mut self) -> Self {
        self.responses
            .get_mut()
            .push_back(Err(GatewayError::ModelsExhausted {
                provider: "scripted".to_string(),
            }));
        self
    }

    /// Make every call to this provider fail
    pub fn failing_for(mut self, provider: &str) -> Self {
        self.fail_providers.insert(provider.to_string());
        self
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        provider: &str,
        request: GenerationRequest,
    ) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .await
            .push((provider.to_string(), request));

        if self.fail_providers.contains(provider) {
            return Err(GatewayError::ModelsExhausted {
                provider: provider.to_string(),
            });
        }

        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| {
                Err(GatewayError::ModelsExhausted {
                    provider: provider.to_string(),
                })
            })
    }
}

/// A chairman response the pipeline should accept as-is
pub const CHAIRMAN_JSON: &str = r#"{"ai_summary": "An interactive visualizer pairing audio physics with music theory.", "ai_tags": ["rust", "audio", "visualization"], "complexity_score": 7}"#;

/// Build a bare project record with collector-shaped inputs
pub fn make_project(name: &str) -> Project {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "readme": format!("# {}\nA demo project.", name),
        "recentCommits": [
            {"date": "2024-03-01T12:00:00Z", "message": "add renderer", "author": "a"},
            {"date": "2024-02-20T09:30:00Z", "message": "initial commit", "author": "a"}
        ],
        "files": [
            {"name": "src", "type": "dir", "path": "src"},
            {"name": "Cargo.toml", "type": "file", "path": "Cargo.toml"}
        ],
        "stars": 5
    }))
    .expect("valid project json")
}
