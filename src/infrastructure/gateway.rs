//! Provider gateway
//!
//! Sends chat-completion requests to a configured provider, walking its
//! candidate model list in order. Failures are classified per attempt and a
//! single retry policy decides whether to back off, retry, or move on to the
//! next model.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::{ChroniclerConfig, ProviderSpec, RetryConfig};
use crate::domain::{GatewayError, GenerationRequest, Role};

/// Seam between the council pipeline and the network
///
/// The pipeline only ever asks for text given a provider id and a request;
/// tests substitute a scripted implementation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text via the named provider
    async fn generate(
        &self,
        provider: &str,
        request: GenerationRequest,
    ) -> Result<String, GatewayError>;
}

/// Outcome of one HTTP attempt against one model
#[derive(Debug)]
enum AttemptOutcome {
    /// Generated text from the first completion choice
    Success(String),
    /// HTTP 429; back off exponentially and retry the same model
    RateLimited,
    /// HTTP 404/400/402; the model is not worth retrying
    ModelFatal(u16),
    /// Transport or parse failure; short fixed delay, then retry
    Transient(String),
}

/// HTTP gateway over all configured providers
pub struct HttpGateway {
    client: Client,
    providers: BTreeMap<String, ProviderSpec>,
    retry: RetryConfig,
}

impl HttpGateway {
    pub fn new(config: &ChroniclerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to build HTTP client with custom timeout, using default client");
                Client::new()
            });

        Self {
            client,
            providers: config.providers.clone(),
            retry: config.retry.clone(),
        }
    }

    /// Issue a single HTTP attempt and classify the result
    async fn issue_once(
        &self,
        spec: &ProviderSpec,
        api_key: &str,
        model: &str,
        request: &GenerationRequest,
    ) -> AttemptOutcome {
        let payload = ChatCompletionRequest::build(model, spec, request);

        let mut http = self
            .client
            .post(&spec.url)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json");
        for (name, value) in &spec.extra_headers {
            http = http.header(name.as_str(), value.as_str());
        }

        let response = match http.json(&payload).send().await {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::Transient(e.to_string()),
        };

        let status = response.status().as_u16();
        match classify_status(status) {
            StatusClass::RateLimited => AttemptOutcome::RateLimited,
            StatusClass::ModelFatal => {
                let body = response.text().await.unwrap_or_default();
                warn!(model, status, body = %truncate(&body, 100), "Model rejected request");
                AttemptOutcome::ModelFatal(status)
            }
            StatusClass::OtherFailure => {
                let body = response.text().await.unwrap_or_default();
                AttemptOutcome::Transient(format!("HTTP {}: {}", status, truncate(&body, 200)))
            }
            StatusClass::Success => match response.json::<ChatCompletionResponse>().await {
                Ok(body) => match body.first_content() {
                    Some(text) => AttemptOutcome::Success(text),
                    None => AttemptOutcome::Transient("response carried no choices".to_string()),
                },
                Err(e) => AttemptOutcome::Transient(format!("body parse failed: {}", e)),
            },
        }
    }

    /// Retry policy for one model: consumes attempt outcomes until the model
    /// succeeds, proves fatal, or runs out of attempts
    async fn call_model(
        &self,
        spec: &ProviderSpec,
        api_key: &str,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, GatewayError> {
        for attempt in 0..self.retry.max_attempts {
            match self.issue_once(spec, api_key, model, request).await {
                AttemptOutcome::Success(text) => return Ok(text),
                AttemptOutcome::RateLimited => {
                    let wait = self.retry.backoff_delay(attempt);
                    warn!(model, attempt, wait_ms = wait.as_millis() as u64, "Rate limited, backing off");
                    sleep(wait).await;
                }
                AttemptOutcome::ModelFatal(status) => {
                    return Err(GatewayError::ModelUnavailable {
                        model: model.to_string(),
                        status,
                    });
                }
                AttemptOutcome::Transient(reason) => {
                    debug!(model, attempt, reason = %reason, "Attempt failed, retrying");
                    sleep(self.retry.transient_delay()).await;
                }
            }
        }

        Err(GatewayError::RetriesExhausted {
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for HttpGateway {
    async fn generate(
        &self,
        provider: &str,
        request: GenerationRequest,
    ) -> Result<String, GatewayError> {
        let spec = self
            .providers
            .get(provider)
            .ok_or_else(|| GatewayError::UnknownProvider(provider.to_string()))?;

        let api_key =
            spec.resolve_credential()
                .ok_or_else(|| GatewayError::MissingCredential {
                    provider: provider.to_string(),
                    env_key: spec.env_key.clone(),
                })?;

        for model in &spec.models {
            debug!(provider, model, "Dispatching generation request");
            match self.call_model(spec, &api_key, model, &request).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(provider, model, error = %e, "Model failed, trying next candidate");
                }
            }
        }

        Err(GatewayError::ModelsExhausted {
            provider: provider.to_string(),
        })
    }
}

/// Classification of an HTTP status for the retry policy
#[derive(Debug, PartialEq, Eq)]
enum StatusClass {
    Success,
    RateLimited,
    ModelFatal,
    OtherFailure,
}

fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        429 => StatusClass::RateLimited,
        // 402 = Payment Required (OpenRouter billing)
        400 | 402 | 404 => StatusClass::ModelFatal,
        _ => StatusClass::OtherFailure,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// === Wire types (OpenAI chat-completion dialect) ===

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repetition_penalty: Option<f64>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl ChatCompletionRequest {
    fn build(model: &str, spec: &ProviderSpec, request: &GenerationRequest) -> Self {
        let messages = request
            .messages
            .iter()
            .map(|msg| WireMessage {
                role: match msg.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: msg.content.clone(),
            })
            .collect();

        Self {
            model: model.to_string(),
            messages,
            temperature: request.temperature,
            top_p: 1.0,
            response_format: request
                .json_mode
                .then_some(ResponseFormat { kind: "json_object" }),
            repetition_penalty: spec.repetition_penalty,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatMessage;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(200), StatusClass::Success);
        assert_eq!(classify_status(429), StatusClass::RateLimited);
        assert_eq!(classify_status(400), StatusClass::ModelFatal);
        assert_eq!(classify_status(402), StatusClass::ModelFatal);
        assert_eq!(classify_status(404), StatusClass::ModelFatal);
        assert_eq!(classify_status(500), StatusClass::OtherFailure);
        assert_eq!(classify_status(503), StatusClass::OtherFailure);
    }

    #[test]
    fn test_wire_request_shape() {
        let spec = ProviderSpec {
            url: "http://localhost".to_string(),
            env_key: "KEY".to_string(),
            api_key: None,
            models: vec!["m".to_string()],
            extra_headers: Vec::new(),
            repetition_penalty: Some(1.0),
        };
        let request = GenerationRequest::new(
            vec![ChatMessage::system("sys"), ChatMessage::user("usr")],
            0.3,
        )
        .with_json_mode();

        let wire = ChatCompletionRequest::build("model-a", &spec, &request);
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["model"], "model-a");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["temperature"], 0.3);
        assert_eq!(json["top_p"], 1.0);
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["repetition_penalty"], 1.0);
    }

    #[test]
    fn test_wire_request_omits_optional_fields() {
        let spec = ProviderSpec {
            url: "http://localhost".to_string(),
            env_key: "KEY".to_string(),
            api_key: None,
            models: vec!["m".to_string()],
            extra_headers: Vec::new(),
            repetition_penalty: None,
        };
        let request = GenerationRequest::new(vec![ChatMessage::user("usr")], 0.7);

        let wire = ChatCompletionRequest::build("model-a", &spec, &request);
        let json = serde_json::to_value(&wire).unwrap();

        assert!(json.get("response_format").is_none());
        assert!(json.get("repetition_penalty").is_none());
    }

    #[test]
    fn test_response_first_content() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "hello"}}, {"message": {"content": "other"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.first_content().as_deref(), Some("hello"));

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(empty.first_content(), None);
    }
}
