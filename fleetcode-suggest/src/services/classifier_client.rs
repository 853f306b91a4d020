//! External taxonomy classifier client
//!
//! Asks an OpenAI-compatible chat-completions endpoint to pick one system code
//! from a closed list. The response is constrained with a JSON schema whose
//! `code` property is an enum of the offered codes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("fleetcode-suggest/", env!("CARGO_PKG_VERSION"));

const SYSTEM_PROMPT: &str = "You classify fleet maintenance parts and inspection findings \
into VMRS-style system codes. Choose exactly one code from the allowed list. Report a \
confidence between 0 and 1 and a one-sentence rationale.";

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Classifier returned unknown code: {0}")]
    UnknownCode(String),
}

/// Coarse failure category recorded on the result tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationErrorKind {
    NotConfigured,
    Network,
    Api,
    MalformedResponse,
    UnknownCode,
}

impl ClassifierError {
    pub fn kind(&self) -> EscalationErrorKind {
        match self {
            ClassifierError::NotConfigured(_) => EscalationErrorKind::NotConfigured,
            ClassifierError::Network(_) => EscalationErrorKind::Network,
            ClassifierError::Api(_, _) => EscalationErrorKind::Api,
            ClassifierError::Parse(_) => EscalationErrorKind::MalformedResponse,
            ClassifierError::UnknownCode(_) => EscalationErrorKind::UnknownCode,
        }
    }
}

/// One allowed answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeOption {
    pub code: String,
    pub title: String,
}

/// What the classifier is asked
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub text: String,
    pub notes: Option<String>,
    /// Closed answer set; any other code in the reply is rejected
    pub codes: Vec<CodeOption>,
}

/// Classifier answer: `{code, confidence, rationale}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClassifierVerdict {
    pub code: String,
    pub confidence: f64,
    pub rationale: String,
}

/// Opaque, fallible text classifier
#[async_trait]
pub trait TaxonomyClassifier: Send + Sync {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassifierVerdict, ClassifierError>;
}

/// Connection settings for [`HttpTaxonomyClassifier`]
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Chat-completions backed classifier
pub struct HttpTaxonomyClassifier {
    http_client: reqwest::Client,
    settings: ClassifierSettings,
}

impl HttpTaxonomyClassifier {
    pub fn new(settings: ClassifierSettings) -> Result<Self, ClassifierError> {
        if settings.api_key.trim().is_empty() {
            return Err(ClassifierError::NotConfigured("API key is empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
        })
    }
}

#[async_trait]
impl TaxonomyClassifier for HttpTaxonomyClassifier {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassifierVerdict, ClassifierError> {
        let body = build_request_body(&self.settings.model, request);

        tracing::debug!(
            endpoint = %self.settings.endpoint,
            model = %self.settings.model,
            codes = request.codes.len(),
            "Querying taxonomy classifier"
        );

        let response = self
            .http_client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api(status.as_u16(), error_text));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let verdict = parse_completion(&text)?;

        tracing::debug!(
            code = %verdict.code,
            confidence = verdict.confidence,
            "Taxonomy classifier answered"
        );

        Ok(verdict)
    }
}

/// User message: finding text, optional notes, allowed codes
pub fn build_user_prompt(request: &ClassificationRequest) -> String {
    let mut prompt = format!("Text: {}\n", request.text.trim());
    if let Some(notes) = request.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        prompt.push_str(&format!("Notes: {}\n", notes));
    }
    prompt.push_str("Allowed codes:\n");
    for option in &request.codes {
        prompt.push_str(&format!("- {}: {}\n", option.code, option.title));
    }
    prompt
}

/// Chat-completions request body with a JSON-schema response format
pub fn build_request_body(model: &str, request: &ClassificationRequest) -> Value {
    let codes: Vec<&str> = request.codes.iter().map(|c| c.code.as_str()).collect();

    json!({
        "model": model,
        "temperature": 0,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": build_user_prompt(request) },
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "taxonomy_classification",
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "code": { "type": "string", "enum": codes },
                        "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                        "rationale": { "type": "string" },
                    },
                    "required": ["code", "confidence", "rationale"],
                    "additionalProperties": false,
                },
            },
        },
    })
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Extract the verdict from a chat-completions response body
pub fn parse_completion(body: &str) -> Result<ClassifierVerdict, ClassifierError> {
    let completion: ChatCompletion =
        serde_json::from_str(body).map_err(|e| ClassifierError::Parse(e.to_string()))?;

    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ClassifierError::Parse("Response has no message content".to_string()))?;

    let verdict: ClassifierVerdict = serde_json::from_str(content.trim())
        .map_err(|e| ClassifierError::Parse(format!("Verdict is not valid JSON: {}", e)))?;

    if verdict.code.trim().is_empty() {
        return Err(ClassifierError::Parse("Verdict code is empty".to_string()));
    }

    Ok(verdict)
}
