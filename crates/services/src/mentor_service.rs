use std::env;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::MentorError;

#[derive(Clone, Debug)]
pub struct MentorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl MentorConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("PREP_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("PREP_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("PREP_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Reply normalized at the provider boundary.
///
/// The rest of the system only ever sees `text` plus the retained `raw`
/// payload for diagnostics; nothing downstream pattern-matches on provider
/// response shapes.
#[derive(Debug, Clone)]
pub struct MentorReply {
    pub text: String,
    pub raw: Value,
}

/// One mock-interview exchange: the question and a model answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub ideal_answer: String,
}

/// Structured resume verdict.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResumeFeedback {
    pub score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// Adapter for the hosted AI chat-completions boundary.
///
/// Explicitly constructed and injected; holds its own HTTP client and an
/// optional configuration. With no configuration every call returns
/// `MentorError::Disabled` so the caller can render a quiet fallback.
#[derive(Clone)]
pub struct MentorService {
    client: Client,
    config: Option<MentorConfig>,
}

impl MentorService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(MentorConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<MentorConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Send a prompt and normalize the reply to `{text, raw}`.
    ///
    /// # Errors
    ///
    /// Returns `MentorError::Disabled` without configuration, `Blocked` on
    /// 401/403, `HttpStatus` on other non-success codes, `EmptyResponse`
    /// when the provider returns no content, and transport errors verbatim.
    pub async fn complete(&self, prompt: &str) -> Result<MentorReply, MentorError> {
        let config = self.config.as_ref().ok_or(MentorError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.2,
        };

        debug!(model = %config.model, "sending mentor prompt");
        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let raw: Value = response.json().await?;
        let text = extract_text(&raw).ok_or(MentorError::EmptyResponse)?;
        Ok(MentorReply { text, raw })
    }

    /// Send a prompt expected to yield a JSON object.
    ///
    /// # Errors
    ///
    /// As [`complete`](Self::complete), plus `MentorError::Unstructured`
    /// carrying the raw text when the reply is not valid JSON.
    pub async fn complete_json(&self, prompt: &str) -> Result<(Value, MentorReply), MentorError> {
        let reply = self.complete(prompt).await?;
        let body = strip_code_fence(&reply.text);
        match serde_json::from_str(body) {
            Ok(value) => Ok((value, reply)),
            Err(_) => Err(MentorError::Unstructured {
                raw: reply.text.clone(),
            }),
        }
    }

    /// Ask for one mock-interview question for the given role.
    ///
    /// # Errors
    ///
    /// As [`complete_json`](Self::complete_json); a JSON reply missing the
    /// expected fields is reported as `Unstructured`.
    pub async fn interview_question(&self, role: &str) -> Result<InterviewQuestion, MentorError> {
        let prompt = format!(
            "You are a placement interviewer for the role of {role}. \
             Reply with a JSON object with keys \"question\" and \
             \"ideal_answer\" and no other text."
        );
        let (value, reply) = self.complete_json(&prompt).await?;
        serde_json::from_value(value).map_err(|_| MentorError::Unstructured {
            raw: reply.text,
        })
    }

    /// Ask for a structured review of a resume.
    ///
    /// # Errors
    ///
    /// As [`complete_json`](Self::complete_json); a JSON reply missing the
    /// expected fields is reported as `Unstructured`.
    pub async fn resume_feedback(&self, resume_text: &str) -> Result<ResumeFeedback, MentorError> {
        let prompt = format!(
            "Review this resume for campus placements. Reply with a JSON \
             object with keys \"score\" (0-100), \"strengths\" (array of \
             strings), and \"improvements\" (array of strings) and no other \
             text.\n\n{resume_text}"
        );
        let (value, reply) = self.complete_json(&prompt).await?;
        serde_json::from_value(value).map_err(|_| MentorError::Unstructured {
            raw: reply.text,
        })
    }

    /// Free-text mentoring advice on a preparation topic.
    ///
    /// # Errors
    ///
    /// As [`complete`](Self::complete).
    pub async fn mentor_insight(&self, topic: &str) -> Result<MentorReply, MentorError> {
        let prompt = format!(
            "Give concise, practical placement-preparation advice about: {topic}"
        );
        self.complete(&prompt).await
    }
}

/// Map a non-success status to a mentor error, keeping auth rejections
/// distinguishable from generic failures.
fn classify_status(status: StatusCode) -> MentorError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        MentorError::Blocked(status)
    } else {
        MentorError::HttpStatus(status)
    }
}

/// The single place that knows the provider's response shape.
fn extract_text(raw: &Value) -> Option<String> {
    let content = raw
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Drop a surrounding markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}
