use crate::config::ai::AiConfig;
use anyhow::Result;
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

const MODERATION_INSTRUCTION: &str = "You are the content moderator for a startup idea community. \
Judge whether the submission is acceptable: reject spam, advertising, abuse, or content that is \
clearly not a genuine startup idea or a genuine comment on one. Respond with only a JSON object \
of the form {\"isValid\": boolean, \"reason\": string} where reason briefly explains a rejection.";

const ASSISTANT_INSTRUCTION: &str = "You are the IdeaConnect assistant. You help founders and \
investors refine startup ideas, think through validation and early traction, and find their way \
around the platform. Keep answers short and practical.";

const ASSISTANT_FALLBACK: &str =
    "Sorry, I'm having trouble answering right now. Please try again in a moment.";

/// Outcome of the moderation gate. `is_valid == false` carries the reason
/// shown verbatim to the submitter.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModerationVerdict {
    pub is_valid: bool,
    pub reason: Option<String>,
}

impl ModerationVerdict {
    fn approved() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }
}

/// One turn of the assistant conversation, as replayed by the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Clone)]
struct Inner {
    client: reqwest::Client,
    config: AiConfig,
}

/// Client for an OpenAI-compatible chat-completions API. If no API key is
/// configured, moderation approves everything and the assistant answers
/// with a fixed fallback (graceful degradation).
#[derive(Clone)]
pub struct AiService {
    inner: Option<Inner>,
}

impl AiService {
    pub fn from_env() -> Self {
        Self::new(AiConfig::from_env())
    }

    pub fn new(config: Option<AiConfig>) -> Self {
        let Some(config) = config else {
            return Self { inner: None };
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        match client {
            Ok(client) => Self {
                inner: Some(Inner { client, config }),
            },
            Err(e) => {
                tracing::warn!("Failed to build AI HTTP client: {e}");
                Self { inner: None }
            }
        }
    }

    /// Returns true if an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    /// Moderation gate for ideas and comments. Fails open: any failure
    /// (unconfigured, network, non-2xx, malformed JSON) approves the
    /// content rather than blocking the write.
    pub async fn moderate(&self, text: &str) -> ModerationVerdict {
        let Some(inner) = &self.inner else {
            return ModerationVerdict::approved();
        };

        let messages = vec![
            WireMessage {
                role: "system".to_string(),
                content: MODERATION_INSTRUCTION.to_string(),
            },
            WireMessage {
                role: "user".to_string(),
                content: text.to_string(),
            },
        ];

        match complete(inner, messages, true).await {
            Ok(content) => match parse_verdict(&content) {
                Some(verdict) => verdict,
                None => {
                    tracing::warn!("Moderation reply was not the expected JSON, approving");
                    ModerationVerdict::approved()
                }
            },
            Err(e) => {
                tracing::warn!("Moderation call failed, approving: {e}");
                ModerationVerdict::approved()
            }
        }
    }

    /// One assistant round trip over the full client-held transcript.
    /// Never errors; failures produce a fixed apology turn.
    pub async fn chat(&self, turns: &[ChatTurn]) -> String {
        let Some(inner) = &self.inner else {
            return ASSISTANT_FALLBACK.to_string();
        };

        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(WireMessage {
            role: "system".to_string(),
            content: ASSISTANT_INSTRUCTION.to_string(),
        });
        for turn in turns {
            messages.push(WireMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            });
        }

        match complete(inner, messages, false).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Assistant call failed: {e}");
                ASSISTANT_FALLBACK.to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

async fn complete(inner: &Inner, messages: Vec<WireMessage>, json_mode: bool) -> Result<String> {
    let request = ChatRequest {
        model: inner.config.model.clone(),
        messages,
        response_format: json_mode.then(|| ResponseFormat {
            format_type: "json_object".to_string(),
        }),
    };

    let response = inner
        .client
        .post(format!("{}/chat/completions", inner.config.base_url))
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", inner.config.api_key),
        )
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("AI API returned {status}: {body}"));
    }

    let chat_response: ChatResponse = response.json().await?;
    let content = chat_response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| anyhow::anyhow!("AI API reply had no content"))?;

    Ok(content)
}

/// Strict parse of the moderation reply. None means "not the contract",
/// which callers treat as approval.
fn parse_verdict(content: &str) -> Option<ModerationVerdict> {
    #[derive(Deserialize)]
    struct RawVerdict {
        #[serde(rename = "isValid")]
        is_valid: bool,
        reason: Option<String>,
    }

    let raw: RawVerdict = serde_json::from_str(content.trim()).ok()?;
    Some(ModerationVerdict {
        is_valid: raw.is_valid,
        reason: raw.reason,
    })
}
