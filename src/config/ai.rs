use std::env;

#[derive(Clone)]
pub struct AiConfig {
    /// OpenAI-compatible API root, e.g. "https://api.openai.com/v1".
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Read AI settings from the environment.
    /// Returns None when no API key is configured; moderation then
    /// approves everything and the assistant answers with a fallback.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("AI_API_KEY").ok()?;
        let base_url = env::var("AI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let timeout_secs = env::var("AI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            timeout_secs,
        })
    }
}
