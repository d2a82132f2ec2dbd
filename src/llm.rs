use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;

/// Models offered in the settings surface. The default endpoint decides which
/// of these it actually serves.
pub const AVAILABLE_MODELS: &[&str] = &[
    "claude-3-5-sonnet",
    "claude-sonnet-4-5",
    "llama3.1-70b",
    "llama3.1-8b",
    "mistral-large",
    "mistral-7b",
];

/// Runtime-tunable completion parameters, mutated by the settings handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: AVAILABLE_MODELS[0].to_string(),
            temperature: 0.3,
            max_tokens: 2048,
        }
    }
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = dotenv::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:1234/v1".to_string());
        let api_key = dotenv::var("LLM_API_KEY").ok().filter(|k| !k.is_empty());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Client against an explicit base URL, no auth. Used by tests and local
    /// overrides.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_key: None,
        }
    }

    /// Resolve the chat completions endpoint from the base URL.
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    /// Non-streaming completion with a typed failure channel.
    pub async fn try_complete(
        &self,
        prompt: &str,
        settings: &ModelSettings,
    ) -> Result<String, Error> {
        let body = serde_json::json!({
            "model": settings.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": settings.temperature,
            "max_tokens": settings.max_tokens,
        });

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::ServiceUnavailable(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::Provider(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Provider(format!("HTTP {}: {}", status, text)));
        }

        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| Error::Provider(e.to_string()))?;

        let content = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .unwrap_or("")
            .to_string();

        debug!(
            model = %settings.model,
            prompt_len = prompt.len(),
            response_len = content.len(),
            "completion received"
        );

        Ok(content)
    }

    /// Completion that never fails: a backend error comes back as the error's
    /// human-readable message. Callers must treat any returned string as
    /// potentially an error message, not a hard failure signal.
    pub async fn complete(&self, prompt: &str, settings: &ModelSettings) -> String {
        match self.try_complete(prompt, settings).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "completion failed; surfacing as response text");
                e.to_string()
            }
        }
    }
}

/// Word pacing for the chat surface. The answer is already fully computed;
/// this only controls how it is printed.
pub fn response_words(answer: &str) -> impl Iterator<Item = &str> {
    answer.split(' ')
}
