//! LLM API client supporting Anthropic and OpenAI-compatible backends
//!
//! Uses ureq (sync HTTP), so the pipeline stays free of an async runtime.

use crate::ai::{AiError, AiResult};
use crate::config::UserConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    #[default]
    Anthropic,
    OpenAi,
    Ollama,
}

impl FromStr for LlmBackend {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmBackend::Anthropic),
            "openai" => Ok(LlmBackend::OpenAi),
            "ollama" => Ok(LlmBackend::Ollama),
            _ => Err(AiError::UnknownBackend(s.to_string())),
        }
    }
}

impl LlmBackend {
    pub fn env_key(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
            LlmBackend::Ollama => "OLLAMA_MODEL",
        }
    }

    pub fn signup_url(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "https://console.anthropic.com/settings/keys",
            LlmBackend::OpenAi => "https://platform.openai.com/api-keys",
            LlmBackend::Ollama => "https://ollama.ai (no key needed, just run locally)",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "claude-sonnet-4-20250514",
            LlmBackend::OpenAi => "gpt-4o",
            LlmBackend::Ollama => "llama3.1:8b",
        }
    }

    pub fn api_url(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "https://api.anthropic.com/v1/messages",
            LlmBackend::OpenAi => "https://api.openai.com/v1/chat/completions",
            LlmBackend::Ollama => "http://localhost:11434/v1/chat/completions",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmBackend::Ollama)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize)]
struct Message<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub backend: LlmBackend,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            model: None,
            // explanations are capped at ~200 words
            max_tokens: 500,
            temperature: 0.3,
        }
    }
}

impl AiConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }
}

/// Unified LLM client
pub struct AiClient {
    config: AiConfig,
    api_key: String,
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // status codes are mapped to AiError below
        .timeout_global(Some(Duration::from_secs(120)))
        .build()
        .new_agent()
}

impl AiClient {
    pub fn new(config: AiConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            agent: make_agent(),
        }
    }

    /// Build a client from user config (keys there already include
    /// environment overrides).
    pub fn from_user_config(user: &UserConfig) -> AiResult<Self> {
        if !user.ai_enabled() {
            return Err(AiError::Disabled);
        }

        let backend: LlmBackend = user.ai_backend().parse()?;
        let mut config = AiConfig {
            backend,
            model: user.ai.model.clone(),
            ..Default::default()
        };
        if let Some(max_tokens) = user.ai.max_tokens {
            config.max_tokens = max_tokens;
        }

        let api_key = match backend {
            LlmBackend::Anthropic => user.ai.anthropic_api_key.clone(),
            LlmBackend::OpenAi => user.ai.openai_api_key.clone(),
            LlmBackend::Ollama => {
                if config.model.is_none() {
                    config.model = std::env::var("OLLAMA_MODEL").ok();
                }
                Some("ollama".to_string())
            }
        };

        let api_key = api_key.ok_or_else(|| AiError::MissingApiKey {
            env_var: backend.env_key().to_string(),
            signup_url: backend.signup_url().to_string(),
        })?;

        Ok(Self::new(config, api_key))
    }

    pub fn backend(&self) -> LlmBackend {
        self.config.backend
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    /// Send one prompt and return the reply text (blocking)
    pub fn generate(&self, prompt: &str, system: Option<&str>) -> AiResult<String> {
        match self.config.backend {
            LlmBackend::Anthropic => self.generate_anthropic(prompt, system),
            LlmBackend::OpenAi | LlmBackend::Ollama => self.generate_chat(prompt, system),
        }
    }

    /// OpenAI-style chat completions (OpenAI and Ollama)
    fn generate_chat(&self, prompt: &str, system: Option<&str>) -> AiResult<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(content) = system {
            messages.push(Message {
                role: Role::System,
                content,
            });
        }
        messages.push(Message {
            role: Role::User,
            content: prompt,
        });

        let body = ChatRequest {
            model: self.config.model(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut req = self
            .agent
            .post(self.config.backend.api_url())
            .header("Content-Type", "application/json");
        if self.config.backend.requires_api_key() {
            req = req.header("Authorization", &format!("Bearer {}", self.api_key));
        }

        let resp: ChatResponse = read_reply(req.send_json(&body))?;
        resp.into_text()
    }

    fn generate_anthropic(&self, prompt: &str, system: Option<&str>) -> AiResult<String> {
        let body = AnthropicRequest {
            model: self.config.model(),
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: Role::User,
                content: prompt,
            }],
            system,
            temperature: self.config.temperature,
        };

        let sent = self
            .agent
            .post(self.config.backend.api_url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .send_json(&body);

        let resp: AnthropicResponse = read_reply(sent)?;
        resp.into_text()
    }
}

/// Map transport failures and error statuses to `AiError`, then decode JSON.
fn read_reply<T: DeserializeOwned>(
    sent: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> AiResult<T> {
    let response = sent.map_err(|e| AiError::ApiError {
        status: 0,
        message: e.to_string(),
    })?;

    let status = response.status().as_u16();
    if status >= 400 {
        let message = response.into_body().read_to_string().unwrap_or_default();
        return Err(AiError::ApiError { status, message });
    }

    response
        .into_body()
        .read_json()
        .map_err(|e| AiError::ParseError(e.to_string()))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl ChatResponse {
    fn into_text(self) -> AiResult<String> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiError::ParseError("No response choices".to_string()))
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    temperature: f32,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicResponse {
    fn into_text(self) -> AiResult<String> {
        self.content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| AiError::ParseError("No text content in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("anthropic".parse::<LlmBackend>().unwrap(), LlmBackend::Anthropic);
        assert_eq!("Claude".parse::<LlmBackend>().unwrap(), LlmBackend::Anthropic);
        assert_eq!("OPENAI".parse::<LlmBackend>().unwrap(), LlmBackend::OpenAi);
        assert_eq!("ollama".parse::<LlmBackend>().unwrap(), LlmBackend::Ollama);
        assert!(matches!(
            "gemini".parse::<LlmBackend>(),
            Err(AiError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_config_model() {
        let config = AiConfig::default();
        assert_eq!(config.model(), "claude-sonnet-4-20250514");
        assert_eq!(config.max_tokens, 500);

        let config = AiConfig {
            model: Some("custom-model".to_string()),
            ..Default::default()
        };
        assert_eq!(config.model(), "custom-model");
    }

    #[test]
    fn test_from_user_config_missing_key() {
        let user = UserConfig::default();
        let err = AiClient::from_user_config(&user).err().unwrap();
        assert!(matches!(err, AiError::MissingApiKey { .. }));
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_from_user_config_disabled() {
        let mut user = UserConfig::default();
        user.ai.enabled = Some(false);
        user.ai.anthropic_api_key = Some("sk-ant-test".into());
        assert!(matches!(
            AiClient::from_user_config(&user),
            Err(AiError::Disabled)
        ));
    }

    #[test]
    fn test_from_user_config_openai() {
        let mut user = UserConfig::default();
        user.ai.backend = Some("openai".into());
        user.ai.openai_api_key = Some("sk-test".into());
        user.ai.max_tokens = Some(800);
        let client = AiClient::from_user_config(&user).unwrap();
        assert_eq!(client.backend(), LlmBackend::OpenAi);
        assert_eq!(client.model(), "gpt-4o");
        assert_eq!(client.config.max_tokens, 800);
    }

    #[test]
    fn test_chat_request_shape() {
        let body = ChatRequest {
            model: "gpt-4o",
            messages: vec![
                Message {
                    role: Role::System,
                    content: "be brief",
                },
                Message {
                    role: Role::User,
                    content: "explain",
                },
            ],
            max_tokens: 500,
            temperature: 0.3,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "explain");
    }

    #[test]
    fn test_reply_text_extraction() {
        let chat: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "Calm."}}]}"#).unwrap();
        assert_eq!(chat.into_text().unwrap(), "Calm.");
        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(empty.into_text(), Err(AiError::ParseError(_))));

        let anthropic: AnthropicResponse = serde_json::from_str(
            r#"{"content": [{"type": "thinking"}, {"type": "text", "text": "Measured."}]}"#,
        )
        .unwrap();
        assert_eq!(anthropic.into_text().unwrap(), "Measured.");
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let mut user = UserConfig::default();
        user.ai.backend = Some("ollama".into());
        user.ai.model = Some("mistral".into());
        let client = AiClient::from_user_config(&user).unwrap();
        assert_eq!(client.model(), "mistral");
    }
}
