//! LLM-backed narrative explanations
//!
//! Turns an already-computed credibility verdict into a short prose analysis.
//! Uses BYOK (bring your own key): API keys come from the user config or
//! environment variables. When no backend is configured, or a call fails, a
//! deterministic template narrative is used instead.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY`: Anthropic backend (default)
//! - `OPENAI_API_KEY`: OpenAI backend
//! - `OLLAMA_MODEL`: model for a local Ollama server (no key needed)

mod client;
mod narrator;
mod prompts;

pub use client::{AiClient, AiConfig, LlmBackend};
pub use narrator::{narrate_with_fallback, LlmNarrator, NarrativeContext, Narrator, TemplateNarrator};
pub use prompts::{sanitize_text, ExplanationPromptBuilder};

use thiserror::Error;

/// Errors that can occur in the AI module
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("Unknown LLM backend '{0}'. Valid backends: anthropic, openai, ollama")]
    UnknownBackend(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("AI narration disabled")]
    Disabled,
}

pub type AiResult<T> = Result<T, AiError>;
