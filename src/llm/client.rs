use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::{
    ChatRole, ConfigError, DEFAULT_TEMPERATURE, EnvLookup, Overrides, Settings, resolve_api_key,
};
use crate::llm::{LanguageModel, LlmError, Provider};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// A chat-completion client bound to one provider, model and sampling
/// configuration.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    provider: Provider,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatClient {
    pub fn new(
        http: Client,
        provider: Provider,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            http,
            provider,
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Build the client for `role` from settings. Explicit overrides are
    /// applied to the name-search role only.
    pub fn from_settings(
        http: Client,
        settings: &Settings,
        role: ChatRole,
        overrides: &Overrides,
        env: &dyn EnvLookup,
    ) -> Result<Self, ConfigError> {
        let kind = settings.provider_for(role)?;
        let section = settings.chat_section(role);
        let overrides = match role {
            ChatRole::NameSearch => overrides.clone(),
            ChatRole::DetailExtraction => Overrides::default(),
        };

        let api_key = resolve_api_key(overrides.api_key.as_deref(), &section.api_key, kind, env)?;
        let api_base = overrides.api_base.as_deref().unwrap_or(&section.api_base);
        let provider = Provider::resolve(kind, api_base, settings)?;

        let model = overrides
            .model
            .filter(|m| !m.trim().is_empty())
            .or_else(|| Some(section.model.trim().to_string()).filter(|m| !m.is_empty()))
            .or_else(|| kind.default_model().map(str::to_string))
            .ok_or(ConfigError::MissingModel(kind))?;

        Ok(Self::new(
            http,
            provider,
            api_key,
            model,
            section.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            section.max_tokens.unwrap_or(role.default_max_tokens()),
        ))
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for ChatClient {
    #[instrument(skip_all, fields(provider = %self.provider.kind(), model = %self.model))]
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(prompt_len = user_prompt.len(), "sending completion request");
        let response = self
            .provider
            .request(&self.http, &self.model, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
                Ok(envelope) => {
                    warn!(%status, "provider reported an error");
                    LlmError::Provider {
                        status,
                        message: envelope.error.message,
                    }
                }
                Err(_) => LlmError::Http { status },
            });
        }

        let parsed: ChatResponse =
            serde_json::from_slice(&bytes).map_err(|e| LlmError::Malformed(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::NoChoices)?
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| LlmError::Malformed("first choice has no message content".to_string()))?;

        Ok(content.trim().to_string())
    }
}
