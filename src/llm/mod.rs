//! Chat-completion access for the OpenAI-compatible, Azure-compatible and
//! custom-HTTP provider families.
//!
//! The provider is resolved once from [`Settings`](crate::config::Settings)
//! into a [`Provider`] value; calls dispatch on that value and never look at
//! the configuration again.

pub mod client;
pub mod error;
pub mod provider;

use async_trait::async_trait;

pub use client::ChatClient;
pub use error::LlmError;
pub use provider::Provider;

/// A language model that answers one system + user prompt pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        (**self).complete(system_prompt, user_prompt).await
    }
}
