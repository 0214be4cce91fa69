use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request to language model failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("language model returned http {status}")]
    Http { status: reqwest::StatusCode },

    #[error("language model reported an error ({status}): {message}")]
    Provider {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("completion response has no choices")]
    NoChoices,
}
