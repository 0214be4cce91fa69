//! The failure taxonomy surfaced by the pipeline. Module errors fold into
//! [`PipelineError`] at stage boundaries.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::fetcher::FetchError;
use crate::llm::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Transport,
    Parse,
    NotFound,
    Selection,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("candidate selection failed: {0}")]
    Selection(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Parse(_) => ErrorKind::Parse,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Selection(_) => ErrorKind::Selection,
        }
    }
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Transport(_) | LlmError::Http { .. } | LlmError::Provider { .. } => {
                Self::Transport(err.to_string())
            }
            LlmError::Malformed(_) | LlmError::NoChoices => Self::Parse(err.to_string()),
        }
    }
}

impl From<CatalogError> for PipelineError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Transport(_) | CatalogError::Http { .. } | CatalogError::Query(_) => {
                Self::Transport(err.to_string())
            }
            CatalogError::Malformed(_) => Self::Parse(err.to_string()),
        }
    }
}

impl From<FetchError> for PipelineError {
    fn from(err: FetchError) -> Self {
        if err.is_transport() {
            Self::Transport(err.to_string())
        } else {
            Self::Parse(err.to_string())
        }
    }
}
