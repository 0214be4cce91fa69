use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned http {status}")]
    Http { status: reqwest::StatusCode },

    #[error("catalog query failed: {0}")]
    Query(String),

    #[error("malformed catalog response: {0}")]
    Malformed(String),
}
