pub mod client;
pub mod errors;
pub mod pipeline;
pub mod reader;
pub mod types;

pub use client::{PageFetcher, build_http_client};
pub use errors::FetchError;
pub use types::{ContentKind, PageResponse};
