pub mod catalog;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod llm;
pub mod pipeline;
pub mod resolver;
pub mod search;

pub use error::{ErrorKind, PipelineError};
pub use extractor::{ExtractionMethod, GameRecord};
pub use pipeline::Pipeline;
