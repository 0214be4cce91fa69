//! Detail extraction: a chain of strategies tried in order until one
//! produces a record.

pub mod assisted;
pub mod heuristic;
pub mod model;
pub mod structured;

#[cfg(test)]
mod tests;

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};

pub use model::{GameRecord, PartialRecord, Platforms};

use crate::catalog::CatalogClient;
use crate::error::PipelineError;
use crate::fetcher::PageFetcher;
use crate::llm::LanguageModel;

static SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/games/([^/?#]+)").unwrap());

/// Which strategy order to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Catalog first, then the language model, then the raw page.
    #[default]
    Standard,
    /// Language model first, then the raw page.
    Assisted,
    /// Raw page first.
    Heuristic,
}

impl ExtractionMethod {
    pub fn strategies(self) -> &'static [Strategy] {
        match self {
            Self::Standard => &[Strategy::Structured, Strategy::Assisted, Strategy::Heuristic],
            Self::Assisted => &[Strategy::Assisted, Strategy::Heuristic],
            Self::Heuristic => &[Strategy::Heuristic, Strategy::Structured, Strategy::Assisted],
        }
    }
}

impl FromStr for ExtractionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "assisted" => Ok(Self::Assisted),
            "heuristic" => Ok(Self::Heuristic),
            other => Err(format!(
                "unknown extraction method '{other}' (expected standard, assisted or heuristic)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Structured,
    Assisted,
    Heuristic,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Structured => "structured",
            Self::Assisted => "assisted",
            Self::Heuristic => "heuristic",
        })
    }
}

/// Slug segment of a `/games/<slug>` detail reference.
pub fn slug_from_ref(detail_ref: &str) -> Option<&str> {
    SLUG.captures(detail_ref)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub struct DetailExtractor {
    catalog: CatalogClient,
    fetcher: PageFetcher,
    assistant: Option<Box<dyn LanguageModel>>,
    method: ExtractionMethod,
}

impl DetailExtractor {
    /// `assistant` is `None` when no model is configured for detail
    /// extraction; the assisted strategy is then skipped.
    pub fn new(
        catalog: CatalogClient,
        fetcher: PageFetcher,
        assistant: Option<Box<dyn LanguageModel>>,
        method: ExtractionMethod,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            assistant,
            method,
        }
    }

    /// Build a complete record for `detail_ref`. Missing fields are filled
    /// with sentinels; the record's URL is always `detail_ref`. Fails only
    /// when every strategy fails, with the last strategy's error.
    #[instrument(skip(self), fields(method = ?self.method))]
    pub async fn extract(&self, detail_ref: &str) -> Result<GameRecord, PipelineError> {
        let mut last_error = None;

        for &strategy in self.method.strategies() {
            if strategy == Strategy::Assisted && self.assistant.is_none() {
                debug!("no detail-extraction model configured, skipping assisted strategy");
                continue;
            }

            match self.run(strategy, detail_ref).await {
                Ok(partial) => {
                    info!(%strategy, "extracted details");
                    return Ok(partial.into_record(detail_ref));
                }
                Err(err) => {
                    warn!(%strategy, error = %err, "extraction strategy failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PipelineError::NotFound(format!("no extraction strategy available for '{detail_ref}'"))
        }))
    }

    async fn run(&self, strategy: Strategy, detail_ref: &str) -> Result<PartialRecord, PipelineError> {
        match strategy {
            Strategy::Structured => self.structured(detail_ref).await,
            Strategy::Assisted => self.assisted(detail_ref).await,
            Strategy::Heuristic => self.heuristic(detail_ref).await,
        }
    }

    async fn structured(&self, detail_ref: &str) -> Result<PartialRecord, PipelineError> {
        let slug = slug_from_ref(detail_ref).ok_or_else(|| {
            PipelineError::Parse(format!("no slug in detail reference '{detail_ref}'"))
        })?;

        let object = self
            .catalog
            .get_by_slug(slug)
            .await?
            .filter(|object| object.name().is_some())
            .ok_or_else(|| PipelineError::NotFound(format!("catalog has no object for slug '{slug}'")))?;

        Ok(structured::from_object(&object))
    }

    async fn assisted(&self, detail_ref: &str) -> Result<PartialRecord, PipelineError> {
        let Some(assistant) = self.assistant.as_deref() else {
            return Err(PipelineError::NotFound("no detail-extraction model".to_string()));
        };

        let page = self.fetcher.fetch_reader_formatted(detail_ref).await?;
        debug!(chars = page.chars().count(), "reader rendering fetched");

        let answer = assistant
            .complete(assisted::SYSTEM_PROMPT, &assisted::user_prompt(&page))
            .await?;
        assisted::parse_answer(&answer)
    }

    async fn heuristic(&self, detail_ref: &str) -> Result<PartialRecord, PipelineError> {
        let page = self.fetcher.fetch(detail_ref).await?;
        Ok(heuristic::extract(&page.body_utf8))
    }
}
