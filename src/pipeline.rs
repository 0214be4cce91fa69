//! Query → canonical name → candidate → detail record.

use tracing::{info, instrument, warn};

use crate::catalog::CatalogClient;
use crate::config::{ChatRole, ConfigError, EnvLookup, Overrides, Settings};
use crate::error::PipelineError;
use crate::extractor::{DetailExtractor, GameRecord};
use crate::fetcher::{PageFetcher, build_http_client};
use crate::llm::{ChatClient, LanguageModel};
use crate::resolver::NameResolver;
use crate::search::{CandidateSearcher, CandidateSelector, SearchCandidate};

pub struct Pipeline {
    resolver: NameResolver<Box<dyn LanguageModel>>,
    searcher: CandidateSearcher,
    selector: Box<dyn CandidateSelector>,
    extractor: DetailExtractor,
}

impl Pipeline {
    pub fn new(
        resolver: NameResolver<Box<dyn LanguageModel>>,
        searcher: CandidateSearcher,
        selector: Box<dyn CandidateSelector>,
        extractor: DetailExtractor,
    ) -> Self {
        Self {
            resolver,
            searcher,
            selector,
            extractor,
        }
    }

    /// Wire every stage from settings over one shared HTTP client.
    ///
    /// A missing credential for the detail-extraction model only disables the
    /// assisted strategy; any other configuration problem is fatal.
    pub fn from_settings(
        settings: &Settings,
        overrides: &Overrides,
        env: &dyn EnvLookup,
        selector: Box<dyn CandidateSelector>,
    ) -> Result<Self, PipelineError> {
        let http = build_http_client(&settings.http)
            .map_err(|e| PipelineError::Transport(format!("failed to build HTTP client: {e}")))?;

        let search_model =
            ChatClient::from_settings(http.clone(), settings, ChatRole::NameSearch, overrides, env)?;
        info!(
            provider = %search_model.provider().kind(),
            model = search_model.model(),
            "name resolution model"
        );
        let search_model: Box<dyn LanguageModel> = Box::new(search_model);

        let assistant: Option<Box<dyn LanguageModel>> = match ChatClient::from_settings(
            http.clone(),
            settings,
            ChatRole::DetailExtraction,
            overrides,
            env,
        ) {
            Ok(client) => Some(Box::new(client)),
            Err(err @ ConfigError::MissingCredential { .. }) => {
                warn!(error = %err, "assisted extraction unavailable");
                None
            }
            Err(err) => return Err(err.into()),
        };

        let catalog = CatalogClient::new(http.clone(), &settings.catalog);
        let fetcher = PageFetcher::new(http, &settings.reader);

        Ok(Self::new(
            NameResolver::new(search_model),
            CandidateSearcher::new(catalog.clone(), settings.search.max_results),
            selector,
            DetailExtractor::new(catalog, fetcher, assistant, settings.extraction.method),
        ))
    }

    /// Run every stage once, in order. The first failing stage ends the run
    /// and no partial record is produced.
    #[instrument(skip(self))]
    pub async fn run(&self, query: &str) -> Result<GameRecord, PipelineError> {
        let guess = self.resolver.resolve(query).await?;
        let candidates = self.searcher.search(&guess).await?;
        let chosen = pick(self.selector.as_ref(), &candidates)?;
        info!(name = %chosen.name, detail_ref = %chosen.detail_ref, "selected candidate");

        let record = self.extractor.extract(&chosen.detail_ref).await?;
        Ok(record.with_names(query, &guess.text))
    }
}

/// A single candidate is taken as-is; otherwise the selector decides.
fn pick<'a>(
    selector: &dyn CandidateSelector,
    candidates: &'a [SearchCandidate],
) -> Result<&'a SearchCandidate, PipelineError> {
    if let [only] = candidates {
        return Ok(only);
    }

    let index = selector
        .choose(candidates)
        .map_err(|e| PipelineError::Selection(e.to_string()))?;
    candidates.get(index).ok_or_else(|| {
        PipelineError::Selection(format!(
            "index {index} is out of range for {} candidates",
            candidates.len()
        ))
    })
}
