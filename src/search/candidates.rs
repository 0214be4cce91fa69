use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::catalog::{CatalogClient, CatalogObject};
use crate::error::PipelineError;
use crate::extractor::model::Platforms;
use crate::resolver::CanonicalNameGuess;
use crate::search::similarity::similarity;

/// One catalog hit under consideration as the canonical match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchCandidate {
    pub name: String,
    /// Absolute detail-page URL.
    pub detail_ref: String,
    pub similarity: f64,
    pub release_date: Option<String>,
    pub platforms: Platforms,
}

impl SearchCandidate {
    /// Map a raw hit. Hits without a name or a usable reference are dropped.
    pub fn from_object(guess: &str, object: &CatalogObject, site_url: &str) -> Option<Self> {
        let name = object.name()?;
        let detail_ref = object.detail_url(site_url)?;
        Some(Self {
            name: name.to_string(),
            detail_ref,
            similarity: similarity(guess, name),
            release_date: object.first_release_date().map(str::to_string),
            platforms: object.platforms(),
        })
    }
}

/// Ranks catalog hits for a name guess.
#[derive(Debug, Clone)]
pub struct CandidateSearcher {
    catalog: CatalogClient,
    max_results: usize,
}

impl CandidateSearcher {
    pub fn new(catalog: CatalogClient, max_results: usize) -> Self {
        Self {
            catalog,
            max_results,
        }
    }

    /// Query the catalog once and return candidates sorted by similarity,
    /// best first. Fails with `NotFound` when nothing usable comes back.
    #[instrument(skip(self), fields(guess = %guess.text))]
    pub async fn search(
        &self,
        guess: &CanonicalNameGuess,
    ) -> Result<Vec<SearchCandidate>, PipelineError> {
        let objects = self
            .catalog
            .search_by_name(&guess.text, self.max_results)
            .await?;

        let candidates = rank(&guess.text, &objects, self.catalog.site_url());
        if candidates.is_empty() {
            return Err(PipelineError::NotFound(format!(
                "no catalog entry found for '{}'",
                guess.text
            )));
        }

        info!(
            count = candidates.len(),
            top = %candidates[0].name,
            similarity = candidates[0].similarity,
            "ranked search candidates"
        );
        Ok(candidates)
    }
}

/// Map hits to candidates and sort by similarity descending. The sort is
/// stable, so ties keep catalog order.
pub fn rank(guess: &str, objects: &[CatalogObject], site_url: &str) -> Vec<SearchCandidate> {
    let mut candidates: Vec<SearchCandidate> = objects
        .iter()
        .filter_map(|o| {
            let candidate = SearchCandidate::from_object(guess, o, site_url);
            if candidate.is_none() {
                debug!(slug = ?o.slug, "skipping hit without name or reference");
            }
            candidate
        })
        .collect();

    candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    candidates
}
