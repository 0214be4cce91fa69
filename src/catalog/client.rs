use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use crate::catalog::{
    error::CatalogError,
    types::{CatalogObject, GraphqlResponse, SearchData, SlugData},
};
use crate::config::CatalogSettings;

const SEARCH_OPERATION: &str = "SearchObjectsByName";
const SEARCH_QUERY_HASH: &str = "e1c2e012a21b4a98aaa618ef1b43eb0cafe9136303274a34f5d9ea4f2446e884";
const SLUG_OPERATION: &str = "GetObjectBySlug";
const SLUG_QUERY_HASH: &str = "e8a0b931f1c950df2bac5f0291ed08fe7c5cbc519a73fd4a20dc61c4996d3b4f";
const CLIENT_NAME: &str = "kraken";
const CLIENT_VERSION: &str = "v0.90.0";

/// Client for the catalog's persisted GraphQL queries.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    api_url: String,
    site_url: String,
}

impl CatalogClient {
    pub fn new(http: Client, settings: &CatalogSettings) -> Self {
        Self {
            http,
            api_url: settings.api_url.clone(),
            site_url: settings.site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Root that relative object URLs resolve against.
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Search for game objects by name. Returns the raw hits in catalog order.
    #[instrument(skip(self))]
    pub async fn search_by_name(
        &self,
        term: &str,
        count: usize,
    ) -> Result<Vec<CatalogObject>, CatalogError> {
        let variables = json!({ "term": term, "count": count, "objectType": "Game" });
        let response: GraphqlResponse<SearchData> = self
            .query(SEARCH_OPERATION, SEARCH_QUERY_HASH, variables)
            .await?;

        let data = into_data(response)?;
        let objects = data
            .and_then(|d| d.search_objects_by_name)
            .map(|s| s.objects)
            .unwrap_or_default();
        debug!(hits = objects.len(), "catalog search returned");
        Ok(objects)
    }

    /// Look up one object by slug. `None` when the catalog has no such
    /// object.
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<CatalogObject>, CatalogError> {
        let variables = json!({ "slug": slug });
        let response: GraphqlResponse<SlugData> = self
            .query(SLUG_OPERATION, SLUG_QUERY_HASH, variables)
            .await?;

        Ok(into_data(response)?.and_then(|d| d.get_object_by_slug))
    }

    async fn query<T: DeserializeOwned>(
        &self,
        operation: &str,
        hash: &str,
        variables: serde_json::Value,
    ) -> Result<GraphqlResponse<T>, CatalogError> {
        let extensions = json!({ "persistedQuery": { "version": 1, "sha256Hash": hash } });

        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("operationName", operation.to_string()),
                ("variables", variables.to_string()),
                ("extensions", extensions.to_string()),
            ])
            .header("accept", "*/*")
            .header("content-type", "application/json")
            .header("apollographql-client-name", CLIENT_NAME)
            .header("apollographql-client-version", CLIENT_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Http { status });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| CatalogError::Malformed(e.to_string()))
    }
}

/// GraphQL reports failures in-band; only treat them as fatal when no data
/// came back with them.
fn into_data<T>(response: GraphqlResponse<T>) -> Result<Option<T>, CatalogError> {
    match response.data {
        Some(data) => Ok(Some(data)),
        None if !response.errors.is_empty() => Err(CatalogError::Query(
            response
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; "),
        )),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::GraphqlError;

    #[test]
    fn errors_without_data_fail() {
        let response: GraphqlResponse<SlugData> = GraphqlResponse {
            data: None,
            errors: vec![
                GraphqlError {
                    message: "PersistedQueryNotFound".to_string(),
                },
                GraphqlError {
                    message: "retry".to_string(),
                },
            ],
        };
        let err = into_data(response).unwrap_err();
        assert_eq!(err.to_string(), "catalog query failed: PersistedQueryNotFound; retry");
    }

    #[test]
    fn partial_data_wins_over_errors() {
        let response: GraphqlResponse<SlugData> = GraphqlResponse {
            data: Some(SlugData {
                get_object_by_slug: None,
            }),
            errors: vec![GraphqlError {
                message: "field deprecated".to_string(),
            }],
        };
        assert!(into_data(response).unwrap().is_some());
    }
}
