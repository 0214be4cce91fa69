use reqwest::{Client, RequestBuilder};

use crate::config::{ConfigError, ProviderKind, Settings};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// A fully resolved provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// `{api_base}/chat/completions` with a bearer token.
    OpenAi { api_base: String },
    /// `{endpoint}/openai/deployments/{deployment}/chat/completions` with an
    /// `api-key` header.
    Azure { endpoint: String, api_version: String },
    /// A complete chat-completions URL taking a bearer token.
    Custom { url: String },
}

impl Provider {
    /// Resolve the endpoint for `kind` from the settings. `api_base` is the
    /// section's base URL after explicit overrides.
    pub fn resolve(
        kind: ProviderKind,
        api_base: &str,
        settings: &Settings,
    ) -> Result<Self, ConfigError> {
        let api_base = api_base.trim().trim_end_matches('/');
        match kind {
            ProviderKind::OpenAi => Ok(Self::OpenAi {
                api_base: if api_base.is_empty() {
                    OPENAI_API_BASE.to_string()
                } else {
                    api_base.to_string()
                },
            }),
            ProviderKind::Azure => {
                let endpoint = settings.llm.azure.endpoint.trim().trim_end_matches('/');
                let endpoint = if endpoint.is_empty() { api_base } else { endpoint };
                if endpoint.is_empty() {
                    return Err(ConfigError::MissingEndpoint(kind));
                }
                Ok(Self::Azure {
                    endpoint: endpoint.to_string(),
                    api_version: settings.llm.azure.api_version.clone(),
                })
            }
            ProviderKind::Custom => {
                if api_base.is_empty() {
                    return Err(ConfigError::MissingEndpoint(kind));
                }
                Ok(Self::Custom {
                    url: api_base.to_string(),
                })
            }
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::OpenAi { .. } => ProviderKind::OpenAi,
            Self::Azure { .. } => ProviderKind::Azure,
            Self::Custom { .. } => ProviderKind::Custom,
        }
    }

    /// Start a completion request against this provider, authenticated with
    /// `api_key`. For Azure the model names the deployment.
    pub fn request(&self, http: &Client, model: &str, api_key: &str) -> RequestBuilder {
        match self {
            Self::OpenAi { api_base } => http
                .post(format!("{api_base}/chat/completions"))
                .bearer_auth(api_key),
            Self::Azure {
                endpoint,
                api_version,
            } => http
                .post(format!(
                    "{endpoint}/openai/deployments/{model}/chat/completions"
                ))
                .query(&[("api-version", api_version.as_str())])
                .header("api-key", api_key),
            Self::Custom { url } => http.post(url.as_str()).bearer_auth(api_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_defaults_to_public_endpoint() {
        let provider = Provider::resolve(ProviderKind::OpenAi, "", &Settings::default()).unwrap();
        assert_eq!(
            provider,
            Provider::OpenAi {
                api_base: OPENAI_API_BASE.to_string()
            }
        );
    }

    #[test]
    fn azure_prefers_configured_endpoint() {
        let mut settings = Settings::default();
        settings.llm.azure.endpoint = "https://games.openai.azure.com/".to_string();
        let provider =
            Provider::resolve(ProviderKind::Azure, "https://ignored.example", &settings).unwrap();
        assert_eq!(
            provider,
            Provider::Azure {
                endpoint: "https://games.openai.azure.com".to_string(),
                api_version: "2023-05-15".to_string(),
            }
        );
    }

    #[test]
    fn azure_falls_back_to_api_base() {
        let provider =
            Provider::resolve(ProviderKind::Azure, "https://base.example", &Settings::default())
                .unwrap();
        assert!(matches!(provider, Provider::Azure { endpoint, .. } if endpoint == "https://base.example"));
    }

    #[test]
    fn endpointless_providers_are_config_errors() {
        let settings = Settings::default();
        assert!(matches!(
            Provider::resolve(ProviderKind::Azure, "", &settings),
            Err(ConfigError::MissingEndpoint(ProviderKind::Azure))
        ));
        assert!(matches!(
            Provider::resolve(ProviderKind::Custom, " ", &settings),
            Err(ConfigError::MissingEndpoint(ProviderKind::Custom))
        ));
    }

    #[test]
    fn request_urls_follow_provider_shape() {
        let http = Client::new();
        let azure = Provider::Azure {
            endpoint: "https://games.openai.azure.com".to_string(),
            api_version: "2024-02-01".to_string(),
        };
        let request = azure.request(&http, "gpt-35-turbo", "k").build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://games.openai.azure.com/openai/deployments/gpt-35-turbo/chat/completions?api-version=2024-02-01"
        );
        assert_eq!(request.headers()["api-key"], "k");

        let custom = Provider::Custom {
            url: "https://llm.example/api/v3/chat/completions".to_string(),
        };
        let request = custom.request(&http, "m", "secret").build().unwrap();
        assert_eq!(request.url().as_str(), "https://llm.example/api/v3/chat/completions");
        assert_eq!(request.headers()["authorization"], "Bearer secret");
    }
}
