//! Configuration handling for the resolver.
//!
//! Settings are layered with the `config` crate: built-in defaults, then a
//! JSON file, then `GAME_RECORD__`-prefixed environment variables. The
//! resulting [`Settings`] value is built once at process start and handed by
//! reference to each component constructor.

pub mod credentials;

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use config::{Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

use crate::extractor::ExtractionMethod;

pub use credentials::{EnvLookup, ProcessEnv, resolve_api_key};

/// Prefix for environment overrides, e.g. `GAME_RECORD__LLM__PROVIDER`.
pub const ENV_PREFIX: &str = "GAME_RECORD";
/// Configuration file read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_MAX_RESULTS: usize = 20;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_AZURE_API_VERSION: &str = "2023-05-15";
pub const DEFAULT_CATALOG_API_URL: &str = "https://mollusk.apis.ign.com/graphql";
pub const DEFAULT_CATALOG_SITE_URL: &str = "https://www.ign.com";
pub const DEFAULT_READER_BASE_URL: &str = "https://r.jina.ai/";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Language-model provider families supported behind one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Azure,
    Custom,
}

impl ProviderKind {
    /// Environment variable consulted when no key is configured.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Azure => "AZURE_OPENAI_API_KEY",
            Self::Custom => "CUSTOM_LLM_API_KEY",
        }
    }

    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("gpt-3.5-turbo"),
            Self::Azure => Some("gpt-35-turbo"),
            Self::Custom => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Azure => "azure",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "azure" => Ok(Self::Azure),
            // Volcano Engine's Ark endpoint speaks the plain chat-completions format.
            "custom" | "huoshan" => Ok(Self::Custom),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which chat section a client is built from. Only the token budget default
/// differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    NameSearch,
    DetailExtraction,
}

impl ChatRole {
    pub fn default_max_tokens(&self) -> u32 {
        match self {
            Self::NameSearch => 150,
            Self::DetailExtraction => 1000,
        }
    }
}

/// How the pipeline picks one candidate among several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    #[default]
    Auto,
    Interactive,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub catalog: CatalogSettings,
    pub reader: ReaderSettings,
    pub extraction: ExtractionSettings,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: String,
    pub search: ChatSection,
    pub api: ChatSection,
    pub azure: AzureSettings,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi.name().to_string(),
            search: ChatSection::default(),
            api: ChatSection::default(),
            azure: AzureSettings::default(),
        }
    }
}

/// One chat-completion configuration block (`llm.search` or `llm.api`).
///
/// Empty strings mean "not configured"; numeric fields fall back to
/// role-specific defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatSection {
    /// Overrides `llm.provider` for this section when non-empty.
    pub provider: String,
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AzureSettings {
    pub api_version: String,
    pub endpoint: String,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            endpoint: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub max_results: usize,
    pub selection: SelectionPolicy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            selection: SelectionPolicy::Auto,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub api_url: String,
    pub site_url: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_CATALOG_API_URL.to_string(),
            site_url: DEFAULT_CATALOG_SITE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    /// Prefix the page URL is appended to. Empty renders pages locally.
    pub base_url: String,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_READER_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub method: ExtractionMethod,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Values passed explicitly on the command line. They take precedence over
/// the name-resolution section of the file configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
}

impl Settings {
    /// Load settings from `path` (required) or `config.json` in the working
    /// directory (optional), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Json).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Json).required(false),
        };

        let settings: Settings = config::Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON document, without file or environment
    /// layering.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = config::Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.max_results",
                reason: "must be at least 1".to_string(),
            });
        }
        for (field, section) in [
            ("llm.search.temperature", &self.llm.search),
            ("llm.api.temperature", &self.llm.api),
        ] {
            if let Some(t) = section.temperature
                && !(0.0..=2.0).contains(&t)
            {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{t} is outside 0.0..=2.0"),
                });
            }
        }
        Ok(())
    }

    /// Provider kind for a chat role. The extraction section may name its
    /// own provider; otherwise both roles share `llm.provider`.
    pub fn provider_for(&self, role: ChatRole) -> Result<ProviderKind, ConfigError> {
        let section = self.chat_section(role);
        if !section.provider.trim().is_empty() {
            return section.provider.parse();
        }
        self.llm.provider.parse()
    }

    pub fn chat_section(&self, role: ChatRole) -> &ChatSection {
        match role {
            ChatRole::NameSearch => &self.llm.search,
            ChatRole::DetailExtraction => &self.llm.api,
        }
    }
}

/// Errors that can occur while building a configuration or resolving a
/// provider from it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no API key for provider '{provider}': pass --api-key, set it in the config file, or export {env_var}")]
    MissingCredential {
        provider: ProviderKind,
        env_var: &'static str,
    },

    #[error("unsupported LLM provider: '{0}'")]
    UnsupportedProvider(String),

    #[error("provider '{0}' needs an endpoint (api_base or llm.azure.endpoint)")]
    MissingEndpoint(ProviderKind),

    #[error("provider '{0}' has no default model; set one in the config file")]
    MissingModel(ProviderKind),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
