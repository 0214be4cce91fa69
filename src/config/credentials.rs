use std::env;

use crate::config::{ConfigError, ProviderKind};

/// Looks up an environment variable by name. Abstracted so callers (and
/// tests) can substitute the process environment.
pub trait EnvLookup {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

impl<F> EnvLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Resolve an API key: explicit argument, then configuration, then the
/// provider's environment variable. Blank values count as absent.
pub fn resolve_api_key(
    explicit: Option<&str>,
    configured: &str,
    provider: ProviderKind,
    env: &dyn EnvLookup,
) -> Result<String, ConfigError> {
    explicit
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| Some(configured.trim()).filter(|k| !k.is_empty()).map(str::to_string))
        .or_else(|| {
            env.var(provider.api_key_env())
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        })
        .ok_or(ConfigError::MissingCredential {
            provider,
            env_var: provider.api_key_env(),
        })
}
