//! Service configuration parsed from environment variables.
//!
//! Built once in `main` and handed to the upstream client constructors, so
//! nothing downstream reads the process environment on its own.

use crate::credential;

pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_PERPLEXITY_MODEL: &str = "sonar";
pub const DEFAULT_SEARCH_MAX_RESULTS: u32 = 5;
pub const DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PORT: u16 = 3000;

pub const TAVILY_API_KEY_VAR: &str = "TAVILY_API_KEY";
pub const PERPLEXITY_API_KEY_VAR: &str = "PERPLEXITY_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for UpstreamTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_results: u32,
    pub timeouts: UpstreamTimeouts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeouts: UpstreamTimeouts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub completion: CompletionConfig,
    pub legacy_status_codes: bool,
    pub port: u16,
}

/// Which provider credentials were configured at startup. Carries at most a
/// four-character preview of each key, never the key itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialStatus {
    pub tavily_key_set: bool,
    pub perplexity_key_set: bool,
    pub tavily_key_length: usize,
    pub perplexity_key_length: usize,
    pub tavily_key_preview: String,
    pub perplexity_key_preview: String,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional (all of them):
    /// - `TAVILY_API_KEY`, `PERPLEXITY_API_KEY`: provider keys, normalized
    /// - `TAVILY_BASE_URL`, `PERPLEXITY_BASE_URL`: endpoint overrides
    /// - `PERPLEXITY_MODEL`: default `sonar`
    /// - `SEARCH_MAX_RESULTS`: default 5
    /// - `UPSTREAM_REQUEST_TIMEOUT_SECS` / `UPSTREAM_CONNECT_TIMEOUT_SECS`: 30 / 10
    /// - `LEGACY_STATUS_CODES`: uniform 500 on every failure when true
    /// - `PORT`: default 3000
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Used by tests to inject
    /// fake credentials without touching the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timeouts = UpstreamTimeouts {
            request_secs: parse_or(&lookup, "UPSTREAM_REQUEST_TIMEOUT_SECS", DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_or(&lookup, "UPSTREAM_CONNECT_TIMEOUT_SECS", DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS)?,
        };

        let search = SearchConfig {
            api_key: credential::normalize_opt(lookup(TAVILY_API_KEY_VAR).as_deref()),
            base_url: base_url(&lookup, "TAVILY_BASE_URL", DEFAULT_TAVILY_BASE_URL),
            max_results: parse_or(&lookup, "SEARCH_MAX_RESULTS", DEFAULT_SEARCH_MAX_RESULTS)?,
            timeouts,
        };

        let completion = CompletionConfig {
            api_key: credential::normalize_opt(lookup(PERPLEXITY_API_KEY_VAR).as_deref()),
            base_url: base_url(&lookup, "PERPLEXITY_BASE_URL", DEFAULT_PERPLEXITY_BASE_URL),
            model: lookup("PERPLEXITY_MODEL")
                .map(|m| m.trim().to_owned())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_PERPLEXITY_MODEL.to_owned()),
            timeouts,
        };

        let legacy_status_codes = match lookup("LEGACY_STATUS_CODES") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "LEGACY_STATUS_CODES", value: raw })?,
            None => false,
        };

        Ok(Self { search, completion, legacy_status_codes, port: parse_or(&lookup, "PORT", DEFAULT_PORT)? })
    }

    #[must_use]
    pub fn credential_status(&self) -> CredentialStatus {
        let tavily = self.search.api_key.as_deref();
        let perplexity = self.completion.api_key.as_deref();
        CredentialStatus {
            tavily_key_set: tavily.is_some(),
            perplexity_key_set: perplexity.is_some(),
            tavily_key_length: tavily.map_or(0, str::len),
            perplexity_key_length: perplexity.map_or(0, str::len),
            tavily_key_preview: credential::preview(tavily),
            perplexity_key_preview: credential::preview(perplexity),
        }
    }
}

fn base_url(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
        .trim_end_matches('/')
        .to_owned()
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => Err(ConfigError::Invalid { key, value: raw }),
        },
        None => Ok(default),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
