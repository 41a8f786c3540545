//! Configuration types for newswire.
//!
//! [`NewswireConfig`] is loaded from a TOML file. Both sections are optional
//! and every missing field falls back to its default:
//!
//! ```toml
//! [search]
//! max_results_per_source = 5
//! cache_ttl_seconds = 900
//!
//! [summary]
//! provider = "openai"
//! model = "gpt-4o-mini"
//! length = "short"
//! ```

use std::path::{Path, PathBuf};

use newswire_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{NewswireError, Result};

/// Providers that cannot run without an API key.
const KEYED_PROVIDERS: &[&str] = &["openai", "anthropic", "azure"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewswireConfig {
    /// Search aggregation settings.
    pub search: SearchConfig,
    /// LLM summarization settings.
    pub summary: SummaryConfig,
}

impl NewswireConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| NewswireError::ConfigFormat(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| NewswireError::ConfigFormat(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/newswire/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("newswire")
            .join("config.toml")
    }

    /// Validate both sections.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.summary.validate()
    }
}

/// How long a generated summary should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    /// One or two sentences.
    Short,
    /// One or two paragraphs.
    #[default]
    Medium,
    /// Two or three paragraphs.
    Long,
}

impl SummaryLength {
    /// Prompt instruction for this length.
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Short => "Provide a concise summary in 1-2 sentences.",
            Self::Medium => "Provide a comprehensive summary in 1-2 paragraphs.",
            Self::Long => "Provide a detailed summary in 2-3 paragraphs.",
        }
    }
}

/// Summarization provider and budget settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Provider name (`openai`, `anthropic`, `azure`, `local`, ...).
    pub provider: String,
    /// Model identifier passed to the provider.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// API key. When absent, `<PROVIDER>_API_KEY` is read from the environment.
    pub api_key: Option<String>,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Summary length.
    pub length: SummaryLength,
    /// Longest content, in characters, sent to the model.
    pub max_content_length: usize,
    /// Timeout for one provider HTTP request.
    pub request_timeout_seconds: u64,
    /// Timeout for fetching and extracting one page.
    pub extraction_timeout_seconds: u64,
    /// Timeout for one summary.
    pub summary_timeout_seconds: u64,
    /// Timeout for a whole batch of summaries.
    pub overall_timeout_seconds: u64,
    /// Results summarized per search unless the caller says otherwise.
    pub max_summaries: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            base_url: "https://api.openai.com".into(),
            api_key: None,
            max_tokens: 4096,
            temperature: 0.3,
            length: SummaryLength::Medium,
            max_content_length: 51_200,
            request_timeout_seconds: 60,
            extraction_timeout_seconds: 120,
            summary_timeout_seconds: 180,
            overall_timeout_seconds: 300,
            max_summaries: 5,
        }
    }
}

impl SummaryConfig {
    /// Environment variable consulted for this provider's key.
    pub fn api_key_var(&self) -> String {
        format!(
            "{}_API_KEY",
            self.provider.trim().to_uppercase().replace('-', "_")
        )
    }

    /// Resolve the API key from config or the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`NewswireError::Config`] if the provider requires a key and
    /// none is available.
    pub fn resolve_api_key(&self) -> Result<Option<String>> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// [`SummaryConfig::resolve_api_key`] with an explicit variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`SummaryConfig::resolve_api_key`].
    pub fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<String>> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(Some(key.clone()));
        }

        let provider = self.provider.trim().to_lowercase();
        if provider == "local" {
            tracing::debug!("local summarization provider, no API key required");
            return Ok(None);
        }

        let var = self.api_key_var();
        match lookup(&var).filter(|k| !k.trim().is_empty()) {
            Some(key) => Ok(Some(key)),
            None if KEYED_PROVIDERS.contains(&provider.as_str()) => Err(NewswireError::Config(
                format!("{var} is required for the {provider} provider"),
            )),
            None => {
                tracing::warn!(provider = %provider, "no API key found for summarization provider");
                Ok(None)
            }
        }
    }

    /// Validate numeric settings.
    ///
    /// # Errors
    ///
    /// Returns [`NewswireError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(NewswireError::Config("summary model must not be empty".into()));
        }
        if self.max_tokens == 0 {
            return Err(NewswireError::Config(
                "max_tokens must be greater than 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(NewswireError::Config(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.max_content_length == 0 {
            return Err(NewswireError::Config(
                "max_content_length must be greater than 0".into(),
            ));
        }
        let timeouts = [
            self.request_timeout_seconds,
            self.extraction_timeout_seconds,
            self.summary_timeout_seconds,
            self.overall_timeout_seconds,
        ];
        if timeouts.contains(&0) {
            return Err(NewswireError::Config(
                "summary timeouts must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
