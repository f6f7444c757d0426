//! Environment-driven server configuration.

use std::net::SocketAddr;

use inkforge_gemini::DEFAULT_BASE_URL;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `STUDIO_BIND` did not parse as a socket address.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        /// The offending value.
        value: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Server configuration.
///
/// Every field has a default; `STUDIO_*` environment variables override.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Base URL of the Generative Language API.
    pub api_base_url: String,
    /// Ordered model ids for text features, most capable first.
    pub text_models: Vec<String>,
    /// Ordered model ids for image features.
    pub image_models: Vec<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            text_models: vec![
                "gemini-2.5-pro".to_string(),
                "gemini-2.5-flash".to_string(),
            ],
            image_models: vec![
                "gemini-2.5-flash-image-preview".to_string(),
                "gemini-2.0-flash-preview-image-generation".to_string(),
            ],
        }
    }
}

impl StudioConfig {
    /// Build configuration from `STUDIO_*` environment variables, falling
    /// back to defaults for anything unset.
    ///
    /// - `STUDIO_BIND`: listen address (`host:port`)
    /// - `STUDIO_API_BASE_URL`: upstream API base URL
    /// - `STUDIO_TEXT_MODELS`: comma-separated ordered model ids
    /// - `STUDIO_IMAGE_MODELS`: comma-separated ordered model ids
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("STUDIO_BIND") {
            config.bind_addr = value
                .parse()
                .map_err(|source| ConfigError::InvalidBindAddr { value, source })?;
        }
        if let Ok(value) = std::env::var("STUDIO_API_BASE_URL") {
            if !value.trim().is_empty() {
                config.api_base_url = value.trim().to_string();
            }
        }
        if let Some(models) = std::env::var("STUDIO_TEXT_MODELS")
            .ok()
            .map(|v| parse_model_list(&v))
            .filter(|m| !m.is_empty())
        {
            config.text_models = models;
        }
        if let Some(models) = std::env::var("STUDIO_IMAGE_MODELS")
            .ok()
            .map(|v| parse_model_list(&v))
            .filter(|m| !m.is_empty())
        {
            config.image_models = models;
        }

        Ok(config)
    }

    /// Replace the upstream API base URL (used by tests).
    #[must_use]
    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }
}

fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = StudioConfig::default();
        assert_eq!(config.bind_addr.port(), 8787);
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert!(!config.text_models.is_empty());
        assert!(!config.image_models.is_empty());
    }

    #[test]
    fn model_list_parsing_trims_and_drops_empties() {
        assert_eq!(
            parse_model_list(" a , b ,, c "),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(parse_model_list("  ,").is_empty());
    }
}
