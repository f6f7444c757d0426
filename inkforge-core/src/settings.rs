//! Generation settings.

use serde::{Deserialize, Serialize};

/// Sampling and length controls for a generation request.
///
/// All fields are optional; unset fields are omitted from the upstream
/// request so the model's own defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Sampling temperature (0.0 to 2.0 typically).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Maximum output tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u64>,

    /// Top-p (nucleus) sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// Top-k sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u64>,

    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl GenerationSettings {
    /// Create empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature.
    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set max output tokens.
    #[must_use]
    pub fn max_output_tokens(mut self, tokens: u64) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Set top-p.
    #[must_use]
    pub fn top_p(mut self, p: f64) -> Self {
        self.top_p = Some(p);
        self
    }

    /// Set top-k.
    #[must_use]
    pub fn top_k(mut self, k: u64) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Add a stop sequence.
    #[must_use]
    pub fn add_stop(mut self, sequence: impl Into<String>) -> Self {
        self.stop.get_or_insert_with(Vec::new).push(sequence.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let settings = GenerationSettings::new()
            .temperature(0.9)
            .max_output_tokens(4096)
            .top_p(0.95)
            .add_stop("END");

        assert_eq!(settings.temperature, Some(0.9));
        assert_eq!(settings.max_output_tokens, Some(4096));
        assert_eq!(settings.stop.as_deref(), Some(&["END".to_string()][..]));
    }

    #[test]
    fn test_serialize_skips_unset() {
        let settings = GenerationSettings::new().temperature(0.5);
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json, serde_json::json!({ "temperature": 0.5 }));
    }
}
