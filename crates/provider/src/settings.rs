//! Provider settings resolution.
//!
//! Settings are resolved once at the start of each generation run into
//! an immutable value passed down the pipeline — never re-queried
//! mid-run. Missing or placeholder credentials are a user-actionable
//! configuration error detected before any provider call.

use crate::error::ProviderError;

/// Values that indicate an unconfigured API key rather than a real one.
const PLACEHOLDER_KEYS: &[&str] = &["", "changeme", "your-api-key", "xxx", "todo"];

/// Immutable provider configuration for one generation run.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base URL of the AI gateway, e.g. `https://gateway.internal`.
    pub base_url: String,
    pub api_key: String,
    /// Model used for prompt enrichment.
    pub text_model: String,
    /// Model used for image generation and editing.
    pub image_model: String,
    /// Model used for consistency analysis.
    pub analysis_model: String,
}

impl ProviderSettings {
    /// Resolve settings from environment variables.
    ///
    /// | Env Var                  | Default                     |
    /// |--------------------------|-----------------------------|
    /// | `AI_GATEWAY_URL`         | `http://localhost:8700`     |
    /// | `AI_GATEWAY_API_KEY`     | (required)                  |
    /// | `AI_TEXT_MODEL`          | `scribe-2`                  |
    /// | `AI_IMAGE_MODEL`         | `atelier-xl`                |
    /// | `AI_ANALYSIS_MODEL`      | `inspector-1`               |
    pub fn resolve() -> Result<Self, ProviderError> {
        let base_url =
            std::env::var("AI_GATEWAY_URL").unwrap_or_else(|_| "http://localhost:8700".into());
        let api_key = std::env::var("AI_GATEWAY_API_KEY").unwrap_or_default();

        if is_placeholder_key(&api_key) {
            return Err(ProviderError::Configuration(
                "AI_GATEWAY_API_KEY is not configured. Set a real API key before \
                 generating scenes."
                    .to_string(),
            ));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            text_model: std::env::var("AI_TEXT_MODEL").unwrap_or_else(|_| "scribe-2".into()),
            image_model: std::env::var("AI_IMAGE_MODEL").unwrap_or_else(|_| "atelier-xl".into()),
            analysis_model: std::env::var("AI_ANALYSIS_MODEL")
                .unwrap_or_else(|_| "inspector-1".into()),
        })
    }
}

/// Whether an API key value is a placeholder rather than a credential.
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    PLACEHOLDER_KEYS
        .iter()
        .any(|p| key.eq_ignore_ascii_case(p))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_keys_are_rejected() {
        assert!(is_placeholder_key(""));
        assert!(is_placeholder_key("  "));
        assert!(is_placeholder_key("changeme"));
        assert!(is_placeholder_key("CHANGEME"));
        assert!(is_placeholder_key("your-api-key"));
    }

    #[test]
    fn real_keys_are_accepted() {
        assert!(!is_placeholder_key("sk-live-3f9a"));
        assert!(!is_placeholder_key("gateway-key-1"));
    }
}
