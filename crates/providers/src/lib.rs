//! LLM Provider implementations for Folio.
//!
//! All providers implement the `folio_core::Provider` trait. Every supported
//! backend speaks the OpenAI chat-completions dialect; Gemini is the default.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use folio_config::AppConfig;
use folio_core::error::ProviderError;
use folio_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured provider.
///
/// Fails with `NotConfigured` when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .require_api_key()
        .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;

    let provider = OpenAiCompatProvider::with_timeout(
        &config.provider.name,
        &config.provider.base_url,
        api_key,
        Duration::from_secs(config.provider.timeout_secs),
    )?;

    tracing::debug!(
        provider = %config.provider.name,
        base_url = %config.provider.base_url,
        model = %config.provider.model,
        "Provider configured"
    );

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_key_is_not_configured() {
        let config = AppConfig::default();
        assert!(matches!(
            build_from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn build_with_key_uses_configured_name() {
        let config = AppConfig {
            api_key: Some("test-key".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "gemini");
    }
}
