use chat_provider::{ModelProvider, ProviderError};
use chat_provider_openrouter::{OpenRouterProvider, OpenRouterProviderConfig};
use serde_json::Value;

use crate::config::EnvConfig;
use crate::credentials::read_api_key;
use crate::error::AppError;

mod mock;
mod openrouter;

pub use chat_provider_mock::MOCK_PROVIDER_ID;
pub use chat_provider_openrouter::OPENROUTER_PROVIDER_ID;

pub const DEFAULT_PROVIDER_ID: &str = OPENROUTER_PROVIDER_ID;

/// A model provider that can also list the models it serves.
pub trait ChatBackend: Send + Sync {
    fn provider(&self) -> &dyn ModelProvider;

    /// Raw catalog entries, as returned by the models endpoint.
    fn list_models(&self) -> Result<Vec<Value>, ProviderError>;
}

pub fn backend_from_config(config: &EnvConfig) -> Result<Box<dyn ChatBackend>, AppError> {
    match config
        .provider_id
        .as_deref()
        .unwrap_or(DEFAULT_PROVIDER_ID)
    {
        OPENROUTER_PROVIDER_ID => {
            let api_key = read_api_key(&config.api_key_path)?;
            let mut provider_config = OpenRouterProviderConfig::new(api_key);
            if let Some(base_url) = &config.base_url {
                provider_config = provider_config.with_base_url(base_url.clone());
            }
            if let Some(timeout) = config.timeout {
                provider_config = provider_config.with_timeout(timeout);
            }
            if let Some(referer) = &config.referer {
                provider_config = provider_config.with_referer(referer.clone());
            }
            if let Some(app_title) = &config.app_title {
                provider_config = provider_config.with_app_title(app_title.clone());
            }
            Ok(Box::new(OpenRouterProvider::new(provider_config)?))
        }
        MOCK_PROVIDER_ID => Ok(Box::new(mock::demo_provider())),
        unknown => Err(AppError::Config(format!(
            "Unsupported provider '{unknown}'. Available providers: {OPENROUTER_PROVIDER_ID}, {MOCK_PROVIDER_ID}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chat_provider::ReasoningEffort;

    use super::*;

    fn config(provider_id: Option<&str>, api_key_path: PathBuf) -> EnvConfig {
        EnvConfig {
            provider_id: provider_id.map(str::to_string),
            api_key_path,
            base_url: None,
            stream: false,
            reasoning_effort: ReasoningEffort::Medium,
            reasoning_summary: true,
            timeout: None,
            referer: None,
            app_title: None,
        }
    }

    #[test]
    fn mock_backend_resolves_without_credentials() {
        let dir = tempfile::tempdir().expect("temp dir");
        let backend = backend_from_config(&config(Some("mock"), dir.path().join("absent")))
            .unwrap_or_else(|error| panic!("mock backend should resolve: {error}"));

        assert_eq!(backend.provider().profile().provider_id, MOCK_PROVIDER_ID);
    }

    #[test]
    fn openrouter_backend_requires_key_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = backend_from_config(&config(None, dir.path().join("api_key.txt")));

        assert!(matches!(result, Err(AppError::Credential { .. })));
    }

    #[test]
    fn openrouter_backend_uses_key_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("api_key.txt");
        std::fs::write(&path, "sk-or-test\n").expect("write key");

        let backend = backend_from_config(&config(Some("openrouter"), path))
            .unwrap_or_else(|error| panic!("openrouter backend should resolve: {error}"));

        assert_eq!(
            backend.provider().profile().provider_id,
            OPENROUTER_PROVIDER_ID
        );
    }

    #[test]
    fn openrouter_backend_accepts_attribution_settings() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("api_key.txt");
        std::fs::write(&path, "sk-or-test\n").expect("write key");
        let mut config = config(Some("openrouter"), path);
        config.referer = Some("https://example.test".to_string());
        config.app_title = Some("My Chat".to_string());

        let backend = backend_from_config(&config)
            .unwrap_or_else(|error| panic!("openrouter backend should resolve: {error}"));

        assert_eq!(
            backend.provider().profile().provider_id,
            OPENROUTER_PROVIDER_ID
        );
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let error = match backend_from_config(&config(Some("custom"), PathBuf::new())) {
            Ok(_) => panic!("unknown providers should fail"),
            Err(error) => error,
        };

        assert!(error.to_string().contains("Unsupported provider 'custom'"));
    }
}
