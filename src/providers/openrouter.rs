use chat_provider::{ModelProvider, ProviderError};
use chat_provider_openrouter::OpenRouterProvider;
use serde_json::Value;

use super::ChatBackend;

impl ChatBackend for OpenRouterProvider {
    fn provider(&self) -> &dyn ModelProvider {
        self
    }

    fn list_models(&self) -> Result<Vec<Value>, ProviderError> {
        OpenRouterProvider::list_models(self)
    }
}
