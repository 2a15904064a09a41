use std::time::Duration;

use chat_provider::{ModelProvider, ProviderError};
use chat_provider_mock::MockProvider;
use serde_json::{json, Value};

use super::ChatBackend;

const TOKEN_DELAY_MS: u64 = 30;

/// Offline provider with a visible token cadence.
pub(super) fn demo_provider() -> MockProvider {
    MockProvider::new().with_token_delay(Duration::from_millis(TOKEN_DELAY_MS))
}

impl ChatBackend for MockProvider {
    fn provider(&self) -> &dyn ModelProvider {
        self
    }

    fn list_models(&self) -> Result<Vec<Value>, ProviderError> {
        Ok(vec![
            json!({
                "id": "mock/echo:free",
                "name": "Mock Echo",
                "pricing": {"prompt": "0", "completion": "0"},
            }),
            json!({
                "id": "mock/echo-paid",
                "name": "Mock Echo (paid)",
                "pricing": {"prompt": "0.000001", "completion": "0.000002"},
            }),
        ])
    }
}
