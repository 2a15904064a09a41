//! OpenRouter-backed implementation of the shared `chat_provider` contract.
//!
//! This adapter translates a provider-neutral `ModelRequest` into a Responses
//! API call, maps transport stream events onto `StreamEvent`, and hands the
//! final response object back as a dumpable `RawResponse`.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chat_provider::{
    CancelSignal, Message, ModelProvider, ModelRequest, ProviderError, ProviderInitError,
    ProviderProfile, RawResponse, StreamEvent,
};
use openrouter_api::payload::InputMessage;
use openrouter_api::{
    ApiStreamEvent, OpenRouterClient, OpenRouterConfig, OpenRouterError, ResponseObject,
    ResponseStatus, ResponsesRequest,
};
use serde_json::Value;

/// Stable provider identifier used for startup selection.
pub const OPENROUTER_PROVIDER_ID: &str = "openrouter";

/// Runtime configuration for the OpenRouter provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRouterProviderConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    /// Sent as `HTTP-Referer` for OpenRouter app attribution.
    pub referer: Option<String>,
    /// Sent as `X-Title`; the transport default applies when unset.
    pub app_title: Option<String>,
}

impl OpenRouterProviderConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: None,
            referer: None,
            app_title: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    #[must_use]
    pub fn with_app_title(mut self, app_title: impl Into<String>) -> Self {
        self.app_title = Some(app_title.into());
        self
    }

    fn into_api_config(self) -> OpenRouterConfig {
        let mut config = OpenRouterConfig::new(self.api_key);

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        if let Some(referer) = self.referer {
            config = config.with_referer(referer);
        }

        if let Some(app_title) = self.app_title {
            config = config.with_app_title(app_title);
        }

        config
    }
}

/// Blocking facade over the async transport client.
trait ResponsesClient: Send + Sync {
    fn base_url(&self) -> Option<String>;

    fn create(
        &self,
        request: &ResponsesRequest,
        cancel: &CancelSignal,
    ) -> Result<ResponseObject, OpenRouterError>;

    fn stream(
        &self,
        request: &ResponsesRequest,
        cancel: &CancelSignal,
        on_event: &mut dyn FnMut(ApiStreamEvent),
    ) -> Result<Option<ResponseObject>, OpenRouterError>;

    fn list_models(&self) -> Result<Vec<Value>, OpenRouterError>;
}

#[derive(Debug)]
struct DefaultResponsesClient {
    client: OpenRouterClient,
}

impl DefaultResponsesClient {
    fn runtime() -> Result<tokio::runtime::Runtime, OpenRouterError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                OpenRouterError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })
    }
}

impl ResponsesClient for DefaultResponsesClient {
    fn base_url(&self) -> Option<String> {
        Some(self.client.config().base_url.clone())
    }

    fn create(
        &self,
        request: &ResponsesRequest,
        cancel: &CancelSignal,
    ) -> Result<ResponseObject, OpenRouterError> {
        Self::runtime()?.block_on(self.client.create(request, Some(cancel)))
    }

    fn stream(
        &self,
        request: &ResponsesRequest,
        cancel: &CancelSignal,
        on_event: &mut dyn FnMut(ApiStreamEvent),
    ) -> Result<Option<ResponseObject>, OpenRouterError> {
        Self::runtime()?.block_on(self.client.stream_with_handler(
            request,
            Some(cancel),
            |event| on_event(event),
        ))
    }

    fn list_models(&self) -> Result<Vec<Value>, OpenRouterError> {
        Self::runtime()?.block_on(self.client.list_models(None))
    }
}

/// `ModelProvider` adapter backed by `openrouter_api` transport primitives.
pub struct OpenRouterProvider {
    client: Arc<dyn ResponsesClient>,
}

impl OpenRouterProvider {
    /// Creates a provider using real OpenRouter transport.
    pub fn new(config: OpenRouterProviderConfig) -> Result<Self, ProviderInitError> {
        let client = Arc::new(DefaultResponsesClient {
            client: OpenRouterClient::new(config.into_api_config()).map_err(map_init_error)?,
        });

        Ok(Self { client })
    }

    /// Fetches the raw model catalog.
    pub fn list_models(&self) -> Result<Vec<Value>, ProviderError> {
        self.client.list_models().map_err(map_transport_error)
    }

    #[cfg(test)]
    fn with_client_for_tests(client: Arc<dyn ResponsesClient>) -> Self {
        Self { client }
    }
}

impl ModelProvider for OpenRouterProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: OPENROUTER_PROVIDER_ID.to_string(),
            base_url: self.client.base_url(),
        }
    }

    fn create(
        &self,
        request: &ModelRequest,
        cancel: &CancelSignal,
    ) -> Result<RawResponse, ProviderError> {
        if cancel.load(Ordering::Acquire) {
            return Err(ProviderError::cancelled());
        }

        let payload = responses_request(request);
        let response = self
            .client
            .create(&payload, cancel)
            .map_err(map_transport_error)?;
        ensure_not_failed(&response)?;

        Ok(RawResponse::dumpable(response))
    }

    fn stream(
        &self,
        request: &ModelRequest,
        cancel: &CancelSignal,
        on_event: &mut dyn FnMut(StreamEvent),
    ) -> Result<RawResponse, ProviderError> {
        if cancel.load(Ordering::Acquire) {
            return Err(ProviderError::cancelled());
        }

        let payload = responses_request(request);
        let final_response = self
            .client
            .stream(&payload, cancel, &mut |event| on_event(map_stream_event(event)))
            .map_err(map_transport_error)?;

        match final_response {
            Some(response) => {
                ensure_not_failed(&response)?;
                Ok(RawResponse::dumpable(response))
            }
            None => Ok(RawResponse::empty()),
        }
    }
}

fn responses_request(request: &ModelRequest) -> ResponsesRequest {
    let input = request.history.iter().map(input_message).collect();
    ResponsesRequest::new(request.model_id.clone(), input).with_reasoning(
        request.reasoning_effort.as_str(),
        request.wants_reasoning_summary,
    )
}

fn input_message(message: &Message) -> InputMessage {
    InputMessage::new(message.role.as_str(), message.content.clone())
}

fn map_stream_event(event: ApiStreamEvent) -> StreamEvent {
    match event {
        ApiStreamEvent::OutputTextDelta { delta } => StreamEvent::output_delta(delta),
        ApiStreamEvent::ReasoningTextDelta { delta } => StreamEvent::reasoning_delta(delta),
        ApiStreamEvent::ReasoningSummaryTextDelta { delta } => StreamEvent::other(
            "response.reasoning_summary_text.delta",
            Some(delta),
        ),
        other => StreamEvent::other(other.event_type().to_string(), None),
    }
}

fn ensure_not_failed(response: &ResponseObject) -> Result<(), ProviderError> {
    if response.parsed_status() != Some(ResponseStatus::Failed) {
        return Ok(());
    }

    let message = response
        .extra
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("response failed");
    Err(ProviderError::model(message))
}

fn map_transport_error(error: OpenRouterError) -> ProviderError {
    tracing::warn!(%error, "OpenRouter invocation failed");
    let message = format!("OpenRouter request failed: {error}");
    match &error {
        OpenRouterError::Cancelled => ProviderError::cancelled(),
        OpenRouterError::MissingApiKey => ProviderError::auth(message),
        OpenRouterError::InvalidRequestPayload(_) | OpenRouterError::InvalidHeader(_) => {
            ProviderError::invalid_request(message)
        }
        OpenRouterError::StreamFailed { .. } => ProviderError::model(message),
        _ => match error.status().map(|status| status.as_u16()) {
            Some(401 | 403) => ProviderError::auth(message),
            Some(400 | 404 | 422) => ProviderError::invalid_request(message),
            _ => ProviderError::transport(message),
        },
    }
}

fn map_init_error(error: OpenRouterError) -> ProviderInitError {
    ProviderInitError::new(format!("Failed to initialize openrouter provider: {error}"))
}
