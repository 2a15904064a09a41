use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;

use crate::config::OpenRouterConfig;
use crate::error::{parse_error_message, OpenRouterError};
use crate::events::ApiStreamEvent;
use crate::headers::build_headers;
use crate::models::ModelList;
use crate::payload::ResponsesRequest;
use crate::response::ResponseObject;
use crate::sse::SseStreamParser;
use crate::url::{normalize_models_url, normalize_responses_url};

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct OpenRouterClient {
    http: Client,
    config: OpenRouterConfig,
}

/// Collected outcome of a stream: every non-terminal event in arrival order
/// plus the final response object, when the terminal frame arrived.
#[derive(Debug, Clone)]
pub struct StreamResult {
    pub events: Vec<ApiStreamEvent>,
    pub final_response: Option<ResponseObject>,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Result<Self, OpenRouterError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(OpenRouterError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    pub fn responses_endpoint(&self) -> String {
        normalize_responses_url(&self.config.base_url)
    }

    pub fn models_endpoint(&self) -> String {
        normalize_models_url(&self.config.base_url)
    }

    pub fn build_headers(&self, streaming: bool) -> Result<HeaderMap, OpenRouterError> {
        let headers = build_headers(&self.config, streaming, self.config.user_agent.as_deref())?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                    OpenRouterError::InvalidHeader(format!("invalid header key: {key}"))
                })?,
                HeaderValue::from_str(&value).map_err(|_| {
                    OpenRouterError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    /// Builds the POST for the Responses endpoint with `stream` forced to the
    /// given mode.
    pub fn build_request(
        &self,
        request: &ResponsesRequest,
        streaming: bool,
    ) -> Result<reqwest::RequestBuilder, OpenRouterError> {
        validate_request_payload(request)?;

        let headers = self.build_headers(streaming)?;
        let mut payload = request.clone();
        payload.stream = streaming;
        Ok(self
            .http
            .post(self.responses_endpoint())
            .headers(headers)
            .json(&payload))
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, OpenRouterError> {
        if is_cancelled(cancellation) {
            return Err(OpenRouterError::Cancelled);
        }

        let response = await_or_cancel(builder.send(), cancellation).await??;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = await_or_cancel(response.text(), cancellation)
            .await?
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        let message = parse_error_message(status, &body);
        tracing::warn!(status = status.as_u16(), %message, "OpenRouter request failed");
        Err(OpenRouterError::Status(status, message))
    }

    /// Performs a non-streaming create call and returns the response object.
    pub async fn create(
        &self,
        request: &ResponsesRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<ResponseObject, OpenRouterError> {
        let response = self
            .send(self.build_request(request, false)?, cancellation)
            .await?;
        let body = await_or_cancel(response.text(), cancellation).await??;
        let value = serde_json::from_str::<Value>(&body)
            .map_err(|error| OpenRouterError::MalformedResponse(error.to_string()))?;

        Ok(ResponseObject::from_value(value))
    }

    /// Streams a response, handing each non-terminal event to `on_event` as it
    /// is parsed.
    ///
    /// Returns the final response object carried by the terminal frame, or
    /// `None` when the stream closed without one.
    pub async fn stream_with_handler<F>(
        &self,
        request: &ResponsesRequest,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<Option<ResponseObject>, OpenRouterError>
    where
        F: FnMut(ApiStreamEvent),
    {
        let response = self
            .send(self.build_request(request, true)?, cancellation)
            .await?;
        let mut bytes = response.bytes_stream();
        let mut parser = SseStreamParser::default();
        let mut final_response = None;

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                break;
            };
            if is_cancelled(cancellation) {
                return Err(OpenRouterError::Cancelled);
            }
            let chunk = chunk.map_err(OpenRouterError::from)?;
            for event in parser.feed(&chunk) {
                process_stream_event(event, &mut final_response, &mut on_event)?;
            }
        }

        if is_cancelled(cancellation) {
            return Err(OpenRouterError::Cancelled);
        }

        if !parser.is_empty_buffer() {
            tracing::debug!("stream closed with an incomplete trailing frame");
        }
        if final_response.is_none() {
            tracing::debug!("stream closed without a terminal response frame");
        }

        Ok(final_response)
    }

    pub async fn stream(
        &self,
        request: &ResponsesRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<StreamResult, OpenRouterError> {
        let mut events = Vec::new();
        let final_response = self
            .stream_with_handler(request, cancellation, |event| {
                events.push(event);
            })
            .await?;

        Ok(StreamResult {
            events,
            final_response,
        })
    }

    /// Fetches the model catalog as raw entries.
    pub async fn list_models(
        &self,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Vec<Value>, OpenRouterError> {
        let builder = self
            .http
            .get(self.models_endpoint())
            .headers(self.build_headers(false)?);
        let response = self.send(builder, cancellation).await?;
        let body = await_or_cancel(response.text(), cancellation).await??;
        let list = serde_json::from_str::<ModelList>(&body)
            .map_err(|error| OpenRouterError::MalformedResponse(error.to_string()))?;

        Ok(list.data)
    }
}

fn validate_request_payload(request: &ResponsesRequest) -> Result<(), OpenRouterError> {
    if request.model.trim().is_empty() {
        return Err(OpenRouterError::InvalidRequestPayload(
            "'model' must not be empty".to_string(),
        ));
    }
    if request.input.is_empty() {
        return Err(OpenRouterError::InvalidRequestPayload(
            "'input' must contain at least one message".to_string(),
        ));
    }

    Ok(())
}

fn process_stream_event<F>(
    event: ApiStreamEvent,
    final_response: &mut Option<ResponseObject>,
    on_event: &mut F,
) -> Result<(), OpenRouterError>
where
    F: FnMut(ApiStreamEvent),
{
    if let Some(error) = stream_failure_from_event(&event) {
        return Err(error);
    }

    if let ApiStreamEvent::ResponseCompleted { response, .. } = event {
        *final_response = Some(ResponseObject::from_value(response));
        return Ok(());
    }

    on_event(event);
    Ok(())
}

fn stream_failure_from_event(event: &ApiStreamEvent) -> Option<OpenRouterError> {
    match event {
        ApiStreamEvent::ResponseFailed { message } => Some(OpenRouterError::StreamFailed {
            code: None,
            message: message
                .clone()
                .unwrap_or_else(|| "response failed".to_owned()),
        }),
        ApiStreamEvent::Error { code, message } => Some(OpenRouterError::StreamFailed {
            code: code.clone(),
            message: message
                .clone()
                .or_else(|| code.clone())
                .unwrap_or_else(|| r#"{"type":"error"}"#.to_owned()),
        }),
        _ => None,
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, OpenRouterError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(OpenRouterError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(OpenRouterError::Cancelled);
            }
            return Ok(output);
        }
    }
}
