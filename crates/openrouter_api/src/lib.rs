//! Transport-only OpenRouter API client primitives.
//!
//! This crate owns request building, response parsing and SSE normalization for
//! the OpenRouter Responses and Models endpoints. It contains no conversation
//! state and no console coupling.
//!
//! Streamed events are normalized into [`ApiStreamEvent`]; the terminal
//! `response.completed` frame carries the final [`ResponseObject`], which the
//! client hands back once the event sequence is exhausted.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod models;
pub mod payload;
pub mod response;
pub mod sse;
pub mod url;

pub use client::OpenRouterClient;
pub use client::StreamResult;
pub use config::OpenRouterConfig;
pub use error::OpenRouterError;
pub use events::{ApiStreamEvent, ResponseStatus};
pub use payload::ResponsesRequest;
pub use response::ResponseObject;
pub use sse::SseStreamParser;
pub use url::{normalize_models_url, normalize_responses_url};
