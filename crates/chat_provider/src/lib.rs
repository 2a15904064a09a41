//! Minimal provider-agnostic contract for one model invocation.
//!
//! This crate defines the conversation message types, the logical request the
//! engine hands to a provider, the incremental stream events a provider emits,
//! and the raw response shapes a provider may hand back. It excludes transport
//! details and any conversation bookkeeping.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Shared cancellation flag for an invocation.
pub type CancelSignal = Arc<AtomicBool>;

/// Error returned while constructing/configuring a provider before any turn starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    /// Creates a new provider initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One entry of the linear conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Whether a turn is served by one create call or by an incremental stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvocationMode {
    #[default]
    Batch,
    Streaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    #[default]
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim().to_ascii_lowercase().as_str() {
            "minimal" => Self::Minimal,
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Logical payload for one model invocation. Providers translate it into
/// their own transport request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub model_id: String,
    pub history: Vec<Message>,
    pub mode: InvocationMode,
    pub reasoning_effort: ReasoningEffort,
    pub wants_reasoning_summary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEventKind {
    ReasoningDelta,
    OutputDelta,
    /// Any event kind the engine does not consume, keyed by its wire name.
    Other(String),
}

/// Incremental event delivered by a streaming invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub kind: StreamEventKind,
    pub payload: Option<String>,
}

impl StreamEvent {
    #[must_use]
    pub fn output_delta(text: impl Into<String>) -> Self {
        Self {
            kind: StreamEventKind::OutputDelta,
            payload: Some(text.into()),
        }
    }

    #[must_use]
    pub fn reasoning_delta(text: impl Into<String>) -> Self {
        Self {
            kind: StreamEventKind::ReasoningDelta,
            payload: Some(text.into()),
        }
    }

    #[must_use]
    pub fn other(kind: impl Into<String>, payload: Option<String>) -> Self {
        Self {
            kind: StreamEventKind::Other(kind.into()),
            payload,
        }
    }
}

/// Capability: the value can dump itself to a key/value mapping.
///
/// Every `Serialize` type has it; dumping fails when the value does not
/// serialize to a JSON object.
pub trait MappingDump {
    fn dump_mapping(&self) -> Result<Map<String, Value>, String>;
}

impl<T: Serialize + ?Sized> MappingDump for T {
    fn dump_mapping(&self) -> Result<Map<String, Value>, String> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(format!("dumped to non-mapping value: {other}")),
            Err(error) => Err(error.to_string()),
        }
    }
}

/// Capability: the value converts into ordered key/value pairs.
pub trait DictConvert {
    fn to_dict(&self) -> Vec<(String, Value)>;
}

impl DictConvert for Vec<(String, Value)> {
    fn to_dict(&self) -> Vec<(String, Value)> {
        self.clone()
    }
}

impl DictConvert for BTreeMap<String, Value> {
    fn to_dict(&self) -> Vec<(String, Value)> {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Response object as handed back by a provider, in whichever shape the
/// provider produced it.
pub enum RawResponse {
    Dumpable(Box<dyn MappingDump + Send>),
    DictLike(Box<dyn DictConvert + Send>),
    Mapping(Map<String, Value>),
    Opaque(Value),
}

impl RawResponse {
    #[must_use]
    pub fn dumpable(value: impl MappingDump + Send + 'static) -> Self {
        Self::Dumpable(Box::new(value))
    }

    #[must_use]
    pub fn dict_like(value: impl DictConvert + Send + 'static) -> Self {
        Self::DictLike(Box::new(value))
    }

    /// Wraps a JSON value, using it as a mapping when it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Mapping(map),
            other => Self::Opaque(other),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::Mapping(Map::new())
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Dumpable(_) => "dumpable",
            Self::DictLike(_) => "dict_like",
            Self::Mapping(_) => "mapping",
            Self::Opaque(_) => "opaque",
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapping(map) => f.debug_tuple("Mapping").field(map).finish(),
            Self::Opaque(value) => f.debug_tuple("Opaque").field(value).finish(),
            other => write!(f, "RawResponse::{}", other.shape_name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Network failure, broken stream, or unexpected HTTP status.
    Transport,
    /// Credential rejected.
    Auth,
    /// The model reported a failure for this request.
    Model,
    /// The request was rejected before or by the API as malformed.
    InvalidRequest,
    /// The invocation was aborted through its cancel signal.
    Cancelled,
}

/// Call-level failure of one model invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Auth, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Model, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ProviderErrorKind::Cancelled, "request was cancelled")
    }
}

/// Immutable metadata describing a model provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub base_url: Option<String>,
}

/// Provider interface for executing model invocations.
pub trait ModelProvider: Send + Sync + 'static {
    /// Returns provider identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Performs one batch invocation and returns the complete response object.
    fn create(
        &self,
        request: &ModelRequest,
        cancel: &CancelSignal,
    ) -> Result<RawResponse, ProviderError>;

    /// Performs one streaming invocation.
    ///
    /// Events are handed to `on_event` synchronously in arrival order. The
    /// final response object is returned once the event sequence is exhausted.
    /// Any error, including one raised after some events were delivered,
    /// aborts the invocation.
    fn stream(
        &self,
        request: &ModelRequest,
        cancel: &CancelSignal,
        on_event: &mut dyn FnMut(StreamEvent),
    ) -> Result<RawResponse, ProviderError>;
}
