use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical lifecycle state reported on Responses API objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Completed,
    Incomplete,
    Failed,
    Cancelled,
    Queued,
    InProgress,
}

impl ResponseStatus {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "completed" => Self::Completed,
            "incomplete" => Self::Incomplete,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
        }
    }
}

/// Stream event emitted by the parser after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApiStreamEvent {
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta { delta: String },
    #[serde(rename = "response.reasoning_text.delta")]
    ReasoningTextDelta { delta: String },
    #[serde(rename = "response.reasoning_summary_text.delta")]
    ReasoningSummaryTextDelta { delta: String },
    /// Terminal frame carrying the final response object.
    #[serde(rename = "response.completed")]
    ResponseCompleted {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<ResponseStatus>,
        response: Value,
    },
    #[serde(rename = "response.failed")]
    ResponseFailed { message: Option<String> },
    #[serde(rename = "error")]
    Error {
        code: Option<String>,
        message: Option<String>,
    },
    /// Unknown event type retained for forward-compatible passthrough.
    #[serde(rename = "unknown")]
    Unknown { event_type: String, payload: Value },
}

impl ApiStreamEvent {
    /// Wire name of the event, as carried in the frame's `type` field.
    pub fn event_type(&self) -> &str {
        match self {
            Self::OutputTextDelta { .. } => "response.output_text.delta",
            Self::ReasoningTextDelta { .. } => "response.reasoning_text.delta",
            Self::ReasoningSummaryTextDelta { .. } => "response.reasoning_summary_text.delta",
            Self::ResponseCompleted { .. } => "response.completed",
            Self::ResponseFailed { .. } => "response.failed",
            Self::Error { .. } => "error",
            Self::Unknown { event_type, .. } => event_type,
        }
    }
}
