use serde::{Deserialize, Serialize};

/// Request payload for the Responses endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: Vec<InputMessage>,
    /// Default: false. The client overrides it per call.
    #[serde(default)]
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningConfig>,
}

impl ResponsesRequest {
    pub fn new(model: impl Into<String>, input: Vec<InputMessage>) -> Self {
        Self {
            model: model.into(),
            input,
            stream: false,
            reasoning: None,
        }
    }

    /// Requests reasoning at `effort`, with an automatic summary when
    /// `with_summary` is set.
    pub fn with_reasoning(mut self, effort: impl Into<String>, with_summary: bool) -> Self {
        self.reasoning = Some(ReasoningConfig {
            effort: Some(effort.into()),
            summary: with_summary.then(|| "auto".to_string()),
        });
        self
    }
}

/// One conversation message in Responses API `input` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    pub content: String,
}

impl InputMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: "message".to_string(),
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
