use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::events::ResponseStatus;

/// Responses API object as returned by a create call or carried by the
/// terminal stream frame.
///
/// Only envelope fields are typed. Output items stay as raw JSON because their
/// shape varies by upstream provider; unrecognized top-level fields are kept in
/// `extra` so that serializing the object reproduces what the API sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponseObject {
    /// Builds a response object from arbitrary JSON.
    ///
    /// When the typed envelope does not fit (for example a numeric `id`), every
    /// key lands in `extra` instead, so no data is dropped.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                match serde_json::from_value::<Self>(Value::Object(map.clone())) {
                    Ok(parsed) => parsed,
                    Err(error) => {
                        tracing::debug!(%error, "response envelope did not match typed fields");
                        Self {
                            extra: map,
                            ..Self::default()
                        }
                    }
                }
            }
            other => {
                tracing::debug!(value = %other, "response object is not a JSON object");
                Self::default()
            }
        }
    }

    pub fn parsed_status(&self) -> Option<ResponseStatus> {
        self.status.as_deref().and_then(ResponseStatus::parse)
    }
}
