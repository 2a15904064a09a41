use serde_json::Value;

use crate::error::code_to_string;
use crate::events::{ApiStreamEvent, ResponseStatus};

/// Incremental parser for SSE text streams.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: String,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete events.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ApiStreamEvent> {
        self.buffer
            .push_str(&String::from_utf8_lossy(bytes).replace("\r\n", "\n"));
        let mut events = Vec::new();

        while let Some(split) = self.buffer.find("\n\n") {
            let frame: String = self.buffer.drain(..split + 2).collect();

            if let Some(payload) = extract_data_payload(&frame) {
                if payload == "[DONE]" || payload.is_empty() {
                    continue;
                }

                match serde_json::from_str::<Value>(&payload) {
                    Ok(value) => {
                        if let Some(event) = map_event(value) {
                            events.push(event);
                        }
                    }
                    Err(error) => {
                        tracing::debug!(%error, "skipping malformed SSE data frame");
                    }
                }
            }
        }

        events
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<ApiStreamEvent> {
        let mut parser = Self::default();
        parser.feed(input.as_bytes())
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|value| value.as_str())
        .map(ToString::to_string)
}

fn map_event(value: Value) -> Option<ApiStreamEvent> {
    let event_type = value.get("type")?.as_str()?.to_owned();
    let delta = || string_field(&value, "delta").unwrap_or_default();

    match event_type.as_str() {
        "response.output_text.delta" => Some(ApiStreamEvent::OutputTextDelta { delta: delta() }),
        "response.reasoning_text.delta" | "response.reasoning.delta" => {
            Some(ApiStreamEvent::ReasoningTextDelta { delta: delta() })
        }
        "response.reasoning_summary_text.delta" => {
            Some(ApiStreamEvent::ReasoningSummaryTextDelta { delta: delta() })
        }
        "response.completed" | "response.done" | "response.incomplete" => {
            let response = value.get("response").cloned().unwrap_or(Value::Null);
            let status = response
                .get("status")
                .and_then(|status| status.as_str())
                .and_then(ResponseStatus::parse);

            // Aliases normalize to one terminal event; the status tells them apart.
            Some(ApiStreamEvent::ResponseCompleted { status, response })
        }
        "response.failed" => {
            let message = value
                .get("response")
                .and_then(|response| response.get("error"))
                .and_then(|error| error.get("message"))
                .and_then(|value| value.as_str())
                .map(ToString::to_string);
            Some(ApiStreamEvent::ResponseFailed { message })
        }
        "error" => {
            // OpenRouter nests the details under `error`; OpenAI puts them at the top level.
            let source = value.get("error").unwrap_or(&value);
            let code = code_to_string(source.get("code"));
            let message = string_field(source, "message");
            Some(ApiStreamEvent::Error { code, message })
        }
        _ => Some(ApiStreamEvent::Unknown {
            event_type,
            payload: value,
        }),
    }
}
