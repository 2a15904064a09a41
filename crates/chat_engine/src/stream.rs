//! Pure accumulation of streamed deltas.
//!
//! [`StreamAccumulator::apply`] only updates the answer buffer and reports
//! which delta should be shown; displaying it is the caller's job. Reasoning
//! deltas are display-only: committed reasoning always comes from the final
//! response object.

use chat_provider::{StreamEvent, StreamEventKind};

use crate::extract::{extract_turn, ExtractedTurnResult};
use crate::view::ResponseView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaChannel {
    Reasoning,
    Answer,
}

/// One fragment to mirror to the user, tagged with its display region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub channel: DeltaChannel,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamAccumulator {
    answer: String,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the answer buffer. Returns the delta to emit, if any.
    pub fn apply(&mut self, event: &StreamEvent) -> Option<Delta> {
        let channel = match &event.kind {
            StreamEventKind::OutputDelta => DeltaChannel::Answer,
            StreamEventKind::ReasoningDelta => DeltaChannel::Reasoning,
            StreamEventKind::Other(kind) => {
                tracing::trace!(kind = kind.as_str(), "ignoring stream event");
                return None;
            }
        };

        let text = event.payload.as_deref().filter(|text| !text.is_empty())?;
        if channel == DeltaChannel::Answer {
            self.answer.push_str(text);
        }

        Some(Delta {
            channel,
            text: text.to_string(),
        })
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Combines the answer buffer with the final response object.
    ///
    /// The streamed answer wins unless it is blank, in which case the final
    /// object's answer is used. Reasoning and summary come from the final
    /// object only.
    pub fn finish(self, final_response: &ResponseView) -> ExtractedTurnResult {
        let mut result = extract_turn(final_response);

        let streamed_answer = self.answer.trim();
        if !streamed_answer.is_empty() {
            result.answer = streamed_answer.to_string();
        }

        result
    }
}
