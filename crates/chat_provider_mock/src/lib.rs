//! Deterministic mock implementation of the shared `chat_provider` contract.
//!
//! This crate contains no transport/protocol logic and is intended for local
//! development and contract-level integration testing. Outcomes are either
//! scripted ahead of time or, once the script is exhausted, produced by a
//! canned echo reply.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chat_provider::{
    CancelSignal, ModelProvider, ModelRequest, ProviderError, ProviderProfile, RawResponse,
    Role, StreamEvent,
};
use serde_json::{json, Value};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

/// Reasoning line used by the canned echo reply.
pub const CANNED_REASONING: &str = "The user sent a message; repeat it back.";

/// One queued reaction to the next invocation.
pub enum ScriptedOutcome {
    /// Batch reply: the response object handed back by `create`.
    Respond(RawResponse),
    /// Streaming reply: events delivered in order, then the final object.
    Stream {
        events: Vec<StreamEvent>,
        final_response: RawResponse,
    },
    /// Streaming reply that delivers `events` and then fails.
    StreamThenFail {
        events: Vec<StreamEvent>,
        error: ProviderError,
    },
    /// Call-level failure before anything is delivered.
    Fail(ProviderError),
}

/// Deterministic mock provider used by engine tests and offline runs.
pub struct MockProvider {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    requests: Mutex<Vec<ModelRequest>>,
    token_delay: Duration,
}

impl MockProvider {
    /// Creates a provider that always answers with the canned echo reply.
    #[must_use]
    pub fn new() -> Self {
        Self::scripted(Vec::new())
    }

    /// Creates a provider that replays `outcomes` in order, then falls back
    /// to the canned echo reply.
    #[must_use]
    pub fn scripted(outcomes: Vec<ScriptedOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
            token_delay: Duration::ZERO,
        }
    }

    /// Sleeps between streamed tokens, for interactive demos.
    #[must_use]
    pub fn with_token_delay(mut self, token_delay: Duration) -> Self {
        self.token_delay = token_delay;
        self
    }

    /// Queues another outcome behind any already scripted ones.
    pub fn push(&self, outcome: ScriptedOutcome) {
        lock_unpoisoned(&self.script).push_back(outcome);
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        lock_unpoisoned(&self.requests).clone()
    }

    fn next_outcome(&self, request: &ModelRequest) -> Option<ScriptedOutcome> {
        lock_unpoisoned(&self.requests).push(request.clone());
        lock_unpoisoned(&self.script).pop_front()
    }

    fn pause(&self) {
        if !self.token_delay.is_zero() {
            thread::sleep(self.token_delay);
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            base_url: None,
        }
    }

    fn create(
        &self,
        request: &ModelRequest,
        cancel: &CancelSignal,
    ) -> Result<RawResponse, ProviderError> {
        if cancel.load(Ordering::SeqCst) {
            return Err(ProviderError::cancelled());
        }

        match self.next_outcome(request) {
            Some(ScriptedOutcome::Respond(response)) => Ok(response),
            Some(ScriptedOutcome::Stream { final_response, .. }) => Ok(final_response),
            Some(ScriptedOutcome::StreamThenFail { error, .. })
            | Some(ScriptedOutcome::Fail(error)) => Err(error),
            None => Ok(RawResponse::from_value(echo_response(request))),
        }
    }

    fn stream(
        &self,
        request: &ModelRequest,
        cancel: &CancelSignal,
        on_event: &mut dyn FnMut(StreamEvent),
    ) -> Result<RawResponse, ProviderError> {
        if cancel.load(Ordering::SeqCst) {
            return Err(ProviderError::cancelled());
        }

        let (events, ending) = match self.next_outcome(request) {
            Some(ScriptedOutcome::Respond(response)) => (Vec::new(), Ok(response)),
            Some(ScriptedOutcome::Stream {
                events,
                final_response,
            }) => (events, Ok(final_response)),
            Some(ScriptedOutcome::StreamThenFail { events, error }) => (events, Err(error)),
            Some(ScriptedOutcome::Fail(error)) => return Err(error),
            None => (
                echo_events(request),
                Ok(RawResponse::from_value(echo_response(request))),
            ),
        };

        for event in events {
            if cancel.load(Ordering::SeqCst) {
                return Err(ProviderError::cancelled());
            }
            on_event(event);
            self.pause();
        }

        ending
    }
}

fn last_user_text(request: &ModelRequest) -> &str {
    request
        .history
        .iter()
        .rev()
        .find(|message| message.role == Role::User)
        .map(|message| message.content.as_str())
        .unwrap_or_default()
}

fn echo_answer(request: &ModelRequest) -> String {
    format!("You said: {}", last_user_text(request))
}

fn echo_response(request: &ModelRequest) -> Value {
    let mut reasoning_item = json!({
        "type": "reasoning",
        "content": [{"type": "reasoning_text", "text": CANNED_REASONING}],
    });
    if request.wants_reasoning_summary {
        reasoning_item["summary"] = json!([{"type": "summary_text", "text": "Echo the input."}]);
    }

    let answer = echo_answer(request);
    json!({
        "id": "mock_response",
        "model": request.model_id,
        "status": "completed",
        "output_text": answer,
        "output": [
            reasoning_item,
            {
                "type": "message",
                "role": "assistant",
                "content": [{"type": "output_text", "text": answer}],
            },
        ],
    })
}

fn echo_events(request: &ModelRequest) -> Vec<StreamEvent> {
    let mut events = vec![StreamEvent::reasoning_delta(CANNED_REASONING)];

    let answer = echo_answer(request);
    let mut pending_token = String::new();
    for ch in answer.chars() {
        pending_token.push(ch);
        if ch == ' ' {
            events.push(StreamEvent::output_delta(std::mem::take(&mut pending_token)));
        }
    }
    if !pending_token.is_empty() {
        events.push(StreamEvent::output_delta(pending_token));
    }

    events
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
