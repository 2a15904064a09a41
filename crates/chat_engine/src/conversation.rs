//! Conversation history and the turn protocol.
//!
//! A turn appends the user message, invokes the provider with the full
//! history, and either commits the assistant messages or removes the user
//! message again. After [`ConversationState::run_turn`] returns, the history
//! never ends with an unanswered user message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chat_provider::{
    CancelSignal, InvocationMode, Message, ModelProvider, ModelRequest, ReasoningEffort,
};

use crate::error::TurnError;
use crate::extract::{extract_turn, ExtractedTurnResult};
use crate::stream::{Delta, StreamAccumulator};
use crate::view::ResponseView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    AwaitingUser,
    TurnInFlight,
    TurnSucceeded,
    TurnFailed,
}

/// Caller-selected parameters applied to every turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSettings {
    pub model_id: String,
    pub mode: InvocationMode,
    pub reasoning_effort: ReasoningEffort,
    pub wants_reasoning_summary: bool,
}

impl TurnSettings {
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            mode: InvocationMode::Batch,
            reasoning_effort: ReasoningEffort::default(),
            wants_reasoning_summary: true,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: InvocationMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_reasoning_effort(mut self, reasoning_effort: ReasoningEffort) -> Self {
        self.reasoning_effort = reasoning_effort;
        self
    }

    #[must_use]
    pub fn with_reasoning_summary(mut self, wants_reasoning_summary: bool) -> Self {
        self.wants_reasoning_summary = wants_reasoning_summary;
        self
    }
}

/// What a finished turn hands back for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    pub succeeded: bool,
    pub printed_reasoning: Vec<String>,
    pub printed_summary: Vec<String>,
    pub printed_answer: String,
    pub error_message: Option<String>,
    pub error: Option<TurnError>,
}

impl TurnOutcome {
    fn succeeded(result: ExtractedTurnResult) -> Self {
        Self {
            succeeded: true,
            printed_reasoning: result.reasoning,
            printed_summary: result.reasoning_summary,
            printed_answer: result.answer,
            error_message: None,
            error: None,
        }
    }

    fn failed(error: TurnError) -> Self {
        Self {
            error_message: Some(error.to_string()),
            error: Some(error),
            ..Self::default()
        }
    }

    /// Terminal phase the turn reached.
    pub fn phase(&self) -> TurnPhase {
        if self.succeeded {
            TurnPhase::TurnSucceeded
        } else {
            TurnPhase::TurnFailed
        }
    }
}

/// Sole owner of the conversation history.
#[derive(Debug)]
pub struct ConversationState {
    history: Vec<Message>,
    phase: TurnPhase,
    last_response: Option<ResponseView>,
    cancel: CancelSignal,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::with_history(Vec::new())
    }

    /// Starts from an existing history, e.g. when replaying a transcript.
    pub fn with_history(history: Vec<Message>) -> Self {
        Self {
            history,
            phase: TurnPhase::Idle,
            last_response: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Most recent response view, kept for diagnostics.
    pub fn last_response(&self) -> Option<&ResponseView> {
        self.last_response.as_ref()
    }

    /// Signal that aborts the in-flight invocation when set.
    ///
    /// The flag is cleared at the start of every turn.
    pub fn cancel_handle(&self) -> CancelSignal {
        Arc::clone(&self.cancel)
    }

    /// Marks the conversation as waiting for the next user message.
    pub fn await_user(&mut self) {
        if self.phase == TurnPhase::Idle {
            self.transition(TurnPhase::AwaitingUser);
        }
    }

    /// Runs one turn for `user_text`.
    ///
    /// In streaming mode every non-empty delta is passed to `emit` as it
    /// arrives. On failure the history is left exactly as it was before the
    /// call.
    pub fn run_turn(
        &mut self,
        provider: &dyn ModelProvider,
        settings: &TurnSettings,
        user_text: &str,
        emit: &mut dyn FnMut(Delta),
    ) -> TurnOutcome {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            self.transition(TurnPhase::Idle);
            return TurnOutcome::failed(TurnError::EmptyInput);
        }

        let history_len = self.history.len();
        self.history.push(Message::user(user_text));
        self.cancel.store(false, Ordering::SeqCst);
        self.transition(TurnPhase::TurnInFlight);

        let outcome = match self.invoke(provider, settings, emit) {
            Ok(result) => {
                self.commit(&result);
                self.transition(TurnPhase::TurnSucceeded);
                TurnOutcome::succeeded(result)
            }
            Err(error) => {
                self.history.truncate(history_len);
                tracing::info!(%error, history_len, "turn failed; rolled back user message");
                self.transition(TurnPhase::TurnFailed);
                TurnOutcome::failed(error)
            }
        };

        self.transition(TurnPhase::Idle);
        outcome
    }

    /// Ends the conversation and hands back the final history.
    pub fn end(self) -> Vec<Message> {
        tracing::debug!(messages = self.history.len(), "conversation ended");
        self.history
    }

    /// Pretty JSON of the most recent response mapping.
    pub fn diagnostic_dump(&self) -> Option<String> {
        self.last_response.as_ref().map(ResponseView::to_pretty_json)
    }

    fn invoke(
        &mut self,
        provider: &dyn ModelProvider,
        settings: &TurnSettings,
        emit: &mut dyn FnMut(Delta),
    ) -> Result<ExtractedTurnResult, TurnError> {
        let request = ModelRequest {
            model_id: settings.model_id.clone(),
            history: self.history.clone(),
            mode: settings.mode,
            reasoning_effort: settings.reasoning_effort,
            wants_reasoning_summary: settings.wants_reasoning_summary,
        };

        let result = match settings.mode {
            InvocationMode::Batch => {
                let raw = provider.create(&request, &self.cancel)?;
                let view = ResponseView::new(raw);
                let result = extract_turn(&view);
                self.last_response = Some(view);
                result
            }
            InvocationMode::Streaming => {
                let mut accumulator = StreamAccumulator::new();
                let raw = provider.stream(&request, &self.cancel, &mut |event| {
                    if let Some(delta) = accumulator.apply(&event) {
                        emit(delta);
                    }
                })?;
                let view = ResponseView::new(raw);
                let result = accumulator.finish(&view);
                self.last_response = Some(view);
                result
            }
        };

        if result.answer.is_empty() {
            return Err(TurnError::EmptyAnswer);
        }

        Ok(result)
    }

    fn commit(&mut self, result: &ExtractedTurnResult) {
        for chunks in [&result.reasoning, &result.reasoning_summary] {
            let joined = chunks.join("\n");
            let joined = joined.trim();
            if !joined.is_empty() {
                self.history.push(Message::assistant(joined));
            }
        }
        self.history.push(Message::assistant(result.answer.clone()));
    }

    fn transition(&mut self, next: TurnPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "turn phase");
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use chat_provider::{ProviderError, RawResponse, Role, StreamEvent};
    use chat_provider_mock::{MockProvider, ScriptedOutcome};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn settings(mode: InvocationMode) -> TurnSettings {
        TurnSettings::new("mock/free").with_mode(mode)
    }

    fn respond(value: serde_json::Value) -> ScriptedOutcome {
        ScriptedOutcome::Respond(RawResponse::from_value(value))
    }

    #[test]
    fn empty_input_is_rejected_without_calling_provider() {
        let provider = MockProvider::new();
        let mut state = ConversationState::new();

        let outcome = state.run_turn(&provider, &settings(InvocationMode::Batch), "   ", &mut |_| {});

        assert!(!outcome.succeeded);
        assert_eq!(outcome.error, Some(TurnError::EmptyInput));
        assert!(state.history().is_empty());
        assert!(provider.requests().is_empty());
    }

    #[test]
    fn request_carries_full_history_and_settings() {
        let provider = MockProvider::scripted(vec![respond(json!({"output_text": "D"}))]);
        let mut state = ConversationState::with_history(vec![
            Message::user("A"),
            Message::assistant("B"),
        ]);
        let settings = settings(InvocationMode::Batch)
            .with_reasoning_effort(ReasoningEffort::High)
            .with_reasoning_summary(false);

        state.run_turn(&provider, &settings, "C", &mut |_| {});

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].history,
            vec![Message::user("A"), Message::assistant("B"), Message::user("C")]
        );
        assert_eq!(requests[0].reasoning_effort, ReasoningEffort::High);
        assert!(!requests[0].wants_reasoning_summary);
        assert_eq!(requests[0].mode, InvocationMode::Batch);
    }

    #[test]
    fn success_commits_reasoning_summary_then_answer() {
        let provider = MockProvider::scripted(vec![respond(json!({
            "output": [
                {"type": "reasoning",
                 "content": [
                     {"type": "reasoning_text", "text": " step 1"},
                     {"type": "reasoning_text", "text": "step 2 "}
                 ],
                 "summary": [{"text": "short"}]},
                {"type": "message", "content": [{"type": "output_text", "text": "answer"}]}
            ],
        }))]);
        let mut state = ConversationState::new();

        let outcome = state.run_turn(&provider, &settings(InvocationMode::Batch), "q", &mut |_| {});

        assert_eq!(outcome.phase(), TurnPhase::TurnSucceeded);
        assert_eq!(
            state.history(),
            &[
                Message::user("q"),
                Message::assistant("step 1\nstep 2"),
                Message::assistant("short"),
                Message::assistant("answer"),
            ]
        );
        assert_eq!(state.phase(), TurnPhase::Idle);
    }

    #[test]
    fn empty_answer_rolls_back_and_keeps_dump() {
        let provider = MockProvider::scripted(vec![respond(json!({"output_text": "  "}))]);
        let mut state = ConversationState::with_history(vec![Message::user("A")]);

        let outcome = state.run_turn(&provider, &settings(InvocationMode::Batch), "B", &mut |_| {});

        assert_eq!(outcome.error, Some(TurnError::EmptyAnswer));
        assert_eq!(outcome.error_message.as_deref(), Some("model returned no answer text"));
        assert_eq!(state.history(), &[Message::user("A")]);
        assert!(state.diagnostic_dump().is_some());
    }

    #[test]
    fn mid_stream_failure_emits_but_commits_nothing() {
        let provider = MockProvider::scripted(vec![ScriptedOutcome::StreamThenFail {
            events: vec![StreamEvent::output_delta("partial")],
            error: ProviderError::transport("connection reset"),
        }]);
        let mut state = ConversationState::new();
        let mut emitted = Vec::new();

        let outcome = state.run_turn(
            &provider,
            &settings(InvocationMode::Streaming),
            "hello",
            &mut |delta| emitted.push(delta.text),
        );

        assert_eq!(emitted, vec!["partial".to_string()]);
        assert_eq!(outcome.error_message.as_deref(), Some("connection reset"));
        assert!(state.history().is_empty());
    }

    #[test]
    fn cancel_handle_is_reset_for_each_turn() {
        let provider = MockProvider::new();
        let mut state = ConversationState::new();
        state.cancel_handle().store(true, Ordering::SeqCst);

        let outcome = state.run_turn(&provider, &settings(InvocationMode::Batch), "hi", &mut |_| {});

        assert!(outcome.succeeded);
        assert_eq!(state.history().last().map(|message| message.role), Some(Role::Assistant));
    }

    #[test]
    fn await_user_only_leaves_idle() {
        let mut state = ConversationState::new();
        assert_eq!(state.phase(), TurnPhase::Idle);

        state.await_user();
        assert_eq!(state.phase(), TurnPhase::AwaitingUser);

        state.await_user();
        assert_eq!(state.phase(), TurnPhase::AwaitingUser);
    }

    #[test]
    fn end_returns_history() {
        let state = ConversationState::with_history(vec![Message::user("x")]);
        assert_eq!(state.end(), vec![Message::user("x")]);
    }

    #[test]
    fn diagnostic_dump_is_absent_before_first_response() {
        assert_eq!(ConversationState::new().diagnostic_dump(), None);
    }
}
