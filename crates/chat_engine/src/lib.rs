//! Response normalization and conversation state for reasoning chat turns.
//!
//! The engine wraps whatever response representation a provider hands back in
//! a [`ResponseView`], pulls answer, reasoning and reasoning-summary text out of
//! it, accumulates streamed deltas, and keeps the conversation history
//! consistent across failed turns.
//!
//! Components, leaves first:
//!
//! - [`view`]: uniform read-only mapping over a provider response.
//! - [`extract`]: shape-tolerant text extraction rules.
//! - [`stream`]: pure delta accumulation for streaming turns.
//! - [`conversation`]: history ownership and the turn protocol with rollback.

pub mod conversation;
pub mod error;
pub mod extract;
pub mod stream;
pub mod view;

pub use conversation::{ConversationState, TurnOutcome, TurnPhase, TurnSettings};
pub use error::TurnError;
pub use extract::{
    extract_answer, extract_reasoning, extract_reasoning_summary, extract_turn,
    ExtractedTurnResult,
};
pub use stream::{Delta, DeltaChannel, StreamAccumulator};
pub use view::ResponseView;
