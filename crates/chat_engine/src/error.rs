use chat_provider::ProviderError;
use thiserror::Error;

/// Reason a turn ended without committing an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("{0}")]
    Provider(#[from] ProviderError),
    #[error("model returned no answer text")]
    EmptyAnswer,
    #[error("message is empty")]
    EmptyInput,
}
