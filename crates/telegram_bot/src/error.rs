use engine::EngineError;
use teloxide::RequestError;
use thiserror::Error;

/// Failure while talking to Telegram.
#[derive(Error, Debug)]
#[error("telegram request failed: {0}")]
pub struct TransportError(#[from] pub RequestError);

/// Errors surfaced while handling one inbound event.
#[derive(Error, Debug)]
pub enum ConversationError {
    #[error(transparent)]
    Store(#[from] EngineError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
