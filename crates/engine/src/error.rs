//! The module contains the errors the engine can throw.
//!
//! Validation errors (`InvalidAmount`, `InvalidCategory`, `InvalidPeriod`,
//! `InvalidText`) describe malformed user input and are recoverable by asking
//! again. [`Database`] is a store failure: the caller must report it and must
//! not advance.
//!
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid text: {0}")]
    InvalidText(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` when the error comes from persistence rather than from
    /// the input.
    #[must_use]
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::KeyNotFound(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidCategory(a), Self::InvalidCategory(b)) => a == b,
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (Self::InvalidText(a), Self::InvalidText(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
