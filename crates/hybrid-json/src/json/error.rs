//! Encoder/decoder error types.

use thiserror::Error;

use crate::value::Opaque;

/// Reasons a [`Value`](crate::Value) cannot be rendered as JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("cannot convert {0} to string")]
    Unconvertible(Opaque),
    #[error("cannot encode cyclic table")]
    CyclicStructure,
    #[error("cannot encode non-finite number {0}")]
    NonFiniteNumber(f64),
    #[error("table nesting exceeds depth limit of {0}")]
    DepthLimitExceeded(usize),
}

/// Reasons JSON text cannot be decoded. Positions are byte offsets into the
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid JSON at byte {position}")]
    Malformed { position: usize },
    #[error("invalid UTF-8 at byte {position}")]
    InvalidUtf8 { position: usize },
    #[error("JSON nesting exceeds depth limit of {limit} at byte {position}")]
    DepthLimitExceeded { position: usize, limit: usize },
}

impl DecodeError {
    pub(crate) fn at(position: usize) -> Self {
        DecodeError::Malformed { position }
    }

    /// Byte offset of the offending input.
    pub fn position(&self) -> usize {
        match self {
            DecodeError::Malformed { position }
            | DecodeError::InvalidUtf8 { position }
            | DecodeError::DepthLimitExceeded { position, .. } => *position,
        }
    }
}
