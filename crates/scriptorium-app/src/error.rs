// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::EntityKind;

/// Failure taxonomy for entity fetches. Absence is its own variant so
/// detail screens can tell "not found" apart from a broken request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {message}")]
    Network { message: String },
    #[error("{kind} {id:?} not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("decode {kind} response: {message}")]
    Decode { kind: EntityKind, message: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
