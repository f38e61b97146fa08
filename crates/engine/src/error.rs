// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claim-engine errors (spec §7), same shape as `oj_core::CoreError` and
//! `oj_storage::StoreError`: one `thiserror` enum at the crate boundary,
//! each variant carrying a fully-formed message and mapping to exactly
//! one [`oj_core::ErrorKind`]. Every locked operation in [`crate::claim`],
//! [`crate::registry`], and [`crate::maintenance`] propagates through
//! `?`, which requires the two `From` impls below — `oj_storage`'s
//! `with_exclusive_lock` is generic over `E: From<StoreError>`, and
//! `WorkItem`'s transition methods return `Result<_, CoreError>`.

use oj_core::{CoreError, ErrorKind};
use oj_storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0}")]
    InvalidArg(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    StateConflict(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    CapacityExceeded(String),
    #[error("{0}")]
    Busy(String),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    CorruptState(String),
    #[error("{0}")]
    IoError(String),
}

impl EngineError {
    pub fn invalid_arg(message: impl Into<String>) -> Self {
        Self::InvalidArg(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::StateConflict(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn capacity_exceeded(message: impl Into<String>) -> Self {
        Self::CapacityExceeded(message.into())
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::Busy(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArg(_) => ErrorKind::InvalidArg,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::StateConflict(_) => ErrorKind::StateConflict,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::CapacityExceeded(_) => ErrorKind::CapacityExceeded,
            Self::Busy(_) => ErrorKind::Busy,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::CorruptState(_) => ErrorKind::CorruptState,
            Self::IoError(_) => ErrorKind::IoError,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e.kind() {
            ErrorKind::Busy => Self::Busy(message),
            ErrorKind::CorruptState => Self::CorruptState(message),
            _ => Self::IoError(message),
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(e: CoreError) -> Self {
        let CoreError { kind, message } = e;
        match kind {
            ErrorKind::InvalidArg => Self::InvalidArg(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::StateConflict => Self::StateConflict(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::CapacityExceeded => Self::CapacityExceeded(message),
            ErrorKind::Busy => Self::Busy(message),
            ErrorKind::Timeout => Self::Timeout(message),
            ErrorKind::CorruptState => Self::CorruptState(message),
            ErrorKind::IoError => Self::IoError(message),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
