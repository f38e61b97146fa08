// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error classification (spec §7).
//!
//! Every crate above `oj-core` — storage, engine, daemon, cli — defines its
//! own `thiserror` enum at its boundary, but each variant carries one of
//! these [`ErrorKind`]s rather than inventing its own taxonomy. The kind is
//! what travels: into span attributes, into the CLI's JSON envelope, and
//! into the exit-code mapping (§4.8). Kinds are behavior classes, not type
//! names — retry policy hangs off the kind, not the call site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behavior class of a failure, shared by every crate's own error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed input. Never retry; user error.
    InvalidArg,
    /// Target entity missing. Never retry.
    NotFound,
    /// Entity exists but is not in a state that admits the requested
    /// transition. Retry only if the caller believes the conflict resolves.
    StateConflict,
    /// Structural conflict (e.g. duplicate registration). Retry policy is
    /// configuration-dependent.
    Conflict,
    /// Agent cannot hold more work; caller must reduce `desired_count` or
    /// wait.
    CapacityExceeded,
    /// Lock contention. Retry with small exponential backoff and jitter,
    /// bounded attempts.
    Busy,
    /// An external resource (lock, fsync, subprocess) exceeded its
    /// deadline. Retriable once, otherwise surface.
    Timeout,
    /// A state file failed schema validation, or an I/A invariant is
    /// violated by the in-memory snapshot. Fatal; only `reality_verify`
    /// is the recovery surface.
    CorruptState,
    /// Lower-level filesystem failure. Fatal for the operation.
    IoError,
}

impl ErrorKind {
    /// CLI exit code per spec §4.8. `0`/`1`/general failure are not
    /// represented here — those are assigned by the CLI boundary itself.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::InvalidArg => 2,
            ErrorKind::Busy => 3,
            ErrorKind::Conflict | ErrorKind::StateConflict => 4,
            ErrorKind::NotFound => 5,
            ErrorKind::CapacityExceeded => 6,
            ErrorKind::Timeout
            | ErrorKind::CorruptState
            | ErrorKind::IoError => 1,
        }
    }

    /// Whether the claim engine's own retry budget (§7 propagation policy)
    /// applies to this kind without the caller asking for it.
    pub fn is_internally_retryable(self) -> bool {
        matches!(self, ErrorKind::Busy)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidArg => "INVALID_ARG",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::StateConflict => "STATE_CONFLICT",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::CapacityExceeded => "CAPACITY_EXCEEDED",
            ErrorKind::Busy => "BUSY",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::CorruptState => "CORRUPT_STATE",
            ErrorKind::IoError => "IO_ERROR",
        };
        f.write_str(s)
    }
}

/// Error type for `oj-core`'s own data-model invariant checks (I1–I5,
/// A1–A3). Storage/engine/daemon/cli define their own richer enums but
/// reuse [`ErrorKind`] for classification.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct CoreError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_arg(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArg, message)
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StateConflict, message)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
