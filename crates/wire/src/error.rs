// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the span log (C2).
//!
//! Per spec §4.2, a failed span write must never abort the caller — the
//! writer logs the failure to stderr (via `tracing`) and counts it; these
//! error values exist so callers *can* observe a failure, not so they
//! must propagate it.

use oj_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("io error writing span log {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("span log {path} is not valid NDJSON: {message}")]
    Corrupt { path: String, message: String },
}

impl WireError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WireError::Io { .. } => ErrorKind::IoError,
            WireError::Corrupt { .. } => ErrorKind::CorruptState,
        }
    }
}
