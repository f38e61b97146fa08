// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State store errors (C3), classified per spec §7.

use oj_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{document} is not valid JSON: {message}")]
    Corrupt { document: String, message: String },
    #[error("lock on {scope} timed out after {waited_secs}s")]
    LockTimeout { scope: String, waited_secs: u64 },
    #[error("write to {document} failed schema validation, rename aborted: {message}")]
    ValidationFailed { document: String, message: String },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Io { .. } => ErrorKind::IoError,
            StoreError::Corrupt { .. } => ErrorKind::CorruptState,
            StoreError::LockTimeout { .. } => ErrorKind::Busy,
            StoreError::ValidationFailed { .. } => ErrorKind::CorruptState,
        }
    }
}
