// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oj-storage: the state store (C3) — three JSON documents under an
//! exclusive lock, committed via write-temp-then-rename, with fast-path
//! (OS `flock`) and safe-path (PID rendezvous) locking selected once at
//! startup.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod documents;
pub mod error;
pub mod lock;

pub use documents::{CompletedWorkRecord, Documents, StateStore};
pub use error::StoreError;
pub use lock::LockGuard;
