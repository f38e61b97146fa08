// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oj-wire: the append-only span log (C2) and the CLI's structured response
//! envelope (§4.8).
//!
//! Span records are the authoritative account of what the coordinator did —
//! the three JSON state documents in `oj-storage` are optimizations over the
//! same history, never the other way around (spec §3, §9).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod envelope;
pub mod error;
pub mod span_log;

pub use envelope::{Envelope, EnvelopeMetadata, EnvelopeStatus, StatusCode};
pub use error::WireError;
pub use span_log::SpanLog;
