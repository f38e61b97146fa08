// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-core: data model, clock/ID service, and error classification shared
//! by every other `oj` crate.

pub mod macros;

pub mod agent;
pub mod clock;
pub mod config;
pub mod error;
pub mod id;
pub mod span;
pub mod work_item;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(any(test, feature = "test-support"))]
pub use agent::AgentBuilder;
pub use agent::{Agent, AgentId, AgentStatus};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigOverrides, CoordinationMode, CoordinatorConfig};
pub use error::{CoreError, ErrorKind};
pub use id::{new_span_id, new_trace_id, now_monotonic_ns, now_wall_iso8601_ms, short, IdBuf};
pub use span::{AttrValue, Span, SpanHandle, SpanStatus};
#[cfg(any(test, feature = "test-support"))]
pub use work_item::WorkItemBuilder;
pub use work_item::{Priority, WorkId, WorkItem, WorkStatus};
