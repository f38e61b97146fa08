// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The coordinator handle every operation in [`crate::claim`],
//! [`crate::registry`], [`crate::queue`], and [`crate::maintenance`] is a
//! method on. Bundles the locked state store, the span log, and the
//! resolved configuration — the three things spec.md's data-flow diagram
//! threads through every claim-engine call.
//!
//! Generic over [`Clock`] so business logic (capacity math, stale-sweep
//! thresholds, retention windows) is deterministically testable with
//! [`FakeClock`], mirroring the teacher's executor taking a clock handle
//! rather than calling `SystemTime::now()` inline.

use oj_core::{Clock, CoordinatorConfig, SystemClock};
use oj_wire::SpanLog;
use oj_storage::StateStore;

use crate::error::EngineError;

/// Trace/span-parent context threaded through one CLI invocation, read
/// from `TRACE_ID`/`PARENT_SPAN_ID` by the CLI boundary (spec §4.2
/// "contexts propagate trace_id and current span_id... across subprocess
/// invocations via environment") and passed down rather than read from
/// the environment again inside the engine.
#[derive(Debug, Clone, Default)]
pub struct TraceContext {
    pub trace_id: Option<String>,
    pub parent_span_id: Option<String>,
}

impl TraceContext {
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self {
            trace_id: std::env::var("TRACE_ID").ok(),
            parent_span_id: std::env::var("PARENT_SPAN_ID").ok(),
        }
    }

    fn resolve_trace_id(&self) -> String {
        self.trace_id.clone().unwrap_or_else(oj_core::new_trace_id)
    }
}

pub struct Coordinator<C: Clock = SystemClock> {
    pub store: StateStore,
    pub spans: SpanLog,
    pub config: CoordinatorConfig,
    pub clock: C,
}

impl Coordinator<SystemClock> {
    /// Open the state store and span log under `config.coordination_dir`.
    pub fn open(config: CoordinatorConfig) -> Result<Self, EngineError> {
        Self::open_with_clock(config, SystemClock)
    }
}

impl<C: Clock> Coordinator<C> {
    pub fn open_with_clock(config: CoordinatorConfig, clock: C) -> Result<Self, EngineError> {
        let store = StateStore::open(&config)?;
        let spans = SpanLog::open(config.coordination_dir.join("spans.ndjson"))
            .map_err(|e| EngineError::InvalidArg(e.to_string()))?;
        Ok(Self { store, spans, config, clock })
    }

    pub fn now(&self) -> u64 {
        self.clock.epoch_ms()
    }

    /// Start a span for one claim-engine operation, resolving `trace_id`
    /// from `ctx` (falling back to a fresh one) so every operation shows
    /// up under some trace even when invoked without an inherited context.
    pub(crate) fn start_span(
        &self,
        ctx: &TraceContext,
        operation_name: &str,
        attrs: std::collections::BTreeMap<String, oj_core::AttrValue>,
    ) -> oj_core::SpanHandle {
        oj_core::SpanHandle::new(
            ctx.resolve_trace_id(),
            ctx.parent_span_id.clone(),
            operation_name.to_string(),
            "oj-engine",
            attrs,
        )
    }

    pub(crate) fn finish_ok(
        &self,
        handle: oj_core::SpanHandle,
        extra: impl IntoIterator<Item = (String, oj_core::AttrValue)>,
    ) {
        self.spans.finish_and_append(handle, oj_core::SpanStatus::Ok, extra);
    }

    pub(crate) fn finish_err(
        &self,
        handle: oj_core::SpanHandle,
        kind: oj_core::ErrorKind,
        message: &str,
    ) {
        self.spans.finish_and_append(
            handle,
            oj_core::SpanStatus::Error,
            [
                ("error_kind".to_string(), oj_core::AttrValue::from(kind.to_string())),
                ("error_message".to_string(), oj_core::AttrValue::from(message.to_string())),
            ],
        );
    }
}
