// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Span record — the unit written by the append-only span log (C2).
//!
//! A span is never rewritten in place. The in-process `SpanHandle` returned
//! by `start_span` tracks the open record; `end_span` finalizes it into the
//! single record actually serialized, which is the simpler of the two
//! choices spec.md §3 leaves open ("both start and end are written as a
//! single record at operation completion").

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scalar attribute value attached to a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<u64> for AttrValue {
    fn from(v: u64) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

/// Terminal status recorded on a span (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStatus {
    Started,
    Ok,
    Error,
    Timeout,
}

crate::simple_display! {
    SpanStatus {
        Started => "started",
        Ok => "ok",
        Error => "error",
        Timeout => "timeout",
    }
}

/// One line of the append-only span log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    pub operation_name: String,
    pub service_name: String,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub status: SpanStatus,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
}

/// In-process handle for a span opened by `start_span` and not yet closed.
/// Not serialized directly; it carries what `end_span` needs to finalize a
/// single [`Span`] record.
#[derive(Debug, Clone)]
pub struct SpanHandle {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub operation_name: String,
    pub service_name: String,
    pub start_time: String,
    pub start_ns: u64,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl SpanHandle {
    pub fn new(
        trace_id: impl Into<String>,
        parent_span_id: Option<String>,
        operation_name: impl Into<String>,
        service_name: impl Into<String>,
        attributes: BTreeMap<String, AttrValue>,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: crate::id::new_span_id(),
            parent_span_id,
            operation_name: operation_name.into(),
            service_name: service_name.into(),
            start_time: crate::id::now_wall_iso8601_ms(),
            start_ns: crate::id::now_monotonic_ns(),
            attributes,
        }
    }

    /// Finalize into the single record written to the span log.
    pub fn finish(
        mut self,
        status: SpanStatus,
        extra_attributes: impl IntoIterator<Item = (String, AttrValue)>,
    ) -> Span {
        let end_time = crate::id::now_wall_iso8601_ms();
        let duration_ms = crate::id::now_monotonic_ns()
            .saturating_sub(self.start_ns)
            / 1_000_000;
        self.attributes.extend(extra_attributes);
        Span {
            trace_id: self.trace_id,
            span_id: self.span_id,
            parent_span_id: self.parent_span_id,
            operation_name: self.operation_name,
            service_name: self.service_name,
            start_time: self.start_time,
            end_time: Some(end_time),
            duration_ms: Some(duration_ms),
            status,
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
#[path = "span_tests.rs"]
mod tests;
