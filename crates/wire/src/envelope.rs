// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The CLI's structured response envelope (spec §4.8) — a stable contract,
//! not an internal type, so field names and shape must not drift across
//! `oj-cli` releases. Grounded on the teacher's `oj-wire::Response`
//! tagged-enum convention, flattened into one fixed envelope shape per
//! spec's exact schema instead of a per-verb enum.

use oj_core::ErrorKind;
use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeStatus {
    pub code: StatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub operation: String,
}

/// `{ api_version, request_id, trace_id, status, data, metadata }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub api_version: String,
    pub request_id: String,
    pub trace_id: String,
    pub status: EnvelopeStatus,
    pub data: serde_json::Value,
    pub metadata: EnvelopeMetadata,
}

impl Envelope {
    pub fn success(
        trace_id: impl Into<String>,
        operation: impl Into<String>,
        agent_id: Option<String>,
        execution_time_ms: u64,
        data: serde_json::Value,
    ) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            request_id: oj_core::new_trace_id(),
            trace_id: trace_id.into(),
            status: EnvelopeStatus {
                code: StatusCode::Success,
                error_kind: None,
                message: "ok".to_string(),
            },
            data,
            metadata: EnvelopeMetadata { execution_time_ms, agent_id, operation: operation.into() },
        }
    }

    pub fn error(
        trace_id: impl Into<String>,
        operation: impl Into<String>,
        agent_id: Option<String>,
        execution_time_ms: u64,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            request_id: oj_core::new_trace_id(),
            trace_id: trace_id.into(),
            status: EnvelopeStatus {
                code: StatusCode::Error,
                error_kind: Some(kind),
                message: message.into(),
            },
            data: serde_json::Value::Null,
            metadata: EnvelopeMetadata { execution_time_ms, agent_id, operation: operation.into() },
        }
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
