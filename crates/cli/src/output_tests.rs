// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_wire::Envelope;

#[test]
fn exit_code_for_success_is_zero() {
    let envelope = Envelope::success("trace-1", "dashboard", None, 4, serde_json::json!({}));
    assert_eq!(exit_code_for(&envelope), 0);
}

#[test]
fn exit_code_for_error_maps_through_error_kind() {
    let envelope = Envelope::error(
        "trace-1",
        "claim",
        Some("a1".to_string()),
        4,
        ErrorKind::CapacityExceeded,
        "agent has no room",
    );
    assert_eq!(exit_code_for(&envelope), ErrorKind::CapacityExceeded.exit_code());
}

#[test]
fn exit_code_for_error_with_no_kind_falls_back_to_one() {
    let mut envelope = Envelope::error("trace-1", "claim", None, 4, ErrorKind::IoError, "boom");
    envelope.status.error_kind = None;
    assert_eq!(exit_code_for(&envelope), 1);
}

#[test]
fn scalar_or_json_renders_strings_bare() {
    assert_eq!(scalar_or_json(&serde_json::json!("pending")), "pending");
    assert_eq!(scalar_or_json(&serde_json::json!(null)), "-");
    assert_eq!(scalar_or_json(&serde_json::json!(3)), "3");
}
