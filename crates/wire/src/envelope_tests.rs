// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn success_envelope_has_fixed_shape() {
    let env = Envelope::success(
        "trc-aaaa",
        "claim_engine.claim",
        Some("agt-1".to_string()),
        12,
        serde_json::json!({"work_id": "wrk-1"}),
    );
    assert_eq!(env.api_version, API_VERSION);
    assert_eq!(env.status.code, StatusCode::Success);
    assert!(env.status.error_kind.is_none());
    assert_eq!(env.metadata.operation, "claim_engine.claim");

    let value = serde_json::to_value(&env).unwrap();
    assert!(value.get("data").is_some());
    assert!(value.get("metadata").is_some());
}

#[test]
fn error_envelope_carries_error_kind() {
    let env = Envelope::error(
        "trc-bbbb",
        "claim_engine.claim",
        None,
        3,
        ErrorKind::NotFound,
        "work item wrk-9 not found",
    );
    assert_eq!(env.status.code, StatusCode::Error);
    assert_eq!(env.status.error_kind, Some(ErrorKind::NotFound));
    assert_eq!(env.data, serde_json::Value::Null);
}
