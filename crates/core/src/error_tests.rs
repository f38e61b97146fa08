// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn exit_codes_match_spec_table() {
    assert_eq!(ErrorKind::InvalidArg.exit_code(), 2);
    assert_eq!(ErrorKind::Busy.exit_code(), 3);
    assert_eq!(ErrorKind::Conflict.exit_code(), 4);
    assert_eq!(ErrorKind::StateConflict.exit_code(), 4);
    assert_eq!(ErrorKind::NotFound.exit_code(), 5);
    assert_eq!(ErrorKind::CapacityExceeded.exit_code(), 6);
}

#[test]
fn fatal_kinds_fall_back_to_general_failure() {
    assert_eq!(ErrorKind::Timeout.exit_code(), 1);
    assert_eq!(ErrorKind::CorruptState.exit_code(), 1);
    assert_eq!(ErrorKind::IoError.exit_code(), 1);
}

#[test]
fn only_busy_is_internally_retryable() {
    assert!(ErrorKind::Busy.is_internally_retryable());
    assert!(!ErrorKind::Timeout.is_internally_retryable());
    assert!(!ErrorKind::StateConflict.is_internally_retryable());
}

#[test]
fn display_uses_screaming_snake_case() {
    assert_eq!(ErrorKind::CapacityExceeded.to_string(), "CAPACITY_EXCEEDED");
    assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
}

#[test]
fn serde_uses_screaming_snake_case() {
    let json = serde_json::to_string(&ErrorKind::StateConflict).unwrap();
    assert_eq!(json, "\"STATE_CONFLICT\"");
}

#[test]
fn core_error_display_combines_kind_and_message() {
    let err = CoreError::invalid_arg("capacity_max must be >= 1");
    assert_eq!(err.to_string(), "INVALID_ARG: capacity_max must be >= 1");
}
