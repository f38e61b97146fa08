// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::ErrorKind;
use oj_storage::StoreError;

#[test]
fn constructors_set_the_matching_kind() {
    assert_eq!(EngineError::invalid_arg("x").kind(), ErrorKind::InvalidArg);
    assert_eq!(EngineError::not_found("x").kind(), ErrorKind::NotFound);
    assert_eq!(EngineError::state_conflict("x").kind(), ErrorKind::StateConflict);
    assert_eq!(EngineError::conflict("x").kind(), ErrorKind::Conflict);
    assert_eq!(EngineError::capacity_exceeded("x").kind(), ErrorKind::CapacityExceeded);
    assert_eq!(EngineError::busy("x").kind(), ErrorKind::Busy);
}

#[test]
fn display_is_the_bare_message() {
    let err = EngineError::not_found("work item wrk-1 not found");
    assert_eq!(err.to_string(), "work item wrk-1 not found");
}

#[test]
fn store_lock_timeout_becomes_busy() {
    let store_err = StoreError::LockTimeout { scope: "state-store".to_string(), waited_secs: 5 };
    let err: EngineError = store_err.into();
    assert_eq!(err.kind(), ErrorKind::Busy);
}

#[test]
fn store_corrupt_becomes_corrupt_state() {
    let store_err = StoreError::Corrupt { document: "active-claims.json".to_string(), message: "bad json".to_string() };
    let err: EngineError = store_err.into();
    assert_eq!(err.kind(), ErrorKind::CorruptState);
}

#[test]
fn core_error_kind_is_preserved_through_conversion() {
    let core_err = oj_core::CoreError::invalid_arg("progress_percent must be <= 100");
    let err: EngineError = core_err.into();
    assert_eq!(err.kind(), ErrorKind::InvalidArg);
    assert_eq!(err.to_string(), "progress_percent must be <= 100");
}
