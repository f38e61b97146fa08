// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn detect_capability_resolves_auto_on_local_fs() {
    let dir = tempdir().unwrap();
    let mode = detect_capability(dir.path(), CoordinationMode::Auto);
    assert!(matches!(mode, CoordinationMode::Fast | CoordinationMode::Safe));
}

#[test]
fn fast_path_second_acquire_times_out_while_held() {
    let dir = tempdir().unwrap();
    let lock_path = dir.path().join("state.lock");
    let _guard = acquire_fast(&lock_path, Duration::from_secs(5), "test").unwrap();
    let second = acquire_fast(&lock_path, Duration::from_millis(50), "test");
    assert!(matches!(second, Err(StoreError::LockTimeout { .. })));
}

#[test]
fn fast_path_releases_on_drop() {
    let dir = tempdir().unwrap();
    let lock_path = dir.path().join("state.lock");
    {
        let _guard = acquire_fast(&lock_path, Duration::from_secs(5), "test").unwrap();
    }
    let second = acquire_fast(&lock_path, Duration::from_secs(1), "test");
    assert!(second.is_ok());
}

#[test]
fn safe_path_second_acquire_times_out_while_held() {
    let dir = tempdir().unwrap();
    let lock_path = dir.path().join("state.lock");
    let _guard = acquire_safe(&lock_path, Duration::from_secs(5), "test").unwrap();
    let second = acquire_safe(&lock_path, Duration::from_millis(50), "test");
    assert!(matches!(second, Err(StoreError::LockTimeout { .. })));
}

#[test]
fn safe_path_releases_on_drop() {
    let dir = tempdir().unwrap();
    let lock_path = dir.path().join("state.lock");
    {
        let _guard = acquire_safe(&lock_path, Duration::from_secs(5), "test").unwrap();
    }
    assert!(!lock_path.with_extension("pid").exists());
    let second = acquire_safe(&lock_path, Duration::from_secs(1), "test");
    assert!(second.is_ok());
}
