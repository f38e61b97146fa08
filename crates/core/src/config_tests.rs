// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

#[test]
fn defaults_are_sane() {
    let config = CoordinatorConfig::default();
    assert_eq!(config.lock_wait_sec, 5);
    assert_eq!(config.heartbeat_timeout_sec, 120);
    assert_eq!(config.completed_retention_days, 30);
    assert_eq!(config.coordination_mode, CoordinationMode::Auto);
}

#[test]
fn load_with_no_file_or_env_returns_defaults_under_given_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoordinatorConfig::load(dir.path(), ConfigOverrides::default()).unwrap();
    assert_eq!(config.coordination_dir, dir.path());
    assert_eq!(config.lock_wait_sec, 5);
}

#[test]
fn toml_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "lock_wait_sec = 9\ncoordination_mode = \"safe\"\n",
    )
    .unwrap();
    let config = CoordinatorConfig::load(dir.path(), ConfigOverrides::default()).unwrap();
    assert_eq!(config.lock_wait_sec, 9);
    assert_eq!(config.coordination_mode, CoordinationMode::Safe);
    // Fields the file didn't set keep their default.
    assert_eq!(config.heartbeat_timeout_sec, 120);
}

#[test]
fn cli_overrides_beat_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "lock_wait_sec = 9\n").unwrap();
    let overrides = ConfigOverrides {
        lock_wait_sec: Some(42),
        ..Default::default()
    };
    let config = CoordinatorConfig::load(dir.path(), overrides).unwrap();
    assert_eq!(config.lock_wait_sec, 42);
}

#[test]
fn invalid_toml_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "not valid [[[ toml").unwrap();
    let err = CoordinatorConfig::load(dir.path(), ConfigOverrides::default()).unwrap_err();
    assert_eq!(err.kind, crate::error::ErrorKind::InvalidArg);
}

#[test]
fn coordination_mode_parse_is_case_insensitive() {
    assert_eq!(CoordinationMode::parse("FAST"), Some(CoordinationMode::Fast));
    assert_eq!(CoordinationMode::parse("bogus"), None);
}

#[test]
fn overrides_apply_only_set_fields() {
    let mut config = CoordinatorConfig::default();
    let overrides = ConfigOverrides {
        coordination_dir: Some(PathBuf::from("/srv/oj")),
        ..Default::default()
    };
    overrides.apply(&mut config);
    assert_eq!(config.coordination_dir, PathBuf::from("/srv/oj"));
    assert_eq!(config.lock_wait_sec, 5);
}
