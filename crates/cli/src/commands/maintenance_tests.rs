// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::{CoordinatorConfig, SystemClock};
use oj_engine::TraceContext;
use tempfile::tempdir;

fn test_coordinator() -> Coordinator<SystemClock> {
    let dir = tempdir().unwrap();
    let config = CoordinatorConfig { coordination_dir: dir.keep(), ..CoordinatorConfig::default() };
    Coordinator::open(config).unwrap()
}

#[test]
fn health_check_returns_a_score() {
    let coordinator = test_coordinator();
    let ctx = TraceContext::fresh();
    let data = run(&coordinator, &ctx, MaintenanceArgs { job: "health_check".to_string() }).unwrap();
    assert!(data["score"].as_f64().unwrap() >= 0.0);
}

#[test]
fn unknown_job_is_invalid_arg() {
    let coordinator = test_coordinator();
    let ctx = TraceContext::fresh();
    let err = run(&coordinator, &ctx, MaintenanceArgs { job: "nonexistent".to_string() }).unwrap_err();
    assert_eq!(err.kind(), oj_core::ErrorKind::InvalidArg);
}
