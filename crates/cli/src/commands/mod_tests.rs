// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn parse_snake_case_round_trips_agent_status() {
    let status: oj_core::AgentStatus = parse_snake_case("status", "busy").unwrap();
    assert_eq!(status, oj_core::AgentStatus::Busy);
}

#[test]
fn parse_snake_case_rejects_unknown_variant() {
    let err = parse_snake_case::<oj_core::AgentStatus>("status", "nonexistent").unwrap_err();
    assert_eq!(err.kind(), oj_core::ErrorKind::InvalidArg);
}

#[test]
#[serial]
fn require_agent_id_prefers_cli_flag_over_env() {
    std::env::set_var("AGENT_ID", "a-from-env");
    let id = require_agent_id(&Some("a-from-flag".to_string())).unwrap();
    assert_eq!(id.as_str(), "a-from-flag");
    std::env::remove_var("AGENT_ID");
}

#[test]
#[serial]
fn require_agent_id_errors_with_neither() {
    std::env::remove_var("AGENT_ID");
    let err = require_agent_id(&None).unwrap_err();
    assert_eq!(err.kind(), oj_core::ErrorKind::InvalidArg);
}
