// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn agent_id_display() {
    let id = AgentId::from_string("agt-test");
    assert_eq!(id.to_string(), "agt-test");
}

#[test]
fn agent_id_equality() {
    let id1 = AgentId::from_string("agt-1");
    let id2 = AgentId::from_string("agt-1");
    let id3 = AgentId::from_string("agt-2");

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
}

#[test]
fn agent_id_from_str() {
    let id: AgentId = "agt-test".into();
    assert_eq!(id.as_str(), "agt-test");
}

#[test]
fn agent_id_serde() {
    let id = AgentId::from_string("agt-my-agent");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"agt-my-agent\"");

    let parsed: AgentId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn agent_id_mint_has_prefix_and_is_unique() {
    let a = AgentId::new();
    let b = AgentId::new();
    assert!(a.as_str().starts_with("agt-"));
    assert_ne!(a, b);
}

#[test]
fn agent_status_display() {
    assert_eq!(AgentStatus::Registering.to_string(), "registering");
    assert_eq!(AgentStatus::Active.to_string(), "active");
    assert_eq!(AgentStatus::Busy.to_string(), "busy");
    assert_eq!(AgentStatus::Idle.to_string(), "idle");
    assert_eq!(AgentStatus::Maintenance.to_string(), "maintenance");
    assert_eq!(AgentStatus::Offline.to_string(), "offline");
}

#[test]
fn agent_status_serde_is_snake_case() {
    let json = serde_json::to_string(&AgentStatus::Busy).unwrap();
    assert_eq!(json, "\"busy\"");
}

#[test]
fn new_agent_starts_active_with_zero_workload() {
    let agent = Agent::new(AgentId::new(), "team-a", "dev", 3, None, 1_000);
    assert_eq!(agent.status, AgentStatus::Active);
    assert_eq!(agent.current_workload, 0);
    assert_eq!(agent.last_heartbeat_at, 1_000);
    assert_eq!(agent.registered_at, 1_000);
}

#[test]
fn within_capacity_respects_a1() {
    let mut agent = Agent::builder().capacity_max(2).current_workload(2).build();
    assert!(agent.within_capacity());
    agent.current_workload = 3;
    assert!(!agent.within_capacity());
}

#[test]
fn has_room_for_checks_prospective_claim() {
    let agent = Agent::builder().capacity_max(3).current_workload(2).build();
    assert!(agent.has_room_for(1));
    assert!(!agent.has_room_for(2));
}

#[test]
fn offline_invariant_requires_zero_workload() {
    let mut agent = Agent::builder()
        .status(AgentStatus::Offline)
        .current_workload(0)
        .build();
    assert!(agent.offline_invariant_holds());

    agent.current_workload = 1;
    assert!(!agent.offline_invariant_holds());
}

#[test]
fn recompute_busy_status_flips_at_capacity() {
    let mut agent = Agent::builder()
        .status(AgentStatus::Active)
        .capacity_max(2)
        .current_workload(2)
        .build();
    agent.recompute_busy_status();
    assert_eq!(agent.status, AgentStatus::Busy);

    agent.current_workload = 1;
    agent.recompute_busy_status();
    assert_eq!(agent.status, AgentStatus::Active);
}

#[test]
fn recompute_busy_status_leaves_offline_alone() {
    let mut agent = Agent::builder()
        .status(AgentStatus::Offline)
        .current_workload(0)
        .build();
    agent.recompute_busy_status();
    assert_eq!(agent.status, AgentStatus::Offline);
}
