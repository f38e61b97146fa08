// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::agent::{Agent, AgentId, AgentStatus};
use crate::work_item::{Priority, WorkId, WorkItem, WorkStatus};

/// Proptest strategies for core state machine types, reused by
/// `oj-engine`'s and `oj-storage`'s P1–P8 invariant suites.
pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_priority() -> impl Strategy<Value = Priority> {
        prop_oneof![
            Just(Priority::Critical),
            Just(Priority::High),
            Just(Priority::Medium),
            Just(Priority::Low),
        ]
    }

    pub fn arb_non_terminal_status() -> impl Strategy<Value = WorkStatus> {
        prop_oneof![Just(WorkStatus::Pending), Just(WorkStatus::Active), Just(WorkStatus::Blocked)]
    }

    pub fn arb_agent_status() -> impl Strategy<Value = AgentStatus> {
        prop_oneof![
            Just(AgentStatus::Registering),
            Just(AgentStatus::Active),
            Just(AgentStatus::Busy),
            Just(AgentStatus::Idle),
            Just(AgentStatus::Maintenance),
            Just(AgentStatus::Offline),
        ]
    }
}

/// A pending work item with deterministic fields, for tests that only care
/// about state-machine behavior rather than exact content.
pub fn pending_work_item(team: &str, priority: Priority, created_at: u64) -> WorkItem {
    WorkItem::builder()
        .team(team)
        .priority(priority)
        .created_at(created_at)
        .build()
}

/// An active agent with room for `capacity_max` concurrent claims.
pub fn active_agent(team: &str, capacity_max: u32) -> Agent {
    Agent::builder().team(team).capacity_max(capacity_max).build()
}

pub fn test_agent_id(suffix: &str) -> AgentId {
    AgentId::from_string(format!("agt-test-{suffix}"))
}

pub fn test_work_id(suffix: &str) -> WorkId {
    WorkId::from_string(format!("wrk-test-{suffix}"))
}
