// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identity and registry record types.
//!
//! An agent is a logical worker identity — a process, a human, or a
//! higher-level entity — registered with the coordinator. `current_workload`
//! is a cache of the count of active-or-blocked work items assigned to this
//! agent (A2); the claim engine is responsible for keeping it in sync, the
//! type itself only enforces A1 (capacity) and A3 (offline implies idle).

use crate::define_id;
use serde::{Deserialize, Serialize};

define_id! {
    /// Unique identifier for a registered agent.
    pub struct AgentId("agt-");
}

/// Lifecycle status of a registered agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// `register_agent` has been called but the upsert has not yet committed.
    Registering,
    Active,
    Busy,
    Idle,
    Maintenance,
    /// Reached via explicit deregister or the stale-heartbeat sweep.
    Offline,
}

crate::simple_display! {
    AgentStatus {
        Registering => "registering",
        Active => "active",
        Busy => "busy",
        Idle => "idle",
        Maintenance => "maintenance",
        Offline => "offline",
    }
}

impl AgentStatus {
    pub fn is_offline(self) -> bool {
        matches!(self, Self::Offline)
    }
}

/// A registered agent and its current capacity/workload accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    pub team: String,
    pub role: String,
    pub capacity_max: u32,
    pub current_workload: u32,
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    pub last_heartbeat_at: u64,
    pub registered_at: u64,
}

impl Agent {
    pub fn new(
        agent_id: AgentId,
        team: impl Into<String>,
        role: impl Into<String>,
        capacity_max: u32,
        specialization: Option<String>,
        now_epoch_ms: u64,
    ) -> Self {
        Self {
            agent_id,
            team: team.into(),
            role: role.into(),
            capacity_max,
            current_workload: 0,
            status: AgentStatus::Active,
            specialization,
            last_heartbeat_at: now_epoch_ms,
            registered_at: now_epoch_ms,
        }
    }

    /// A1: is `current_workload` within `[0, capacity_max]`.
    pub fn within_capacity(&self) -> bool {
        self.current_workload <= self.capacity_max
    }

    /// Would claiming `additional` more items keep A1 satisfied.
    pub fn has_room_for(&self, additional: u32) -> bool {
        self.current_workload.saturating_add(additional) <= self.capacity_max
    }

    /// A3: an offline agent must carry no active workload.
    pub fn offline_invariant_holds(&self) -> bool {
        !self.status.is_offline() || self.current_workload == 0
    }

    /// Recompute `busy`/`active` status from workload vs. capacity, per the
    /// claim engine's post-mutation bookkeeping (§4.4.4 step 5, §4.4.7
    /// step 3). Does not touch `offline`/`maintenance`/`registering`.
    pub fn recompute_busy_status(&mut self) {
        if matches!(self.status, AgentStatus::Active | AgentStatus::Busy) {
            self.status = if self.current_workload >= self.capacity_max {
                AgentStatus::Busy
            } else {
                AgentStatus::Active
            };
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct AgentBuilder => Agent {
        into {
            team: String = "team-a",
            role: String = "dev",
        }
        set {
            capacity_max: u32 = 3,
            current_workload: u32 = 0,
            status: AgentStatus = AgentStatus::Active,
            last_heartbeat_at: u64 = 1_000,
            registered_at: u64 = 1_000,
        }
        option {
            specialization: String = None,
        }
        computed {
            agent_id: AgentId = AgentId::new(),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
