// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry (C5, spec §4.5) — a thin layer over the state store.
//! The one non-trivial operation is `deregister`, which must reassign or
//! cancel the agent's active work items in the same transaction it goes
//! offline in, to preserve A3.

use oj_core::{Agent, AgentId, AgentStatus, Clock, WorkStatus};
use oj_wire::span_log::attrs;

use crate::context::{Coordinator, TraceContext};
use crate::error::EngineError;

/// What happens to an agent's active work on forcible deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeregisterPolicy {
    /// Active/blocked items go back to `pending` (reassignable).
    Reassign,
    /// Active/blocked items are cancelled outright.
    Cancel,
}

#[derive(Debug, Clone)]
pub struct ListAgentsFilter {
    pub team: Option<String>,
    pub specialization: Option<String>,
    pub status: Option<AgentStatus>,
}

impl<C: Clock> Coordinator<C> {
    pub fn list_agents(&self, filter: &ListAgentsFilter) -> Result<Vec<Agent>, EngineError> {
        let snap = self.store.read_snapshot()?;
        Ok(snap
            .agent_registry
            .into_values()
            .filter(|a| filter.team.as_deref().map_or(true, |t| a.team == t))
            .filter(|a| {
                filter
                    .specialization
                    .as_deref()
                    .map_or(true, |s| a.specialization.as_deref() == Some(s))
            })
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .collect())
    }

    pub fn find_by_team(&self, team: &str) -> Result<Vec<Agent>, EngineError> {
        self.list_agents(&ListAgentsFilter { team: Some(team.to_string()), specialization: None, status: None })
    }

    pub fn find_by_specialization(&self, specialization: &str) -> Result<Vec<Agent>, EngineError> {
        self.list_agents(&ListAgentsFilter {
            team: None,
            specialization: Some(specialization.to_string()),
            status: None,
        })
    }

    /// §4.5: explicit `set_status` outside of `heartbeat`'s narrower
    /// contract (heartbeat refuses `offline`; this doesn't, since going
    /// offline through here still runs the workload-safety check below).
    pub fn set_status(&self, agent_id: &AgentId, status: AgentStatus) -> Result<Agent, EngineError> {
        self.store.with_exclusive_lock(|docs| {
            let agent = docs
                .agent_mut(agent_id)
                .ok_or_else(|| EngineError::not_found(format!("agent {agent_id} not found")))?;
            if status == AgentStatus::Offline && agent.current_workload > 0 {
                return Err(EngineError::state_conflict(format!(
                    "agent {agent_id} still has {} active work items; use deregister",
                    agent.current_workload
                )));
            }
            agent.status = status;
            Ok(agent.clone())
        })
    }

    /// §4.5 deregister: transitions the agent to `offline`, reassigning
    /// or cancelling its active/blocked work in the same locked
    /// transaction so A3 never observes an intermediate violation.
    #[allow(clippy::expect_used)] // agent existence was just checked under the same lock
    pub fn deregister(
        &self,
        ctx: &TraceContext,
        agent_id: &AgentId,
        policy: DeregisterPolicy,
    ) -> Result<Agent, EngineError> {
        let handle = self.start_span(
            ctx,
            "agent_registry.deregister",
            attrs([("agent_id", agent_id.to_string().into())]),
        );
        let now = self.now();
        let result: Result<(Agent, u32), EngineError> = self.store.with_exclusive_lock(|docs| {
            if docs.agent(agent_id).is_none() {
                return Err(EngineError::not_found(format!("agent {agent_id} not found")));
            }
            let mut reassigned = 0u32;
            let mut cancelled = Vec::new();
            for item in docs.active_claims.iter_mut() {
                if item.assigned_agent_id.as_ref() != Some(agent_id) {
                    continue;
                }
                if !matches!(item.status, WorkStatus::Active | WorkStatus::Blocked) {
                    continue;
                }
                match policy {
                    DeregisterPolicy::Reassign => {
                        item.status = WorkStatus::Pending;
                        item.assigned_agent_id = None;
                        item.claimed_at = None;
                        item.started_at = None;
                    }
                    DeregisterPolicy::Cancel => {
                        item.cancel(now)?;
                        cancelled.push((item.work_id.clone(), item.created_at));
                    }
                }
                reassigned += 1;
            }
            for (work_id, created_at) in cancelled {
                docs.retire(&work_id, now.saturating_sub(created_at));
            }
            let agent = docs.agent_mut(agent_id).expect("checked present above");
            agent.current_workload = 0;
            agent.status = AgentStatus::Offline;
            let agent = agent.clone();
            Ok((agent, reassigned))
        });

        match result {
            Ok((agent, reassigned_count)) => {
                self.finish_ok(
                    handle,
                    attrs([
                        ("policy", format!("{policy:?}").into()),
                        ("reassigned_count", (reassigned_count as i64).into()),
                    ]),
                );
                Ok(agent)
            }
            Err(e) => {
                self.finish_err(handle, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }
}
