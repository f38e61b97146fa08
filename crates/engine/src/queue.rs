// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work queue view (C6, spec §4.6) — read-only projections over a
//! single state-store snapshot. No query here ever touches
//! `with_exclusive_lock`; `read_snapshot` is sufficient and keeps these
//! from blocking mutating operations any longer than the read itself.

use oj_core::{AgentId, Clock, Priority, WorkItem, WorkStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::context::Coordinator;
use crate::error::EngineError;

/// Threshold past which a blocked item counts as "stale" in the
/// dashboard's top-N report. Not in `CoordinatorConfig` because it's a
/// reporting knob, not a correctness-affecting one.
const STALE_BLOCKED_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Default)]
pub struct ListWorkFilter {
    pub status: Option<WorkStatus>,
    pub priority: Option<Priority>,
    pub team: Option<String>,
    pub assigned_agent_id: Option<AgentId>,
    pub work_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamCapacity {
    pub team: String,
    pub capacity_total: u32,
    pub workload_total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub counts_by_status: BTreeMap<String, usize>,
    pub team_capacity: Vec<TeamCapacity>,
    pub stale_blocked: Vec<WorkItem>,
    pub completion_rate_last_window: f64,
    pub health_score: f64,
}

impl<C: Clock> Coordinator<C> {
    pub fn list_work(&self, filter: &ListWorkFilter) -> Result<Vec<WorkItem>, EngineError> {
        let snap = self.store.read_snapshot()?;
        Ok(snap
            .active_claims
            .into_iter()
            .chain(snap.completed_log.into_iter().map(|r| r.item))
            .filter(|w| filter.status.map_or(true, |s| w.status == s))
            .filter(|w| filter.priority.map_or(true, |p| w.priority == p))
            .filter(|w| filter.team.as_deref().map_or(true, |t| w.team == t))
            .filter(|w| {
                filter
                    .assigned_agent_id
                    .as_ref()
                    .map_or(true, |a| w.assigned_agent_id.as_ref() == Some(a))
            })
            .filter(|w| filter.work_type.as_deref().map_or(true, |t| w.work_type == t))
            .collect())
    }

    pub fn queue_depth(&self, team: Option<&str>) -> Result<usize, EngineError> {
        let snap = self.store.read_snapshot()?;
        Ok(snap
            .active_claims
            .iter()
            .filter(|w| w.status == WorkStatus::Pending)
            .filter(|w| team.map_or(true, |t| w.team == t))
            .count())
    }

    /// §4.6: counts by status, per-team capacity vs. workload, top-N
    /// stale blocked items, completion rate over the last window, and
    /// `health_score`.
    pub fn dashboard(&self) -> Result<Dashboard, EngineError> {
        let snap = self.store.read_snapshot()?;
        let now = self.now();

        let mut counts_by_status: BTreeMap<String, usize> = BTreeMap::new();
        for item in snap.active_claims.iter() {
            *counts_by_status.entry(item.status.to_string()).or_default() += 1;
        }
        for record in snap.completed_log.iter() {
            *counts_by_status.entry(record.item.status.to_string()).or_default() += 1;
        }

        let mut by_team: BTreeMap<String, TeamCapacity> = BTreeMap::new();
        for agent in snap.agent_registry.values() {
            let entry = by_team.entry(agent.team.clone()).or_insert_with(|| TeamCapacity {
                team: agent.team.clone(),
                capacity_total: 0,
                workload_total: 0,
            });
            entry.capacity_total += agent.capacity_max;
            entry.workload_total += agent.current_workload;
        }

        let mut stale_blocked: Vec<WorkItem> = snap
            .active_claims
            .iter()
            .filter(|w| w.status == WorkStatus::Blocked)
            .filter(|w| {
                let since = w.started_at.unwrap_or(w.created_at);
                now.saturating_sub(since) >= STALE_BLOCKED_MS
            })
            .cloned()
            .collect();
        stale_blocked.sort_by_key(|w| w.started_at.unwrap_or(w.created_at));
        stale_blocked.truncate(10);

        let window_start = now.saturating_sub(24 * 60 * 60 * 1000);
        let completed_in_window =
            snap.completed_log.iter().filter(|r| r.item.completed_at.unwrap_or(0) >= window_start).count();
        let total_in_window = completed_in_window
            + snap
                .active_claims
                .iter()
                .filter(|w| w.created_at >= window_start && w.is_terminal())
                .count();
        let completion_rate_last_window = if total_in_window == 0 {
            1.0
        } else {
            completed_in_window as f64 / total_in_window as f64
        };

        let health_score = self.health_score_from(&snap)?;

        Ok(Dashboard {
            counts_by_status,
            team_capacity: by_team.into_values().collect(),
            stale_blocked,
            completion_rate_last_window,
            health_score,
        })
    }

    pub fn health_score(&self) -> Result<f64, EngineError> {
        let snap = self.store.read_snapshot()?;
        self.health_score_from(&snap)
    }

    /// Composite of queue depth, stale-blocked count, and per-team
    /// capacity pressure, each normalized to `[0,1]` and averaged; `1.0`
    /// is healthy, `0.0` is maximally degraded. Used both by the
    /// `dashboard` query and the `health_check` maintenance job.
    pub(crate) fn health_score_from(&self, snap: &oj_storage::Documents) -> Result<f64, EngineError> {
        let now = self.now();
        let pending = snap.active_claims.iter().filter(|w| w.status == WorkStatus::Pending).count();
        let depth_penalty = (pending as f64 / 50.0).min(1.0);

        let stale = snap
            .active_claims
            .iter()
            .filter(|w| w.status == WorkStatus::Blocked)
            .filter(|w| now.saturating_sub(w.started_at.unwrap_or(w.created_at)) >= STALE_BLOCKED_MS)
            .count();
        let stale_penalty = (stale as f64 / 10.0).min(1.0);

        let capacity_penalty = if snap.agent_registry.is_empty() {
            0.0
        } else {
            let (total_capacity, total_workload) = snap
                .agent_registry
                .values()
                .fold((0u32, 0u32), |(c, w), a| (c + a.capacity_max, w + a.current_workload));
            if total_capacity == 0 {
                1.0
            } else {
                (total_workload as f64 / total_capacity as f64).min(1.0)
            }
        };

        let penalty = (depth_penalty + stale_penalty + capacity_penalty) / 3.0;
        Ok((1.0 - penalty).clamp(0.0, 1.0))
    }
}
