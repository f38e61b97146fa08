// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work item identifier and state machine.
//!
//! A `WorkItem` is mutated only by the claim engine, under the state
//! store's exclusive lock; the transition methods here enforce I1–I5 at the
//! type level so the engine cannot construct an invariant-violating record
//! even if it forgets a check. Timestamps are epoch milliseconds (`u64`),
//! not `Instant`, because they cross process boundaries through the JSON
//! state documents.

use crate::agent::AgentId;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a work item.
    pub struct WorkId("wrk-");
}

/// Priority of a work item. Declared low-to-high so the derived `Ord`
/// sorts ascending; candidate selection in the claim engine sorts
/// descending (`critical` first) by reversing the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

crate::simple_display! {
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }
}

/// Lifecycle status of a work item (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Pending,
    Active,
    Blocked,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    WorkStatus {
        Pending => "pending",
        Active => "active",
        Blocked => "blocked",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl WorkStatus {
    /// I5: terminal statuses admit no further mutation.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// I1: statuses that count against an agent's `current_workload` (A2).
    pub fn holds_workload(self) -> bool {
        matches!(self, Self::Active | Self::Blocked)
    }
}

/// One unit of work tracked by the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub work_id: WorkId,
    pub work_type: String,
    pub description: String,
    pub priority: Priority,
    pub team: String,
    pub status: WorkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent_id: Option<AgentId>,
    pub progress_percent: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<String>,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_points: Option<u32>,
    pub trace_id: String,
}

impl WorkItem {
    /// `create_work` (§4.4.3): mints `work_id`/`trace_id`, starts `pending`.
    pub fn create(
        work_type: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        team: impl Into<String>,
        now_epoch_ms: u64,
    ) -> Self {
        Self {
            work_id: WorkId::new(),
            work_type: work_type.into(),
            description: description.into(),
            priority,
            team: team.into(),
            status: WorkStatus::Pending,
            assigned_agent_id: None,
            progress_percent: 0,
            sub_status: None,
            created_at: now_epoch_ms,
            claimed_at: None,
            started_at: None,
            completed_at: None,
            result: None,
            velocity_points: None,
            trace_id: crate::id::new_trace_id(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// I3: timestamps present so far are non-decreasing.
    pub fn timestamps_monotonic(&self) -> bool {
        let mut last = self.created_at;
        for ts in [self.claimed_at, self.started_at, self.completed_at]
            .into_iter()
            .flatten()
        {
            if ts < last {
                return false;
            }
            last = ts;
        }
        true
    }

    /// §4.4.4 steps 4: transition `pending → active`, assigned to `agent_id`.
    pub fn claim(&mut self, agent_id: AgentId, now_epoch_ms: u64) -> Result<(), CoreError> {
        if self.status != WorkStatus::Pending {
            return Err(CoreError::state_conflict(format!(
                "work item {} is {}, not pending",
                self.work_id, self.status
            )));
        }
        self.status = WorkStatus::Active;
        self.assigned_agent_id = Some(agent_id);
        self.claimed_at = Some(now_epoch_ms);
        self.started_at = Some(now_epoch_ms);
        Ok(())
    }

    /// §4.4.5: clamp progress to `[0,100]`; a regression is only accepted
    /// when `sub_status` explicitly downgrades the item.
    pub fn set_progress(
        &mut self,
        progress_percent: u8,
        sub_status: Option<String>,
    ) -> Result<(), CoreError> {
        if self.is_terminal() {
            return Err(CoreError::state_conflict(format!(
                "work item {} is terminal ({})",
                self.work_id, self.status
            )));
        }
        if self.status != WorkStatus::Active {
            return Err(CoreError::state_conflict(format!(
                "work item {} is {}, not active",
                self.work_id, self.status
            )));
        }
        let clamped = progress_percent.min(100);
        if clamped < self.progress_percent && sub_status.is_none() {
            return Err(CoreError::invalid_arg(format!(
                "progress regression from {} to {} requires an explicit sub_status",
                self.progress_percent, clamped
            )));
        }
        self.progress_percent = clamped;
        if sub_status.is_some() {
            self.sub_status = sub_status;
        }
        Ok(())
    }

    /// `active → blocked`. Idempotent.
    pub fn block(&mut self, reason: impl Into<String>) -> Result<(), CoreError> {
        match self.status {
            WorkStatus::Active => {
                self.status = WorkStatus::Blocked;
                self.sub_status = Some(reason.into());
                Ok(())
            }
            WorkStatus::Blocked => Ok(()),
            _ => Err(CoreError::state_conflict(format!(
                "work item {} is {}, cannot block",
                self.work_id, self.status
            ))),
        }
    }

    /// `blocked → active`. Idempotent.
    pub fn unblock(&mut self) -> Result<(), CoreError> {
        match self.status {
            WorkStatus::Blocked => {
                self.status = WorkStatus::Active;
                self.sub_status = None;
                Ok(())
            }
            WorkStatus::Active => Ok(()),
            _ => Err(CoreError::state_conflict(format!(
                "work item {} is {}, cannot unblock",
                self.work_id, self.status
            ))),
        }
    }

    /// §4.4.7: terminal success. I4 requires `progress_percent = 100`.
    pub fn complete(
        &mut self,
        result: impl Into<String>,
        velocity_points: Option<u32>,
        now_epoch_ms: u64,
    ) -> Result<(), CoreError> {
        if !matches!(self.status, WorkStatus::Active | WorkStatus::Blocked) {
            return Err(CoreError::state_conflict(format!(
                "work item {} is {}, cannot complete",
                self.work_id, self.status
            )));
        }
        self.status = WorkStatus::Completed;
        self.completed_at = Some(now_epoch_ms);
        self.progress_percent = 100;
        self.result = Some(result.into());
        self.velocity_points = velocity_points;
        Ok(())
    }

    /// §4.4.8: terminal failure, permitted from `active`/`blocked`.
    pub fn fail(&mut self, reason: impl Into<String>, now_epoch_ms: u64) -> Result<(), CoreError> {
        if !matches!(self.status, WorkStatus::Active | WorkStatus::Blocked) {
            return Err(CoreError::state_conflict(format!(
                "work item {} is {}, cannot fail",
                self.work_id, self.status
            )));
        }
        self.status = WorkStatus::Failed;
        self.completed_at = Some(now_epoch_ms);
        self.result = Some(reason.into());
        Ok(())
    }

    /// §4.4.8: `cancel` is additionally permitted from `pending`.
    pub fn cancel(&mut self, now_epoch_ms: u64) -> Result<(), CoreError> {
        if !matches!(
            self.status,
            WorkStatus::Pending | WorkStatus::Active | WorkStatus::Blocked
        ) {
            return Err(CoreError::state_conflict(format!(
                "work item {} is {}, cannot cancel",
                self.work_id, self.status
            )));
        }
        self.status = WorkStatus::Cancelled;
        self.completed_at = Some(now_epoch_ms);
        self.result = Some("cancelled".to_string());
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct WorkItemBuilder => WorkItem {
        into {
            work_type: String = "feature",
            description: String = "test work item",
            team: String = "team-a",
        }
        set {
            priority: Priority = Priority::Medium,
            status: WorkStatus = WorkStatus::Pending,
            progress_percent: u8 = 0,
            created_at: u64 = 1_000,
        }
        option {
            assigned_agent_id: AgentId = None,
            sub_status: String = None,
            claimed_at: u64 = None,
            started_at: u64 = None,
            completed_at: u64 = None,
            result: String = None,
            velocity_points: u32 = None,
        }
        computed {
            work_id: WorkId = WorkId::new(),
            trace_id: String = crate::id::new_trace_id(),
        }
    }
}

#[cfg(test)]
#[path = "work_item_tests.rs"]
mod tests;
