// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The claim engine (C4, spec §4.4) — the heart of the core. Every
//! mutating operation here runs its body under
//! [`oj_storage::StateStore::with_exclusive_lock`] and finishes by
//! appending one or more spans, win or lose.

use oj_core::{Agent, AgentId, AgentStatus, Clock, Priority, WorkId, WorkItem, WorkStatus};
use oj_wire::span_log::attrs;
use std::cmp::Reverse;

use crate::context::{Coordinator, TraceContext};
use crate::error::EngineError;

impl<C: Clock> Coordinator<C> {
    /// §4.4.1: upsert an agent. Re-registering with the same team/role
    /// just refreshes the heartbeat and workload bookkeeping; a different
    /// team/role for an existing `agent_id` is a `CONFLICT` (this
    /// implementation never allows takeover).
    pub fn register_agent(
        &self,
        ctx: &TraceContext,
        agent_id: AgentId,
        team: &str,
        role: &str,
        capacity_max: u32,
        specialization: Option<String>,
    ) -> Result<Agent, EngineError> {
        let handle = self.start_span(
            ctx,
            "claim_engine.register_agent",
            attrs([("agent_id", agent_id.to_string().into())]),
        );

        if team.is_empty() || role.is_empty() {
            let err = EngineError::invalid_arg("team and role must be non-empty");
            self.finish_err(handle, err.kind(), &err.to_string());
            return Err(err);
        }
        if capacity_max < 1 {
            let err = EngineError::invalid_arg("capacity_max must be >= 1");
            self.finish_err(handle, err.kind(), &err.to_string());
            return Err(err);
        }

        let now = self.now();
        let result = self.store.with_exclusive_lock(|docs| {
            if let Some(existing) = docs.agent(&agent_id) {
                if existing.team != team || existing.role != role {
                    return Err(EngineError::Conflict(format!(
                        "agent {agent_id} already registered under a different team/role"
                    )));
                }
            }
            let agent = Agent::new(agent_id.clone(), team, role, capacity_max, specialization.clone(), now);
            docs.agent_registry.insert(agent_id.to_string(), agent.clone());
            Ok(agent)
        });

        match result {
            Ok(agent) => {
                self.finish_ok(handle, attrs([("team", team.into()), ("role", role.into())]));
                Ok(agent)
            }
            Err(e) => {
                self.finish_err(handle, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }

    /// §4.4.2.
    pub fn heartbeat(
        &self,
        ctx: &TraceContext,
        agent_id: &AgentId,
        status: Option<AgentStatus>,
        current_workload: Option<u32>,
    ) -> Result<Agent, EngineError> {
        let handle = self.start_span(
            ctx,
            "claim_engine.heartbeat",
            attrs([("agent_id", agent_id.to_string().into())]),
        );

        if status == Some(AgentStatus::Offline) {
            let err = EngineError::invalid_arg("heartbeat cannot set status to offline");
            self.finish_err(handle, err.kind(), &err.to_string());
            return Err(err);
        }

        let now = self.now();
        let result = self.store.with_exclusive_lock(|docs| {
            let agent = docs.agent_mut(agent_id).ok_or_else(|| {
                EngineError::not_found(format!("agent {agent_id} not found"))
            })?;
            agent.last_heartbeat_at = now;
            if let Some(s) = status {
                agent.status = s;
            }
            if let Some(w) = current_workload {
                agent.current_workload = w.min(agent.capacity_max);
            }
            Ok(agent.clone())
        });

        match result {
            Ok(agent) => {
                self.finish_ok(handle, []);
                Ok(agent)
            }
            Err(e) => {
                self.finish_err(handle, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }

    /// §4.4.3.
    pub fn create_work(
        &self,
        ctx: &TraceContext,
        work_type: &str,
        description: &str,
        priority: Priority,
        team: &str,
    ) -> Result<WorkItem, EngineError> {
        let handle = self.start_span(
            ctx,
            "claim_engine.create_work",
            attrs([("work_type", work_type.into()), ("team", team.into())]),
        );

        if work_type.is_empty() || description.is_empty() || team.is_empty() {
            let err = EngineError::invalid_arg("work_type, description, and team must be non-empty");
            self.finish_err(handle, err.kind(), &err.to_string());
            return Err(err);
        }

        let now = self.now();
        let item = WorkItem::create(work_type, description, priority, team, now);
        let result: Result<WorkItem, EngineError> = self.store.with_exclusive_lock(|docs| {
            docs.active_claims.push(item.clone());
            Ok(item.clone())
        });

        match result {
            Ok(item) => {
                self.finish_ok(handle, attrs([("work_id", item.work_id.to_string().into())]));
                Ok(item)
            }
            Err(e) => {
                self.finish_err(handle, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }

    /// §4.4.4, the central operation. `work_id` selects the targeted
    /// form; its absence selects next-claim, filtered by `work_type`/
    /// `team` and capped at `desired_count`, highest priority first, tied
    /// by ascending `created_at` then ascending `work_id`.
    ///
    /// `desired_count` is a ceiling, not a threshold: next-claim commits
    /// as many matching candidates as capacity allows, up to
    /// `desired_count` (spec end-to-end scenario 3 — `count=3` against
    /// two remaining slots yields two, not an error). `CAPACITY_EXCEEDED`
    /// is reserved for the case where the agent has *zero* remaining
    /// room at all.
    #[allow(clippy::too_many_arguments)]
    #[allow(clippy::expect_used)] // candidates/agent are looked up from the same locked snapshot
    pub fn claim(
        &self,
        ctx: &TraceContext,
        agent_id: &AgentId,
        work_id: Option<&WorkId>,
        work_type: Option<&str>,
        team: Option<&str>,
        desired_count: u32,
        require_nonempty: bool,
    ) -> Result<Vec<WorkItem>, EngineError> {
        let handle = self.start_span(
            ctx,
            "claim_engine.claim",
            attrs([("agent_id", agent_id.to_string().into())]),
        );

        if desired_count == 0 {
            let err = EngineError::invalid_arg("desired_count must be >= 1");
            self.finish_err(handle, err.kind(), &err.to_string());
            return Err(err);
        }

        let now = self.now();
        let agent_id = agent_id.clone();
        let target = work_id.cloned();
        let work_type = work_type.map(str::to_string);
        let team = team.map(str::to_string);

        let result: Result<Vec<WorkItem>, EngineError> = self.store.with_exclusive_lock(|docs| {
            let agent = docs
                .agent(&agent_id)
                .ok_or_else(|| EngineError::not_found(format!("agent {agent_id} not found")))?;
            if agent.status.is_offline() {
                return Err(EngineError::state_conflict(format!("agent {agent_id} is offline")));
            }
            let room = agent.capacity_max.saturating_sub(agent.current_workload);
            if room == 0 {
                return Err(EngineError::capacity_exceeded(format!(
                    "agent {agent_id} has no remaining capacity"
                )));
            }

            let claimed: Vec<WorkItem> = if let Some(work_id) = target {
                let item = docs
                    .work_item_mut(&work_id)
                    .ok_or_else(|| EngineError::not_found(format!("work item {work_id} not found")))?;
                if item.status != WorkStatus::Pending {
                    return Err(EngineError::state_conflict(format!(
                        "work item {work_id} is {}, not pending",
                        item.status
                    )));
                }
                item.claim(agent_id.clone(), now)?;
                vec![item.clone()]
            } else {
                let take = desired_count.min(room) as usize;
                // Priority desc, created_at asc, work_id asc (spec §4.4.4 step 3).
                let mut ordered: Vec<&WorkItem> = docs
                    .active_claims
                    .iter()
                    .filter(|w| w.status == WorkStatus::Pending)
                    .filter(|w| work_type.as_deref().map_or(true, |t| w.work_type == t))
                    .filter(|w| team.as_deref().map_or(true, |t| w.team == t))
                    .collect();
                ordered.sort_by(|a, b| {
                    Reverse(a.priority)
                        .cmp(&Reverse(b.priority))
                        .then(a.created_at.cmp(&b.created_at))
                        .then(a.work_id.as_str().cmp(b.work_id.as_str()))
                });
                let candidates: Vec<WorkId> =
                    ordered.into_iter().take(take).map(|w| w.work_id.clone()).collect();

                if candidates.is_empty() && require_nonempty {
                    return Err(EngineError::not_found("no matching pending work items"));
                }

                let mut claimed = Vec::with_capacity(candidates.len());
                for id in candidates {
                    let item = docs
                        .work_item_mut(&id)
                        .expect("candidate selected from the same snapshot");
                    item.claim(agent_id.clone(), now)?;
                    claimed.push(item.clone());
                }
                claimed
            };

            if !claimed.is_empty() {
                let agent = docs.agent_mut(&agent_id).expect("checked present above");
                agent.current_workload += claimed.len() as u32;
                agent.recompute_busy_status();
            }
            Ok(claimed)
        });

        match result {
            Ok(claimed) => {
                // §4.4.4 step 7: one span per claimed item, parented to this
                // operation's span, each carrying that item's own
                // priority/team/work_type — the aggregate `claimed_count` on
                // the operation span is a convenience, not a substitute.
                let item_ctx = TraceContext {
                    trace_id: Some(handle.trace_id.clone()),
                    parent_span_id: Some(handle.span_id.clone()),
                };
                for item in &claimed {
                    tracing::info!(work_id = %item.work_id, agent_id = %agent_id, "claimed");
                    let item_handle = self.start_span(
                        &item_ctx,
                        "claim_engine.claim",
                        attrs([
                            ("work_id", item.work_id.to_string().into()),
                            ("agent_id", agent_id.to_string().into()),
                            ("priority", item.priority.to_string().into()),
                            ("team", item.team.clone().into()),
                            ("work_type", item.work_type.clone().into()),
                        ]),
                    );
                    self.finish_ok(item_handle, []);
                }
                self.finish_ok(handle, attrs([("claimed_count", (claimed.len() as i64).into())]));
                Ok(claimed)
            }
            Err(e) => {
                self.finish_err(handle, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }

    /// §4.4.5.
    pub fn progress(
        &self,
        ctx: &TraceContext,
        work_id: &WorkId,
        progress_percent: u8,
        sub_status: Option<String>,
    ) -> Result<WorkItem, EngineError> {
        let handle = self.start_span(
            ctx,
            "claim_engine.progress",
            attrs([("work_id", work_id.to_string().into())]),
        );
        let result: Result<WorkItem, EngineError> = self.store.with_exclusive_lock(|docs| {
            let item = docs
                .work_item_mut(work_id)
                .ok_or_else(|| EngineError::not_found(format!("work item {work_id} not found")))?;
            item.set_progress(progress_percent, sub_status)?;
            Ok(item.clone())
        });
        match result {
            Ok(item) => {
                self.finish_ok(handle, attrs([("progress_percent", (item.progress_percent as i64).into())]));
                Ok(item)
            }
            Err(e) => {
                self.finish_err(handle, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }

    /// §4.4.6.
    pub fn block(&self, ctx: &TraceContext, work_id: &WorkId, reason: &str) -> Result<WorkItem, EngineError> {
        let handle = self.start_span(ctx, "claim_engine.block", attrs([("work_id", work_id.to_string().into())]));
        let reason = reason.to_string();
        let result: Result<WorkItem, EngineError> = self.store.with_exclusive_lock(|docs| {
            let item = docs
                .work_item_mut(work_id)
                .ok_or_else(|| EngineError::not_found(format!("work item {work_id} not found")))?;
            item.block(reason)?;
            Ok(item.clone())
        });
        match result {
            Ok(item) => {
                self.finish_ok(handle, []);
                Ok(item)
            }
            Err(e) => {
                self.finish_err(handle, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }

    /// §4.4.6.
    pub fn unblock(&self, ctx: &TraceContext, work_id: &WorkId) -> Result<WorkItem, EngineError> {
        let handle = self.start_span(ctx, "claim_engine.unblock", attrs([("work_id", work_id.to_string().into())]));
        let result: Result<WorkItem, EngineError> = self.store.with_exclusive_lock(|docs| {
            let item = docs
                .work_item_mut(work_id)
                .ok_or_else(|| EngineError::not_found(format!("work item {work_id} not found")))?;
            item.unblock()?;
            Ok(item.clone())
        });
        match result {
            Ok(item) => {
                self.finish_ok(handle, []);
                Ok(item)
            }
            Err(e) => {
                self.finish_err(handle, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }

    /// §4.4.7.
    #[allow(clippy::expect_used)] // item was just looked up under the same lock
    pub fn complete(
        &self,
        ctx: &TraceContext,
        work_id: &WorkId,
        result: &str,
        velocity_points: Option<u32>,
    ) -> Result<WorkItem, EngineError> {
        let handle = self.start_span(ctx, "claim_engine.complete", attrs([("work_id", work_id.to_string().into())]));
        let now = self.now();
        let result_text = result.to_string();
        let outcome: Result<WorkItem, EngineError> = self.store.with_exclusive_lock(|docs| {
            let item = docs
                .work_item(work_id)
                .ok_or_else(|| EngineError::not_found(format!("work item {work_id} not found")))?
                .clone();
            let agent_id = item.assigned_agent_id.clone();

            let item_mut = docs.work_item_mut(work_id).expect("checked above");
            item_mut.complete(result_text, velocity_points, now)?;
            let completed = item_mut.clone();

            if let Some(agent_id) = agent_id {
                if let Some(agent) = docs.agent_mut(&agent_id) {
                    agent.current_workload = agent.current_workload.saturating_sub(1);
                    agent.recompute_busy_status();
                }
            }
            let duration_ms = completed.completed_at.unwrap_or(now).saturating_sub(completed.created_at);
            docs.retire(work_id, duration_ms);
            Ok(completed)
        });
        match outcome {
            Ok(item) => {
                self.finish_ok(
                    handle,
                    attrs([("result", item.result.clone().unwrap_or_default().into())]),
                );
                Ok(item)
            }
            Err(e) => {
                self.finish_err(handle, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }

    /// §4.4.8.
    pub fn fail(&self, ctx: &TraceContext, work_id: &WorkId, reason: &str) -> Result<WorkItem, EngineError> {
        self.terminate(ctx, "claim_engine.fail", work_id, reason, false)
    }

    /// §4.4.8. Additionally permitted from `pending` (dropping the item
    /// without ever assigning an agent).
    pub fn cancel(&self, ctx: &TraceContext, work_id: &WorkId) -> Result<WorkItem, EngineError> {
        self.terminate(ctx, "claim_engine.cancel", work_id, "cancelled", true)
    }

    #[allow(clippy::expect_used)] // item was just looked up under the same lock
    fn terminate(
        &self,
        ctx: &TraceContext,
        operation_name: &str,
        work_id: &WorkId,
        reason: &str,
        is_cancel: bool,
    ) -> Result<WorkItem, EngineError> {
        let handle = self.start_span(ctx, operation_name, attrs([("work_id", work_id.to_string().into())]));
        let now = self.now();
        let reason = reason.to_string();
        let outcome: Result<WorkItem, EngineError> = self.store.with_exclusive_lock(|docs| {
            let item = docs
                .work_item(work_id)
                .ok_or_else(|| EngineError::not_found(format!("work item {work_id} not found")))?
                .clone();
            let agent_id = item.assigned_agent_id.clone();
            let had_workload = item.status.holds_workload();

            let item_mut = docs.work_item_mut(work_id).expect("checked above");
            if is_cancel {
                item_mut.cancel(now)?;
            } else {
                item_mut.fail(reason, now)?;
            }
            let terminated = item_mut.clone();

            if had_workload {
                if let Some(agent_id) = agent_id {
                    if let Some(agent) = docs.agent_mut(&agent_id) {
                        agent.current_workload = agent.current_workload.saturating_sub(1);
                        agent.recompute_busy_status();
                    }
                }
            }
            let duration_ms = terminated.completed_at.unwrap_or(now).saturating_sub(terminated.created_at);
            docs.retire(work_id, duration_ms);
            Ok(terminated)
        });
        match outcome {
            Ok(item) => {
                if is_cancel {
                    // Open question (spec §9): cancel never reassigns the
                    // dropped item back to `pending`. Recorded on the span
                    // since the spec requires the choice be observable.
                    self.finish_ok(handle, attrs([("reassigned", false.into())]));
                } else {
                    self.finish_ok(handle, []);
                }
                Ok(item)
            }
            Err(e) => {
                self.finish_err(handle, e.kind(), &e.to_string());
                Err(e)
            }
        }
    }
}
