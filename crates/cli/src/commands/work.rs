// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `claim`, `claim-next`, `progress`, `complete`, `fail`, `cancel`
//! (§4.4.3–4.4.8, §6 verb table).

use clap::Args;
use oj_core::{AgentId, Priority, SystemClock, WorkId};
use oj_engine::{Coordinator, EngineError, TraceContext};

#[derive(Args, Debug)]
pub struct ClaimArgs {
    /// Work type (a free-text category, e.g. "code_review").
    pub work_type: String,
    /// Human-readable description of the work.
    pub description: String,
    /// Priority; defaults to `medium`.
    #[arg(long, default_value = "medium")]
    pub priority: String,
    /// Team the new work item is filed under; defaults to the acting
    /// agent's team when omitted (the agent must already be registered).
    #[arg(long)]
    pub team: Option<String>,
}

/// §6 `claim`: create-and-claim shortcut. `ctx` must carry a shared
/// `trace_id` so the `create_work` and `claim` spans it emits correlate
/// under one trace rather than each minting its own.
#[allow(clippy::expect_used)] // require_nonempty=true guarantees a non-empty result
pub fn claim(
    coordinator: &Coordinator<SystemClock>,
    ctx: &TraceContext,
    agent_id: &AgentId,
    args: ClaimArgs,
) -> Result<serde_json::Value, EngineError> {
    let priority = Priority::parse(&args.priority)
        .ok_or_else(|| EngineError::invalid_arg(format!("invalid priority: {}", args.priority)))?;

    let team = match args.team {
        Some(team) => team,
        None => {
            let agent = coordinator
                .list_agents(&oj_engine::ListAgentsFilter { team: None, specialization: None, status: None })?
                .into_iter()
                .find(|a| a.agent_id == *agent_id)
                .ok_or_else(|| EngineError::not_found(format!("agent {agent_id} not found")))?;
            agent.team
        }
    };

    let created = coordinator.create_work(ctx, &args.work_type, &args.description, priority, &team)?;
    let claimed = coordinator.claim(ctx, agent_id, Some(&created.work_id), None, None, 1, true)?;
    let item = claimed.into_iter().next().expect("require_nonempty guarantees one item");
    serde_json::to_value(item).map_err(|e| EngineError::invalid_arg(e.to_string()))
}

#[derive(Args, Debug)]
pub struct ClaimNextArgs {
    /// Restrict candidates to this work type.
    #[arg(long = "work-type")]
    pub work_type: Option<String>,
    /// Restrict candidates to this team.
    #[arg(long)]
    pub team: Option<String>,
    /// Number of items to claim, up to the agent's remaining capacity.
    #[arg(long, default_value_t = 1)]
    pub count: u32,
}

pub fn claim_next(
    coordinator: &Coordinator<SystemClock>,
    ctx: &TraceContext,
    agent_id: &AgentId,
    args: ClaimNextArgs,
) -> Result<serde_json::Value, EngineError> {
    // Next-claim is a query, not a demand: an empty candidate set is a
    // normal outcome (spec scenario "contention on one item"), not an error.
    let claimed = coordinator.claim(
        ctx,
        agent_id,
        None,
        args.work_type.as_deref(),
        args.team.as_deref(),
        args.count,
        false,
    )?;
    serde_json::to_value(claimed).map_err(|e| EngineError::invalid_arg(e.to_string()))
}

#[derive(Args, Debug)]
pub struct ProgressArgs {
    pub work_id: String,
    /// Completion percentage, 0-100.
    pub percent: u8,
    #[arg(long = "sub-status")]
    pub sub_status: Option<String>,
}

pub fn progress(
    coordinator: &Coordinator<SystemClock>,
    ctx: &TraceContext,
    args: ProgressArgs,
) -> Result<serde_json::Value, EngineError> {
    let work_id = WorkId::from(args.work_id.as_str());
    let item = coordinator.progress(ctx, &work_id, args.percent, args.sub_status)?;
    serde_json::to_value(item).map_err(|e| EngineError::invalid_arg(e.to_string()))
}

#[derive(Args, Debug)]
pub struct CompleteArgs {
    pub work_id: String,
    pub result: String,
    #[arg(long)]
    pub velocity: Option<u32>,
}

pub fn complete(
    coordinator: &Coordinator<SystemClock>,
    ctx: &TraceContext,
    args: CompleteArgs,
) -> Result<serde_json::Value, EngineError> {
    let work_id = WorkId::from(args.work_id.as_str());
    let item = coordinator.complete(ctx, &work_id, &args.result, args.velocity)?;
    serde_json::to_value(item).map_err(|e| EngineError::invalid_arg(e.to_string()))
}

#[derive(Args, Debug)]
pub struct FailArgs {
    pub work_id: String,
    pub reason: String,
}

pub fn fail(
    coordinator: &Coordinator<SystemClock>,
    ctx: &TraceContext,
    args: FailArgs,
) -> Result<serde_json::Value, EngineError> {
    let work_id = WorkId::from(args.work_id.as_str());
    let item = coordinator.fail(ctx, &work_id, &args.reason)?;
    serde_json::to_value(item).map_err(|e| EngineError::invalid_arg(e.to_string()))
}

#[derive(Args, Debug)]
pub struct CancelArgs {
    pub work_id: String,
}

pub fn cancel(
    coordinator: &Coordinator<SystemClock>,
    ctx: &TraceContext,
    args: CancelArgs,
) -> Result<serde_json::Value, EngineError> {
    let work_id = WorkId::from(args.work_id.as_str());
    let item = coordinator.cancel(ctx, &work_id)?;
    serde_json::to_value(item).map_err(|e| EngineError::invalid_arg(e.to_string()))
}

#[cfg(test)]
#[path = "work_tests.rs"]
mod tests;
