// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `register` and `heartbeat` (§4.4.1–4.4.2, §6 verb table).

use clap::Args;
use oj_core::{AgentId, AgentStatus, SystemClock};
use oj_engine::{Coordinator, EngineError, TraceContext};

use super::parse_snake_case;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Agent identifier; re-registering the same id refreshes it.
    pub agent_id: String,
    /// Team this agent belongs to.
    pub team: String,
    /// Role within the team.
    pub role: String,
    /// Maximum number of work items this agent can hold concurrently.
    pub capacity_max: u32,
    /// Optional free-text specialization used by `find_by_specialization`.
    pub specialization: Option<String>,
}

pub fn register(
    coordinator: &Coordinator<SystemClock>,
    ctx: &TraceContext,
    args: RegisterArgs,
) -> Result<serde_json::Value, EngineError> {
    let agent_id = AgentId::from(args.agent_id.as_str());
    let agent = coordinator.register_agent(
        ctx,
        agent_id,
        &args.team,
        &args.role,
        args.capacity_max,
        args.specialization,
    )?;
    serde_json::to_value(agent).map_err(|e| EngineError::invalid_arg(e.to_string()))
}

#[derive(Args, Debug)]
pub struct HeartbeatArgs {
    /// Agent identifier.
    pub agent_id: String,
    /// Optional status update; `offline` is rejected here (use deregister).
    #[arg(long)]
    pub status: Option<String>,
    /// Optional current workload override.
    #[arg(long)]
    pub workload: Option<u32>,
}

pub fn heartbeat(
    coordinator: &Coordinator<SystemClock>,
    ctx: &TraceContext,
    args: HeartbeatArgs,
) -> Result<serde_json::Value, EngineError> {
    let agent_id = AgentId::from(args.agent_id.as_str());
    let status = args.status.as_deref().map(|s| parse_snake_case::<AgentStatus>("status", s)).transpose()?;
    let agent = coordinator.heartbeat(ctx, &agent_id, status, args.workload)?;
    serde_json::to_value(agent).map_err(|e| EngineError::invalid_arg(e.to_string()))
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
