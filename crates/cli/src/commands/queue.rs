// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `list-work` and `dashboard` (§4.6, §6 verb table).

use clap::Args;
use oj_core::{AgentId, Priority, SystemClock};
use oj_engine::{Coordinator, EngineError, ListWorkFilter};

use super::parse_snake_case;

#[derive(Args, Debug)]
pub struct ListWorkArgs {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub team: Option<String>,
    #[arg(long = "assigned-agent")]
    pub assigned_agent: Option<String>,
    #[arg(long = "work-type")]
    pub work_type: Option<String>,
}

pub fn list_work(
    coordinator: &Coordinator<SystemClock>,
    args: ListWorkArgs,
) -> Result<serde_json::Value, EngineError> {
    let filter = ListWorkFilter {
        status: args.status.as_deref().map(|s| parse_snake_case("status", s)).transpose()?,
        priority: args
            .priority
            .as_deref()
            .map(|s| Priority::parse(s).ok_or_else(|| EngineError::invalid_arg(format!("invalid priority: {s}"))))
            .transpose()?,
        team: args.team,
        assigned_agent_id: args.assigned_agent.map(|s| AgentId::from(s.as_str())),
        work_type: args.work_type,
    };
    let items = coordinator.list_work(&filter)?;
    serde_json::to_value(items).map_err(|e| EngineError::invalid_arg(e.to_string()))
}

pub fn dashboard(coordinator: &Coordinator<SystemClock>) -> Result<serde_json::Value, EngineError> {
    let dashboard = coordinator.dashboard()?;
    serde_json::to_value(dashboard).map_err(|e| EngineError::invalid_arg(e.to_string()))
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
