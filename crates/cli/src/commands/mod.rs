// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Verb handlers (spec §6). Each function takes the open coordinator
//! plus its own parsed args and returns the envelope's `data` payload —
//! rendering (text vs. JSON) and exit-code mapping both live in
//! `crate::output`, not here.

pub mod agent;
pub mod maintenance;
pub mod queue;
pub mod work;

use oj_engine::EngineError;

/// Parse a value through a type's `#[serde(rename_all = "snake_case")]`
/// derive instead of hand-writing a second parser. `WorkStatus` and
/// `AgentStatus` (unlike `Priority`) have no bespoke `.parse()`, so this
/// round-trips the raw string through `serde_json` to reuse the derive.
pub fn parse_snake_case<T: serde::de::DeserializeOwned>(field: &str, s: &str) -> Result<T, EngineError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| EngineError::invalid_arg(format!("invalid {field}: {s}")))
}

/// Resolve the acting agent id from `--agent` or the `AGENT_ID`
/// environment variable (spec §6); verbs that act on behalf of an
/// agent require one or the other.
pub fn require_agent_id(cli_agent: &Option<String>) -> Result<oj_core::AgentId, EngineError> {
    cli_agent
        .clone()
        .or_else(|| std::env::var("AGENT_ID").ok())
        .map(|s| oj_core::AgentId::from(s.as_str()))
        .ok_or_else(|| EngineError::invalid_arg("no agent id: pass --agent or set AGENT_ID"))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
