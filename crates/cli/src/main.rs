// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `oj` — the CLI dispatcher (C8, spec §6): one subprocess invocation per
//! verb, a JSON or text response on stdout, and an exit code that encodes
//! the outcome without needing to parse output (spec §4.8). Every verb
//! opens its own [`Coordinator`] against the coordination directory — no
//! daemon required for the core claim loop; `oj-daemon` only runs the
//! maintenance cadence, and `maintenance <job>` here runs one job body
//! the same way that scheduler would.

mod color;
mod commands;
mod duration;
mod exit_error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use oj_core::{ConfigOverrides, CoordinatorConfig, SystemClock};
use oj_engine::{Coordinator, EngineError, TraceContext};
use oj_wire::Envelope;
use tracing_subscriber::EnvFilter;

use commands::{agent, maintenance, queue, work};
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "oj",
    about = "Work-claim coordinator for a swarm of autonomous agents",
    version = env!("BUILD_GIT_HASH"),
    styles = color::styles()
)]
struct Cli {
    /// Emit the JSON response envelope instead of the text summary.
    #[arg(long, global = true)]
    json: bool,

    /// Acting agent id; falls back to the `AGENT_ID` environment variable.
    #[arg(long, global = true)]
    agent: Option<String>,

    /// Override the configured lock wait, e.g. `30s`, `2m`.
    #[arg(long, global = true, value_parser = duration::parse_timeout_secs)]
    timeout: Option<u64>,

    /// Coordination directory; falls back to `COORDINATION_DIR`, then `.oj`.
    #[arg(long = "coordination-dir", global = true)]
    coordination_dir: Option<PathBuf>,

    #[command(subcommand)]
    verb: Verb,
}

#[derive(Subcommand, Debug)]
enum Verb {
    /// Register an agent with the swarm, or refresh its registration.
    Register(agent::RegisterArgs),
    /// Report liveness and, optionally, status and workload.
    Heartbeat(agent::HeartbeatArgs),
    /// Create a work item and claim it in one call.
    Claim(work::ClaimArgs),
    /// Claim the next eligible pending work item(s) off the queue.
    ClaimNext(work::ClaimNextArgs),
    /// Report percent-complete on an active work item.
    Progress(work::ProgressArgs),
    /// Mark a work item completed.
    Complete(work::CompleteArgs),
    /// Mark a work item failed.
    Fail(work::FailArgs),
    /// Cancel a work item.
    Cancel(work::CancelArgs),
    /// List work items, optionally filtered.
    ListWork(queue::ListWorkArgs),
    /// Print the swarm-wide health dashboard.
    Dashboard,
    /// Run one maintenance job body outside the scheduler's own cadence.
    Maintenance(maintenance::MaintenanceArgs),
    /// Print build version metadata.
    Version,
}

fn verb_name(verb: &Verb) -> &'static str {
    match verb {
        Verb::Register(_) => "register",
        Verb::Heartbeat(_) => "heartbeat",
        Verb::Claim(_) => "claim",
        Verb::ClaimNext(_) => "claim-next",
        Verb::Progress(_) => "progress",
        Verb::Complete(_) => "complete",
        Verb::Fail(_) => "fail",
        Verb::Cancel(_) => "cancel",
        Verb::ListWork(_) => "list-work",
        Verb::Dashboard => "dashboard",
        Verb::Maintenance(_) => "maintenance",
        Verb::Version => "version",
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn resolve_format(json_flag: bool) -> OutputFormat {
    if json_flag {
        return OutputFormat::Json;
    }
    match std::env::var("OUTPUT_FORMAT").ok().as_deref() {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Text,
    }
}

fn version_payload() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "git_hash": env!("BUILD_GIT_HASH"),
    })
}

/// Dispatch one verb against a freshly-opened coordinator. Kept separate
/// from `main` so the `?` on `CoordinatorConfig::load`/`Coordinator::open`
/// flows into the same `EngineError` envelope every other failure does —
/// spec §7 makes no exception for errors raised before an operation runs.
fn dispatch(
    verb: Verb,
    agent_flag: &Option<String>,
    coordination_dir: &std::path::Path,
    cli_overrides: ConfigOverrides,
    ctx: &TraceContext,
) -> Result<serde_json::Value, EngineError> {
    let config = CoordinatorConfig::load(coordination_dir, cli_overrides)?;
    let coordinator = Coordinator::<SystemClock>::open(config)?;

    match verb {
        Verb::Register(args) => agent::register(&coordinator, ctx, args),
        Verb::Heartbeat(args) => agent::heartbeat(&coordinator, ctx, args),
        Verb::Claim(args) => {
            let agent_id = commands::require_agent_id(agent_flag)?;
            work::claim(&coordinator, ctx, &agent_id, args)
        }
        Verb::ClaimNext(args) => {
            let agent_id = commands::require_agent_id(agent_flag)?;
            work::claim_next(&coordinator, ctx, &agent_id, args)
        }
        Verb::Progress(args) => work::progress(&coordinator, ctx, args),
        Verb::Complete(args) => work::complete(&coordinator, ctx, args),
        Verb::Fail(args) => work::fail(&coordinator, ctx, args),
        Verb::Cancel(args) => work::cancel(&coordinator, ctx, args),
        Verb::ListWork(args) => queue::list_work(&coordinator, args),
        Verb::Dashboard => queue::dashboard(&coordinator),
        Verb::Maintenance(args) => maintenance::run(&coordinator, ctx, args),
        Verb::Version => Ok(version_payload()),
    }
}

fn run(cli: Cli) -> Result<ExitCode, ExitError> {
    let started = Instant::now();
    let format = resolve_format(cli.json);
    let operation = verb_name(&cli.verb);

    let coordination_dir = cli
        .coordination_dir
        .clone()
        .or_else(|| std::env::var("COORDINATION_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(".oj"));

    if coordination_dir.is_file() {
        return Err(ExitError::new(
            1,
            format!("{} exists and is not a directory", coordination_dir.display()),
        ));
    }

    let cli_overrides = ConfigOverrides {
        coordination_dir: cli.coordination_dir.clone(),
        lock_wait_sec: cli.timeout,
        ..ConfigOverrides::default()
    };

    let mut ctx = TraceContext::from_env();
    let trace_id = ctx.trace_id.clone().unwrap_or_else(oj_core::new_trace_id);
    ctx.trace_id = Some(trace_id.clone());

    let agent_id_for_envelope = cli.agent.clone().or_else(|| std::env::var("AGENT_ID").ok());

    let result = dispatch(cli.verb, &cli.agent, &coordination_dir, cli_overrides, &ctx);
    let execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let envelope = match result {
        Ok(data) => {
            Envelope::success(trace_id, operation, agent_id_for_envelope, execution_time_ms, data)
        }
        Err(e) => {
            let kind = e.kind();
            Envelope::error(trace_id, operation, agent_id_for_envelope, execution_time_ms, kind, e.to_string())
        }
    };

    output::print_envelope(format, &envelope);
    Ok(ExitCode::from(u8::try_from(output::exit_code_for(&envelope)).unwrap_or(1)))
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("oj: {}", e.message);
            ExitCode::from(u8::try_from(e.code).unwrap_or(1))
        }
    }
}
