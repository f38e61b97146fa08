// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `maintenance <job-name>` (§4.7, §9 "maintenance is not a cron
//! contract"): a one-shot run of any job the scheduler would otherwise
//! run on its own cadence, delegated straight to `oj-daemon` so there is
//! exactly one implementation of each job body.

use clap::Args;
use oj_core::SystemClock;
use oj_engine::{Coordinator, EngineError, TraceContext};

#[derive(Args, Debug)]
pub struct MaintenanceArgs {
    /// One of `oj_daemon::job_names()`.
    pub job: String,
}

pub fn run(
    coordinator: &Coordinator<SystemClock>,
    ctx: &TraceContext,
    args: MaintenanceArgs,
) -> Result<serde_json::Value, EngineError> {
    oj_daemon::run_job_once(&args.job, coordinator, ctx)
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
