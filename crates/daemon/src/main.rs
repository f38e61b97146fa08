// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ojd` — runs the maintenance scheduler (C7) as a long-lived process.
//! Each job is independently invokable one-shot via `oj maintenance
//! <job>` (spec.md §9: "maintenance is not a cron contract"); this
//! binary is the opt-in continuous alternative.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use oj_core::{ConfigOverrides, CoordinatorConfig, SystemClock};
use oj_daemon::Scheduler;
use oj_engine::Coordinator;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ojd", about = "Maintenance scheduler for an oj coordination directory")]
struct Args {
    /// Coordination directory holding the state store and span log.
    #[arg(long, env = "COORDINATION_DIR", default_value = ".oj")]
    coordination_dir: PathBuf,

    /// Directory for rotated log files; stderr-only when unset.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn init_tracing(log_dir: Option<&PathBuf>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ojd.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(non_blocking).init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let args = Args::parse();
    let _guard = init_tracing(args.log_dir.as_ref());

    let config = match CoordinatorConfig::load(&args.coordination_dir, ConfigOverrides::default()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to load coordinator configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let coordinator = match Coordinator::<SystemClock>::open(config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!(error = %e, "failed to open coordination directory");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(jobs = ?oj_daemon::job_names().collect::<Vec<_>>(), "starting maintenance scheduler");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Scheduler::new(coordinator);
    let run = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown requested, draining in-flight maintenance ticks");
    let _ = shutdown_tx.send(true);
    let _ = run.await;

    std::process::ExitCode::SUCCESS
}
