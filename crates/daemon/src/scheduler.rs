// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process maintenance ticker (§4.7, §5 "scheduler's global
//! maintenance-token has a watchdog"). One `tokio::time::interval` per
//! job; every tick serializes through a single `tokio::sync::Mutex`
//! slot so at most one maintenance job body runs at a time on this
//! host, matching the teacher's full-featured `tokio` runtime
//! dependency and its one-task-per-concern scheduling style.
//!
//! Job bodies themselves (`oj_engine::Coordinator::maintenance_*`) are
//! synchronous — they do blocking filesystem I/O under the state-store
//! lock — so each tick runs on a blocking thread via
//! `tokio::task::spawn_blocking` rather than stalling the ticker task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use oj_core::SystemClock;
use oj_engine::{Coordinator, EngineError, TraceContext};
use tokio::sync::{watch, Mutex};
use tokio::time::{interval_at, timeout, Instant};
use tracing::{error, info, warn};

/// Upper bound on how long a single job body, or the wait to acquire
/// the maintenance token, may run before the watchdog force-releases
/// it and records an error (§5 "watchdog... force-releases after a
/// bounded interval (and raises an error span)").
const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(120);

/// When `health_check` reports a degraded score, the other jobs' cadence
/// is raised (run more often) by this factor until the next healthy
/// `health_check` tick clears it (§4.7 `health_check` row).
const DEGRADED_CADENCE_DIVISOR: u32 = 4;

/// One entry in the fixed job table (§4.7). `name` must match one of
/// the `maintenance_*` dispatch arms below.
struct JobSpec {
    name: &'static str,
    default_cadence: Duration,
}

const JOBS: &[JobSpec] = &[
    JobSpec { name: "health_check", default_cadence: Duration::from_secs(15 * 60) },
    JobSpec { name: "archive_completed", default_cadence: Duration::from_secs(24 * 60 * 60) },
    JobSpec { name: "rotate_span_log", default_cadence: Duration::from_secs(24 * 60 * 60) },
    JobSpec { name: "reality_verify", default_cadence: Duration::from_secs(60 * 60) },
    JobSpec { name: "stale_heartbeat_sweep", default_cadence: Duration::from_secs(15 * 60) },
    JobSpec { name: "rebalance", default_cadence: Duration::from_secs(60 * 60) },
    JobSpec { name: "optimize_work_queue", default_cadence: Duration::from_secs(4 * 60 * 60) },
    JobSpec { name: "status_report", default_cadence: Duration::from_secs(24 * 60 * 60) },
];

/// Names every job `oj-cli`'s `maintenance <job>` verb can invoke
/// one-shot, independent of this scheduler (spec.md §9 "maintenance is
/// not a cron contract").
pub fn job_names() -> impl Iterator<Item = &'static str> {
    JOBS.iter().map(|j| j.name)
}

pub struct Scheduler {
    coordinator: Arc<Coordinator<SystemClock>>,
    token: Arc<Mutex<()>>,
    degraded: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(coordinator: Arc<Coordinator<SystemClock>>) -> Self {
        Self { coordinator, token: Arc::new(Mutex::new(())), degraded: Arc::new(AtomicBool::new(false)) }
    }

    /// Run every job's ticker until `shutdown` reports `true`, then wait
    /// for in-flight ticks to finish before returning.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        let mut handles = Vec::with_capacity(JOBS.len());
        for job in JOBS {
            let coordinator = self.coordinator.clone();
            let token = self.token.clone();
            let degraded = self.degraded.clone();
            let mut shutdown = shutdown.clone();
            handles.push(tokio::spawn(async move {
                job_loop(job.name, job.default_cadence, coordinator, token, degraded, &mut shutdown).await;
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }
}

async fn job_loop(
    name: &'static str,
    base_cadence: Duration,
    coordinator: Arc<Coordinator<SystemClock>>,
    token: Arc<Mutex<()>>,
    degraded: Arc<AtomicBool>,
    shutdown: &mut watch::Receiver<bool>,
) {
    loop {
        let cadence = effective_cadence(base_cadence, &degraded);
        let mut ticker = interval_at(Instant::now() + cadence, cadence);

        tokio::select! {
            _ = ticker.tick() => {
                run_tick(name, &coordinator, &token, &degraded).await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}

fn effective_cadence(base: Duration, degraded: &AtomicBool) -> Duration {
    if degraded.load(Ordering::Relaxed) {
        (base / DEGRADED_CADENCE_DIVISOR).max(Duration::from_secs(1))
    } else {
        base
    }
}

async fn run_tick(name: &'static str, coordinator: &Arc<Coordinator<SystemClock>>, token: &Arc<Mutex<()>>, degraded: &Arc<AtomicBool>) {
    let guard = match timeout(WATCHDOG_TIMEOUT, token.lock()).await {
        Ok(guard) => guard,
        Err(_) => {
            warn!(job = name, "maintenance token unavailable within watchdog window, skipping tick");
            return;
        }
    };

    let coordinator = coordinator.clone();
    let ctx = TraceContext::fresh();
    let outcome = timeout(WATCHDOG_TIMEOUT, run_job_blocking(name, coordinator, ctx)).await;
    drop(guard);

    match outcome {
        Ok(Ok(job_degraded)) => {
            if let Some(is_degraded) = job_degraded {
                degraded.store(is_degraded, Ordering::Relaxed);
            }
            info!(job = name, "maintenance tick completed");
        }
        Ok(Err(e)) => error!(job = name, error = %e, "maintenance tick failed"),
        Err(_) => error!(job = name, "maintenance tick exceeded watchdog timeout, token force-released"),
    }
}

/// Run one job body on a blocking thread; `maintenance_*` methods do
/// synchronous filesystem I/O under the state-store lock and must
/// never run directly on an async executor thread.
async fn run_job_blocking(
    name: &'static str,
    coordinator: Arc<Coordinator<SystemClock>>,
    ctx: TraceContext,
) -> Result<Option<bool>, EngineError> {
    match tokio::task::spawn_blocking(move || dispatch(name, &coordinator, &ctx)).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::invalid_arg(format!("maintenance job {name} panicked"))),
    }
}

fn dispatch(name: &str, coordinator: &Coordinator<SystemClock>, ctx: &TraceContext) -> Result<Option<bool>, EngineError> {
    match name {
        "health_check" => coordinator.maintenance_health_check(ctx).map(|r| Some(r.degraded)),
        "archive_completed" => coordinator.maintenance_archive_completed(ctx).map(|_| None),
        "rotate_span_log" => coordinator.maintenance_rotate_span_log(ctx).map(|_| None),
        "reality_verify" => coordinator.maintenance_reality_verify(ctx).map(|_| None),
        "stale_heartbeat_sweep" => coordinator.maintenance_stale_heartbeat_sweep(ctx).map(|_| None),
        "rebalance" => coordinator.maintenance_rebalance(ctx).map(|_| None),
        "optimize_work_queue" => coordinator.maintenance_optimize_work_queue(ctx).map(|_| None),
        "status_report" => coordinator.maintenance_status_report(ctx).map(|_| None),
        other => Err(EngineError::invalid_arg(format!("unknown maintenance job {other}"))),
    }
}

/// One-shot entry point for `oj-cli`'s `maintenance <job>` verb. Unlike
/// `dispatch`, which the ticker uses only for the `health_check`
/// degraded signal, this returns the job's own report serialized to
/// JSON so the CLI gets the full structured payload without one match
/// arm per report type.
pub fn run_job_once(
    name: &str,
    coordinator: &Coordinator<SystemClock>,
    ctx: &TraceContext,
) -> Result<serde_json::Value, EngineError> {
    fn to_value<T: serde::Serialize>(v: T) -> Result<serde_json::Value, EngineError> {
        serde_json::to_value(v).map_err(|e| EngineError::invalid_arg(e.to_string()))
    }
    match name {
        "health_check" => to_value(coordinator.maintenance_health_check(ctx)?),
        "archive_completed" => to_value(coordinator.maintenance_archive_completed(ctx)?),
        "rotate_span_log" => to_value(coordinator.maintenance_rotate_span_log(ctx)?),
        "reality_verify" => {
            // The job body itself only reports violations (maintenance never
            // auto-repairs state); the one-shot CLI surface is where a
            // non-empty report must become a non-zero exit code (spec's
            // reality-verification scenario).
            let report = coordinator.maintenance_reality_verify(ctx)?;
            if report.violations.is_empty() {
                to_value(report)
            } else {
                Err(EngineError::CorruptState(report.violations.join("; ")))
            }
        }
        "stale_heartbeat_sweep" => to_value(coordinator.maintenance_stale_heartbeat_sweep(ctx)?),
        "rebalance" => to_value(coordinator.maintenance_rebalance(ctx)?),
        "optimize_work_queue" => to_value(coordinator.maintenance_optimize_work_queue(ctx)?),
        "status_report" => to_value(coordinator.maintenance_status_report(ctx)?),
        other => Err(EngineError::invalid_arg(format!("unknown maintenance job {other}"))),
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
