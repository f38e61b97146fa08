// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maintenance scheduler job bodies (C7, spec §4.7).
//!
//! Each function here is one idempotent, traced job. `oj-daemon` owns the
//! cadence table, the global maintenance-token, and the watchdog
//! timeout (§9 "maintenance is not a cron contract" — the scheduling
//! mechanism is an integration choice, not part of the job itself);
//! `oj-cli`'s `maintenance <job>` verb calls the same functions for a
//! one-shot run. No job here writes to the state files directly outside
//! of `with_exclusive_lock` / the claim engine's own operations.

use oj_core::{AttrValue, Clock, WorkStatus};
use oj_wire::span_log::attrs;
use serde::{Deserialize, Serialize};

use crate::context::{Coordinator, TraceContext};
use crate::error::EngineError;
use crate::registry::DeregisterPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckReport {
    pub score: f64,
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveCompletedReport {
    pub archived_count: usize,
    pub remaining_count: usize,
    pub archive_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateSpanLogReport {
    pub rotated: bool,
    pub rotated_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealityVerifyReport {
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaleHeartbeatSweepReport {
    pub offlined_agents: Vec<String>,
    pub reassigned_work_items: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceReport {
    pub max_team: Option<String>,
    pub min_team: Option<String>,
    pub ratio: f64,
    pub recommended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeWorkQueueReport {
    pub active_claims_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReportSummary {
    pub pending: usize,
    pub active: usize,
    pub blocked: usize,
    pub completed_total: usize,
    pub registered_agents: usize,
}

/// Health score below this is "degraded" for `health_check`'s cadence
/// recommendation (§4.7: "raise cadence of other jobs by configured
/// factor" — the factor itself is a daemon-scheduler concern).
const DEGRADED_THRESHOLD: f64 = 0.4;
/// Rebalance recommendation threshold on max/min team workload ratio.
const REBALANCE_RATIO_THRESHOLD: f64 = 3.0;

impl<C: Clock> Coordinator<C> {
    /// 15 min default cadence.
    pub fn maintenance_health_check(&self, ctx: &TraceContext) -> Result<HealthCheckReport, EngineError> {
        let handle = self.start_span(ctx, "maintenance.health_check", Default::default());
        let score = self.health_score()?;
        let degraded = score < DEGRADED_THRESHOLD;
        let report = HealthCheckReport { score, degraded };

        let cache_path = self.config.coordination_dir.join("dashboard-cache.json");
        if let Ok(json) = serde_json::to_string_pretty(&report) {
            if let Err(e) = std::fs::write(&cache_path, json) {
                tracing::warn!(error = %e, "failed to write dashboard cache");
            }
        }

        self.finish_ok(handle, attrs([("score", score.into()), ("degraded", degraded.into())]));
        Ok(report)
    }

    /// Daily default cadence. L3: a second run with no intervening
    /// terminations archives nothing and leaves completed-log unchanged.
    pub fn maintenance_archive_completed(
        &self,
        ctx: &TraceContext,
    ) -> Result<ArchiveCompletedReport, EngineError> {
        let handle = self.start_span(ctx, "maintenance.archive_completed", Default::default());
        let now = self.now();
        let retention_ms = u64::from(self.config.completed_retention_days) * 24 * 60 * 60 * 1000;
        let cutoff = now.saturating_sub(retention_ms);

        let archive_dir = self.config.coordination_dir.clone();
        let result: Result<ArchiveCompletedReport, EngineError> = self.store.with_exclusive_lock(|docs| {
            let before = docs.completed_log.len();
            let (keep, archive): (Vec<_>, Vec<_>) =
                docs.completed_log.drain(..).partition(|r| r.item.completed_at.unwrap_or(now) >= cutoff);
            docs.completed_log = keep;
            let after = docs.completed_log.len();
            debug_assert_eq!(before, after + archive.len());

            if archive.is_empty() {
                return Ok(ArchiveCompletedReport {
                    archived_count: 0,
                    remaining_count: after,
                    archive_path: None,
                });
            }

            let date_suffix = oj_core::now_wall_iso8601_ms();
            let date_suffix = date_suffix.split('T').next().unwrap_or(&date_suffix).replace('-', "");
            let archive_path = archive_dir.join(format!("completed-log.{date_suffix}.json"));
            let json = serde_json::to_string_pretty(&archive).map_err(|e| {
                EngineError::InvalidArg(format!("failed to serialize archive: {e}"))
            })?;
            std::fs::write(&archive_path, json)
                .map_err(|e| EngineError::InvalidArg(format!("failed to write {}: {e}", archive_path.display())))?;

            Ok(ArchiveCompletedReport {
                archived_count: archive.len(),
                remaining_count: after,
                archive_path: Some(archive_path.display().to_string()),
            })
        });

        let result = result?;
        self.finish_ok(
            handle,
            attrs([
                ("archived_count", (result.archived_count as i64).into()),
                ("remaining_count", (result.remaining_count as i64).into()),
            ]),
        );
        Ok(result)
    }

    /// Daily default cadence. L4: idempotent when the live file is
    /// already empty.
    pub fn maintenance_rotate_span_log(&self, ctx: &TraceContext) -> Result<RotateSpanLogReport, EngineError> {
        let handle = self.start_span(ctx, "maintenance.rotate_span_log", Default::default());
        let size = self.spans.size_bytes().map_err(|e| EngineError::InvalidArg(e.to_string()))?;
        if size < self.config.span_log_max_bytes {
            self.finish_ok(handle, attrs([("rotated", false.into())]));
            return Ok(RotateSpanLogReport { rotated: false, rotated_path: None });
        }

        let date_suffix = oj_core::now_wall_iso8601_ms();
        let date_suffix = date_suffix.split('T').next().unwrap_or(&date_suffix).replace('-', "");
        let rotated = self
            .spans
            .rotate(&date_suffix)
            .map_err(|e| EngineError::InvalidArg(e.to_string()))?;

        let report = RotateSpanLogReport {
            rotated: rotated.is_some(),
            rotated_path: rotated.map(|p| p.display().to_string()),
        };
        self.finish_ok(handle, attrs([("rotated", report.rotated.into())]));
        Ok(report)
    }

    /// Hourly default cadence. Checks I1–I5 and A1–A3 against the current
    /// snapshot; never repairs.
    pub fn maintenance_reality_verify(&self, ctx: &TraceContext) -> Result<RealityVerifyReport, EngineError> {
        let handle = self.start_span(ctx, "maintenance.reality_verify", Default::default());
        let snap = self.store.read_snapshot()?;
        let mut violations = Vec::new();

        // P1: at most one active/blocked WorkItem per work_id.
        let mut seen = std::collections::HashSet::new();
        for item in snap.active_claims.iter().filter(|w| matches!(w.status, WorkStatus::Active | WorkStatus::Blocked)) {
            if !seen.insert(item.work_id.as_str()) {
                violations.push(format!("P1 violation: duplicate claimant for work_id {}", item.work_id));
            }
        }

        // I3: timestamp monotonicity.
        for item in snap.active_claims.iter() {
            if !item.timestamps_monotonic() {
                violations.push(format!("I3 violation: non-monotonic timestamps on {}", item.work_id));
            }
        }

        // I4: progress bounds (type system already bounds to u8<=100 in memory,
        // but completed items must read 100).
        for item in snap.active_claims.iter() {
            if item.status == WorkStatus::Completed && item.progress_percent != 100 {
                violations.push(format!("I4 violation: completed item {} has progress {}", item.work_id, item.progress_percent));
            }
        }

        // I2: an active item's assigned agent must exist and be online.
        for item in snap.active_claims.iter().filter(|w| w.status == WorkStatus::Active) {
            match item.assigned_agent_id.as_ref().and_then(|id| snap.agent(id)) {
                Some(agent) if !agent.status.is_offline() => {}
                Some(_) => violations.push(format!(
                    "I2 violation: active item {} assigned to offline agent {}",
                    item.work_id,
                    item.assigned_agent_id.as_ref().map(|a| a.to_string()).unwrap_or_default()
                )),
                None => violations.push(format!(
                    "I2 violation: active item {} has no registered assigned agent",
                    item.work_id
                )),
            }
        }

        // I5: no terminal-status item may sit in active-claims.
        for item in snap.active_claims.iter() {
            if item.status.is_terminal() {
                violations.push(format!(
                    "I5 violation: terminal item {} ({}) present in active-claims",
                    item.work_id, item.status
                ));
            }
        }

        // P2/P3: agent workload accounting and capacity.
        for agent in snap.agent_registry.values() {
            let actual = snap
                .active_claims
                .iter()
                .filter(|w| w.assigned_agent_id.as_ref() == Some(&agent.agent_id))
                .filter(|w| matches!(w.status, WorkStatus::Active | WorkStatus::Blocked))
                .count() as u32;
            if actual != agent.current_workload {
                violations.push(format!(
                    "P2 violation: agent {} recorded workload {} but {} actual",
                    agent.agent_id, agent.current_workload, actual
                ));
            }
            if !agent.within_capacity() {
                violations.push(format!("P3 violation: agent {} over capacity", agent.agent_id));
            }
            if !agent.offline_invariant_holds() {
                violations.push(format!("A3 violation: offline agent {} still carries workload", agent.agent_id));
            }
        }

        let report = RealityVerifyReport { violations: violations.clone() };
        if violations.is_empty() {
            self.finish_ok(handle, attrs([("violation_count", 0i64.into())]));
        } else {
            self.finish_err(handle, oj_core::ErrorKind::CorruptState, &format!("{} invariant violations", violations.len()));
        }
        Ok(report)
    }

    /// 15 min default cadence.
    pub fn maintenance_stale_heartbeat_sweep(
        &self,
        ctx: &TraceContext,
    ) -> Result<StaleHeartbeatSweepReport, EngineError> {
        let handle = self.start_span(ctx, "maintenance.stale_heartbeat_sweep", Default::default());
        let now = self.now();
        let timeout_ms = self.config.heartbeat_timeout_sec * 1000;

        let result: Result<StaleHeartbeatSweepReport, EngineError> = self.store.with_exclusive_lock(|docs| {
            let stale_agents: Vec<String> = docs
                .agent_registry
                .values()
                .filter(|a| !a.status.is_offline())
                .filter(|a| now.saturating_sub(a.last_heartbeat_at) > timeout_ms)
                .map(|a| a.agent_id.to_string())
                .collect();

            let mut reassigned = 0usize;
            for agent_id_str in &stale_agents {
                for item in docs.active_claims.iter_mut() {
                    if item.assigned_agent_id.as_ref().map(|a| a.as_str()) != Some(agent_id_str.as_str()) {
                        continue;
                    }
                    if matches!(item.status, WorkStatus::Active | WorkStatus::Blocked) {
                        item.status = WorkStatus::Pending;
                        item.assigned_agent_id = None;
                        item.claimed_at = None;
                        item.started_at = None;
                        reassigned += 1;
                    }
                }
                if let Some(agent) = docs.agent_registry.get_mut(agent_id_str) {
                    agent.current_workload = 0;
                    agent.status = oj_core::AgentStatus::Offline;
                }
            }

            Ok(StaleHeartbeatSweepReport { offlined_agents: stale_agents, reassigned_work_items: reassigned })
        });

        match &result {
            Ok(report) => {
                self.finish_ok(
                    handle,
                    attrs([
                        ("offlined_count", (report.offlined_agents.len() as i64).into()),
                        ("reassigned_count", (report.reassigned_work_items as i64).into()),
                    ]),
                );
            }
            Err(e) => self.finish_err(handle, e.kind(), &e.to_string()),
        }
        result
    }

    /// Hourly default cadence. Emits a recommendation span; actual
    /// reassignment is out of scope here (spec: "actual reassignment
    /// only when configured to" — this implementation never configures
    /// automatic reassignment, only the recommendation path, and records
    /// that choice via the `recommended` field rather than acting on it).
    pub fn maintenance_rebalance(&self, ctx: &TraceContext) -> Result<RebalanceReport, EngineError> {
        let handle = self.start_span(ctx, "maintenance.rebalance", Default::default());
        let snap = self.store.read_snapshot()?;

        let mut by_team: std::collections::BTreeMap<String, (u32, u32)> = std::collections::BTreeMap::new();
        for agent in snap.agent_registry.values() {
            let entry = by_team.entry(agent.team.clone()).or_default();
            entry.0 += agent.capacity_max;
            entry.1 += agent.current_workload;
        }

        let ratios: Vec<(String, f64)> = by_team
            .iter()
            .map(|(team, (cap, work))| {
                let ratio = if *cap == 0 { 0.0 } else { *work as f64 / *cap as f64 };
                (team.clone(), ratio)
            })
            .collect();

        let max_entry = ratios.iter().max_by(|a, b| a.1.total_cmp(&b.1));
        let min_entry = ratios.iter().min_by(|a, b| a.1.total_cmp(&b.1));
        let ratio = match (max_entry, min_entry) {
            (Some((_, max)), Some((_, min))) if *min > 0.0 => max / min,
            (Some((_, max)), _) if *max > 0.0 => f64::INFINITY,
            _ => 1.0,
        };
        let recommended = ratio > REBALANCE_RATIO_THRESHOLD;

        let report = RebalanceReport {
            max_team: max_entry.map(|(t, _)| t.clone()),
            min_team: min_entry.map(|(t, _)| t.clone()),
            ratio,
            recommended,
        };
        let ratio_attr = if report.ratio.is_finite() { report.ratio } else { f64::MAX };
        self.finish_ok(
            handle,
            attrs([("ratio", ratio_attr.into()), ("recommended", recommended.into())]),
        );
        Ok(report)
    }

    /// 4h default cadence. Compacts active-claims by rewriting it
    /// without gaps (the JSON array is already gap-free since it's a
    /// `Vec`, so this is a re-validate-and-recommit) and sorts by
    /// priority then `created_at` so a dump of the file reads in
    /// candidate-selection order.
    pub fn maintenance_optimize_work_queue(
        &self,
        ctx: &TraceContext,
    ) -> Result<OptimizeWorkQueueReport, EngineError> {
        let handle = self.start_span(ctx, "maintenance.optimize_work_queue", Default::default());
        let result: Result<usize, EngineError> = self.store.with_exclusive_lock(|docs| {
            docs.active_claims.sort_by(|a, b| {
                std::cmp::Reverse(a.priority)
                    .cmp(&std::cmp::Reverse(b.priority))
                    .then(a.created_at.cmp(&b.created_at))
                    .then(a.work_id.as_str().cmp(b.work_id.as_str()))
            });
            Ok(docs.active_claims.len())
        });
        match &result {
            Ok(count) => self.finish_ok(handle, attrs([("active_claims_count", (*count as i64).into())])),
            Err(e) => self.finish_err(handle, e.kind(), &e.to_string()),
        }
        Ok(OptimizeWorkQueueReport { active_claims_count: result? })
    }

    /// Daily default cadence. Appends the summary as a single span-log
    /// event rather than a state document (spec: "append to the span log
    /// as a single event").
    pub fn maintenance_status_report(&self, ctx: &TraceContext) -> Result<StatusReportSummary, EngineError> {
        let handle = self.start_span(ctx, "maintenance.status_report", Default::default());
        let snap = self.store.read_snapshot()?;

        let mut pending = 0;
        let mut active = 0;
        let mut blocked = 0;
        for item in snap.active_claims.iter() {
            match item.status {
                WorkStatus::Pending => pending += 1,
                WorkStatus::Active => active += 1,
                WorkStatus::Blocked => blocked += 1,
                _ => {}
            }
        }
        let summary = StatusReportSummary {
            pending,
            active,
            blocked,
            completed_total: snap.completed_log.len(),
            registered_agents: snap.agent_registry.len(),
        };

        let extra: Vec<(String, AttrValue)> = vec![
            ("pending".to_string(), (summary.pending as i64).into()),
            ("active".to_string(), (summary.active as i64).into()),
            ("blocked".to_string(), (summary.blocked as i64).into()),
            ("completed_total".to_string(), (summary.completed_total as i64).into()),
            ("registered_agents".to_string(), (summary.registered_agents as i64).into()),
        ];
        self.finish_ok(handle, extra);
        Ok(summary)
    }

    /// Convenience used by `reality_verify`-triggered recovery flows and
    /// tests: force an agent offline via the registry's deregister path,
    /// reassigning its work rather than cancelling it.
    pub fn force_offline(&self, ctx: &TraceContext, agent_id: &oj_core::AgentId) -> Result<(), EngineError> {
        self.deregister(ctx, agent_id, DeregisterPolicy::Reassign).map(|_| ())
    }
}
