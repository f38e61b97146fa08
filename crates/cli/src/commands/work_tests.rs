// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::{AgentId, CoordinatorConfig, SystemClock};
use oj_engine::TraceContext;
use tempfile::tempdir;

fn test_coordinator() -> Coordinator<SystemClock> {
    let dir = tempdir().unwrap();
    let config = CoordinatorConfig { coordination_dir: dir.keep(), ..CoordinatorConfig::default() };
    Coordinator::open(config).unwrap()
}

#[test]
fn claim_shortcut_creates_and_claims_in_one_call() {
    let coordinator = test_coordinator();
    let ctx = TraceContext::fresh();
    let agent_id = AgentId::from("a1");
    coordinator.register_agent(&ctx, agent_id.clone(), "team-a", "dev", 3, None).unwrap();

    let data = claim(
        &coordinator,
        &ctx,
        &agent_id,
        ClaimArgs {
            work_type: "feature".to_string(),
            description: "build the thing".to_string(),
            priority: "high".to_string(),
            team: None,
        },
    )
    .unwrap();
    assert_eq!(data["status"], "active");
    assert_eq!(data["team"], "team-a");
}

#[test]
fn claim_next_honors_count_and_capacity() {
    let coordinator = test_coordinator();
    let ctx = TraceContext::fresh();
    let agent_id = AgentId::from("a1");
    coordinator.register_agent(&ctx, agent_id.clone(), "team-a", "dev", 2, None).unwrap();
    for _ in 0..3 {
        coordinator.create_work(&ctx, "feature", "item", oj_core::Priority::Medium, "team-a").unwrap();
    }

    let data =
        claim_next(&coordinator, &ctx, &agent_id, ClaimNextArgs { work_type: None, team: None, count: 3 }).unwrap();
    assert_eq!(data.as_array().unwrap().len(), 2);
}

#[test]
fn progress_complete_fail_cancel_round_trip() {
    let coordinator = test_coordinator();
    let ctx = TraceContext::fresh();
    let agent_id = AgentId::from("a1");
    coordinator.register_agent(&ctx, agent_id.clone(), "team-a", "dev", 3, None).unwrap();
    let item = coordinator.create_work(&ctx, "feature", "thing", oj_core::Priority::Medium, "team-a").unwrap();
    coordinator.claim(&ctx, &agent_id, Some(&item.work_id), None, None, 1, false).unwrap();

    let data = progress(
        &coordinator,
        &ctx,
        ProgressArgs { work_id: item.work_id.to_string(), percent: 50, sub_status: None },
    )
    .unwrap();
    assert_eq!(data["progress_percent"], 50);

    let data = complete(
        &coordinator,
        &ctx,
        CompleteArgs { work_id: item.work_id.to_string(), result: "done".to_string(), velocity: Some(3) },
    )
    .unwrap();
    assert_eq!(data["status"], "completed");

    let item2 = coordinator.create_work(&ctx, "feature", "thing2", oj_core::Priority::Medium, "team-a").unwrap();
    coordinator.claim(&ctx, &agent_id, Some(&item2.work_id), None, None, 1, false).unwrap();
    let data = fail(&coordinator, &ctx, FailArgs { work_id: item2.work_id.to_string(), reason: "boom".to_string() })
        .unwrap();
    assert_eq!(data["status"], "failed");

    let item3 = coordinator.create_work(&ctx, "feature", "thing3", oj_core::Priority::Medium, "team-a").unwrap();
    let data = cancel(&coordinator, &ctx, CancelArgs { work_id: item3.work_id.to_string() }).unwrap();
    assert_eq!(data["status"], "cancelled");
}
