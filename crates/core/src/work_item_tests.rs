// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn priority_orders_critical_highest() {
    let mut ps = vec![Priority::Medium, Priority::Critical, Priority::Low, Priority::High];
    ps.sort();
    assert_eq!(ps, vec![Priority::Low, Priority::Medium, Priority::High, Priority::Critical]);
}

#[test]
fn priority_parse_round_trips_display() {
    for p in [Priority::Critical, Priority::High, Priority::Medium, Priority::Low] {
        assert_eq!(Priority::parse(&p.to_string()), Some(p));
    }
    assert_eq!(Priority::parse("urgent"), None);
}

#[test]
fn create_starts_pending_with_zero_progress() {
    let item = WorkItem::create("feature", "refactor cache", Priority::High, "team-a", 1_000);
    assert_eq!(item.status, WorkStatus::Pending);
    assert_eq!(item.progress_percent, 0);
    assert_eq!(item.created_at, 1_000);
    assert!(item.assigned_agent_id.is_none());
}

#[test]
fn claim_transitions_pending_to_active() {
    let mut item = WorkItem::create("feature", "x", Priority::Medium, "team-a", 1_000);
    let agent = AgentId::new();
    item.claim(agent.clone(), 2_000).unwrap();
    assert_eq!(item.status, WorkStatus::Active);
    assert_eq!(item.assigned_agent_id, Some(agent));
    assert_eq!(item.claimed_at, Some(2_000));
    assert_eq!(item.started_at, Some(2_000));
}

#[test]
fn claim_twice_yields_state_conflict() {
    let mut item = WorkItem::create("feature", "x", Priority::Medium, "team-a", 1_000);
    item.claim(AgentId::new(), 2_000).unwrap();
    let err = item.claim(AgentId::new(), 3_000).unwrap_err();
    assert_eq!(err.kind, ErrorKind::StateConflict);
}

#[test]
fn timestamps_monotonic_holds_for_fresh_item() {
    let item = WorkItem::create("feature", "x", Priority::Medium, "team-a", 1_000);
    assert!(item.timestamps_monotonic());
}

#[test]
fn timestamps_monotonic_detects_regression() {
    let mut item = WorkItem::create("feature", "x", Priority::Medium, "team-a", 1_000);
    item.claim(AgentId::new(), 500).unwrap();
    assert!(!item.timestamps_monotonic());
}

#[test]
fn set_progress_clamps_to_100() {
    let mut item = WorkItem::builder().status(WorkStatus::Active).build();
    item.set_progress(150, None).unwrap();
    assert_eq!(item.progress_percent, 100);
}

#[test]
fn set_progress_rejects_unexplained_regression() {
    let mut item = WorkItem::builder()
        .status(WorkStatus::Active)
        .progress_percent(60)
        .build();
    let err = item.set_progress(30, None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArg);
    assert_eq!(item.progress_percent, 60);
}

#[test]
fn set_progress_allows_regression_with_sub_status() {
    let mut item = WorkItem::builder()
        .status(WorkStatus::Active)
        .progress_percent(60)
        .build();
    item.set_progress(30, Some("reverted bad merge".into())).unwrap();
    assert_eq!(item.progress_percent, 30);
    assert_eq!(item.sub_status.as_deref(), Some("reverted bad merge"));
}

#[test]
fn set_progress_on_terminal_item_is_state_conflict() {
    let mut item = WorkItem::builder().status(WorkStatus::Completed).build();
    let err = item.set_progress(50, None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::StateConflict);
}

#[test]
fn block_and_unblock_round_trip() {
    let mut item = WorkItem::builder().status(WorkStatus::Active).build();
    item.block("waiting on upstream").unwrap();
    assert_eq!(item.status, WorkStatus::Blocked);
    item.unblock().unwrap();
    assert_eq!(item.status, WorkStatus::Active);
    assert!(item.sub_status.is_none());
}

#[test]
fn block_is_idempotent() {
    let mut item = WorkItem::builder().status(WorkStatus::Blocked).build();
    item.block("still waiting").unwrap();
    assert_eq!(item.status, WorkStatus::Blocked);
}

#[test]
fn block_from_pending_is_state_conflict() {
    let mut item = WorkItem::builder().status(WorkStatus::Pending).build();
    assert_eq!(item.block("x").unwrap_err().kind, ErrorKind::StateConflict);
}

#[test]
fn complete_sets_progress_to_100_and_records_result() {
    let mut item = WorkItem::builder()
        .status(WorkStatus::Active)
        .progress_percent(80)
        .build();
    item.complete("shipped", Some(5), 9_000).unwrap();
    assert_eq!(item.status, WorkStatus::Completed);
    assert_eq!(item.progress_percent, 100);
    assert_eq!(item.result.as_deref(), Some("shipped"));
    assert_eq!(item.velocity_points, Some(5));
    assert_eq!(item.completed_at, Some(9_000));
}

#[test]
fn complete_from_blocked_is_allowed() {
    let mut item = WorkItem::builder().status(WorkStatus::Blocked).build();
    item.complete("shipped", None, 9_000).unwrap();
    assert_eq!(item.status, WorkStatus::Completed);
}

#[test]
fn complete_from_pending_is_state_conflict() {
    let mut item = WorkItem::builder().status(WorkStatus::Pending).build();
    assert_eq!(
        item.complete("x", None, 1).unwrap_err().kind,
        ErrorKind::StateConflict
    );
}

#[test]
fn complete_is_terminal_and_rejects_further_mutation() {
    let mut item = WorkItem::builder().status(WorkStatus::Active).build();
    item.complete("done", None, 1_000).unwrap();
    assert!(item.is_terminal());
    assert_eq!(
        item.complete("again", None, 2_000).unwrap_err().kind,
        ErrorKind::StateConflict
    );
}

#[test]
fn fail_records_reason_as_result() {
    let mut item = WorkItem::builder().status(WorkStatus::Active).build();
    item.fail("out of disk space", 5_000).unwrap();
    assert_eq!(item.status, WorkStatus::Failed);
    assert_eq!(item.result.as_deref(), Some("out of disk space"));
    assert_eq!(item.completed_at, Some(5_000));
}

#[test]
fn cancel_permitted_from_pending() {
    let mut item = WorkItem::builder().status(WorkStatus::Pending).build();
    item.cancel(4_000).unwrap();
    assert_eq!(item.status, WorkStatus::Cancelled);
}

#[test]
fn cancel_permitted_from_active() {
    let mut item = WorkItem::builder().status(WorkStatus::Active).build();
    item.cancel(4_000).unwrap();
    assert_eq!(item.status, WorkStatus::Cancelled);
}

#[test]
fn cancel_rejected_from_terminal_status() {
    let mut item = WorkItem::builder().status(WorkStatus::Failed).build();
    assert_eq!(item.cancel(1).unwrap_err().kind, ErrorKind::StateConflict);
}

#[test]
fn work_status_holds_workload_matches_a2() {
    assert!(WorkStatus::Active.holds_workload());
    assert!(WorkStatus::Blocked.holds_workload());
    assert!(!WorkStatus::Pending.holds_workload());
    assert!(!WorkStatus::Completed.holds_workload());
}

#[test]
fn builder_mints_distinct_work_ids() {
    let a = WorkItem::builder().build();
    let b = WorkItem::builder().build();
    assert_ne!(a.work_id, b.work_id);
    assert!(a.work_id.as_str().starts_with("wrk-"));
}
