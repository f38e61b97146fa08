// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios against the compiled `oj` binary (spec §8), each
//! invoked in its own coordination directory so runs never interact.

use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use serde_json::Value;

fn oj(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("oj").expect("oj binary built by this workspace");
    cmd.arg("--json").arg("--coordination-dir").arg(dir);
    cmd
}

fn run(dir: &Path, args: &[&str]) -> (Output, Value) {
    let output = oj(dir).args(args).output().expect("oj invocation");
    let envelope: Value = serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("stdout was not a JSON envelope ({e}): {:?}", output));
    (output, envelope)
}

fn exit_code(output: &Output) -> i32 {
    output.status.code().expect("process exited normally")
}

#[test]
fn register_claim_progress_complete() {
    let dir = tempfile::tempdir().unwrap();

    let (out, env) = run(dir.path(), &["register", "a1", "team-a", "dev", "3"]);
    assert_eq!(exit_code(&out), 0);
    assert_eq!(env["data"]["status"], "active");
    assert_eq!(env["data"]["current_workload"], 0);

    let (out, env) = run(
        dir.path(),
        &["--agent", "a1", "claim", "feature", "refactor cache", "--priority", "high"],
    );
    assert_eq!(exit_code(&out), 0);
    assert_eq!(env["data"]["status"], "active");
    assert_eq!(env["data"]["team"], "team-a");
    let work_id = env["data"]["work_id"].as_str().unwrap().to_string();

    let (out, env) = run(dir.path(), &["progress", &work_id, "50"]);
    assert_eq!(exit_code(&out), 0);
    assert_eq!(env["data"]["progress_percent"], 50);

    let (out, env) = run(dir.path(), &["complete", &work_id, "ok", "--velocity", "5"]);
    assert_eq!(exit_code(&out), 0);
    assert_eq!(env["data"]["status"], "completed");

    let (_, env) = run(dir.path(), &["heartbeat", "a1"]);
    assert_eq!(env["data"]["current_workload"], 0);
}

#[test]
fn contention_on_one_item_claims_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    run(dir.path(), &["register", "aX", "team-a", "dev", "2"]);
    run(dir.path(), &["register", "aY", "team-a", "dev", "2"]);

    // Seed exactly one pending item the same way the capacity test does:
    // claim it with a throwaway agent, then knock that agent offline so
    // the sweep returns the item to `pending`.
    run(dir.path(), &["register", "seed", "team-a", "dev", "1"]);
    run(dir.path(), &["--agent", "seed", "claim", "feature", "one pending item", "--team", "team-a"]);
    std::thread::sleep(std::time::Duration::from_millis(20));
    oj(dir.path())
        .env("HEARTBEAT_TIMEOUT_SEC", "0")
        .args(["maintenance", "stale_heartbeat_sweep"])
        .output()
        .unwrap();

    let (out1, env1) =
        run(dir.path(), &["--agent", "aX", "claim-next", "--work-type", "feature"]);
    let (out2, env2) =
        run(dir.path(), &["--agent", "aY", "claim-next", "--work-type", "feature"]);

    assert_eq!(exit_code(&out1), 0);
    assert_eq!(exit_code(&out2), 0);

    let claimed_counts: Vec<usize> =
        [&env1, &env2].iter().map(|e| e["data"].as_array().unwrap().len()).collect();
    assert_eq!(claimed_counts.iter().sum::<usize>(), 1, "exactly one of the two claimed the item");
}

#[test]
fn capacity_limit_caps_claim_next_and_then_rejects() {
    let dir = tempfile::tempdir().unwrap();
    // The only CLI-level way to get pending work is `claim` (create-and-claim),
    // so seed three items on a high-capacity throwaway agent, then knock it
    // offline via the stale-heartbeat sweep — that returns its active items
    // to `pending` without needing a direct store-level fixture.
    run(dir.path(), &["register", "seed", "team-a", "dev", "99"]);
    for _ in 0..3 {
        run(dir.path(), &["--agent", "seed", "claim", "feature", "item", "--team", "team-a"]);
    }
    std::thread::sleep(std::time::Duration::from_millis(20));
    oj(dir.path())
        .env("HEARTBEAT_TIMEOUT_SEC", "0")
        .args(["maintenance", "stale_heartbeat_sweep"])
        .output()
        .unwrap();

    run(dir.path(), &["register", "a2", "team-a", "dev", "2"]);
    let (out, env) =
        run(dir.path(), &["--agent", "a2", "claim-next", "--work-type", "feature", "--count", "3"]);
    assert_eq!(exit_code(&out), 0);
    assert_eq!(env["data"].as_array().unwrap().len(), 2);

    let (_, env) = run(dir.path(), &["heartbeat", "a2"]);
    assert_eq!(env["data"]["current_workload"], 2);
    assert_eq!(env["data"]["status"], "busy");

    let (out, env) =
        run(dir.path(), &["--agent", "a2", "claim-next", "--work-type", "feature", "--count", "1"]);
    assert_ne!(exit_code(&out), 0);
    assert_eq!(env["status"]["error_kind"], "CAPACITY_EXCEEDED");
}

#[test]
fn stale_heartbeat_sweep_returns_work_to_pending() {
    let dir = tempfile::tempdir().unwrap();
    run(dir.path(), &["register", "a3", "team-a", "dev", "2"]);
    let (_, env) = run(dir.path(), &["--agent", "a3", "claim", "feature", "w7", "--team", "team-a"]);
    let work_id = env["data"]["work_id"].as_str().unwrap().to_string();

    std::thread::sleep(std::time::Duration::from_millis(20));

    let (out, _) = oj(dir.path())
        .env("HEARTBEAT_TIMEOUT_SEC", "0")
        .args(["maintenance", "stale_heartbeat_sweep"])
        .output()
        .map(|o| {
            let v: Value = serde_json::from_slice(&o.stdout).unwrap();
            (o, v)
        })
        .unwrap();
    assert_eq!(exit_code(&out), 0);

    run(dir.path(), &["register", "a4", "team-a", "dev", "2"]);
    let (out, env) =
        run(dir.path(), &["--agent", "a4", "claim-next", "--work-type", "feature"]);
    assert_eq!(exit_code(&out), 0);
    let claimed = env["data"].as_array().unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0]["work_id"], work_id);
}

#[test]
fn reality_verify_flags_tampered_state_with_nonzero_exit() {
    let dir = tempfile::tempdir().unwrap();
    run(dir.path(), &["register", "a1", "team-a", "dev", "3"]);
    run(dir.path(), &["--agent", "a1", "claim", "feature", "item", "--team", "team-a"]);

    let claims_path = dir.path().join("active-claims.json");
    let contents = std::fs::read_to_string(&claims_path).unwrap();
    let mut items: Vec<Value> = serde_json::from_str(&contents).unwrap();
    let duplicate = items[0].clone();
    items.push(duplicate);
    std::fs::write(&claims_path, serde_json::to_string(&items).unwrap()).unwrap();

    let (out, env) = run(dir.path(), &["maintenance", "reality_verify"]);
    assert_ne!(exit_code(&out), 0);
    assert_eq!(env["status"]["code"], "error");
    assert_eq!(env["status"]["error_kind"], "CORRUPT_STATE");
    assert!(env["status"]["message"].as_str().unwrap().contains("P1 violation"));
}
