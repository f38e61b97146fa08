// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fast path / safe path locking (spec §4.3, §9 "Fast vs. safe path").
//!
//! The fast path uses `fs2`'s OS-level advisory `flock`. The safe path —
//! used when the platform or filesystem doesn't honor advisory locks — is
//! a PID + `O_CREAT|O_EXCL` rendezvous file, grounded on
//! `other_examples`'s `claim_coordinator.rs` lock-file pattern. Capability
//! is probed once at process start and logged; switching mid-run is not
//! permitted (spec §9).

use fs2::FileExt;
use oj_core::CoordinationMode;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::StoreError;

/// How long a safe-path rendezvous file is trusted before it's considered
/// abandoned by a crashed holder and force-reclaimed.
const STALE_RENDEZVOUS_SECS: u64 = 30;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Probe whether this filesystem honors OS-level advisory locks. Returns
/// the resolved mode (`Auto` is never returned — it's resolved to `Fast`
/// or `Safe` here).
pub fn detect_capability(dir: &Path, requested: CoordinationMode) -> CoordinationMode {
    match requested {
        CoordinationMode::Fast => CoordinationMode::Fast,
        CoordinationMode::Safe => CoordinationMode::Safe,
        CoordinationMode::Auto => {
            let probe = dir.join(".oj-lock-probe");
            let resolved = File::create(&probe)
                .and_then(|f| f.try_lock_exclusive().map(|_| f))
                .map(|f| {
                    let _ = fs2::FileExt::unlock(&f);
                    CoordinationMode::Fast
                })
                .unwrap_or(CoordinationMode::Safe);
            let _ = fs::remove_file(&probe);
            resolved
        }
    }
}

/// Held while a scope's lock is live; releases on drop.
pub enum LockGuard {
    Fast(File),
    Safe(PathBuf),
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        match self {
            LockGuard::Fast(file) => {
                let _ = fs2::FileExt::unlock(file);
            }
            LockGuard::Safe(path) => {
                let _ = fs::remove_file(path);
            }
        }
    }
}

/// Acquire the named scope's exclusive lock, blocking up to `wait` (spec:
/// "Lock acquisition blocks up to a configured wait... On timeout the
/// operation fails with `BUSY`").
pub fn acquire_exclusive(
    lock_path: &Path,
    mode: CoordinationMode,
    wait: Duration,
    scope_name: &str,
) -> Result<LockGuard, StoreError> {
    match mode {
        CoordinationMode::Auto => {
            unreachable!("coordination mode must be resolved via detect_capability before locking")
        }
        CoordinationMode::Fast => acquire_fast(lock_path, wait, scope_name),
        CoordinationMode::Safe => acquire_safe(lock_path, wait, scope_name),
    }
}

fn acquire_fast(lock_path: &Path, wait: Duration, scope_name: &str) -> Result<LockGuard, StoreError> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|source| StoreError::Io { path: lock_path.display().to_string(), source })?;

    let deadline = Instant::now() + wait;
    loop {
        match fs2::FileExt::try_lock_exclusive(&file) {
            Ok(()) => return Ok(LockGuard::Fast(file)),
            Err(_) if Instant::now() < deadline => std::thread::sleep(POLL_INTERVAL),
            Err(_) => {
                return Err(StoreError::LockTimeout {
                    scope: scope_name.to_string(),
                    waited_secs: wait.as_secs(),
                })
            }
        }
    }
}

fn acquire_safe(lock_path: &Path, wait: Duration, scope_name: &str) -> Result<LockGuard, StoreError> {
    let rendezvous = lock_path.with_extension("pid");
    let deadline = Instant::now() + wait;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&rendezvous) {
            Ok(mut f) => {
                let _ = write!(f, "{}", std::process::id());
                return Ok(LockGuard::Safe(rendezvous));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if is_stale(&rendezvous) {
                    let _ = fs::remove_file(&rendezvous);
                    continue;
                }
                if Instant::now() >= deadline {
                    return Err(StoreError::LockTimeout {
                        scope: scope_name.to_string(),
                        waited_secs: wait.as_secs(),
                    });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                return Err(StoreError::Io { path: rendezvous.display().to_string(), source })
            }
        }
    }
}

fn is_stale(rendezvous: &Path) -> bool {
    let Ok(meta) = fs::metadata(rendezvous) else { return true };
    let Ok(modified) = meta.modified() else { return false };
    modified.elapsed().map(|age| age.as_secs() > STALE_RENDEZVOUS_SECS).unwrap_or(false)
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
