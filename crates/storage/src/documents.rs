// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three JSON state documents (C3) and the locked mutate / lock-free
//! snapshot operations over them.
//!
//! Grounded on the teacher's `storage::state` materialized-state shape
//! (one struct holding every domain collection, loaded/saved as a unit),
//! repointed at spec's three-document contract. Per spec §9 ("An
//! implementer MAY consolidate the three documents into a single file to
//! simplify atomicity"), all three documents here are covered by one
//! combined lock (`state.lock`) rather than a fixed per-document lock
//! order — this satisfies S2 without a deadlock-avoidance protocol.

use oj_core::{Agent, AgentId, CoordinationMode, CoordinatorConfig, WorkId, WorkItem};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::StoreError;
use crate::lock::{self, LockGuard};

/// A `WorkItem` that reached a terminal status, plus the fields only
/// known at completion time (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedWorkRecord {
    #[serde(flatten)]
    pub item: WorkItem,
    pub duration_ms: u64,
}

/// In-memory copy of the three documents, mutated under lock and
/// committed back atomically by `with_exclusive_lock`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Documents {
    pub active_claims: Vec<WorkItem>,
    pub agent_registry: BTreeMap<String, Agent>,
    pub completed_log: Vec<CompletedWorkRecord>,
}

impl Documents {
    pub fn agent(&self, agent_id: &AgentId) -> Option<&Agent> {
        self.agent_registry.get(agent_id.as_str())
    }

    pub fn agent_mut(&mut self, agent_id: &AgentId) -> Option<&mut Agent> {
        self.agent_registry.get_mut(agent_id.as_str())
    }

    pub fn work_item(&self, work_id: &WorkId) -> Option<&WorkItem> {
        self.active_claims.iter().find(|w| w.work_id == *work_id)
    }

    pub fn work_item_mut(&mut self, work_id: &WorkId) -> Option<&mut WorkItem> {
        self.active_claims.iter_mut().find(|w| w.work_id == *work_id)
    }

    /// Move a terminated item out of active-claims and into the
    /// completed-work log (spec §4.4.7 step 4–5, §4.4.8).
    pub fn retire(&mut self, work_id: &WorkId, duration_ms: u64) -> Option<&CompletedWorkRecord> {
        let idx = self.active_claims.iter().position(|w| w.work_id == *work_id)?;
        let item = self.active_claims.remove(idx);
        self.completed_log.push(CompletedWorkRecord { item, duration_ms });
        self.completed_log.last()
    }
}

/// Handle on the coordination directory's three JSON documents.
pub struct StateStore {
    dir: PathBuf,
    mode: CoordinationMode,
    lock_wait: Duration,
}

impl StateStore {
    /// Open the state store, resolving `Auto` coordination mode once and
    /// running the startup recovery pass (S4: delete orphaned temp files
    /// from a crashed rename, restore a corrupt main file from backup).
    pub fn open(config: &CoordinatorConfig) -> Result<Self, StoreError> {
        let dir = config.coordination_dir.clone();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let mode = lock::detect_capability(&dir, config.coordination_mode);
        tracing::info!(?mode, dir = %dir.display(), "state store coordination mode selected");
        let store = Self { dir, mode, lock_wait: Duration::from_secs(config.lock_wait_sec) };
        store.recover()?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn active_claims_path(&self) -> PathBuf {
        self.dir.join("active-claims.json")
    }

    pub fn agent_registry_path(&self) -> PathBuf {
        self.dir.join("agent-registry.json")
    }

    pub fn completed_log_path(&self) -> PathBuf {
        self.dir.join("completed-log.json")
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join("state.lock")
    }

    /// S4: delete any `.tmp` file left behind by a crashed rename, and
    /// restore any document that fails to parse from its `.bak` sidecar.
    fn recover(&self) -> Result<(), StoreError> {
        for path in [self.active_claims_path(), self.agent_registry_path(), self.completed_log_path()]
        {
            let tmp = path.with_extension("json.tmp");
            if tmp.exists() {
                tracing::warn!(path = %tmp.display(), "removing orphaned temp file from crashed rename");
                let _ = fs::remove_file(&tmp);
            }
            if path.exists() && fs::read_to_string(&path).ok().and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok()).is_none() {
                let backup = path.with_extension("json.bak");
                if backup.exists() {
                    tracing::warn!(path = %path.display(), "document corrupt, restoring from backup");
                    fs::copy(&backup, &path).map_err(|source| StoreError::Io {
                        path: path.display().to_string(),
                        source,
                    })?;
                } else {
                    return Err(StoreError::Corrupt {
                        document: path.display().to_string(),
                        message: "invalid JSON and no backup available".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn read_document<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T, StoreError> {
        if !path.exists() {
            return Ok(T::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|source| StoreError::Io { path: path.display().to_string(), source })?;
        if contents.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
            document: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Write-temp-then-rename with S3 schema validation: the temp file is
    /// parsed back before the rename, so a malformed write never replaces
    /// a good document.
    fn write_document<T: Serialize + DeserializeOwned>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::ValidationFailed {
            document: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str::<T>(&json).map_err(|e| StoreError::ValidationFailed {
            document: path.display().to_string(),
            message: e.to_string(),
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json)
            .map_err(|source| StoreError::Io { path: tmp.display().to_string(), source })?;

        if path.exists() {
            let backup = path.with_extension("json.bak");
            let _ = fs::copy(path, &backup);
        }

        fs::rename(&tmp, path)
            .map_err(|source| StoreError::Io { path: path.display().to_string(), source })
    }

    fn load(&self) -> Result<Documents, StoreError> {
        Ok(Documents {
            active_claims: self.read_document(&self.active_claims_path())?,
            agent_registry: self.read_document(&self.agent_registry_path())?,
            completed_log: self.read_document(&self.completed_log_path())?,
        })
    }

    fn commit(&self, docs: &Documents) -> Result<(), StoreError> {
        self.write_document(&self.active_claims_path(), &docs.active_claims)?;
        self.write_document(&self.agent_registry_path(), &docs.agent_registry)?;
        self.write_document(&self.completed_log_path(), &docs.completed_log)?;
        Ok(())
    }

    /// S1/S2: acquire the combined exclusive lock, load a mutable
    /// snapshot, run `f`, and — only if `f` succeeds — commit the result
    /// atomically. A failing `f` leaves the on-disk documents untouched
    /// (the mutated in-memory copy is simply dropped, per spec's "every
    /// operation either fully commits or fully rolls back").
    ///
    /// Generic over the error type so callers above `oj-storage` can
    /// return their own domain errors (`NOT_FOUND`, `STATE_CONFLICT`,
    /// `CAPACITY_EXCEEDED`, ...) from inside the locked closure — those
    /// checks must happen under the lock, not after it's released.
    pub fn with_exclusive_lock<T, E>(
        &self,
        f: impl FnOnce(&mut Documents) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let _guard: LockGuard =
            lock::acquire_exclusive(&self.lock_path(), self.mode, self.lock_wait, "state-store")
                .map_err(E::from)?;
        let mut docs = self.load().map_err(E::from)?;
        let result = f(&mut docs)?;
        self.commit(&docs).map_err(E::from)?;
        Ok(result)
    }

    /// Take a consistent snapshot without promising exclusivity for
    /// longer than the read itself (spec §4.3 `read_snapshot`, §4.6 "must
    /// not block mutating operations longer than that snapshot").
    pub fn read_snapshot(&self) -> Result<Documents, StoreError> {
        let _guard: LockGuard =
            lock::acquire_exclusive(&self.lock_path(), self.mode, self.lock_wait, "state-store")?;
        self.load()
    }

    pub fn mode(&self) -> CoordinationMode {
        self.mode
    }
}

#[cfg(test)]
#[path = "documents_tests.rs"]
mod tests;
