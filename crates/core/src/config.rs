// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered coordinator configuration.
//!
//! Precedence, lowest to highest: built-in defaults → `config.toml` in the
//! coordination directory → environment variables (§6) → CLI flags. Each
//! layer only overrides fields it actually sets; a layer silent on a field
//! never resets it back to default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Lock-path selection (§4.3 "fast path" / "fallback path").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinationMode {
    /// OS-level advisory file locks.
    Fast,
    /// PID + `O_CREAT|O_EXCL` rendezvous lock files.
    Safe,
    /// Probe platform capability at startup and pick one; logged once.
    Auto,
}

crate::simple_display! {
    CoordinationMode {
        Fast => "fast",
        Safe => "safe",
        Auto => "auto",
    }
}

impl CoordinationMode {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Some(Self::Fast),
            "safe" => Some(Self::Safe),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

fn default_coordination_dir() -> PathBuf {
    PathBuf::from(".oj")
}

/// Fully resolved configuration used by every crate above `oj-core`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    pub coordination_dir: PathBuf,
    pub lock_wait_sec: u64,
    pub heartbeat_timeout_sec: u64,
    pub span_log_max_bytes: u64,
    pub completed_retention_days: u32,
    pub coordination_mode: CoordinationMode,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            coordination_dir: default_coordination_dir(),
            lock_wait_sec: 5,
            heartbeat_timeout_sec: 120,
            span_log_max_bytes: 50 * 1024 * 1024,
            completed_retention_days: 30,
            coordination_mode: CoordinationMode::Auto,
        }
    }
}

/// One layer of config, every field optional — only the fields a layer
/// actually sets are applied on top of what came before.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    pub coordination_dir: Option<PathBuf>,
    pub lock_wait_sec: Option<u64>,
    pub heartbeat_timeout_sec: Option<u64>,
    pub span_log_max_bytes: Option<u64>,
    pub completed_retention_days: Option<u32>,
    pub coordination_mode: Option<CoordinationMode>,
}

impl ConfigOverrides {
    fn apply(self, base: &mut CoordinatorConfig) {
        if let Some(v) = self.coordination_dir {
            base.coordination_dir = v;
        }
        if let Some(v) = self.lock_wait_sec {
            base.lock_wait_sec = v;
        }
        if let Some(v) = self.heartbeat_timeout_sec {
            base.heartbeat_timeout_sec = v;
        }
        if let Some(v) = self.span_log_max_bytes {
            base.span_log_max_bytes = v;
        }
        if let Some(v) = self.completed_retention_days {
            base.completed_retention_days = v;
        }
        if let Some(v) = self.coordination_mode {
            base.coordination_mode = v;
        }
    }

    /// Read the environment variables named in spec.md §6.
    pub fn from_env() -> Self {
        Self {
            coordination_dir: std::env::var("COORDINATION_DIR").ok().map(PathBuf::from),
            lock_wait_sec: std::env::var("LOCK_WAIT_SEC")
                .ok()
                .and_then(|v| v.parse().ok()),
            heartbeat_timeout_sec: std::env::var("HEARTBEAT_TIMEOUT_SEC")
                .ok()
                .and_then(|v| v.parse().ok()),
            span_log_max_bytes: std::env::var("SPAN_LOG_MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok()),
            completed_retention_days: std::env::var("COMPLETED_RETENTION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok()),
            coordination_mode: std::env::var("COORDINATION_MODE")
                .ok()
                .and_then(|v| CoordinationMode::parse(&v)),
        }
    }
}

impl CoordinatorConfig {
    /// Load `config.toml` from `coordination_dir` if present, layer
    /// environment variables, then `cli_overrides` (highest precedence),
    /// on top of built-in defaults.
    pub fn load(
        coordination_dir: &Path,
        cli_overrides: ConfigOverrides,
    ) -> Result<Self, CoreError> {
        let mut config = Self {
            coordination_dir: coordination_dir.to_path_buf(),
            ..Self::default()
        };

        let file_path = coordination_dir.join("config.toml");
        if let Ok(contents) = std::fs::read_to_string(&file_path) {
            let file_overrides: ConfigOverrides = toml::from_str(&contents).map_err(|e| {
                CoreError::invalid_arg(format!(
                    "{} is not valid config.toml: {e}",
                    file_path.display()
                ))
            })?;
            file_overrides.apply(&mut config);
        }

        ConfigOverrides::from_env().apply(&mut config);
        cli_overrides.apply(&mut config);

        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
