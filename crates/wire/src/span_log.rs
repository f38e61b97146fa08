// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The append-only span log (C2).
//!
//! One JSON record per line, never rewritten. Grounded on the teacher's
//! `oj-storage` WAL module (`Wal::open`/`append`/`flush`/`entries_after`):
//! same open-append-read shape, repointed at spec's NDJSON span schema
//! instead of a replay log of domain events, and with rotation instead of
//! processed-seq tracking since the span log has no consumer offset to
//! persist.
//!
//! Every write failure is swallowed at the call site (spec §4.2: "a failed
//! write is itself logged... the calling operation proceeds") — this type
//! only offers the building blocks; `oj-engine` decides to ignore the
//! `Result` and log instead.

use oj_core::{AttrValue, Span, SpanHandle, SpanStatus};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::WireError;

/// Handle on the live span-log file. Cheap to construct per-operation —
/// each CLI invocation opens, appends, and drops one of these.
pub struct SpanLog {
    path: PathBuf,
}

impl SpanLog {
    /// Open (creating if absent) the span log at `path`, running the
    /// truncated/corrupt-tail recovery pass described in spec §4.2/§3.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WireError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| WireError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        if !path.exists() {
            File::create(&path).map_err(|source| WireError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        let log = Self { path };
        log.recover()?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scan the live file for a corrupt (non-final) line. A final line
    /// that fails to parse is tolerated as an in-progress truncated write
    /// (spec §3: "the reader contract tolerates a final truncated line")
    /// and is simply dropped on the next append. An *earlier* invalid line
    /// means real corruption: everything from that line onward is moved
    /// into a dated `.corrupt` sidecar and the live file keeps only the
    /// valid prefix.
    fn recover(&self) -> Result<(), WireError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| WireError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let lines: Vec<&str> = contents.lines().collect();
        if lines.is_empty() {
            return Ok(());
        }

        let mut first_bad = None;
        for (i, line) in lines.iter().enumerate() {
            if serde_json::from_str::<Span>(line).is_err() {
                first_bad = Some(i);
                break;
            }
        }
        let Some(bad_idx) = first_bad else { return Ok(()) };
        if bad_idx == lines.len() - 1 {
            // Only the final line is bad: truncated in-progress write, drop it.
            let good = lines[..bad_idx].join("\n");
            let good = if good.is_empty() { good } else { format!("{good}\n") };
            fs::write(&self.path, good).map_err(|source| WireError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
            return Ok(());
        }

        // Real corruption: quarantine the bad suffix into a dated sidecar.
        let suffix = lines[bad_idx..].join("\n");
        let sidecar = self.path.with_extension(format!(
            "corrupt.{}",
            oj_core::now_wall_iso8601_ms().replace([':', '.'], "-")
        ));
        fs::write(&sidecar, suffix).map_err(|source| WireError::Io {
            path: sidecar.display().to_string(),
            source,
        })?;
        let good = lines[..bad_idx].join("\n");
        let good = if good.is_empty() { good } else { format!("{good}\n") };
        fs::write(&self.path, good).map_err(|source| WireError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Append one finalized span as a single NDJSON line. One `write_all`
    /// call carries the whole line (spec §4.2: "each line is emitted in a
    /// single write call"); a short write re-seeks to end and retries once.
    pub fn append(&self, span: &Span) -> Result<(), WireError> {
        let mut line = serde_json::to_string(span).map_err(|e| WireError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        line.push('\n');
        let bytes = line.as_bytes();

        let mut file = OpenOptions::new().append(true).open(&self.path).map_err(|source| {
            WireError::Io { path: self.path.display().to_string(), source }
        })?;

        let written = file.write(bytes).map_err(|source| WireError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        if written < bytes.len() {
            // Partial write: re-open at end-of-file and retry the remainder.
            let mut retry = OpenOptions::new().append(true).open(&self.path).map_err(|source| {
                WireError::Io { path: self.path.display().to_string(), source }
            })?;
            retry.write_all(&bytes[written..]).map_err(|source| WireError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
            retry.flush().map_err(|source| WireError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        } else {
            file.flush().map_err(|source| WireError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Convenience: finish a [`SpanHandle`] and append it in one call,
    /// logging (never propagating) any write failure — the contract every
    /// mutating operation in `oj-engine` relies on.
    pub fn finish_and_append(
        &self,
        handle: SpanHandle,
        status: SpanStatus,
        extra_attributes: impl IntoIterator<Item = (String, AttrValue)>,
    ) {
        let span = handle.finish(status, extra_attributes);
        if let Err(e) = self.append(&span) {
            tracing::warn!(error = %e, "span log write failed, operation proceeds");
        }
    }

    /// Read every record currently in the live file, skipping a final
    /// truncated line rather than erroring (spec §3).
    pub fn entries(&self) -> Result<Vec<Span>, WireError> {
        let file = File::open(&self.path).map_err(|source| WireError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut out = Vec::new();
        let lines: Vec<String> = reader
            .lines()
            .collect::<Result<_, _>>()
            .map_err(|source| WireError::Io { path: self.path.display().to_string(), source })?;
        for (i, line) in lines.iter().enumerate() {
            match serde_json::from_str::<Span>(line) {
                Ok(span) => out.push(span),
                Err(_) if i == lines.len() - 1 => break,
                Err(e) => {
                    return Err(WireError::Corrupt {
                        path: self.path.display().to_string(),
                        message: e.to_string(),
                    })
                }
            }
        }
        Ok(out)
    }

    /// Current size of the live file in bytes, used by `rotate_span_log`
    /// against `SPAN_LOG_MAX_BYTES`.
    pub fn size_bytes(&self) -> Result<u64, WireError> {
        fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|source| WireError::Io { path: self.path.display().to_string(), source })
    }

    /// Rotate the live file to a dated suffix and start a fresh, empty
    /// live file. Never concatenates; never edits in place (spec §4.7).
    /// Returns the path the old content was renamed to, or `None` if the
    /// live file was already empty (idempotent: L4).
    pub fn rotate(&self, date_suffix: &str) -> Result<Option<PathBuf>, WireError> {
        if self.size_bytes()? == 0 {
            return Ok(None);
        }
        let rotated = self.path.with_file_name(format!(
            "{}.{date_suffix}",
            self.path.file_name().and_then(|n| n.to_str()).unwrap_or("spans.ndjson")
        ));
        fs::rename(&self.path, &rotated).map_err(|source| WireError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        File::create(&self.path).map_err(|source| WireError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(Some(rotated))
    }
}

/// Build the attribute map shared by every claim-engine span. Kept as a
/// free function rather than a method on `Span` since `oj-core` doesn't
/// depend on `oj-wire`.
pub fn attrs(pairs: impl IntoIterator<Item = (&'static str, AttrValue)>) -> BTreeMap<String, AttrValue> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[cfg(test)]
#[path = "span_log_tests.rs"]
mod tests;
