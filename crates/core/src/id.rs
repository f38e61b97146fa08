// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions.
//!
//! Every minted ID is `{prefix}{16 hex mint-nanos}{6 char nanoid}`. The
//! mint-nanos segment is a zero-padded hex encoding of elapsed time since
//! the process started, so two IDs minted later in the same process always
//! compare greater by plain string ordering — this is what lets the claim
//! engine break priority ties by `created_at` without a second timestamp
//! field, and lets spans correlate with the order operations actually ran.

use smol_str::SmolStr;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

/// Width in hex digits of the mint-nanos segment (64 bits).
const MINT_HEX_LEN: usize = 16;
/// Width of the random suffix appended after the mint-nanos segment.
const SUFFIX_LEN: usize = 6;

fn process_epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// Nanoseconds elapsed since this process started. Monotonic for the
/// lifetime of the process — never goes backwards.
pub fn now_monotonic_ns() -> u64 {
    process_epoch().elapsed().as_nanos() as u64
}

/// Current wall-clock time formatted as milliseconds since the Unix epoch,
/// rendered as an RFC 3339 / ISO 8601 string with millisecond precision.
pub fn now_wall_iso8601_ms() -> String {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = dur.as_secs() as i64;
    let millis = dur.subsec_millis();
    format_iso8601(secs, millis)
}

/// Render a `(unix_secs, millis)` pair as `YYYY-MM-DDTHH:MM:SS.sssZ`.
///
/// Implemented directly against the civil-calendar algorithm (no timezone
/// database lookups are needed since every timestamp here is UTC), so the
/// core has no chrono dependency for this.
fn format_iso8601(unix_secs: i64, millis: u32) -> String {
    let days = unix_secs.div_euclid(86_400);
    let secs_of_day = unix_secs.rem_euclid(86_400);
    let (y, m, d) = civil_from_days(days);
    let hh = secs_of_day / 3600;
    let mm = (secs_of_day % 3600) / 60;
    let ss = secs_of_day % 60;
    format!("{y:04}-{m:02}-{d:02}T{hh:02}:{mm:02}:{ss:02}.{millis:03}Z")
}

/// Howard Hinnant's `civil_from_days` algorithm, converting a day count
/// since the Unix epoch into a `(year, month, day)` triple.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Random source used when minting trace/span IDs. Attempts a
/// cryptographic-quality UUID v4; on failure (the OS RNG being
/// unavailable) falls back to a process-local counter seeded from the
/// monotonic clock, per spec: all ID operations are total.
fn random_u128() -> (u128, bool) {
    match std::panic::catch_unwind(|| uuid::Uuid::new_v4().as_u128()) {
        Ok(v) => (v, false),
        Err(_) => {
            static FALLBACK: AtomicU64 = AtomicU64::new(0);
            let n = FALLBACK.fetch_add(1, Ordering::Relaxed);
            let seed = u128::from(now_monotonic_ns()) << 32 | u128::from(n);
            (seed, true)
        }
    }
}

fn hex_suffix(n: usize) -> String {
    let (v, _degraded) = random_u128();
    let s = format!("{v:032x}");
    s[s.len() - n..].to_string()
}

/// Mint the variable-length body shared by every `define_id!` type:
/// 16 hex mint-nanos digits followed by a 6-char random suffix.
pub fn mint_body() -> String {
    format!("{:0>width$x}{}", now_monotonic_ns(), hex_suffix(SUFFIX_LEN), width = MINT_HEX_LEN)
}

/// Mint a 128-bit trace ID rendered as 32 lowercase hex digits.
pub fn new_trace_id() -> String {
    let (v, _degraded) = random_u128();
    format!("{v:032x}")
}

/// Mint a 64-bit span ID rendered as 16 lowercase hex digits.
pub fn new_span_id() -> String {
    let (v, _degraded) = random_u128();
    let s = format!("{v:032x}");
    s[..16].to_string()
}

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        &s[..n]
    }
}

/// Cheaply-cloned ID storage. Short IDs (the common case — prefix + 16 hex
/// + 6 char suffix is well under `smol_str`'s inline capacity) never touch
/// the heap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdBuf(SmolStr);

impl IdBuf {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(SmolStr::new(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::borrow::Borrow<str> for IdBuf {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for IdBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for IdBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for IdBuf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for IdBuf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        Ok(IdBuf::new(s))
    }
}

/// Define a newtype ID wrapper around [`IdBuf`] with a type prefix.
///
/// Generates `new()` (mints a sortable ID via [`mint_body`]), `from_string()`
/// for parsing, `as_str()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `Borrow<str>`, and `Deref` implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $crate::id::IdBuf);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Mint a new sortable ID with this type's prefix.
            pub fn new() -> Self {
                Self($crate::id::IdBuf::new(format!("{}{}", Self::PREFIX, $crate::id::mint_body())))
            }

            /// Create an ID from an existing string (parsing/deserialization).
            pub fn from_string(id: impl AsRef<str>) -> Self {
                Self($crate::id::IdBuf::new(id.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0.as_str())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0.as_str() == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
