// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `--timeout=<duration>` parsing for the global CLI flag (spec §6).
//! Accepts a bare integer (seconds) or a suffixed value; only whole
//! seconds matter since it feeds `ConfigOverrides::lock_wait_sec`.

pub fn parse_timeout_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty --timeout value".to_string());
    }

    let (num_str, suffix) = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, ""));

    let num: u64 = num_str.parse().map_err(|_| format!("invalid number in --timeout: {s}"))?;

    let multiplier = match suffix.trim() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600,
        other => return Err(format!("unknown --timeout suffix: {other}")),
    };

    Ok(num * multiplier)
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
