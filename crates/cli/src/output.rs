// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output shaping for the two modes spec §4.8 allows: human-readable
//! text (one-liner plus a flat dump of the response payload) or the
//! stable JSON envelope. The dispatcher in [`crate::commands`] does no
//! rendering itself — every verb hands back a plain [`serde_json::Value`]
//! and this module turns that, plus timing/trace metadata, into one of
//! the two.

use clap::ValueEnum;
use oj_core::ErrorKind;
use oj_wire::{Envelope, StatusCode};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_envelope(format: OutputFormat, envelope: &Envelope) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(envelope) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("failed to serialize response envelope: {e}"),
        },
        OutputFormat::Text => print_text(envelope),
    }
}

fn print_text(envelope: &Envelope) {
    match envelope.status.code {
        StatusCode::Success => {
            println!(
                "{} ok ({}ms)",
                crate::color::header(&envelope.metadata.operation),
                envelope.metadata.execution_time_ms
            );
            print_data_fields(&envelope.data);
        }
        StatusCode::Warning => {
            println!("{} warning: {}", envelope.metadata.operation, envelope.status.message);
            print_data_fields(&envelope.data);
        }
        StatusCode::Error => {
            eprintln!(
                "{} failed: {}{}",
                envelope.metadata.operation,
                envelope.status.message,
                envelope
                    .status
                    .error_kind
                    .map(|k| format!(" ({k})"))
                    .unwrap_or_default(),
            );
        }
    }
}

fn print_data_fields(data: &serde_json::Value) {
    match data {
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                println!("  {}: {}", crate::color::muted(key), scalar_or_json(value));
            }
        }
        serde_json::Value::Array(items) => {
            println!("  {} item(s)", items.len());
            for item in items {
                println!("  - {}", scalar_or_json(item));
            }
        }
        serde_json::Value::Null => {}
        other => println!("  {other}"),
    }
}

fn scalar_or_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// §4.8 exit-code mapping: `0` success, `2`..`6` per `ErrorKind`, `1`
/// for everything else (including the kinds with no dedicated code).
pub fn exit_code_for(envelope: &Envelope) -> i32 {
    match envelope.status.code {
        StatusCode::Success | StatusCode::Warning => 0,
        StatusCode::Error => envelope.status.error_kind.map(ErrorKind::exit_code).unwrap_or(1),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
