// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    let id = TestId::from_string("tst-k");
    map.insert(id.clone(), 42);
    assert_eq!(map.get("tst-k"), Some(&42));
}

#[test]
fn mint_has_prefix_and_expected_length() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
    assert_eq!(id.as_str().len(), "tst-".len() + 16 + 6);
}

#[test]
fn mint_order_agrees_with_string_order() {
    let first = TestId::new();
    std::thread::sleep(std::time::Duration::from_micros(10));
    let second = TestId::new();
    assert!(first.as_str() < second.as_str());
}

#[test]
fn no_two_mints_collide() {
    let mut seen = std::collections::HashSet::new();
    for _ in 0..2_000 {
        assert!(seen.insert(TestId::new().as_str().to_string()));
    }
}

#[test]
fn round_trips_through_serde() {
    let id = TestId::new();
    let json = serde_json::to_string(&id).unwrap();
    let back: TestId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);
}

#[test]
fn from_string_preserves_exact_text() {
    let id = TestId::from_string("tst-whatever-the-caller-passed");
    assert_eq!(id.as_str(), "tst-whatever-the-caller-passed");
}

#[test]
fn display_matches_as_str() {
    let id = TestId::new();
    assert_eq!(id.to_string(), id.as_str());
}

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}

#[test]
fn now_monotonic_ns_never_goes_backwards() {
    let a = now_monotonic_ns();
    let b = now_monotonic_ns();
    assert!(b >= a);
}

#[test]
fn now_wall_iso8601_ms_has_expected_shape() {
    let s = now_wall_iso8601_ms();
    assert_eq!(s.len(), "2026-01-01T00:00:00.000Z".len());
    assert!(s.ends_with('Z'));
    assert_eq!(s.as_bytes()[4], b'-');
    assert_eq!(s.as_bytes()[10], b'T');
}

#[test]
fn trace_id_is_128_bits_of_hex() {
    let t = new_trace_id();
    assert_eq!(t.len(), 32);
    assert!(t.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn span_id_is_64_bits_of_hex() {
    let s = new_span_id();
    assert_eq!(s.len(), 16);
    assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn trace_and_span_ids_are_not_trivially_equal() {
    let a = new_trace_id();
    let b = new_trace_id();
    assert_ne!(a, b);
}

#[test]
fn civil_from_days_matches_known_epoch_dates() {
    assert_eq!(civil_from_days(0), (1970, 1, 1));
    assert_eq!(civil_from_days(19_723), (2024, 1, 1));
}
