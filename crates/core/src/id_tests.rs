// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job::JobId;

#[test]
fn new_ids_carry_prefix_and_fixed_length() {
    let id = JobId::new();
    assert!(id.as_str().starts_with("job-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn from_string_round_trips() {
    let id = JobId::from_string("job-abc123");
    assert_eq!(id.as_str(), "job-abc123");
    assert_eq!(id, "job-abc123");
}

#[test]
fn suffix_strips_prefix() {
    let id = JobId::from_string("job-abc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn short_truncates_suffix() {
    let id = JobId::from_string("job-abcdefgh");
    assert_eq!(id.short(3), "abc");
}

#[test]
fn ids_are_unique() {
    let a = JobId::new();
    let b = JobId::new();
    assert_ne!(a, b);
}

#[test]
fn serde_round_trip() {
    let id = JobId::new();
    let json = serde_json::to_string(&id).unwrap();
    let back: JobId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);
}

#[test]
fn idbuf_borrow_matches_hashmap_lookup() {
    use std::collections::HashMap;
    let id = JobId::from_string("job-lookup-key");
    let mut map: HashMap<JobId, u32> = HashMap::new();
    map.insert(id, 42);
    assert_eq!(map.get(&JobId::from_string("job-lookup-key")), Some(&42));
}

#[test]
fn short_helper_truncates() {
    assert_eq!(short("hello world", 5), "hello");
    assert_eq!(short("hi", 5), "hi");
}
