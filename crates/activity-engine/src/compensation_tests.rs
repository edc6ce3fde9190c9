// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn broker_safe_id_replaces_unsafe_characters() {
    assert_eq!(broker_safe_id("a.b:c"), "a_b_c");
    assert_eq!(broker_safe_id("act-123_x"), "act-123_x");
}

#[test]
fn compensation_id_is_deterministic() {
    let id = ActivityId::from_string("act-1");
    let a = compensation_id(&id, "seq.1");
    let b = compensation_id(&id, "seq.1");
    assert_eq!(a, b);
    assert_eq!(a, "act-1_seq_1");
}
