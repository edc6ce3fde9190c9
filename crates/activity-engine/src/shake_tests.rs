// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use activity_core::ActivityId;

#[test]
fn visit_appends_in_order() {
    let mut trail = ShakeTrail::default();
    let a = ActivityId::new();
    let b = ActivityId::new();
    trail.visit(a, "task");
    trail.visit(b, "gateway");
    assert_eq!(trail.sequence.len(), 2);
    assert_eq!(trail.sequence[0].id, a);
    assert_eq!(trail.sequence[1].id, b);
}

#[test]
fn repeated_shake_appends_same_suffix() {
    let mut first = ShakeTrail::default();
    let mut second = ShakeTrail::default();
    let id = ActivityId::from_string("act-fixed");
    first.visit(id, "task");
    second.visit(id, "task");
    assert_eq!(
        serde_json::to_value(&first.sequence).unwrap(),
        serde_json::to_value(&second.sequence).unwrap()
    );
}
