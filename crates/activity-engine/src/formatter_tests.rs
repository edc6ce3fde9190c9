// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn passthrough_formatter_completes_immediately_with_same_content() {
    let mut formatter = PassthroughFormatter::default();
    formatter.start(json!({"a": 1}));
    match formatter.poll() {
        FormatOutcome::Complete(value) => assert_eq!(value, json!({"a": 1})),
        FormatOutcome::Pending => panic!("passthrough formatter must not suspend"),
    }
}
