// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::matches;

#[yare::parameterized(
    exact_match        = { "run.enter", "run.enter", true },
    exact_mismatch     = { "run.enter", "run.start", false },
    star_one_segment   = { "run.*", "run.enter", true },
    star_rejects_multi = { "run.*", "run.outbound.take", false },
    hash_anything       = { "run.#", "run.outbound.take", true },
    hash_zero_segments  = { "run.#", "run", true },
    hash_alone          = { "#", "anything.at.all", true },
    mixed_wildcards     = { "*.outbound.#", "flow.outbound.take", true },
    mixed_mismatch      = { "*.outbound.#", "flow.inbound.take", false },
)]
fn topic_pattern_matching(pattern: &str, key: &str, expected: bool) {
    assert_eq!(matches(pattern, key), expected);
}
