// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic-pattern matching for routing keys, dot-separated with `*` (exactly
//! one segment) and `#` (zero or more segments) wildcards.

/// Returns true if `routing_key` matches `pattern`.
pub fn matches(pattern: &str, routing_key: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('.').collect();
    let key: Vec<&str> = routing_key.split('.').collect();
    matches_segments(&pattern, &key)
}

fn matches_segments(pattern: &[&str], key: &[&str]) -> bool {
    match pattern.first() {
        None => key.is_empty(),
        Some(&"#") => {
            if pattern.len() == 1 {
                return true;
            }
            // `#` consumes zero or more segments; try every split point.
            (0..=key.len()).any(|n| matches_segments(&pattern[1..], &key[n..]))
        }
        Some(&"*") => match key.first() {
            Some(_) => matches_segments(&pattern[1..], &key[1..]),
            None => false,
        },
        Some(&seg) => match key.first() {
            Some(&k) if k == seg => matches_segments(&pattern[1..], &key[1..]),
            _ => false,
        },
    }
}

#[cfg(test)]
#[path = "topic_tests.rs"]
mod tests;
