// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General support code for cycle-runner.

/// Returns the last `max_lines` lines of `text`, used for log excerpts in
/// the structured report.
pub(crate) fn tail_lines(text: &str, max_lines: usize) -> &str {
    if max_lines == 0 {
        return "";
    }
    let mut remaining = max_lines;
    for (index, byte) in text.as_bytes().iter().enumerate().rev() {
        if *byte == b'\n' {
            // A trailing newline doesn't start a line.
            if index == text.len() - 1 {
                continue;
            }
            remaining -= 1;
            if remaining == 0 {
                return &text[index + 1..];
            }
        }
    }
    text
}

/// Utilities for pluralizing words based on count.
pub(crate) mod plural {
    /// Returns "test case" if `count` is 1, otherwise "test cases".
    pub(crate) fn test_cases_str(count: usize) -> &'static str {
        if count == 1 { "test case" } else { "test cases" }
    }

    /// Returns "iteration" if `count` is 1, otherwise "iterations".
    pub(crate) fn iterations_str(count: usize) -> &'static str {
        if count == 1 { "iteration" } else { "iterations" }
    }
}
