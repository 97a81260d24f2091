// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of raw test script results into terminal outcomes.
//!
//! The main entry point is [`classify`], a pure function that maps the raw
//! result token (or its absence) to exactly one [`TestOutcome`]. An
//! indeterminate result is never treated as a pass: anything empty or
//! unrecognized comes back as [`TestOutcome::Aborted`] with a synthetic
//! error attached.

use crate::script::RawResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Synthetic error attached when a raw result is empty, absent, or matches
/// none of the known vocabularies.
pub const UNRECOGNIZED_RESULT_ERROR: &str = "empty or unrecognized result";

/// Placeholder attached when a multi-result narrative block cannot be parsed
/// into sub-results.
pub const UNPARSEABLE_NARRATIVE_ERROR: &str = "Unable to parse the results";

/// The terminal outcome of one test iteration.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestOutcome {
    /// The test passed.
    Passed,
    /// The test ran to completion and failed.
    Failed,
    /// The test did not produce a usable result: the script crashed, returned
    /// nothing, or returned something unrecognized.
    Aborted,
}

impl TestOutcome {
    /// Returns true if the outcome counts as a success.
    pub fn is_success(self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    /// Returns the canonical result token for this outcome.
    pub fn as_token(self) -> &'static str {
        match self {
            TestOutcome::Passed => "PASS",
            TestOutcome::Failed => "FAIL",
            TestOutcome::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// The outcome of one named sub-test within a multi-result iteration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SubResult {
    /// The sub-test name as reported by the script.
    pub name: String,

    /// The classified outcome for the sub-test.
    pub outcome: TestOutcome,
}

/// The full classification of one raw result.
///
/// Produced by [`classify`]; consumed by the cycle engine when constructing
/// an [`IterationRecord`](crate::runner::IterationRecord).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Classification {
    /// The overall outcome.
    pub outcome: TestOutcome,

    /// Sub-test outcomes, in the order the script reported them. Empty for
    /// single-result scripts and for narrative blocks that failed to parse.
    pub sub_results: Vec<SubResult>,

    /// A synthetic error describing why classification fell back, if it did.
    pub error: Option<String>,
}

/// Classifies a raw result into a terminal outcome.
///
/// Matching is case-insensitive substring matching against three fixed
/// vocabularies, checked worst-outcome-first so that a raw value somehow
/// containing more than one token is never upgraded: `"abort"` ⇒
/// [`Aborted`](TestOutcome::Aborted), `"fail"` ⇒
/// [`Failed`](TestOutcome::Failed), `"pass"` ⇒
/// [`Passed`](TestOutcome::Passed).
///
/// Passing `None` represents an absent result (for example a script that
/// crashed before reporting anything) and always classifies as `Aborted`
/// with [`UNRECOGNIZED_RESULT_ERROR`] attached. Multi-result and
/// single-result inputs share the same rule for unrecognized overall
/// tokens.
///
/// This function is pure: same input, same output, no side effects.
pub fn classify(raw: Option<&RawResult>) -> Classification {
    let Some(raw) = raw else {
        return aborted_fallback();
    };

    let (overall_token, narrative) = match raw {
        RawResult::Single(token) => (token.as_str(), None),
        RawResult::Multi { overall, narrative } => (overall.as_str(), Some(narrative.as_str())),
    };

    let Some(outcome) = classify_token(overall_token) else {
        return aborted_fallback();
    };

    match narrative {
        None => Classification {
            outcome,
            sub_results: Vec::new(),
            error: None,
        },
        Some(block) => match parse_sub_results(block) {
            Some(sub_results) => Classification {
                outcome,
                sub_results,
                error: None,
            },
            None => Classification {
                outcome,
                sub_results: Vec::new(),
                error: Some(UNPARSEABLE_NARRATIVE_ERROR.to_owned()),
            },
        },
    }
}

fn aborted_fallback() -> Classification {
    Classification {
        outcome: TestOutcome::Aborted,
        sub_results: Vec::new(),
        error: Some(UNRECOGNIZED_RESULT_ERROR.to_owned()),
    }
}

/// Matches a single token against the outcome vocabularies.
///
/// Returns `None` if the token is empty or matches none of them.
pub fn classify_token(token: &str) -> Option<TestOutcome> {
    let lower = token.to_lowercase();
    // Worst outcome first.
    if lower.contains("abort") {
        Some(TestOutcome::Aborted)
    } else if lower.contains("fail") {
        Some(TestOutcome::Failed)
    } else if lower.contains("pass") {
        Some(TestOutcome::Passed)
    } else {
        None
    }
}

/// Parses a narrative sub-result block of the form
/// `"subA: PASS, subB: FAIL"`.
///
/// Returns `None` if the block is empty or any entry is missing the
/// `name: token` shape. An entry whose token is present but unrecognized
/// classifies as `Aborted`, consistent with the overall rule.
fn parse_sub_results(block: &str) -> Option<Vec<SubResult>> {
    if block.trim().is_empty() {
        return None;
    }

    let mut sub_results = Vec::new();
    for entry in block.split(',') {
        let (name, token) = entry.split_once(':')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let outcome = classify_token(token.trim()).unwrap_or(TestOutcome::Aborted);
        sub_results.push(SubResult {
            name: name.to_owned(),
            outcome,
        });
    }
    Some(sub_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("PASS", TestOutcome::Passed; "upper pass")]
    #[test_case("pass", TestOutcome::Passed; "lower pass")]
    #[test_case("TestPassed", TestOutcome::Passed; "pass substring")]
    #[test_case("FAIL", TestOutcome::Failed; "upper fail")]
    #[test_case("TestFailed", TestOutcome::Failed; "fail substring")]
    #[test_case("ABORT", TestOutcome::Aborted; "upper abort")]
    #[test_case("TestAborted", TestOutcome::Aborted; "abort substring")]
    #[test_case("passing but aborted", TestOutcome::Aborted; "worst outcome wins")]
    fn token_vocabularies(token: &str, expected: TestOutcome) {
        let raw = RawResult::Single(token.to_owned());
        let classification = classify(Some(&raw));
        assert_eq!(classification.outcome, expected);
        assert_eq!(classification.error, None);
    }

    #[test_case(""; "empty string")]
    #[test_case("   "; "whitespace")]
    #[test_case("SUCCESS"; "unknown token")]
    #[test_case("0"; "numeric")]
    fn unrecognized_is_aborted(token: &str) {
        let raw = RawResult::Single(token.to_owned());
        let classification = classify(Some(&raw));
        assert_eq!(classification.outcome, TestOutcome::Aborted);
        assert_eq!(
            classification.error.as_deref(),
            Some(UNRECOGNIZED_RESULT_ERROR)
        );
    }

    #[test]
    fn absent_result_is_aborted() {
        let classification = classify(None);
        assert_eq!(classification.outcome, TestOutcome::Aborted);
        assert_eq!(
            classification.error.as_deref(),
            Some(UNRECOGNIZED_RESULT_ERROR)
        );
        assert!(classification.sub_results.is_empty());
    }

    #[test]
    fn classify_is_idempotent() {
        let raw = RawResult::Multi {
            overall: "FAIL".to_owned(),
            narrative: "subA: PASS, subB: FAIL".to_owned(),
        };
        assert_eq!(classify(Some(&raw)), classify(Some(&raw)));
    }

    #[test]
    fn multi_result_parses_sub_results() {
        let raw = RawResult::Multi {
            overall: "FAIL".to_owned(),
            narrative: "subA: PASS, subB: FAIL".to_owned(),
        };
        let classification = classify(Some(&raw));
        assert_eq!(classification.outcome, TestOutcome::Failed);
        assert_eq!(
            classification.sub_results,
            vec![
                SubResult {
                    name: "subA".to_owned(),
                    outcome: TestOutcome::Passed,
                },
                SubResult {
                    name: "subB".to_owned(),
                    outcome: TestOutcome::Failed,
                },
            ],
        );
        assert_eq!(classification.error, None);
    }

    #[test]
    fn multi_result_unrecognized_sub_token_is_aborted() {
        let raw = RawResult::Multi {
            overall: "PASS".to_owned(),
            narrative: "subA: PASS, subB: bogus".to_owned(),
        };
        let classification = classify(Some(&raw));
        assert_eq!(classification.outcome, TestOutcome::Passed);
        assert_eq!(classification.sub_results[1].outcome, TestOutcome::Aborted);
    }

    #[test]
    fn multi_result_unparseable_narrative_falls_back() {
        let raw = RawResult::Multi {
            overall: "FAIL".to_owned(),
            narrative: "not a sub-result block".to_owned(),
        };
        let classification = classify(Some(&raw));
        // The overall token still classifies; only the sub-results are lost.
        assert_eq!(classification.outcome, TestOutcome::Failed);
        assert!(classification.sub_results.is_empty());
        assert_eq!(
            classification.error.as_deref(),
            Some(UNPARSEABLE_NARRATIVE_ERROR)
        );
    }

    #[test]
    fn multi_result_unrecognized_overall_is_aborted() {
        // Same rule as the single-result path: no partial-pass semantics for
        // an unrecognized overall token, even if the narrative parses.
        let raw = RawResult::Multi {
            overall: "bogus".to_owned(),
            narrative: "subA: PASS".to_owned(),
        };
        let classification = classify(Some(&raw));
        assert_eq!(classification.outcome, TestOutcome::Aborted);
        assert!(classification.sub_results.is_empty());
        assert_eq!(
            classification.error.as_deref(),
            Some(UNRECOGNIZED_RESULT_ERROR)
        );
    }
}
