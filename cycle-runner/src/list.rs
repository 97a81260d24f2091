// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declared test cases and cycle selection.
//!
//! A [`TestCaseList`] holds the definitions loaded for one cycle, in
//! declaration order. Selection filters it down by priority and platform;
//! filtered-out cases produce no iteration records and never touch the
//! cycle totals.

use crate::errors::DuplicateTestCaseName;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashSet},
    num::NonZeroUsize,
};

/// One declared test case.
///
/// Immutable after load; owned by the config loader and read-only to the
/// engine.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TestCaseDefinition {
    /// The test case name, unique within a cycle.
    pub name: String,

    /// Priority used for inclusion filtering.
    pub priority: u8,

    /// Platforms this case applies to. Empty means no restriction.
    #[serde(default)]
    pub platform_tags: BTreeSet<String>,

    /// Opaque handle passed to the script runner.
    pub script_reference: String,

    /// Whether the script reports one outcome or an outcome plus sub-test
    /// outcomes.
    #[serde(default)]
    pub is_multi_result: bool,

    /// How many times to run the case. A count greater than one is a
    /// deliberate repeat, not a retry-on-failure.
    #[serde(default = "default_iteration_count")]
    pub iteration_count: NonZeroUsize,
}

fn default_iteration_count() -> NonZeroUsize {
    NonZeroUsize::MIN
}

impl TestCaseDefinition {
    /// Creates a single-result, single-iteration definition with no platform
    /// restriction.
    pub fn new(
        name: impl Into<String>,
        priority: u8,
        script_reference: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            platform_tags: BTreeSet::new(),
            script_reference: script_reference.into(),
            is_multi_result: false,
            iteration_count: NonZeroUsize::MIN,
        }
    }
}

/// The ordered list of test cases declared for one cycle.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCaseList {
    cases: Vec<TestCaseDefinition>,
}

impl TestCaseList {
    /// Creates a new list, checking that names are unique within the cycle.
    pub fn new(
        cases: impl IntoIterator<Item = TestCaseDefinition>,
    ) -> Result<Self, DuplicateTestCaseName> {
        let cases: Vec<_> = cases.into_iter().collect();
        let mut seen = HashSet::new();
        for case in &cases {
            if !seen.insert(case.name.as_str()) {
                return Err(DuplicateTestCaseName::new(case.name.clone()));
            }
        }
        Ok(Self { cases })
    }

    /// The number of declared cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Iterates over the declared cases in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TestCaseDefinition> {
        self.cases.iter()
    }

    /// Returns the cases surviving the given filter, in declaration order.
    pub fn select<'a>(&'a self, filter: &CaseFilter) -> Vec<&'a TestCaseDefinition> {
        self.cases
            .iter()
            .filter(|case| filter.is_match(case))
            .collect()
    }
}

/// Selection criteria for one cycle: accepted priorities and the current
/// platform.
#[derive(Clone, Debug)]
pub struct CaseFilter {
    accepted_priorities: Option<BTreeSet<u8>>,
    platform: String,
}

impl CaseFilter {
    /// Creates a filter that accepts every priority on the given platform.
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            accepted_priorities: None,
            platform: platform.into(),
        }
    }

    /// Restricts the filter to the given priority set.
    pub fn with_priorities(mut self, priorities: impl IntoIterator<Item = u8>) -> Self {
        self.accepted_priorities = Some(priorities.into_iter().collect());
        self
    }

    /// Returns true if the case survives selection.
    pub fn is_match(&self, case: &TestCaseDefinition) -> bool {
        if let Some(accepted) = &self.accepted_priorities {
            if !accepted.contains(&case.priority) {
                return false;
            }
        }
        case.platform_tags.is_empty() || case.platform_tags.contains(&self.platform)
    }
}
