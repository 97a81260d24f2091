// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Precomputed setup/teardown sharing for a cycle.
//!
//! Rather than inferring "first test case" and "last test case" inline while
//! iterating, the engine derives a [`SetupPlan`] once from the ordered,
//! filtered case list and follows it.

use serde::{Deserialize, Serialize};

/// The provisioning lifecycle state of one test case slot within a cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionState {
    /// No environment has been made available to this case yet.
    SetupPending,
    /// An environment is available (freshly provisioned, or shared from an
    /// earlier case in economy mode).
    Ready,
    /// This case's environment has been handed off for teardown.
    TornDown,
}

impl ExecutionState {
    pub(crate) fn mark_ready(&mut self) {
        match self {
            ExecutionState::SetupPending => *self = ExecutionState::Ready,
            ExecutionState::Ready | ExecutionState::TornDown => {
                panic!("illegal state transition: mark_ready on {self:?}")
            }
        }
    }

    pub(crate) fn mark_torn_down(&mut self) {
        match self {
            ExecutionState::Ready => *self = ExecutionState::TornDown,
            ExecutionState::SetupPending | ExecutionState::TornDown => {
                panic!("illegal state transition: mark_torn_down on {self:?}")
            }
        }
    }
}

/// What one test case slot must do about environment lifecycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CasePlan {
    /// Whether the case requests setup before its first iteration.
    pub needs_setup: bool,

    /// Whether the case requests teardown after its last iteration.
    pub needs_teardown: bool,
}

/// The setup/teardown plan for an ordered, filtered case list.
///
/// With economy mode enabled, one environment is shared across the whole
/// contiguous run: the first case requests setup and the last requests
/// teardown. With it disabled, every case requests both.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetupPlan {
    plans: Vec<CasePlan>,
}

impl SetupPlan {
    /// Computes the plan for `case_count` selected cases.
    pub fn for_cases(case_count: usize, economy_mode: bool) -> Self {
        let plans = (0..case_count)
            .map(|index| {
                if economy_mode {
                    CasePlan {
                        needs_setup: index == 0,
                        needs_teardown: index + 1 == case_count,
                    }
                } else {
                    CasePlan {
                        needs_setup: true,
                        needs_teardown: true,
                    }
                }
            })
            .collect();
        Self { plans }
    }

    /// The plan for the case at `index` in selection order.
    pub fn get(&self, index: usize) -> CasePlan {
        self.plans[index]
    }

    /// The number of planned cases.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Whether the plan covers no cases.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn economy_mode_shares_one_environment() {
        let plan = SetupPlan::for_cases(3, true);
        assert_eq!(
            (0..3).map(|i| plan.get(i)).collect::<Vec<_>>(),
            vec![
                CasePlan {
                    needs_setup: true,
                    needs_teardown: false,
                },
                CasePlan {
                    needs_setup: false,
                    needs_teardown: false,
                },
                CasePlan {
                    needs_setup: false,
                    needs_teardown: true,
                },
            ],
        );
    }

    #[test]
    fn economy_mode_single_case_does_both() {
        let plan = SetupPlan::for_cases(1, true);
        assert_eq!(
            plan.get(0),
            CasePlan {
                needs_setup: true,
                needs_teardown: true,
            },
        );
    }

    #[test]
    fn non_economy_provisions_every_case() {
        let plan = SetupPlan::for_cases(3, false);
        for index in 0..3 {
            assert_eq!(
                plan.get(index),
                CasePlan {
                    needs_setup: true,
                    needs_teardown: true,
                },
            );
        }
    }

    #[test]
    fn empty_selection_is_an_empty_plan() {
        assert!(SetupPlan::for_cases(0, true).is_empty());
        assert!(SetupPlan::for_cases(0, false).is_empty());
    }

    #[test]
    fn state_transitions() {
        let mut state = ExecutionState::SetupPending;
        state.mark_ready();
        assert_eq!(state, ExecutionState::Ready);
        state.mark_torn_down();
        assert_eq!(state, ExecutionState::TornDown);
    }

    #[test]
    #[should_panic(expected = "illegal state transition")]
    fn teardown_before_setup_panics() {
        let mut state = ExecutionState::SetupPending;
        state.mark_torn_down();
    }
}
