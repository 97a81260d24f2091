// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The test cycle engine.
//!
//! The main structure in this module is [`TestCycleRunner`].

mod imp;
mod plan;

pub use imp::*;
pub use plan::{CasePlan, ExecutionState, SetupPlan};
