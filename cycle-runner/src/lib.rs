// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core logic for driving a cycle of declared test cases against a
//! provisioned lab environment.
//!
//! A *cycle* selects test cases from a declared list, runs each one against
//! an environment obtained from a [`Provisioner`](provision::Provisioner),
//! classifies every raw script result into a terminal
//! [`TestOutcome`](classify::TestOutcome), and produces a structured
//! suite/case report plus a narrative summary. Environment teardown runs as
//! background work tracked by a [`CleanupCoordinator`](cleanup::CleanupCoordinator),
//! which the engine drains before declaring the cycle complete.

pub mod classify;
pub mod cleanup;
pub mod config;
pub mod errors;
mod helpers;
pub mod list;
pub mod provision;
pub mod reporter;
pub mod runner;
pub mod script;
mod stopwatch;
pub mod telemetry;
