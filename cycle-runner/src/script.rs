// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The boundary to the test script collaborator.
//!
//! A test script is an opaque subprocess (or remote command) that exercises
//! the system under test and reports back a raw result token. The engine
//! invokes it once per iteration through the [`ScriptRunner`] trait and
//! classifies whatever comes back; abnormal termination is reported as a
//! [`ScriptError`](crate::errors::ScriptError) and recorded as an aborted
//! iteration, never propagated.

use crate::{errors::ScriptError, provision::EnvironmentHandle};
use camino::Utf8PathBuf;

/// The raw, unclassified result of a script invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RawResult {
    /// A single outcome token, e.g. `"PASS"`.
    Single(String),

    /// An overall outcome token plus a narrative sub-result block, e.g.
    /// `("FAIL", "subA: PASS, subB: FAIL")`. Returned by scripts declared
    /// multi-result.
    Multi {
        /// The overall outcome token.
        overall: String,

        /// The narrative block listing per-sub-test outcomes.
        narrative: String,
    },
}

/// Everything captured from one script invocation.
#[derive(Clone, Debug)]
pub struct ScriptOutput {
    /// The raw result to classify.
    pub raw: RawResult,

    /// Where the full captured output was written, if anywhere. Recorded on
    /// the iteration as its log reference.
    pub log_path: Option<Utf8PathBuf>,

    /// The tail of the captured output, attached to the structured report as
    /// the log excerpt when the iteration does not pass.
    pub log_tail: String,
}

/// The test script collaborator.
pub trait ScriptRunner {
    /// Invokes the script identified by `script_reference` against the given
    /// environment.
    ///
    /// `iteration` is 1-based and identifies which repeat of the test case
    /// this is. An `Err` return represents abnormal termination (the process
    /// crashed, could not be started, or exited without reporting); the
    /// engine classifies it through the absent-result path.
    fn invoke(
        &self,
        script_reference: &str,
        iteration: usize,
        environment: &EnvironmentHandle,
    ) -> Result<ScriptOutput, ScriptError>;
}
