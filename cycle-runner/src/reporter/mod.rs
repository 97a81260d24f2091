// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report generation for a cycle.
//!
//! The [`ReportWriter`] accumulates one suite record with an ordered
//! sequence of case records, plus a narrative summary, and flushes both to
//! disk exactly once at cycle end: a JUnit XML artifact for machines and an
//! HTML summary for humans. Case records and narrative lines are kept in
//! execution order regardless of how background cleanup interleaves.

mod junit;
mod narrative;

use crate::{
    classify::TestOutcome,
    errors::WriteReportError,
    stopwatch::{StopwatchStart, stopwatch},
};
use camino::Utf8PathBuf;
use chrono::{DateTime, Local};
use junit::JunitAggregator;
use narrative::NarrativeSummary;
use quick_junit::ReportUuid;
use std::time::Duration;

/// A handle to a case record opened with [`ReportWriter::begin_case`].
///
/// Consumed by [`ReportWriter::finish_case`], so a case cannot be finished
/// twice.
#[derive(Debug)]
pub struct CaseHandle {
    name: String,
    sequence: usize,
    started_at: DateTime<Local>,
}

impl CaseHandle {
    /// The case name this handle was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
enum SuiteState {
    Idle,
    Open(OpenSuite),
    Finished,
}

#[derive(Debug)]
struct OpenSuite {
    name: String,
    run_id: ReportUuid,
    started: StopwatchStart,
    junit: JunitAggregator,
    narrative: NarrativeSummary,
    next_sequence: usize,
}

/// Accumulates and writes the per-cycle report artifacts.
#[derive(Debug)]
pub struct ReportWriter {
    junit_path: Utf8PathBuf,
    summary_path: Utf8PathBuf,
    state: SuiteState,
}

impl ReportWriter {
    /// Creates a writer that will emit the structured report to
    /// `junit_path` and the narrative summary to `summary_path`.
    pub fn new(junit_path: impl Into<Utf8PathBuf>, summary_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            junit_path: junit_path.into(),
            summary_path: summary_path.into(),
            state: SuiteState::Idle,
        }
    }

    /// Opens the suite record for this cycle.
    ///
    /// # Panics
    ///
    /// Panics if called more than once.
    pub fn begin_suite(&mut self, name: impl Into<String>, run_id: ReportUuid) {
        match self.state {
            SuiteState::Idle => {
                let name = name.into();
                self.state = SuiteState::Open(OpenSuite {
                    junit: JunitAggregator::new(&name),
                    narrative: NarrativeSummary::new(),
                    name,
                    run_id,
                    started: stopwatch(),
                    next_sequence: 1,
                });
            }
            SuiteState::Open(_) | SuiteState::Finished => {
                panic!("illegal state transition: begin_suite called twice")
            }
        }
    }

    /// Opens one case record under the suite, stamping its start time.
    ///
    /// # Panics
    ///
    /// Panics if the suite is not open.
    pub fn begin_case(&mut self, name: impl Into<String>) -> CaseHandle {
        let suite = self.open_suite_mut("begin_case");
        let sequence = suite.next_sequence;
        suite.next_sequence += 1;
        CaseHandle {
            name: name.into(),
            sequence,
            started_at: Local::now(),
        }
    }

    /// Closes a case record.
    ///
    /// `log_excerpt` must be provided when `outcome` is not
    /// [`TestOutcome::Passed`], so the structured report is self-sufficient
    /// for triage without reopening raw logs.
    ///
    /// # Panics
    ///
    /// Panics if the suite is not open, or if a non-passing case carries no
    /// log excerpt.
    pub fn finish_case(
        &mut self,
        handle: CaseHandle,
        outcome: TestOutcome,
        duration: Duration,
        log_excerpt: Option<&str>,
    ) {
        assert!(
            outcome.is_success() || log_excerpt.is_some(),
            "non-passing case `{}` must carry a log excerpt",
            handle.name,
        );
        let suite = self.open_suite_mut("finish_case");
        suite
            .junit
            .add_case(&handle.name, outcome, handle.started_at, duration, log_excerpt);
        suite
            .narrative
            .push_row(handle.sequence, &handle.name, duration, outcome);
    }

    /// Appends one line to the narrative summary. Append-only; lines come
    /// out in the order they went in.
    ///
    /// # Panics
    ///
    /// Panics if the suite is not open.
    pub fn append_narrative(&mut self, line: impl Into<String>) {
        let suite = self.open_suite_mut("append_narrative");
        suite.narrative.append_line(line);
    }

    /// Closes the suite and flushes both artifacts to disk.
    ///
    /// # Panics
    ///
    /// Panics if the suite is not open.
    pub fn finish_suite(&mut self) -> Result<(), WriteReportError> {
        let suite = match std::mem::replace(&mut self.state, SuiteState::Finished) {
            SuiteState::Open(suite) => suite,
            SuiteState::Idle | SuiteState::Finished => {
                panic!("illegal state transition: finish_suite called without an open suite")
            }
        };
        let snapshot = suite.started.snapshot();

        if let Some(dir) = self.junit_path.parent() {
            std::fs::create_dir_all(dir).map_err(|error| WriteReportError::Fs {
                file: dir.to_path_buf(),
                error,
            })?;
        }

        suite.junit.write(
            &self.junit_path,
            suite.run_id,
            snapshot.start_time,
            snapshot.duration,
        )?;

        let html = suite.narrative.render_html(&suite.name);
        if let Some(dir) = self.summary_path.parent() {
            std::fs::create_dir_all(dir).map_err(|error| WriteReportError::Fs {
                file: dir.to_path_buf(),
                error,
            })?;
        }
        std::fs::write(&self.summary_path, html).map_err(|error| WriteReportError::Fs {
            file: self.summary_path.clone(),
            error,
        })?;

        Ok(())
    }

    fn open_suite_mut(&mut self, operation: &str) -> &mut OpenSuite {
        match &mut self.state {
            SuiteState::Open(suite) => suite,
            SuiteState::Idle | SuiteState::Finished => {
                panic!("illegal state transition: {operation} called without an open suite")
            }
        }
    }
}
