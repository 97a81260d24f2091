// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    classify::{self, SubResult, TestOutcome, UNPARSEABLE_NARRATIVE_ERROR},
    cleanup::CleanupCoordinator,
    config::CycleConfig,
    errors::CycleRunError,
    helpers::tail_lines,
    list::{CaseFilter, TestCaseDefinition, TestCaseList},
    provision::{EnvironmentHandle, Provisioner},
    reporter::ReportWriter,
    runner::plan::{ExecutionState, SetupPlan},
    script::ScriptRunner,
    stopwatch::stopwatch,
    telemetry::{CycleMetadata, TelemetrySink},
};
use camino::Utf8PathBuf;
use chrono::Local;
use quick_junit::ReportUuid;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// How many trailing log lines are attached to non-passing case records.
const LOG_EXCERPT_LINES: usize = 50;

static NO_OUTPUT_CAPTURED: &str = "(no output captured)";

/// The result of running one iteration of one test case.
///
/// Created exactly once per iteration and immutable once classified;
/// retained for the lifetime of the cycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IterationRecord {
    /// The test case this iteration belongs to.
    pub test_case_name: String,

    /// The 1-based iteration index.
    pub iteration_index: usize,

    /// The classified outcome.
    pub outcome: TestOutcome,

    /// Wall-clock time from invocation to return.
    pub duration: Duration,

    /// Sub-test outcomes for multi-result scripts, in reported order.
    pub sub_results: Vec<SubResult>,

    /// Where the script's captured output was written, if anywhere.
    pub log_reference: Option<Utf8PathBuf>,

    /// The synthetic classification error, if classification fell back.
    pub error: Option<String>,
}

/// Counters for one cycle, incremented once per attempted iteration.
///
/// Iterations filtered out by selection never reach these counters.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    /// The number of iterations attempted so far.
    pub scheduled: usize,

    /// The number of iterations that passed.
    pub passed: usize,

    /// The number of iterations that failed.
    pub failed: usize,

    /// The number of iterations that aborted.
    pub aborted: usize,
}

impl CycleStats {
    /// Returns true if every attempted iteration passed.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.aborted == 0
    }

    fn on_iteration_finished(&mut self, outcome: TestOutcome) {
        self.scheduled += 1;
        match outcome {
            TestOutcome::Passed => self.passed += 1,
            TestOutcome::Failed => self.failed += 1,
            TestOutcome::Aborted => self.aborted += 1,
        }
        debug_assert_eq!(self.scheduled, self.passed + self.failed + self.aborted);
    }
}

/// Everything a finished cycle hands back to the caller.
#[derive(Clone, Debug)]
pub struct CycleSummary {
    /// The final counters.
    pub stats: CycleStats,

    /// One record per attempted iteration, in execution order.
    pub records: Vec<IterationRecord>,
}

/// Drives one cycle of test cases against provisioned environments.
///
/// The main loop is single-threaded and sequential: test cases and their
/// iterations never run concurrently with each other, because economy-mode
/// environment sharing makes concurrent execution unsafe. The only
/// background work is environment teardown, tracked by a
/// [`CleanupCoordinator`] and drained before [`execute`](Self::execute)
/// returns.
pub struct TestCycleRunner<'a> {
    config: &'a CycleConfig,
    provisioner: &'a dyn Provisioner,
    script_runner: &'a dyn ScriptRunner,
    telemetry: Option<&'a dyn TelemetrySink>,
    run_id: ReportUuid,
}

impl<'a> TestCycleRunner<'a> {
    /// Creates a new runner for the given configuration and collaborators.
    pub fn new(
        config: &'a CycleConfig,
        provisioner: &'a dyn Provisioner,
        script_runner: &'a dyn ScriptRunner,
    ) -> Self {
        Self {
            config,
            provisioner,
            script_runner,
            telemetry: None,
            run_id: ReportUuid::new_v4(),
        }
    }

    /// Attaches a best-effort telemetry sink.
    pub fn with_telemetry(mut self, telemetry: &'a dyn TelemetrySink) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// The unique id assigned to this run, stamped into the structured
    /// report.
    pub fn run_id(&self) -> ReportUuid {
        self.run_id
    }

    /// Executes the cycle: selection, execution, finalization.
    ///
    /// Only two failures are fatal and propagated: the environment image
    /// failing to resolve before execution begins (no report is emitted),
    /// and a setup request failing. Everything that goes wrong inside an
    /// iteration is recorded as an aborted iteration and the cycle
    /// continues. Does not return until every registered teardown task has
    /// finished and the report is flushed.
    pub fn execute(
        &self,
        test_cases: &TestCaseList,
        reporter: &mut ReportWriter,
    ) -> Result<CycleSummary, CycleRunError> {
        // Phase 1: selection.
        let mut filter = CaseFilter::new(self.config.platform());
        if let Some(priorities) = &self.config.accepted_priorities {
            filter = filter.with_priorities(priorities.iter().copied());
        }
        let selected = test_cases.select(&filter);
        let plan = SetupPlan::for_cases(selected.len(), self.config.economy_mode);
        debug!(
            selected = selected.len(),
            declared = test_cases.len(),
            economy_mode = self.config.economy_mode,
            "selected test cases"
        );

        // Resolving the image is the one pre-execution step whose failure is
        // fatal: no report is emitted for a cycle that never identified what
        // it was testing.
        let image = self
            .provisioner
            .resolve_image(&self.config.environment)
            .map_err(|error| CycleRunError::ImageResolve {
                cycle_name: self.config.cycle_name.clone(),
                error,
            })?;

        let metadata = CycleMetadata {
            cycle_name: self.config.cycle_name.clone(),
            run_id: self.run_id,
            platform: self.config.platform().to_owned(),
            image: image.name().to_owned(),
            started_at: Local::now(),
        };

        reporter.begin_suite(&self.config.cycle_name, self.run_id);

        // Phase 2: execution.
        let mut coordinator = CleanupCoordinator::new(self.provisioner);
        let mut stats = CycleStats::default();
        let mut records = Vec::new();
        let mut states = vec![ExecutionState::SetupPending; selected.len()];
        let mut environment: Option<EnvironmentHandle> = None;

        for (case_index, case) in selected.iter().enumerate() {
            let case_plan = plan.get(case_index);
            let iteration_count = case.iteration_count.get();

            for iteration in 1..=iteration_count {
                if iteration == 1 {
                    if case_plan.needs_setup {
                        let handle = self
                            .provisioner
                            .request_setup(&self.config.environment, &image)
                            .map_err(|error| CycleRunError::Setup {
                                test_case: case.name.clone(),
                                error,
                            })?;
                        debug!(
                            test_case = case.name.as_str(),
                            environment = handle.identifier(),
                            "environment provisioned"
                        );
                        environment = Some(handle);
                    }
                    states[case_index].mark_ready();
                }

                let handle = environment
                    .as_ref()
                    .expect("setup plan guarantees an environment before any iteration");

                let record =
                    self.run_iteration(case, iteration, iteration_count, handle, reporter);
                stats.on_iteration_finished(record.outcome);

                if let Some(telemetry) = self.telemetry {
                    if let Err(error) = telemetry.record_iteration(&record, &metadata) {
                        warn!(
                            test_case = record.test_case_name.as_str(),
                            iteration = record.iteration_index,
                            %error,
                            "failed to record iteration telemetry"
                        );
                    }
                }
                records.push(record);

                if iteration == iteration_count && case_plan.needs_teardown {
                    let handle = environment
                        .take()
                        .expect("environment is still owned at teardown");
                    let task = self.provisioner.request_teardown(handle);
                    states[case_index].mark_torn_down();
                    coordinator.register(task);
                }

                // Reclaim finished teardown handles early.
                coordinator.poll();
            }
        }

        // Phase 3: finalization. Block until no teardown task is still
        // running, so a completed cycle can't race with a later one reusing
        // the same identifiers.
        coordinator.drain(self.config.cleanup_poll_interval);
        reporter.finish_suite()?;

        Ok(CycleSummary { stats, records })
    }

    /// Runs one iteration: invoke, classify, record, report.
    fn run_iteration(
        &self,
        case: &TestCaseDefinition,
        iteration: usize,
        iteration_count: usize,
        environment: &EnvironmentHandle,
        reporter: &mut ReportWriter,
    ) -> IterationRecord {
        let case_handle = reporter.begin_case(case_record_name(&case.name, iteration));
        let timer = stopwatch();
        let invocation = self
            .script_runner
            .invoke(&case.script_reference, iteration, environment);
        let snapshot = timer.snapshot();

        let (classification, log_reference, log_tail) = match invocation {
            Ok(output) => {
                let classification = classify::classify(Some(&output.raw));
                (classification, output.log_path, output.log_tail)
            }
            Err(error) => {
                let chain = error_chain(&error);
                warn!(
                    test_case = case.name.as_str(),
                    iteration,
                    error = chain.as_str(),
                    "test script terminated abnormally"
                );
                (classify::classify(None), None, chain)
            }
        };

        if classification.error.as_deref() == Some(UNPARSEABLE_NARRATIVE_ERROR) {
            warn!(
                test_case = case.name.as_str(),
                iteration, "unable to parse multi-result narrative"
            );
        }

        let record = IterationRecord {
            test_case_name: case.name.clone(),
            iteration_index: iteration,
            outcome: classification.outcome,
            duration: snapshot.duration,
            sub_results: classification.sub_results,
            log_reference,
            error: classification.error,
        };

        let excerpt = if record.outcome.is_success() {
            None
        } else {
            let tail = tail_lines(&log_tail, LOG_EXCERPT_LINES);
            Some(if tail.is_empty() {
                record
                    .error
                    .clone()
                    .unwrap_or_else(|| NO_OUTPUT_CAPTURED.to_owned())
            } else {
                tail.to_owned()
            })
        };
        reporter.finish_case(
            case_handle,
            record.outcome,
            record.duration,
            excerpt.as_deref(),
        );

        reporter.append_narrative(format!("{}: {}", record.test_case_name, record.outcome));
        for sub in &record.sub_results {
            reporter.append_narrative(format!("  {}: {}", sub.name, sub.outcome));
        }
        if record.error.as_deref() == Some(UNPARSEABLE_NARRATIVE_ERROR) {
            reporter.append_narrative(format!("  {UNPARSEABLE_NARRATIVE_ERROR}"));
        }

        debug!(
            test_case = record.test_case_name.as_str(),
            iteration = record.iteration_index,
            of = iteration_count,
            outcome = %record.outcome,
            "iteration finished"
        );
        record
    }
}

/// The name a case record is filed under in the structured report. Repeats
/// past the first iteration get a suffix so records stay distinguishable.
fn case_record_name(name: &str, iteration: usize) -> String {
    if iteration == 1 {
        name.to_owned()
    } else {
        format!("{name}@iter-{iteration}")
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stats_invariant_holds_per_iteration() {
        let mut stats = CycleStats::default();
        let outcomes = [
            TestOutcome::Passed,
            TestOutcome::Failed,
            TestOutcome::Aborted,
            TestOutcome::Passed,
        ];
        for (attempted, outcome) in outcomes.iter().enumerate() {
            stats.on_iteration_finished(*outcome);
            assert_eq!(stats.scheduled, attempted + 1);
            assert_eq!(stats.scheduled, stats.passed + stats.failed + stats.aborted);
        }
        assert_eq!(
            stats,
            CycleStats {
                scheduled: 4,
                passed: 2,
                failed: 1,
                aborted: 1,
            },
        );
        assert!(!stats.is_success());
    }

    #[test]
    fn empty_stats_are_a_success() {
        assert!(CycleStats::default().is_success());
    }

    #[test]
    fn case_record_names() {
        assert_eq!(case_record_name("boot", 1), "boot");
        assert_eq!(case_record_name("boot", 3), "boot@iter-3");
    }
}
