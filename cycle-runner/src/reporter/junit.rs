// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code to generate the JUnit XML artifact from finished case records.

use crate::{classify::TestOutcome, errors::WriteReportError};
use camino::Utf8Path;
use chrono::{DateTime, Local};
use debug_ignore::DebugIgnore;
use quick_junit::{NonSuccessKind, Report, ReportUuid, TestCase, TestCaseStatus, TestSuite};
use std::{fs::File, time::Duration};

#[derive(Debug)]
pub(super) struct JunitAggregator {
    suite_name: String,
    suite: DebugIgnore<TestSuite>,
}

impl JunitAggregator {
    pub(super) fn new(suite_name: &str) -> Self {
        Self {
            suite_name: suite_name.to_owned(),
            suite: DebugIgnore(TestSuite::new(suite_name)),
        }
    }

    pub(super) fn add_case(
        &mut self,
        name: &str,
        outcome: TestOutcome,
        start_time: DateTime<Local>,
        duration: Duration,
        log_excerpt: Option<&str>,
    ) {
        let status = match outcome {
            TestOutcome::Passed => TestCaseStatus::success(),
            TestOutcome::Failed | TestOutcome::Aborted => {
                let (kind, ty) = non_success_kind_and_type(outcome);
                let mut status = TestCaseStatus::non_success(kind);
                status.set_type(ty);
                if let Some(excerpt) = log_excerpt {
                    if let Some(first_line) = excerpt.lines().next() {
                        status.set_message(first_line);
                    }
                    status.set_description(excerpt);
                }
                status
            }
        };

        let mut testcase = TestCase::new(name, status);
        testcase
            .set_classname(self.suite_name.as_str())
            .set_timestamp(start_time)
            .set_time(duration);
        if let Some(excerpt) = log_excerpt {
            testcase.set_system_err(excerpt);
        }

        self.suite.add_test_case(testcase);
    }

    /// Writes the report to `path`. Consumes the aggregator: the artifact is
    /// written exactly once.
    pub(super) fn write(
        self,
        path: &Utf8Path,
        run_id: ReportUuid,
        started_at: DateTime<Local>,
        elapsed: Duration,
    ) -> Result<(), WriteReportError> {
        let mut report = Report::new(self.suite_name.as_str());
        report
            .set_report_uuid(run_id)
            .set_timestamp(started_at)
            .set_time(elapsed)
            .add_test_suite(self.suite.0);

        let file = File::create(path).map_err(|error| WriteReportError::Fs {
            file: path.to_path_buf(),
            error,
        })?;
        report.serialize(file).map_err(|error| WriteReportError::Junit {
            file: path.to_path_buf(),
            error,
        })?;
        Ok(())
    }
}

fn non_success_kind_and_type(outcome: TestOutcome) -> (NonSuccessKind, &'static str) {
    match outcome {
        // A failure is an expected kind of issue; an abort is an unexpected
        // one, reported as a JUnit error.
        TestOutcome::Failed => (NonSuccessKind::Failure, "test failure"),
        TestOutcome::Aborted => (NonSuccessKind::Error, "test aborted"),
        TestOutcome::Passed => {
            unreachable!("this is a failure status")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::tempdir;

    #[test]
    fn aborted_case_is_reported_as_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("junit.xml");

        let mut aggregator = JunitAggregator::new("cycle");
        aggregator.add_case(
            "boot",
            TestOutcome::Passed,
            Local::now(),
            Duration::from_secs(1),
            None,
        );
        aggregator.add_case(
            "stress",
            TestOutcome::Aborted,
            Local::now(),
            Duration::from_secs(2),
            Some("empty or unrecognized result"),
        );
        aggregator
            .write(&path, ReportUuid::new_v4(), Local::now(), Duration::from_secs(3))
            .unwrap();

        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains(r#"errors="1""#), "{xml}");
        assert!(xml.contains(r#"failures="0""#), "{xml}");
        assert!(xml.contains("test aborted"), "{xml}");
        assert!(xml.contains("empty or unrecognized result"), "{xml}");
    }
}
