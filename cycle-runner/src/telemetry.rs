// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort upload of iteration results.
//!
//! Telemetry is explicitly a non-critical side channel: the engine reports
//! each finished iteration to the configured [`TelemetrySink`], logs any
//! failure, and moves on. Nothing in the cycle's outcome depends on it.

use crate::{errors::TelemetryError, runner::IterationRecord};
use camino::Utf8PathBuf;
use chrono::{DateTime, Local};
use quick_junit::ReportUuid;
use serde_json::json;
use std::io::Write;

/// Cycle-level context attached to every telemetry record.
#[derive(Clone, Debug)]
pub struct CycleMetadata {
    /// The cycle name.
    pub cycle_name: String,

    /// The unique id of this run.
    pub run_id: ReportUuid,

    /// The platform the cycle ran on.
    pub platform: String,

    /// The resolved image the environments were provisioned from.
    pub image: String,

    /// When the cycle started.
    pub started_at: DateTime<Local>,
}

/// The telemetry sink collaborator.
pub trait TelemetrySink {
    /// Records one finished iteration.
    ///
    /// Errors are logged by the engine and never propagated.
    fn record_iteration(
        &self,
        record: &IterationRecord,
        metadata: &CycleMetadata,
    ) -> Result<(), TelemetryError>;
}

/// A telemetry sink that appends one JSON object per iteration to a local
/// file, one per line.
#[derive(Clone, Debug)]
pub struct JsonTelemetrySink {
    path: Utf8PathBuf,
}

impl JsonTelemetrySink {
    /// Creates a sink appending to the given file.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file records are appended to.
    pub fn path(&self) -> &camino::Utf8Path {
        &self.path
    }
}

impl TelemetrySink for JsonTelemetrySink {
    fn record_iteration(
        &self,
        record: &IterationRecord,
        metadata: &CycleMetadata,
    ) -> Result<(), TelemetryError> {
        let line = json!({
            "cycle": metadata.cycle_name,
            "run_id": metadata.run_id.to_string(),
            "platform": metadata.platform,
            "image": metadata.image,
            "started_at": metadata.started_at.to_rfc3339(),
            "test_case": record.test_case_name,
            "iteration": record.iteration_index,
            "outcome": record.outcome,
            "duration_secs": record.duration.as_secs_f64(),
            "sub_results": record.sub_results,
            "log_reference": record.log_reference,
            "error": record.error,
        });

        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|error| {
                TelemetryError::with_source(format!("failed to open `{}`", self.path), error)
            })?;
        writeln!(file, "{line}").map_err(|error| {
            TelemetryError::with_source(format!("failed to append to `{}`", self.path), error)
        })?;
        Ok(())
    }
}
