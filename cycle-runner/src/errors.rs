// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by cycle-runner.

use camino::Utf8PathBuf;
use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// A fatal error that aborts an entire cycle.
///
/// Iteration-level failures are never surfaced through this type: a crashing
/// or misbehaving test script is recorded as an aborted iteration and the
/// cycle continues.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CycleRunError {
    /// The base environment image could not be resolved before execution
    /// began. No report is emitted in this case.
    #[error("failed to resolve environment image for cycle `{cycle_name}`")]
    ImageResolve {
        /// The cycle being run.
        cycle_name: String,

        /// The underlying provisioner error.
        #[source]
        error: ProvisionError,
    },

    /// The provisioner failed to set up an environment for a test case.
    #[error("failed to provision environment for test case `{test_case}`")]
    Setup {
        /// The test case whose setup request failed.
        test_case: String,

        /// The underlying provisioner error.
        #[source]
        error: ProvisionError,
    },

    /// The finalized report could not be written.
    #[error(transparent)]
    ReportWrite(#[from] WriteReportError),
}

/// An error returned by a [`Provisioner`](crate::provision::Provisioner)
/// operation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProvisionError {
    message: String,
    #[source]
    source: Option<BoxedError>,
}

impl ProvisionError {
    /// Creates a new `ProvisionError` with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `ProvisionError` with the given message and underlying
    /// cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// An error signaling abnormal termination of a test script invocation.
///
/// The engine never propagates this: the iteration it belongs to is
/// classified as aborted and the error text becomes the log excerpt.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ScriptError {
    message: String,
    #[source]
    source: Option<BoxedError>,
}

impl ScriptError {
    /// Creates a new `ScriptError` with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `ScriptError` with the given message and underlying
    /// cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// An error returned by a [`TelemetrySink`](crate::telemetry::TelemetrySink).
///
/// Telemetry is a best-effort side channel: the engine logs these and
/// continues.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TelemetryError {
    message: String,
    #[source]
    source: Option<BoxedError>,
}

impl TelemetryError {
    /// Creates a new `TelemetryError` with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `TelemetryError` with the given message and underlying
    /// cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// An error that occurs while writing report artifacts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteReportError {
    /// An error occurred while operating on the file system.
    #[error("error operating on path {file}")]
    Fs {
        /// The file being operated on.
        file: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// An error occurred while producing JUnit XML.
    #[error("error writing JUnit output to {file}")]
    Junit {
        /// The output file.
        file: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: quick_junit::SerializeError,
    },
}

/// An error that occurs while constructing a
/// [`TestCaseList`](crate::list::TestCaseList).
#[derive(Clone, Debug, Error)]
#[error("duplicate test case name `{name}` in cycle")]
pub struct DuplicateTestCaseName {
    name: String,
}

impl DuplicateTestCaseName {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The duplicated name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
