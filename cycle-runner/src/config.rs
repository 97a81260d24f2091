// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cycle configuration.
//!
//! Parsing declarative test definitions and credentials is the enclosing
//! config loader's job; this module only defines the inputs the engine
//! consumes. All fields derive serde so the loader can deserialize them
//! directly.

use crate::{cleanup::DEFAULT_POLL_INTERVAL, provision::EnvironmentSpec};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, time::Duration};

/// Configuration for one test cycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CycleConfig {
    /// The cycle name, used as the suite name in reports.
    pub cycle_name: String,

    /// The environment to provision and test against.
    pub environment: EnvironmentSpec,

    /// Priorities accepted by selection. `None` accepts every priority.
    #[serde(default)]
    pub accepted_priorities: Option<BTreeSet<u8>>,

    /// Whether consecutive test cases share one provisioned environment
    /// instead of provisioning one each.
    #[serde(default)]
    pub economy_mode: bool,

    /// Interval between polls while draining outstanding cleanup tasks.
    #[serde(default = "default_poll_interval")]
    pub cleanup_poll_interval: Duration,

    /// Directory the report artifacts are written to.
    pub output_dir: Utf8PathBuf,
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

impl CycleConfig {
    /// Creates a configuration with default selection (all priorities),
    /// economy mode off, and the default cleanup poll interval.
    pub fn new(
        cycle_name: impl Into<String>,
        environment: EnvironmentSpec,
        output_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            cycle_name: cycle_name.into(),
            environment,
            accepted_priorities: None,
            economy_mode: false,
            cleanup_poll_interval: DEFAULT_POLL_INTERVAL,
            output_dir: output_dir.into(),
        }
    }

    /// Sets the accepted priority set.
    pub fn set_accepted_priorities(
        &mut self,
        priorities: impl IntoIterator<Item = u8>,
    ) -> &mut Self {
        self.accepted_priorities = Some(priorities.into_iter().collect());
        self
    }

    /// Enables or disables economy mode.
    pub fn set_economy_mode(&mut self, economy_mode: bool) -> &mut Self {
        self.economy_mode = economy_mode;
        self
    }

    /// Sets the cleanup drain poll interval.
    pub fn set_cleanup_poll_interval(&mut self, interval: Duration) -> &mut Self {
        self.cleanup_poll_interval = interval;
        self
    }

    /// The path of the structured suite/case report.
    pub fn junit_path(&self) -> Utf8PathBuf {
        self.output_dir.join("junit.xml")
    }

    /// The path of the narrative summary artifact.
    pub fn summary_path(&self) -> Utf8PathBuf {
        self.output_dir.join("summary.html")
    }

    /// The platform test cases are matched against.
    pub fn platform(&self) -> &str {
        &self.environment.platform
    }

    /// The report output directory.
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec() -> EnvironmentSpec {
        EnvironmentSpec {
            name: "lab".to_owned(),
            image: "ubuntu-lts".to_owned(),
            platform: "azure".to_owned(),
        }
    }

    #[test]
    fn defaults() {
        let config = CycleConfig::new("nightly", spec(), "out");
        assert_eq!(config.accepted_priorities, None);
        assert!(!config.economy_mode);
        assert_eq!(config.cleanup_poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.junit_path(), Utf8PathBuf::from("out/junit.xml"));
        assert_eq!(config.summary_path(), Utf8PathBuf::from("out/summary.html"));
    }

    #[test]
    fn setters() {
        let mut config = CycleConfig::new("nightly", spec(), "out");
        config
            .set_accepted_priorities([0, 1])
            .set_economy_mode(true)
            .set_cleanup_poll_interval(Duration::from_secs(5));
        assert_eq!(
            config.accepted_priorities,
            Some([0, 1].into_iter().collect())
        );
        assert!(config.economy_mode);
        assert_eq!(config.cleanup_poll_interval, Duration::from_secs(5));
    }
}
