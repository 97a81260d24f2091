// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The boundary to the environment provisioner.
//!
//! Provisioning itself (VM and resource-group creation, image copies, the
//! cloud API wire format) lives outside this crate. The engine only depends
//! on the [`Provisioner`] trait: resolve an image once per cycle, request
//! setup when a test case needs a fresh environment, request teardown when
//! it is done with one, and poll the resulting [`CleanupTask`]s to
//! completion.

use crate::errors::ProvisionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The environment a cycle runs against, as declared by configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    /// Base name for provisioned resources (e.g. a resource-group prefix).
    pub name: String,

    /// The requested image or VHD identifier, resolved to an
    /// [`ImageReference`] before execution begins.
    pub image: String,

    /// The platform this environment provides (matched against test case
    /// platform tags).
    pub platform: String,
}

/// A resolved environment image identity.
///
/// Produced by [`Provisioner::resolve_image`] exactly once per cycle, before
/// any test case runs. Failure to resolve is fatal to the cycle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageReference {
    name: String,
}

impl ImageReference {
    /// Creates a new `ImageReference`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The resolved image name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An opaque handle to a provisioned environment.
///
/// Owned by the engine between a setup request and the matching teardown
/// request; consumed by [`Provisioner::request_teardown`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvironmentHandle {
    identifier: String,
}

impl EnvironmentHandle {
    /// Creates a new `EnvironmentHandle`.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// The provisioner-side identifier for this environment.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// A handle to an asynchronous teardown operation.
///
/// Returned immediately by [`Provisioner::request_teardown`]; the actual
/// deletion happens out-of-band. The handle is owned by the
/// [`CleanupCoordinator`](crate::cleanup::CleanupCoordinator) until it is
/// observed [`Finished`](TaskState::Finished), then released and never
/// reused.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CleanupTask {
    identifier: String,
}

impl CleanupTask {
    /// Creates a new `CleanupTask` with the given identifier (e.g. a
    /// resource-group name).
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// The identifier of the resource being torn down.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// The observable state of a [`CleanupTask`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaskState {
    /// Teardown is still in progress.
    Running,
    /// Teardown has completed; the handle can be released.
    Finished,
}

/// The provisioner collaborator.
///
/// Implementations are expected to run teardown out-of-band: a
/// `request_teardown` call must return without waiting for the deletion to
/// complete, and completion is communicated solely through [`poll_task`](Self::poll_task).
pub trait Provisioner {
    /// Resolves the environment image to test against.
    ///
    /// Called once per cycle before any test case runs. An error here is
    /// fatal to the cycle.
    fn resolve_image(&self, spec: &EnvironmentSpec) -> Result<ImageReference, ProvisionError>;

    /// Provisions an environment. May block. An error here is fatal to the
    /// cycle.
    fn request_setup(
        &self,
        spec: &EnvironmentSpec,
        image: &ImageReference,
    ) -> Result<EnvironmentHandle, ProvisionError>;

    /// Begins teardown of an environment, returning immediately with a task
    /// handle for the out-of-band deletion.
    fn request_teardown(&self, environment: EnvironmentHandle) -> CleanupTask;

    /// Non-blocking status check for an outstanding teardown task.
    fn poll_task(&self, task: &CleanupTask) -> TaskState;
}
