// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coordination of asynchronous environment-teardown tasks.
//!
//! Teardown is fire-and-forget at registration time: the main loop keeps
//! executing later test cases while earlier environments are deleted in the
//! background. The one blocking wait in the whole system is
//! [`CleanupCoordinator::drain`], called once at cycle end so that the cycle
//! is never reported complete while teardown is still outstanding (a
//! premature "complete" could race with a later cycle reusing the same
//! identifiers).

use crate::provision::{CleanupTask, Provisioner, TaskState};
use std::time::Duration;
use tracing::debug;

/// The default interval between polls in [`CleanupCoordinator::drain`].
///
/// Constant rather than backed off, to keep behavior predictable and bound
/// API call volume against the provisioner.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Tracks outstanding teardown tasks and polls them to completion.
///
/// All methods are called from the engine's single-threaded main loop; the
/// tasks themselves execute concurrently on the provisioner's side and
/// communicate completion only through
/// [`Provisioner::poll_task`].
pub struct CleanupCoordinator<'a> {
    provisioner: &'a dyn Provisioner,
    tasks: Vec<CleanupTask>,
}

impl<'a> CleanupCoordinator<'a> {
    /// Creates a new coordinator polling through the given provisioner.
    pub fn new(provisioner: &'a dyn Provisioner) -> Self {
        Self {
            provisioner,
            tasks: Vec::new(),
        }
    }

    /// Registers a teardown task in the running state. Non-blocking.
    pub fn register(&mut self, task: CleanupTask) {
        debug!(identifier = task.identifier(), "registered cleanup task");
        self.tasks.push(task);
    }

    /// The number of tasks not yet observed finished.
    pub fn outstanding(&self) -> usize {
        self.tasks.len()
    }

    /// Inspects every registered task once, releasing the handles of those
    /// that have finished. Non-blocking.
    ///
    /// Returns the number of tasks still running. Called opportunistically
    /// by the engine after each iteration so handles are reclaimed early.
    pub fn poll(&mut self) -> usize {
        self.tasks.retain(|task| {
            match self.provisioner.poll_task(task) {
                TaskState::Running => true,
                TaskState::Finished => {
                    debug!(identifier = task.identifier(), "cleanup task finished");
                    false
                }
            }
        });
        self.tasks.len()
    }

    /// Blocks until every registered task has finished.
    ///
    /// Polls once immediately, then sleeps `poll_interval` between further
    /// polls. A task that never finishes blocks this call indefinitely;
    /// enforcing an overall timeout is the job of an enclosing supervisor.
    pub fn drain(&mut self, poll_interval: Duration) {
        loop {
            let running = self.poll();
            if running == 0 {
                return;
            }
            debug!(running, "waiting for cleanup tasks");
            std::thread::sleep(poll_interval);
        }
    }
}
