//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which runs meshing work off the main thread.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed on a worker
//! - `TaskResult`: Represents the result of a completed task
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskScheduler::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the thread that drains completions
//! 5. The result can spawn follow-up tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back
//! - A task always runs to completion; there is no cancellation

/// A unit of work that can be executed on a background worker.
///
/// Tasks should own (or hold `Arc`s to) everything they need, since they
/// outlive the call that scheduled them.
pub trait Task: Send {
    /// Performs the work.
    ///
    /// Runs on a worker thread. Failures should be captured in the returned
    /// result rather than panicking; a panic is still caught by the worker and
    /// reported as [`crate::VoxelError::TaskPanicked`].
    fn process(&self) -> Box<dyn TaskResult>;
}

/// The outcome of processing a `Task`.
///
/// Handled on the thread that drains completed tasks, so implementations can
/// hand finished data to collaborators that are not meant to be called from
/// workers.
pub trait TaskResult: Send {
    /// Consumes the result.
    ///
    /// # Returns
    /// Follow-up tasks to schedule (usually none).
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task>>;
}

/// Anything that accepts tasks for execution.
pub trait TaskScheduler {
    /// Submits a task.
    ///
    /// # Returns
    /// `true` if the task started right away, `false` if it was queued.
    fn publish_task(&mut self, task: Box<dyn Task>) -> bool;
}
