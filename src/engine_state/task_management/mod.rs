//! # Task Management System
//!
//! This module provides the worker pool that runs meshing off the main thread,
//! plus an inline runner with the same interface for tests and tools.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Owns the worker threads and distributes tasks to them
//! - `InlineTaskRunner`: Runs every task to completion inside `publish_task`
//! - `Task` / `TaskResult`: The unit of work and its outcome
//! - `TaskScheduler`: The interface both runners implement
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskScheduler::publish_task()`
//! 2. The manager hands them to idle workers using round-robin, or queues them
//! 3. Workers process tasks and send back results
//! 4. Results are handled on the caller's thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks, which are published in turn
//!
//! ## Failure Handling
//! A panic inside `Task::process` is caught on the worker. The worker survives,
//! and the panic comes back as a result that logs a warning and drops the job.
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new(4)?;
//!
//! task_manager.publish_task(Box::new(MyTask::new()));
//!
//! // In the main loop:
//! task_manager.process_completed_tasks();
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::{
    any::Any,
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::mpsc::{channel, Receiver, Sender},
    thread::{self, JoinHandle},
};

use log::{info, warn};

use crate::error::{Result, VoxelError};

pub use task::{Task, TaskResult, TaskScheduler};

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task results from worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `worker`: Handle to the worker thread, joined when the manager is dropped
struct TaskChannel {
    task_sender: Sender<Box<dyn Task>>,
    result_receiver: Receiver<Box<dyn TaskResult>>,
    num_tasks_in_flight: usize,
    worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating the worker threads
/// - Distributing tasks across idle workers
/// - Queuing tasks while every worker is busy
/// - Collecting and handling task results
///
/// Dropping the manager closes every channel and joins the workers, after
/// letting each finish the task it is running.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Keeping this at 1 means a queued task always goes to the next worker that
/// becomes idle instead of waiting behind a long job.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// Runs a task, turning a panic into a result that reports it.
fn run_task(task: &dyn Task) -> Box<dyn TaskResult> {
    match panic::catch_unwind(AssertUnwindSafe(|| task.process())) {
        Ok(result) => result,
        Err(payload) => Box::new(PanickedTaskResult {
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Result standing in for a task that panicked.
struct PanickedTaskResult {
    message: String,
}

impl TaskResult for PanickedTaskResult {
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task>> {
        warn!("Dropping failed task: {}", VoxelError::TaskPanicked(self.message));
        Vec::new()
    }
}

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Errors
    /// Returns [`VoxelError::WorkerSpawn`] if a worker thread cannot be started.
    pub fn new(num_workers: usize) -> Result<Self> {
        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult>>();

            let worker = thread::Builder::new()
                .name(format!("mesh-worker-{index}"))
                .spawn(move || {
                    while let Ok(task) = task_rx.recv() {
                        if result_tx.send(run_task(task.as_ref())).is_err() {
                            break;
                        }
                    }
                })
                .map_err(VoxelError::WorkerSpawn)?;

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                worker,
            });
        }

        info!(
            "Started {} task workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        Ok(TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks that are queued or running.
    pub fn pending_tasks(&self) -> usize {
        self.queued_tasks.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was handed to the worker
    /// - `Err(task)` if the worker has disconnected, giving the task back for requeueing
    fn try_send_task(
        &mut self,
        task: Box<dyn Task>,
        channel_idx: usize,
    ) -> std::result::Result<(), Box<dyn Task>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(()) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(error) => Err(error.0),
        }
    }

    /// Finds a worker channel that can accept a new task.
    ///
    /// Round-robin starting from the channel after the last one used, skipping
    /// channels that are at `MAX_TASKS_IN_FLIGHT`.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&index| self.channels[index].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Schedules queued tasks while workers are available, oldest first.
    pub fn process_queued_tasks(&mut self) {
        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                break;
            };
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    warn!("Worker {} disconnected, keeping task queued", channel_idx);
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Handles every result the workers have produced so far.
    ///
    /// Must be called regularly from the owning thread. Follow-up tasks returned
    /// by the results are published before this returns.
    ///
    /// # Returns
    /// The number of results handled.
    pub fn process_completed_tasks(&mut self) -> usize {
        let mut tasks_to_publish = Vec::new();
        let mut handled = 0;

        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                tasks_to_publish.extend(result.handle_result());
                handled += 1;
            }
        }

        for task in tasks_to_publish {
            self.publish_task(task);
        }
        handled
    }
}

impl TaskScheduler for TaskManager {
    /// Publishes a new task for execution.
    ///
    /// The task starts on an idle worker right away, or waits in the queue
    /// until `process_queued_tasks()` finds one.
    fn publish_task(&mut self, task: Box<dyn Task>) -> bool {
        let Some(channel_idx) = self.find_available_channel() else {
            self.queued_tasks.push_back(task);
            return false;
        };

        match self.try_send_task(task, channel_idx) {
            Ok(()) => {
                self.current_channel = (channel_idx + 1) % self.channels.len();
                true
            }
            Err(task) => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        if !self.queued_tasks.is_empty() {
            warn!("Dropping {} queued tasks on shutdown", self.queued_tasks.len());
        }
        for channel in self.channels.drain(..) {
            let TaskChannel {
                task_sender,
                result_receiver,
                worker,
                ..
            } = channel;
            drop(task_sender);
            drop(result_receiver);
            if worker.join().is_err() {
                warn!("Task worker exited with a panic");
            }
        }
    }
}

/// Runs tasks synchronously on the calling thread.
///
/// Each published task is processed and its result handled before
/// `publish_task` returns, including any follow-up tasks it spawns.
#[derive(Default)]
pub struct InlineTaskRunner {
    completed: usize,
}

impl InlineTaskRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks run so far.
    pub fn completed_tasks(&self) -> usize {
        self.completed
    }
}

impl TaskScheduler for InlineTaskRunner {
    fn publish_task(&mut self, task: Box<dyn Task>) -> bool {
        let mut pending = VecDeque::from([task]);
        while let Some(task) = pending.pop_front() {
            pending.extend(run_task(task.as_ref()).handle_result());
            self.completed += 1;
        }
        true
    }
}
