//! # Task Management System
//!
//! This module provides the task management system for executing work
//! asynchronously across a pool of worker threads.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the main thread and worker threads
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks asynchronously and return results
//! 4. Results are processed on the main thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks and report `TaskEvent`s
//! 6. The cycle continues until all work is complete
//!
//! ## Example Usage
//! ```
//! use voxel_globe::core::injection_system::MtInjectionSystem;
//! use voxel_globe::engine_state::task_management::TaskManager;
//!
//! let mut task_manager = TaskManager::new(2, MtInjectionSystem::new());
//! assert!(task_manager.is_idle());
//!
//! // In the frame loop:
//! let events = task_manager.process_completed_tasks();
//! task_manager.process_queued_tasks();
//! assert!(events.is_empty());
//! ```

pub mod task;

use crate::core::injection_system::MtInjectionSystem;
use log::{debug, error, info};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use task::{Task, TaskEvent, TaskResult};

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task results from worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `worker`: Handle to the worker thread, joined when the manager drops
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and managing worker threads
/// - Distributing tasks across available workers
/// - Collecting and processing task results
/// - Handling task queuing when all workers are busy
///
/// A panicking task does not take its worker down: the panic is caught and
/// logged, the task's `failed()` result is handled in place of its own, and
/// the worker keeps serving its channel.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task>>,
    current_channel: usize,
    mt_injection_system: MtInjectionSystem,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Keeping this at 1 means a busy worker never holds a backlog, so queued
/// tasks always go to the next worker that frees up.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. 0 means one per
    ///   available core.
    /// * `mt_injection_system` - Thread-safe services handed to task results
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize, mt_injection_system: MtInjectionSystem) -> Self {
        let available = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let num_workers = if num_workers == 0 { available } else { num_workers };
        info!(
            "Starting {} task workers (available parallelism: {})",
            num_workers, available
        );

        let mut channels = Vec::with_capacity(num_workers);

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let outcome = catch_unwind(AssertUnwindSafe(|| task.process()));
                    let result: Box<dyn TaskResult + Send> = match outcome {
                        Ok(result) => result,
                        Err(_) => {
                            error!("Task panicked on worker {:?}", thread::current().id());
                            task.failed()
                        }
                    };
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                worker: thread::spawn(task_closure),
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            mt_injection_system,
        }
    }

    pub fn num_workers(&self) -> usize {
        self.channels.len()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the send failed (worker disconnected), so the caller
    ///   can requeue it
    fn try_send_task(
        &mut self,
        task: Box<dyn Task>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel that can accept a new task.
    ///
    /// Round-robin starting from the channel after the last one used.
    /// Channels that have reached `MAX_TASKS_IN_FLIGHT` are skipped.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|offset| (self.current_channel + offset) % len)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// The task will be executed as soon as a worker becomes available, or queued
    /// if all workers are busy. Queued tasks keep their publication order.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task>) -> bool {
        if !self.queued_tasks.is_empty() {
            self.queued_tasks.push_back(task);
            return false;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Processes any queued tasks if workers are available.
    ///
    /// Tasks are handed out oldest first until the queue is empty or every
    /// worker is busy.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Channel is disconnected, put task back and stop processing
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Processes all completed task results from worker threads.
    ///
    /// Must be called on the main thread. Follow-up tasks returned by the
    /// handlers are published; events are returned in handling order.
    pub fn process_completed_tasks(&mut self) -> Vec<TaskEvent> {
        let mut tasks_to_queue = Vec::new();
        let mut events = Vec::new();

        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                let (new_tasks, new_events) = result.handle_result(&self.mt_injection_system);
                tasks_to_queue.extend(new_tasks);
                events.extend(new_events);
            }
        }

        if !tasks_to_queue.is_empty() {
            debug!("Queueing {} follow-up tasks", tasks_to_queue.len());
        }
        for task in tasks_to_queue {
            self.publish_task(task);
        }

        events
    }

    /// Tasks queued or running.
    pub fn pending_count(&self) -> usize {
        self.queued_tasks.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
    }

    pub fn is_idle(&self) -> bool {
        self.pending_count() == 0
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        for TaskChannel {
            task_sender,
            worker,
            ..
        } in self.channels.drain(..)
        {
            drop(task_sender);
            if worker.join().is_err() {
                error!("Task worker exited with a panic");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MtResource;
    use std::time::{Duration, Instant};

    struct CountTask {
        counter: MtResource<Vec<usize>>,
        value: usize,
        follow_up: bool,
    }

    impl Task for CountTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            self.counter.get_mut().push(self.value);
            Box::new(CountResult {
                counter: self.counter.clone(),
                value: self.value,
                follow_up: self.follow_up,
            })
        }
    }

    struct CountResult {
        counter: MtResource<Vec<usize>>,
        value: usize,
        follow_up: bool,
    }

    impl TaskResult for CountResult {
        fn handle_result(
            self: Box<Self>,
            _mt_injection_system: &MtInjectionSystem,
        ) -> (Vec<Box<dyn Task>>, Vec<TaskEvent>) {
            let mut tasks: Vec<Box<dyn Task>> = Vec::new();
            if self.follow_up {
                tasks.push(Box::new(CountTask {
                    counter: self.counter.clone(),
                    value: self.value + 100,
                    follow_up: false,
                }));
            }
            (tasks, Vec::new())
        }
    }

    struct PanickingTask;

    impl Task for PanickingTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            panic!("task failure");
        }
    }

    /// Panics on the worker and records its failure when handled.
    struct RecoveringTask {
        counter: MtResource<Vec<usize>>,
    }

    impl Task for RecoveringTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            panic!("task failure");
        }

        fn failed(&self) -> Box<dyn TaskResult + Send> {
            Box::new(CountResult {
                counter: self.counter.clone(),
                value: 7,
                follow_up: true,
            })
        }
    }

    fn drain(manager: &mut TaskManager) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !manager.is_idle() {
            assert!(Instant::now() < deadline, "tasks did not finish");
            manager.process_completed_tasks();
            manager.process_queued_tasks();
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn runs_every_task_and_follow_ups() {
        let counter = MtResource::new(Vec::new());
        let mut manager = TaskManager::new(3, MtInjectionSystem::new());

        for value in 0..20 {
            manager.publish_task(Box::new(CountTask {
                counter: counter.clone(),
                value,
                follow_up: value % 2 == 0,
            }));
        }
        assert!(manager.pending_count() > 0);
        drain(&mut manager);

        let mut values = counter.get().clone();
        values.sort();
        assert_eq!(values.len(), 30);
        assert!(values.contains(&118));
    }

    #[test]
    fn single_worker_keeps_fifo_order() {
        let counter = MtResource::new(Vec::new());
        let mut manager = TaskManager::new(1, MtInjectionSystem::new());
        for value in 0..10 {
            manager.publish_task(Box::new(CountTask {
                counter: counter.clone(),
                value,
                follow_up: false,
            }));
        }
        drain(&mut manager);
        assert_eq!(*counter.get(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn panicking_task_does_not_stall_the_worker() {
        let counter = MtResource::new(Vec::new());
        let mut manager = TaskManager::new(1, MtInjectionSystem::new());
        manager.publish_task(Box::new(PanickingTask));
        manager.publish_task(Box::new(CountTask {
            counter: counter.clone(),
            value: 1,
            follow_up: false,
        }));
        drain(&mut manager);
        assert_eq!(*counter.get(), vec![1]);
    }

    #[test]
    fn failure_result_of_a_panicking_task_is_handled() {
        let counter = MtResource::new(Vec::new());
        let mut manager = TaskManager::new(1, MtInjectionSystem::new());
        manager.publish_task(Box::new(RecoveringTask {
            counter: counter.clone(),
        }));
        drain(&mut manager);

        // The follow-up spawned by the failure result ran.
        assert_eq!(*counter.get(), vec![107]);
        assert!(manager.is_idle());
    }

    #[test]
    fn zero_workers_means_available_parallelism() {
        let manager = TaskManager::new(0, MtInjectionSystem::new());
        assert!(manager.num_workers() >= 1);
    }
}
