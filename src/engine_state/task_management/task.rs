//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which provides a framework for executing work asynchronously across multiple threads.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed asynchronously
//! - `TaskResult`: Represents the result of a completed task
//! - `TaskEvent`: What a handled result reports back to the engine
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`, or `failed()` supplies one if
//!    `process()` panicked
//! 4. The result's `handle_result()` is called on the main thread
//! 5. The result can spawn new tasks and report events
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the main thread
//! - `process()` must never take the world lock; only `handle_result()` may

use std::sync::Arc;

use cgmath::Point3;

use crate::{core::injection_system::MtInjectionSystem, engine_state::meshing::mesh::Mesh};

/// A trait representing a unit of work that can be executed asynchronously.
///
/// Tasks are the primary mechanism for offloading work from the main thread to
/// background workers. They should be designed to be self-contained and own all
/// the data they need to perform their work.
///
/// # Implementation Guidelines
/// - Must be `Send` to be transferred between threads
/// - Should be relatively coarse-grained to amortize task scheduling overhead
/// - Should be `'static` (no non-static references)
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// This method contains the actual work to be performed asynchronously.
    /// It runs on a background thread and should avoid blocking operations
    /// that could starve other tasks.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be processed on the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;

    /// The result handed to the main thread when `process` panicked.
    ///
    /// Tasks that mark shared state as in flight override this to release
    /// it. The default result does nothing.
    fn failed(&self) -> Box<dyn TaskResult + Send> {
        Box::new(FailedTaskResult)
    }
}

/// A trait representing the result of processing a `Task`.
///
/// Task results are processed on the main thread and can:
/// - Spawn new tasks for further processing
/// - Report events to the engine
/// - Access engine services through the injection system
pub trait TaskResult: Send {
    /// Handles the result of a completed task on the main thread.
    ///
    /// # Returns
    /// A tuple containing:
    /// 1. A vector of new tasks to schedule (can be empty)
    /// 2. A vector of events for the engine (can be empty)
    fn handle_result(
        self: Box<Self>,
        mt_injection_system: &MtInjectionSystem,
    ) -> (Vec<Box<dyn Task>>, Vec<TaskEvent>);
}

/// Something that happened while handling a task result.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// A generated chunk was inserted into the world.
    ChunkGenerated(Point3<i32>),
    /// A chunk's mesh was stored in the mesh cache.
    ChunkMeshed {
        position: Point3<i32>,
        mesh: Arc<Mesh>,
    },
    /// A chunk's mesh was evicted from the mesh cache to make room.
    ChunkMeshEvicted(Point3<i32>),
}

/// Default result for a task that panicked on its worker. Handling it does
/// nothing beyond balancing the worker's in-flight accounting.
pub struct FailedTaskResult;

impl TaskResult for FailedTaskResult {
    fn handle_result(
        self: Box<Self>,
        _mt_injection_system: &MtInjectionSystem,
    ) -> (Vec<Box<dyn Task>>, Vec<TaskEvent>) {
        (Vec::new(), Vec::new())
    }
}
