//! # Core Module
//!
//! Shared-ownership containers used to hand world and mesh state between the
//! main thread and the task workers.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted data with read-write locking (chunks)
//! - `MtSystem`: Thread-safe reference-counted service container (world, managers)
//! - `MtInjectionSystem`: Type-keyed registry that task results use to find services
//!
//! ## Usage
//! ```rust
//! use voxel_globe::core::{injection_system::MtInjectionSystem, MtResource};
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//!
//! let injector = MtInjectionSystem::new();
//! injector.insert(42u32);
//! let value: u32 = **injector.get::<u32>().unwrap().get();
//! assert_eq!(value, 42);
//! ```

pub mod injection_system;
pub mod mt_resource;
pub mod mt_system;

pub use mt_resource::MtResource;
pub use mt_system::MtSystem;
