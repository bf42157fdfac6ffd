//! # Injection System
//!
//! A type-keyed registry of `MtSystem` handles. Task results run on the main
//! thread and only receive this registry, so anything a result needs (the
//! world, the mesh manager, the streaming manager) is registered here once at
//! engine start-up.
//!
//! ## Usage
//! ```rust
//! use voxel_globe::core::{injection_system::MtInjectionSystem, MtSystem};
//!
//! let injector = MtInjectionSystem::new();
//! injector.insert("Hello".to_string());
//! let retrieved: MtSystem<String> = injector.get().unwrap();
//! assert_eq!(retrieved.get().as_str(), "Hello");
//! ```

use super::{MtResource, MtSystem};
use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
};

/// A thread-safe dependency injection container.
///
/// Each entry stores the `MtSystem<T>` handle itself as `dyn Any`, so lookups
/// are a checked `downcast_ref` followed by a cheap handle clone.
pub struct MtInjectionSystem {
    systems: MtResource<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl MtInjectionSystem {
    /// Creates a new, empty `MtInjectionSystem`.
    pub fn new() -> Self {
        Self {
            systems: MtResource::new(HashMap::new()),
        }
    }

    /// Inserts a new system into the container, replacing any system of the
    /// same type, and returns a handle to it.
    pub fn insert<T: Send + Sync + 'static>(&self, system: T) -> MtSystem<T> {
        let handle = MtSystem::new(Box::new(system));
        self.insert_handle(handle.clone());
        handle
    }

    /// Registers an existing handle, so the caller and the registry share the
    /// same underlying system.
    pub fn insert_handle<T: Send + Sync + 'static>(&self, handle: MtSystem<T>) {
        self.systems
            .get_mut()
            .insert(TypeId::of::<T>(), Box::new(handle));
    }

    /// Retrieves the system of type `T`, or `None` if none was registered.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<MtSystem<T>> {
        let systems = self.systems.get();
        let entry = systems.get(&TypeId::of::<T>());
        if entry.is_none() {
            log::warn!("No system of type {} registered", type_name::<T>());
        }
        entry.and_then(|boxed| boxed.downcast_ref::<MtSystem<T>>().cloned())
    }
}

impl Default for MtInjectionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MtInjectionSystem {
    fn clone(&self) -> Self {
        Self {
            systems: self.systems.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_handle_is_shared() {
        let injector = MtInjectionSystem::new();
        let handle = injector.insert(7u64);
        **handle.get_mut() = 9;

        let retrieved = injector.get::<u64>().unwrap();
        assert_eq!(**retrieved.get(), 9);
    }

    #[test]
    fn missing_system_is_none() {
        let injector = MtInjectionSystem::new();
        assert!(injector.get::<String>().is_none());
    }

    #[test]
    fn clones_share_registry() {
        let injector = MtInjectionSystem::new();
        let clone = injector.clone();
        clone.insert(1i32);
        assert!(injector.get::<i32>().is_some());
    }
}
