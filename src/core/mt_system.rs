use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe container for long-lived services.
///
/// `MtSystem` holds a boxed service (the world, the mesh manager, the
/// streaming manager) behind an `Arc<RwLock<Box<T>>>`. Handles are cheap to
/// clone and are what tasks carry onto worker threads.
///
/// # Examples
/// ```rust
/// use voxel_globe::core::MtSystem;
///
/// let system = MtSystem::new(Box::new(42u32));
/// assert_eq!(**system.get(), 42);
///
/// **system.get_mut() = 100;
/// assert_eq!(**system.get(), 100);
/// ```
///
/// # Performance Considerations
/// - Read operations (`get()`) can occur concurrently
/// - Write operations (`get_mut()`) are exclusive and will block other operations
/// - Consider using `MtResource` for plain data that is not a service
pub struct MtSystem<T: Send + Sync + ?Sized> {
    pub system: Arc<RwLock<Box<T>>>,
}

impl<T: Send + Sync + 'static + ?Sized> MtSystem<T> {
    /// Creates a new `MtSystem` containing the given boxed system.
    pub fn new(system: Box<T>) -> Self {
        Self {
            system: Arc::new(RwLock::new(system)),
        }
    }

    /// Returns a read-only guard that allows accessing the contained system.
    pub fn get(&self) -> RwLockReadGuard<'_, Box<T>> {
        self.system.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a mutable guard that allows modifying the contained system.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, Box<T>> {
        self.system.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send + Sync + ?Sized> Clone for MtSystem<T> {
    fn clone(&self) -> Self {
        Self {
            system: self.system.clone(),
        }
    }
}
