use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` wraps an `Arc<RwLock<T>>`. Chunks are stored this way so a
/// mesh worker can read one while the main thread keeps the world map.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use voxel_globe::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// let handle = thread::spawn(move || {
///     *counter_clone.get_mut() += 1;
/// });
///
/// handle.join().unwrap();
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Poisoning
/// A panic on a worker while holding the lock does not make the resource
/// unusable: the guard is recovered from the `PoisonError`.
#[derive(Debug)]
pub struct MtResource<T: Send + Sync> {
    pub resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read guard. Concurrent readers do not block each other.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns an exclusive write guard.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if both handles point at the same resource.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
