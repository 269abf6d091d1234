use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

/// Mutual-exclusion handle shared by the tick and render loops.
///
/// Wraps the application's shared state (`App::Shared`). Holding the guard
/// returned by [`SyncHandle::lock`] is the only way to touch that state, so a
/// render pass can never observe a tick pass mid-mutation. The guard releases
/// on drop, including early returns and unwinding.
pub struct SyncHandle<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> SyncHandle<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Blocks until the handle is free and returns a scoped guard.
    ///
    /// A panic inside a previous holder does not poison the handle for the
    /// other loop; the state is returned as the panicking holder left it.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("sync handle was poisoned by a panicking callback; recovering");
            poisoned.into_inner()
        })
    }

    /// Returns a guard only if the handle is free right now.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Runs `f` with exclusive access to the shared state.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }
}

impl<T> Clone for SyncHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for SyncHandle<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for SyncHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncHandle")
            .field("holders", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}
