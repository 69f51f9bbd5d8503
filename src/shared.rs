//! Shared registry — one critical section for multi-threaded hosts
//!
//! The registry itself is single-writer. Hosts that call it from several
//! threads go through this handle, which runs each operation to completion
//! under a single lock.

use crate::clock::{Clock, SystemClock};
use crate::lifecycle::Registry;
use crate::query::Query;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
pub struct SharedRegistry<C: Clock = SystemClock> {
    inner: Arc<Mutex<Registry<C>>>,
}

impl<C: Clock> Clone for SharedRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedRegistry<C> {
    pub fn new(registry: Registry<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Run a mutating operation under the lock
    pub fn write<T>(&self, op: impl FnOnce(&mut Registry<C>) -> T) -> T {
        op(&mut self.lock())
    }

    /// Run a read-only projection under the lock
    pub fn read<T>(&self, op: impl FnOnce(Query<'_>) -> T) -> T {
        op(self.lock().query())
    }

    fn lock(&self) -> MutexGuard<'_, Registry<C>> {
        // operations never leave partial state behind, so a panic elsewhere
        // cannot have corrupted the registry
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
