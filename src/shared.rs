//! Lock-guarded cube handle for multi-threaded hosts.
//!
//! A [`DataCube`] has no internal locking. Hosts that touch one cube from
//! several threads wrap it in a [`SharedCube`]: writers (cursor mutation,
//! category removal) take the write lock, traversal and aggregation take the
//! read lock.

use crate::cube::DataCube;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Cloneable handle to a cube behind a reader/writer lock.
#[derive(Debug, Clone)]
pub struct SharedCube {
    inner: Arc<RwLock<DataCube>>,
}

impl SharedCube {
    pub fn new(cube: DataCube) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cube)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, DataCube> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, DataCube> {
        self.inner.write()
    }

    /// Run `f` with exclusive access; the lock is released when `f` returns.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut DataCube) -> R) -> R {
        f(&mut *self.inner.write())
    }

    /// Run `f` with shared access.
    pub fn with_read<R>(&self, f: impl FnOnce(&DataCube) -> R) -> R {
        f(&*self.inner.read())
    }

    /// Take the cube back if this is the last handle.
    pub fn try_unwrap(self) -> Result<DataCube, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<DataCube> for SharedCube {
    fn from(cube: DataCube) -> Self {
        Self::new(cube)
    }
}
