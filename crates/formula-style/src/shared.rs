use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Workbook;

/// A cloneable handle to one workbook shared between threads.
///
/// The workbook itself does no locking. This handle is the one exclusive section: every
/// read-modify-write sequence (read a value, compute, write it back) must run inside a single
/// [`SharedWorkbook::write`] call, otherwise concurrent callers can lose updates.
#[derive(Clone, Debug, Default)]
pub struct SharedWorkbook {
    inner: Arc<RwLock<Workbook>>,
}

impl SharedWorkbook {
    pub fn new(workbook: Workbook) -> Self {
        Self {
            inner: Arc::new(RwLock::new(workbook)),
        }
    }

    /// Run `f` with shared access. Readers may overlap each other but never a writer.
    pub fn read<R>(&self, f: impl FnOnce(&Workbook) -> R) -> R {
        f(&*self.read_guard())
    }

    /// Run `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut Workbook) -> R) -> R {
        f(&mut *self.write_guard())
    }

    /// Clone the current state of the workbook.
    pub fn snapshot(&self) -> Workbook {
        self.read(Workbook::clone)
    }

    /// Take the workbook back if this is the last handle, otherwise return the handle.
    pub fn try_into_inner(self) -> Result<Workbook, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => Ok(match lock.into_inner() {
                Ok(workbook) => workbook,
                Err(poisoned) => poisoned.into_inner(),
            }),
            Err(inner) => Err(Self { inner }),
        }
    }

    // A panic inside a closure poisons the lock. Every mutation validates before it writes, so
    // the workbook is still consistent and later callers keep going.
    fn read_guard(&self) -> RwLockReadGuard<'_, Workbook> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Workbook> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl From<Workbook> for SharedWorkbook {
    fn from(workbook: Workbook) -> Self {
        Self::new(workbook)
    }
}
