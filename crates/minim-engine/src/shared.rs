use std::sync::{Arc, Mutex, MutexGuard};

use minim_core::{Characteristics, MinimError, RandomSource, RngHandle, SubjectId};

use crate::allocation::Allocation;
use crate::engine::RandomizationEngine;
use crate::registry::SubjectRecord;

/// Cloneable, thread-safe handle to a [`RandomizationEngine`].
///
/// Every allocation holds the lock across validation, decision and append, so
/// no two subjects are ever decided from the same history snapshot and
/// registry order equals lock acquisition order.
pub struct SharedEngine<R: RandomSource = RngHandle> {
    inner: Arc<Mutex<RandomizationEngine<R>>>,
}

impl<R: RandomSource> SharedEngine<R> {
    /// Wraps an engine for shared use.
    pub fn new(engine: RandomizationEngine<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// See [`RandomizationEngine::randomise_subject`].
    pub fn randomise_subject(
        &self,
        id: impl Into<SubjectId>,
        characteristics: &Characteristics,
    ) -> Result<String, MinimError> {
        self.lock().randomise_subject(id, characteristics)
    }

    /// See [`RandomizationEngine::allocate`].
    pub fn allocate(
        &self,
        id: impl Into<SubjectId>,
        characteristics: &Characteristics,
    ) -> Result<Allocation, MinimError> {
        self.lock().allocate(id, characteristics)
    }

    /// Owned copy of the registry records, in randomisation order.
    pub fn snapshot(&self) -> Vec<SubjectRecord> {
        self.lock().registry().snapshot()
    }

    /// Number of randomised subjects.
    pub fn subject_count(&self) -> usize {
        self.lock().subject_count()
    }

    /// Runs `f` with shared access to the engine while holding the lock.
    pub fn with_engine<T>(&self, f: impl FnOnce(&RandomizationEngine<R>) -> T) -> T {
        let guard = self.lock();
        f(&*guard)
    }

    fn lock(&self) -> MutexGuard<'_, RandomizationEngine<R>> {
        // The registry append is the last step of an allocation, so a panic
        // while the lock was held cannot leave a half-written record.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<R: RandomSource> Clone for SharedEngine<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
