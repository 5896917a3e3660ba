//! Attendance store that always fails.

use crate::application::ports::{AttendanceStore, StoreError};
use crate::domain::attendance::AttendanceRecord;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Store double returning a fixed error, counting attempted writes.
#[derive(Debug, Clone)]
pub struct FailingStore {
    error: StoreError,
    attempts: Arc<AtomicUsize>,
}

impl FailingStore {
    /// Fail every insert with `error`.
    pub fn new(error: StoreError) -> Self {
        Self {
            error,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail every insert as if the backend could not be reached.
    pub fn unavailable(message: &str) -> Self {
        Self::new(StoreError::Unavailable(message.to_string()))
    }

    /// Number of inserts attempted so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AttendanceStore for FailingStore {
    fn insert(&self, _record: AttendanceRecord) -> Result<u64, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}
