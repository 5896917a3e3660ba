//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::attendance::AttendanceRecord;
use chrono::{DateTime, Utc};
use std::fmt::{self, Debug};

/// Port for obtaining the current wall-clock time.
///
/// The generate path and the validate path must read the same clock.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current wall-clock instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Error returned by an attendance store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached
    Unavailable(String),
    /// The store was reached but refused the write
    Write(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "attendance store unavailable: {}", msg),
            StoreError::Write(msg) => write!(f, "attendance write failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Port for persisting accepted check-ins.
///
/// Persistence is owned by collaborators; the application layer only hands
/// over records that already passed validation.
pub trait AttendanceStore: Send + Sync + Debug {
    /// Persist a record and return the identifier assigned to it.
    fn insert(&self, record: AttendanceRecord) -> Result<u64, StoreError>;
}

impl<T: AttendanceStore + ?Sized> AttendanceStore for std::sync::Arc<T> {
    fn insert(&self, record: AttendanceRecord) -> Result<u64, StoreError> {
        (**self).insert(record)
    }
}
