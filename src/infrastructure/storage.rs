//! In-memory attendance storage.
//!
//! Concurrent storage for accepted check-ins, keyed by a monotonically
//! increasing id. Suitable for tests, demos and single-process deployments.

use crate::application::ports::{AttendanceStore, StoreError};
use crate::domain::attendance::{AttendanceRecord, Cedula};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Filter for reading stored check-ins back.
///
/// Both dates are inclusive and compared against the local date of
/// `recorded_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Only records for this identity, or everyone when `None`
    pub cedula: Option<Cedula>,
    /// First local date to include
    pub from: NaiveDate,
    /// Last local date to include
    pub to: NaiveDate,
}

impl RecordQuery {
    /// Everyone on a single day.
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            cedula: None,
            from: day,
            to: day,
        }
    }

    /// Restrict the query to one identity.
    pub fn with_cedula(mut self, cedula: Cedula) -> Self {
        self.cedula = Some(cedula);
        self
    }

    fn matches(&self, record: &AttendanceRecord) -> bool {
        let day = record.recorded_at.date();
        if day < self.from || day > self.to {
            return false;
        }
        self.cedula
            .as_ref()
            .map_or(true, |cedula| cedula == &record.cedula)
    }
}

/// Thread-safe attendance store backed by DashMap.
///
/// Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct MemoryAttendanceStore {
    records: DashMap<u64, AttendanceRecord>,
    next_id: AtomicU64,
}

impl MemoryAttendanceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Get a stored record by id.
    pub fn get(&self, id: u64) -> Option<AttendanceRecord> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    /// Records matching `query`, newest first.
    ///
    /// Records sharing a timestamp come back in reverse insertion order.
    pub fn query(&self, query: &RecordQuery) -> Vec<(u64, AttendanceRecord)> {
        let mut matched: Vec<(u64, AttendanceRecord)> = self
            .records
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        matched.sort_by(|(a_id, a), (b_id, b)| {
            b.recorded_at
                .cmp(&a.recorded_at)
                .then_with(|| b_id.cmp(a_id))
        });
        matched
    }

    /// Get the number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record. Ids keep counting.
    pub fn clear(&self) {
        self.records.clear();
    }
}

impl Default for MemoryAttendanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AttendanceStore for MemoryAttendanceStore {
    fn insert(&self, record: AttendanceRecord) -> Result<u64, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.records.insert(id, record);
        Ok(id)
    }
}
