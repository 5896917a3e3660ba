//! Scan submission: turn an accepted token into an attendance record.
//!
//! The service validates the identity and the scanned token, stamps the
//! record with the codec's clock, and hands it to an `AttendanceStore`.
//! Transport concerns (status codes, request parsing) stay with the caller.

use crate::application::codec::TokenCodec;
use crate::application::ports::{AttendanceStore, StoreError};
use crate::domain::attendance::{AttendanceRecord, Cedula};
use crate::domain::token::log_prefix;
use crate::domain::verdict::{RejectReason, Verdict};
use chrono::{NaiveDateTime, TimeDelta, Timelike};
use std::fmt;
use tracing::{info, warn};

/// Error returned when a check-in is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInError {
    /// The identity or the token is missing
    IncompleteData {
        cedula_present: bool,
        token_present: bool,
    },
    /// The token is not valid for the current window
    InvalidToken(RejectReason),
    /// The record could not be persisted
    Store(StoreError),
}

impl fmt::Display for CheckInError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckInError::IncompleteData { .. } => write!(f, "incomplete check-in data"),
            CheckInError::InvalidToken(reason) => write!(f, "invalid or expired QR: {}", reason),
            CheckInError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CheckInError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckInError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CheckInError {
    fn from(e: StoreError) -> Self {
        CheckInError::Store(e)
    }
}

/// A stored check-in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CheckInReceipt {
    /// Identifier assigned by the store
    pub id: u64,
    /// What was stored
    pub record: AttendanceRecord,
}

/// Accepts scans and records attendance.
#[derive(Debug, Clone)]
pub struct CheckInService<S>
where
    S: AttendanceStore,
{
    codec: TokenCodec,
    store: S,
}

impl<S> CheckInService<S>
where
    S: AttendanceStore,
{
    /// Create a service validating with `codec` and persisting to `store`.
    pub fn new(codec: TokenCodec, store: S) -> Self {
        Self { codec, store }
    }

    /// Register a scan for `cedula`.
    ///
    /// Both values are required before the token is even looked at. The
    /// token is stored exactly as presented.
    pub fn register(&self, cedula: &str, token: &str) -> Result<CheckInReceipt, CheckInError> {
        let parsed = Cedula::parse(cedula);
        let token_present = !token.trim().is_empty();

        let cedula = match parsed {
            Some(cedula) if token_present => cedula,
            parsed => {
                warn!(
                    cedula_present = parsed.is_some(),
                    token_present, "check-in refused: incomplete data"
                );
                return Err(CheckInError::IncompleteData {
                    cedula_present: parsed.is_some(),
                    token_present,
                });
            }
        };

        if let Verdict::Reject(reason) = self.codec.check(token) {
            warn!(
                cedula = %cedula,
                token = %log_prefix(token),
                %reason,
                "check-in refused: invalid token"
            );
            return Err(CheckInError::InvalidToken(reason));
        }

        let record = AttendanceRecord {
            cedula,
            token: token.to_string(),
            recorded_at: truncate_to_second(self.codec.now().naive_local()),
        };

        let id = self.store.insert(record.clone()).map_err(|e| {
            warn!(cedula = %record.cedula, error = %e, "check-in refused: store failure");
            CheckInError::from(e)
        })?;

        info!(
            id,
            cedula = %record.cedula,
            recorded_at = %record.recorded_at_display(),
            "check-in stored"
        );

        Ok(CheckInReceipt { id, record })
    }

    /// Get a reference to the codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

fn truncate_to_second(instant: NaiveDateTime) -> NaiveDateTime {
    instant - TimeDelta::nanoseconds(i64::from(instant.nanosecond()))
}
