//! Read-only views of the codec for timing and debug endpoints.
//!
//! These are derived from a single clock sample plus the token derivation.
//! They are for observability only; callers must not base decisions on them.

use crate::domain::token::Token;
use serde::Serialize;

/// Pattern for the wall time reported in a debug snapshot.
pub const WALL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Where the codec stands at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugSnapshot {
    /// Wall time in the reference offset, microsecond precision
    pub wall_time: String,
    /// Canonical string of the current window
    pub window: String,
    /// Seconds field of the window start
    pub window_start_second: u32,
    /// Whole seconds elapsed in the window
    pub seconds_into_window: u32,
    /// Whole seconds left in the window, counting the current one
    pub seconds_remaining: u32,
    /// Token of the current window
    pub current_token: Token,
    /// Token of the previous window
    pub previous_token: Token,
    /// Whether the previous token would be accepted right now
    pub grace_active: bool,
}

/// When a QR renderer should fetch its next token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshTiming {
    /// Milliseconds until the token rotates
    pub millis_until_refresh: u64,
    /// Server time in the reference offset, RFC 3339
    pub server_time: String,
}
