//! Clock adapters for time operations.
//!
//! Provides SystemClock implementation for production use.
//!
//! # Testing
//!
//! See `MockClock` (in `crate::infrastructure::mocks`) for a controllable test clock.
//! Available with the `test-helpers` feature or in test builds:
//!
//! ```toml
//! [dev-dependencies]
//! timeclock-token = { version = "*", features = ["test-helpers"] }
//! ```

use crate::application::codec::TokenCodec;
use crate::application::ports::Clock;
use crate::config::CodecConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// System clock implementation using `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl TokenCodec {
    /// Create a codec reading the system wall clock.
    pub fn with_system_clock(config: CodecConfig) -> Self {
        TokenCodec::new(config, Arc::new(SystemClock::new()))
    }
}
