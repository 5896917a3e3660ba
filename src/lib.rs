//! # timeclock-token
//!
//! Rotating, time-windowed tokens for QR-based attendance check-in.
//!
//! A kiosk shows a QR code that changes every few seconds. Whoever scans it
//! submits the embedded token together with their identity, and the server
//! accepts the check-in only if the token belongs to the current rotation
//! window (or, for a moment right after a rollover, the previous one).
//!
//! The scheme is stateless. Both sides recompute the token from the wall
//! clock and a shared static secret:
//!
//! ```text
//! window = local wall time, seconds floored to a multiple of the window size
//! token  = hex(sha256("YYYY-MM-DD HH:MM:SS" ++ secret))
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use timeclock_token::{CodecConfig, TokenCodec};
//!
//! // 10 second windows, 2 second grace, UTC-05:00
//! let config = CodecConfig::from_env().expect("TIMECLOCK_SECRET must be set");
//! let codec = TokenCodec::with_system_clock(config);
//!
//! // Render path
//! let token = codec.generate();
//! println!("encode into QR: {}", token);
//!
//! // Scan path
//! assert!(codec.validate(token.as_str()));
//! ```
//!
//! ## Grace Period
//!
//! A code rendered in the last instant of one window is often scanned after
//! the clock has rolled into the next. During the first `grace_seconds`
//! (inclusive) of a window, the previous window's token is still accepted.
//! Grace only looks back one window, so at most two tokens are valid at any
//! instant:
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use timeclock_token::{AcceptPath, CodecConfig, RejectReason, TokenCodec, Verdict};
//! use timeclock_token::infrastructure::mocks::MockClock;
//!
//! let config = CodecConfig::builder().with_secret("s3cret").build().unwrap();
//! // 12:00:09.500 at UTC-05:00
//! let clock = MockClock::new(
//!     Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 9).unwrap() + TimeDelta::milliseconds(500),
//! );
//! let codec = TokenCodec::new(config, Arc::new(clock.clone()));
//! let token = codec.generate();
//!
//! clock.advance(TimeDelta::milliseconds(2_500)); // 12:00:12.000
//! assert_eq!(codec.check(token.as_str()), Verdict::Accept(AcceptPath::Grace));
//!
//! clock.advance(TimeDelta::seconds(1)); // 12:00:13.000
//! assert_eq!(
//!     codec.check(token.as_str()),
//!     Verdict::Reject(RejectReason::WindowMismatch)
//! );
//! ```
//!
//! ## Configuration
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `TIMECLOCK_SECRET` | required | Shared secret appended to the window string |
//! | `TIMECLOCK_WINDOW_SECONDS` | `10` | Window size, must divide 60 |
//! | `TIMECLOCK_GRACE_SECONDS` | `2` | Inclusive grace threshold, `off` disables |
//! | `TIMECLOCK_UTC_OFFSET` | `-05:00` | Fixed offset used for the wall time |
//!
//! The render path and the scan path must use the same configuration; a
//! different secret, window size or offset produces disjoint tokens.
//!
//! ## Check-in
//!
//! [`CheckInService`] wires the codec to an [`AttendanceStore`]: it requires
//! both an identity and a token, validates the token, and stores a record
//! stamped with the codec's clock. [`MemoryAttendanceStore`] is the bundled
//! in-memory store.
//!
//! ## Feature Flags
//!
//! - `async`: [`RotationTicker`], a tokio task publishing the token on every
//!   rollover.
//! - `test-helpers`: mock clock, failing store and a log-capturing layer.
//! - `dev-secret`: a built-in secret for local development only.
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber. The
//! secret is never logged, and tokens only ever appear as 8 character
//! prefixes.

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Configuration
pub mod config;

// Re-export commonly used types for convenience
pub use domain::{
    attendance::{AttendanceRecord, Cedula},
    token::{Secret, Token, TokenParseError},
    verdict::{AcceptPath, RejectReason, Verdict},
    window::{Window, WindowPosition, WindowSize, WindowSizeError},
};

pub use application::{
    bucket_clock::{BucketClock, DEFAULT_OFFSET},
    checkin::{CheckInError, CheckInReceipt, CheckInService},
    codec::{IssuedToken, TokenCodec},
    metrics::{Metrics, MetricsSnapshot},
    ports::{AttendanceStore, Clock, StoreError},
    snapshot::{DebugSnapshot, RefreshTiming},
};

#[cfg(feature = "async")]
pub use application::rotation::{RotationConfig, RotationHandle, RotationTicker, ShutdownError};

pub use config::{BuildError, CodecConfig, CodecConfigBuilder, ConfigError};

pub use infrastructure::{
    clock::SystemClock,
    storage::{MemoryAttendanceStore, RecordQuery},
};
