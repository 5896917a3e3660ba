//! Application layer - orchestration of domain logic.
//!
//! This layer turns the pure window and token rules into the operations
//! callers use:
//! - Bucket clock (wall clock to window position)
//! - Token codec (generate, validate, timing views)
//! - Check-in service (scan submission)
//! - Rotation ticker (rollover-driven publishing, `async` feature)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod bucket_clock;
pub mod checkin;
pub mod codec;
pub mod metrics;
pub mod ports;
pub mod snapshot;

#[cfg(feature = "async")]
pub mod rotation;
