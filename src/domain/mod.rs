//! Domain layer - pure types with no clock access.
//!
//! This layer contains the core concepts of the rotation scheme:
//! - Rotation windows and positions within them
//! - Token derivation from a window and the shared secret
//! - Validation verdicts
//! - Attendance entries produced by accepted scans
//!
//! Everything here is a pure function of its inputs.

pub mod attendance;
pub mod token;
pub mod verdict;
pub mod window;
