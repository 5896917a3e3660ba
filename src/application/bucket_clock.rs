//! Wall clock projected onto rotation windows.
//!
//! `BucketClock` pairs a `Clock` with a fixed reference offset and a window
//! size. Every reading goes through the same offset, so two codecs built from
//! the same configuration always agree on the current window.

use crate::application::ports::Clock;
use crate::domain::window::{Window, WindowPosition, WindowSize};
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;

/// Reference offset used when none is configured: UTC-05:00, no DST.
pub const DEFAULT_OFFSET: FixedOffset = match FixedOffset::west_opt(5 * 3600) {
    Some(offset) => offset,
    None => panic!("UTC-05:00 is a valid offset"),
};

/// Derives rotation windows from the wall clock.
#[derive(Debug, Clone)]
pub struct BucketClock {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    size: WindowSize,
}

impl BucketClock {
    /// Create a bucket clock.
    ///
    /// # Arguments
    /// * `clock` - Wall-clock source
    /// * `offset` - Reference offset every window is computed in
    /// * `size` - Window length
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset, size: WindowSize) -> Self {
        Self {
            clock,
            offset,
            size,
        }
    }

    /// Current instant in the reference offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.offset)
    }

    /// Sample the clock once and locate the instant within its window.
    pub fn position(&self) -> WindowPosition {
        WindowPosition::at(self.now(), self.size)
    }

    /// The window containing the current instant.
    pub fn current_window(&self) -> Window {
        Window::containing(self.now(), self.size)
    }

    /// The window one step before `window`. No clock read.
    pub fn previous_window(&self, window: &Window) -> Window {
        window.previous()
    }

    /// Whole seconds elapsed in the current window, in `[0, size)`.
    pub fn seconds_into_window(&self) -> u32 {
        self.position().seconds_into
    }

    /// Milliseconds until the next window boundary, in `[0, size * 1000]`.
    pub fn millis_until_next_window(&self) -> u64 {
        self.position().millis_until_next()
    }

    /// Reference offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Window length.
    pub fn window_size(&self) -> WindowSize {
        self.size
    }
}
