//! Rotation windows.
//!
//! A window is a wall-clock instant truncated down to a fixed-size boundary
//! inside the minute. Every instant maps to exactly one window, and two
//! instants inside the same aligned span always map to the same window.

use chrono::{DateTime, FixedOffset, TimeDelta, Timelike};
use std::fmt;

/// Pattern used to render a window start. Second precision, no offset.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default rotation period in seconds.
pub const DEFAULT_WINDOW_SECONDS: u32 = 10;

/// Error returned when a window size is not usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSizeError {
    /// Window size must be greater than zero
    Zero,
    /// Window size must split the minute into equal windows
    NotDivisorOfMinute(u32),
}

impl fmt::Display for WindowSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSizeError::Zero => write!(f, "window size must be greater than 0"),
            WindowSizeError::NotDivisorOfMinute(secs) => {
                write!(f, "window size of {}s does not divide 60 evenly", secs)
            }
        }
    }
}

impl std::error::Error for WindowSizeError {}

/// Length of a rotation window in whole seconds.
///
/// Truncation operates on the seconds field of the wall clock, so the size
/// must divide 60. Otherwise the last window of each minute would be short
/// and the previous window would not start on a boundary.
///
/// # Example
/// ```
/// use timeclock_token::WindowSize;
///
/// assert_eq!(WindowSize::new(10).unwrap().as_secs(), 10);
/// assert!(WindowSize::new(0).is_err());
/// assert!(WindowSize::new(7).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowSize(u32);

impl WindowSize {
    /// Create a window size.
    ///
    /// # Errors
    /// Returns `WindowSizeError` if `secs` is zero or does not divide 60.
    pub fn new(secs: u32) -> Result<Self, WindowSizeError> {
        if secs == 0 {
            return Err(WindowSizeError::Zero);
        }
        if 60 % secs != 0 {
            return Err(WindowSizeError::NotDivisorOfMinute(secs));
        }
        Ok(Self(secs))
    }

    /// Window length in seconds.
    pub fn as_secs(&self) -> u32 {
        self.0
    }

    /// Window length in milliseconds.
    pub fn as_millis(&self) -> u64 {
        u64::from(self.0) * 1_000
    }

    fn as_delta(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.0))
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self(DEFAULT_WINDOW_SECONDS)
    }
}

/// A rotation window: the aligned start instant and the window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    start: DateTime<FixedOffset>,
    size: WindowSize,
}

impl Window {
    /// The window containing `instant`.
    ///
    /// The seconds field is floored to a multiple of the window size and all
    /// sub-second precision is dropped, so second 19 lands on 10, never 20.
    pub fn containing(instant: DateTime<FixedOffset>, size: WindowSize) -> Self {
        let offset = instant.second() % size.as_secs();
        let start = instant
            - TimeDelta::seconds(i64::from(offset))
            - TimeDelta::nanoseconds(i64::from(instant.nanosecond()));
        Self { start, size }
    }

    /// The window immediately before this one. Pure, no clock read.
    pub fn previous(&self) -> Self {
        Self {
            start: self.start - self.size.as_delta(),
            size: self.size,
        }
    }

    /// The window immediately after this one.
    pub fn next(&self) -> Self {
        Self {
            start: self.start + self.size.as_delta(),
            size: self.size,
        }
    }

    /// Start of the window in the reference offset.
    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    /// Length of the window.
    pub fn size(&self) -> WindowSize {
        self.size
    }

    /// Seconds field of the window start (0, 10, 20, ... for 10s windows).
    pub fn start_second(&self) -> u32 {
        self.start.second()
    }

    /// Whether `instant` falls inside this window.
    pub fn contains(&self, instant: DateTime<FixedOffset>) -> bool {
        instant >= self.start && instant < self.start + self.size.as_delta()
    }

    /// Canonical string fed to the token digest.
    ///
    /// Byte-identical for every instant inside the window.
    pub fn canonical(&self) -> String {
        self.start.format(CANONICAL_FORMAT).to_string()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start.format(CANONICAL_FORMAT))
    }
}

/// Where a single clock sample sits relative to its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPosition {
    /// The sampled instant in the reference offset
    pub instant: DateTime<FixedOffset>,
    /// The window containing the instant
    pub window: Window,
    /// Whole seconds elapsed since the window started, in `[0, size)`
    pub seconds_into: u32,
}

impl WindowPosition {
    /// Locate `instant` within its window.
    pub fn at(instant: DateTime<FixedOffset>, size: WindowSize) -> Self {
        Self {
            instant,
            window: Window::containing(instant, size),
            seconds_into: instant.second() % size.as_secs(),
        }
    }

    /// Whole seconds left before rollover, counting the current second.
    pub fn seconds_remaining(&self) -> u32 {
        self.window.size().as_secs() - self.seconds_into
    }

    /// Milliseconds until the next window boundary.
    ///
    /// Computed from whole seconds plus the microsecond fraction and floored,
    /// so an instant exactly on a boundary reports the full window.
    pub fn millis_until_next(&self) -> u64 {
        // chrono reports leap seconds as nanos >= 1e9
        let micros = u64::from(self.instant.nanosecond().min(999_999_999) / 1_000);
        let remaining_micros = u64::from(self.seconds_remaining()) * 1_000_000;
        remaining_micros.saturating_sub(micros) / 1_000
    }

    /// Whether the previous window's token is still acceptable at this
    /// position, for an inclusive grace threshold.
    pub fn within_grace(&self, grace_seconds: Option<u32>) -> bool {
        grace_seconds.is_some_and(|grace| self.seconds_into <= grace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn guayaquil() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn at(h: u32, m: u32, s: u32, millis: u32) -> DateTime<FixedOffset> {
        guayaquil()
            .with_ymd_and_hms(2024, 1, 1, h, m, s)
            .unwrap()
            + TimeDelta::milliseconds(i64::from(millis))
    }

    fn ten() -> WindowSize {
        WindowSize::new(10).unwrap()
    }

    #[test]
    fn test_window_size_validation() {
        assert_eq!(WindowSize::new(0), Err(WindowSizeError::Zero));
        assert_eq!(
            WindowSize::new(7),
            Err(WindowSizeError::NotDivisorOfMinute(7))
        );
        assert_eq!(
            WindowSize::new(120),
            Err(WindowSizeError::NotDivisorOfMinute(120))
        );
        for secs in [1, 2, 3, 4, 5, 6, 10, 12, 15, 20, 30, 60] {
            assert!(WindowSize::new(secs).is_ok(), "{} should be valid", secs);
        }
        assert_eq!(WindowSize::default().as_secs(), 10);
    }

    #[test]
    fn test_truncation_floors_seconds() {
        let window = Window::containing(at(12, 0, 19, 999), ten());
        assert_eq!(window.canonical(), "2024-01-01 12:00:10");
        assert_eq!(window.start_second(), 10);
    }

    #[test]
    fn test_same_span_same_window() {
        let a = Window::containing(at(12, 0, 0, 0), ten());
        let b = Window::containing(at(12, 0, 4, 250), ten());
        let c = Window::containing(at(12, 0, 9, 999), ten());

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.canonical(), c.canonical());
    }

    #[test]
    fn test_boundary_starts_new_window() {
        let before = Window::containing(at(12, 0, 9, 999), ten());
        let after = Window::containing(at(12, 0, 10, 0), ten());

        assert_ne!(before, after);
        assert_eq!(before.next(), after);
        assert_eq!(after.previous(), before);
    }

    #[test]
    fn test_previous_crosses_minute_and_day() {
        let window = Window::containing(at(0, 0, 3, 0), ten());
        assert_eq!(window.canonical(), "2024-01-01 00:00:00");
        assert_eq!(window.previous().canonical(), "2023-12-31 23:59:50");
    }

    #[test]
    fn test_windows_are_monotonic() {
        let size = WindowSize::new(5).unwrap();
        let mut last = Window::containing(at(12, 0, 0, 0), size);
        for step in 1..400 {
            let instant = at(12, 0, 0, 0) + TimeDelta::milliseconds(step * 173);
            let window = Window::containing(instant, size);
            assert!(window.start() >= last.start());
            assert!(window.contains(instant));
            last = window;
        }
    }

    #[test]
    fn test_canonical_has_no_offset_or_fraction() {
        let window = Window::containing(at(23, 59, 58, 123), ten());
        assert_eq!(window.canonical(), "2024-01-01 23:59:50");
        assert_eq!(window.to_string(), window.canonical());
    }

    #[test]
    fn test_position_fields() {
        let position = WindowPosition::at(at(12, 0, 17, 500), ten());
        assert_eq!(position.seconds_into, 7);
        assert_eq!(position.seconds_remaining(), 3);
        assert_eq!(position.millis_until_next(), 2_500);
        assert_eq!(position.window.start_second(), 10);
    }

    #[test]
    fn test_millis_until_next_at_boundary_is_full_window() {
        let position = WindowPosition::at(at(12, 0, 0, 0), ten());
        assert_eq!(position.millis_until_next(), 10_000);
    }

    #[test]
    fn test_millis_until_next_near_rollover() {
        let position = WindowPosition::at(at(12, 0, 9, 999), ten());
        assert_eq!(position.millis_until_next(), 1);

        let sub_milli = at(12, 0, 9, 999) + TimeDelta::microseconds(600);
        assert_eq!(WindowPosition::at(sub_milli, ten()).millis_until_next(), 0);
    }

    #[test]
    fn test_grace_threshold_is_inclusive() {
        assert!(WindowPosition::at(at(12, 0, 10, 0), ten()).within_grace(Some(2)));
        assert!(WindowPosition::at(at(12, 0, 12, 999), ten()).within_grace(Some(2)));
        assert!(!WindowPosition::at(at(12, 0, 13, 0), ten()).within_grace(Some(2)));
        assert!(!WindowPosition::at(at(12, 0, 10, 0), ten()).within_grace(None));
    }
}
