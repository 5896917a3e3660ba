//! Token generation and grace-tolerant validation.
//!
//! The codec is a pure function of the wall clock and the static secret. It
//! keeps no record of issued tokens: the render path and the scan path each
//! recompute the token for their own clock sample, so any number of threads
//! can call into it without coordination.

use crate::application::bucket_clock::BucketClock;
use crate::application::metrics::Metrics;
use crate::application::ports::Clock;
use crate::application::snapshot::{DebugSnapshot, RefreshTiming, WALL_TIME_FORMAT};
use crate::config::CodecConfig;
use crate::domain::token::{log_prefix, Secret, Token};
use crate::domain::verdict::{AcceptPath, RejectReason, Verdict};
use crate::domain::window::{Window, WindowPosition, WindowSize};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Window the token belongs to
    pub window: Window,
    /// Token of that window
    pub token: Token,
    /// Milliseconds until the window rolls over
    pub millis_until_next: u64,
}

/// Generates and validates rotating tokens.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use chrono::{TimeZone, Utc};
/// use timeclock_token::{CodecConfig, TokenCodec};
/// use timeclock_token::infrastructure::mocks::MockClock;
///
/// let config = CodecConfig::builder().with_secret("s3cret").build().unwrap();
/// let clock = MockClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 8).unwrap());
/// let codec = TokenCodec::new(config, Arc::new(clock.clone()));
///
/// let token = codec.generate();
/// assert!(codec.validate(token.as_str()));
///
/// // Rolled into the next window, still inside the grace period
/// clock.advance(chrono::TimeDelta::seconds(3));
/// assert!(codec.validate(token.as_str()));
///
/// // Grace is over
/// clock.advance(chrono::TimeDelta::seconds(2));
/// assert!(!codec.validate(token.as_str()));
/// ```
#[derive(Debug, Clone)]
pub struct TokenCodec {
    clock: BucketClock,
    secret: Secret,
    grace_seconds: Option<u32>,
    metrics: Metrics,
}

impl TokenCodec {
    /// Create a codec reading time from `clock`.
    ///
    /// The QR render path and the scan path must share the configuration and
    /// read the same clock.
    pub fn new(config: CodecConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock: BucketClock::new(clock, config.utc_offset(), config.window_size()),
            secret: config.secret().clone(),
            grace_seconds: config.grace_seconds(),
            metrics: Metrics::new(),
        }
    }

    /// Token for the current window.
    ///
    /// Idempotent within a window: every call inside the same window returns
    /// the identical digest.
    pub fn generate(&self) -> Token {
        self.issue().token
    }

    /// Token for the current window together with the window it belongs to
    /// and the time left before it rotates, all from one clock sample.
    pub fn issue(&self) -> IssuedToken {
        let position = self.clock.position();
        let token = self.token_for(&position.window);
        self.metrics.record_issued();
        debug!(
            window = %position.window,
            token = %token.short(),
            seconds_remaining = position.seconds_remaining(),
            "issued rotating token"
        );
        IssuedToken {
            millis_until_next: position.millis_until_next(),
            window: position.window,
            token,
        }
    }

    /// Token for an arbitrary window, using the same derivation as `generate`.
    pub fn token_for(&self, window: &Window) -> Token {
        Token::derive(window, &self.secret)
    }

    /// Whether `presented` is acceptable right now.
    pub fn validate(&self, presented: &str) -> bool {
        self.check(presented).is_accept()
    }

    /// Check `presented` and report which rule decided the outcome.
    ///
    /// 1. Blank input is rejected without hashing.
    /// 2. A match with the current window's token is accepted.
    /// 3. During the grace period only, a match with the previous window's
    ///    token is accepted.
    /// 4. Anything else is rejected.
    ///
    /// Grace only looks one window back, so at most two digests are valid at
    /// any instant.
    pub fn check(&self, presented: &str) -> Verdict {
        if presented.trim().is_empty() {
            let verdict = Verdict::Reject(RejectReason::EmptyToken);
            self.metrics.record_verdict(verdict);
            warn!("rejected empty token");
            return verdict;
        }

        let position = self.clock.position();
        let verdict = self.check_at(&position, presented);
        self.metrics.record_verdict(verdict);

        match verdict {
            Verdict::Accept(AcceptPath::Current) => {
                debug!(
                    window = %position.window,
                    seconds_into = position.seconds_into,
                    "accepted current-window token"
                );
            }
            Verdict::Accept(AcceptPath::Grace) => {
                info!(
                    window = %position.window,
                    seconds_into = position.seconds_into,
                    "accepted previous-window token during grace period"
                );
            }
            Verdict::Reject(_) => {
                warn!(
                    presented = %log_prefix(presented),
                    expected = %self.token_for(&position.window).short(),
                    window = %position.window,
                    seconds_into = position.seconds_into,
                    grace_active = position.within_grace(self.grace_seconds),
                    "rejected token outside the accepted windows"
                );
            }
        }

        verdict
    }

    fn check_at(&self, position: &WindowPosition, presented: &str) -> Verdict {
        if self.token_for(&position.window).matches(presented) {
            return Verdict::Accept(AcceptPath::Current);
        }

        if position.within_grace(self.grace_seconds)
            && self.token_for(&position.window.previous()).matches(presented)
        {
            return Verdict::Accept(AcceptPath::Grace);
        }

        Verdict::Reject(RejectReason::WindowMismatch)
    }

    /// The window containing the current instant.
    pub fn current_window(&self) -> Window {
        self.clock.current_window()
    }

    /// Whole seconds elapsed in the current window.
    pub fn seconds_into_window(&self) -> u32 {
        self.clock.seconds_into_window()
    }

    /// Milliseconds until the token rotates.
    pub fn millis_until_next_window(&self) -> u64 {
        self.clock.millis_until_next_window()
    }

    /// Current instant in the reference offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    /// Everything the codec would decide with, at one instant.
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        let position = self.clock.position();
        DebugSnapshot {
            wall_time: position.instant.format(WALL_TIME_FORMAT).to_string(),
            window: position.window.canonical(),
            window_start_second: position.window.start_second(),
            seconds_into_window: position.seconds_into,
            seconds_remaining: position.seconds_remaining(),
            current_token: self.token_for(&position.window),
            previous_token: self.token_for(&position.window.previous()),
            grace_active: position.within_grace(self.grace_seconds),
        }
    }

    /// Countdown for renderers that schedule their own refresh.
    pub fn refresh_timing(&self) -> RefreshTiming {
        let position = self.clock.position();
        RefreshTiming {
            millis_until_refresh: position.millis_until_next(),
            server_time: position
                .instant
                .to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }

    /// Window length.
    pub fn window_size(&self) -> WindowSize {
        self.clock.window_size()
    }

    /// Inclusive grace threshold, or `None` when disabled.
    pub fn grace_seconds(&self) -> Option<u32> {
        self.grace_seconds
    }

    /// Reference offset.
    pub fn utc_offset(&self) -> FixedOffset {
        self.clock.offset()
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::MockClock;
    use chrono::{TimeDelta, TimeZone, Utc};

    const WINDOW_1200: &str = "0a5bea31a5e5f6c0c581453e889c1cd356f73b455f77be13e135b62f2f25b257";

    /// Local time at UTC-05:00 on 2024-01-01.
    fn local(h: u32, m: u32, s: u32, millis: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h + 5, m, s).unwrap() + TimeDelta::milliseconds(millis)
    }

    fn codec_at(instant: DateTime<Utc>) -> (TokenCodec, MockClock) {
        let config = CodecConfig::builder()
            .with_secret("mmqep2024")
            .build()
            .unwrap();
        let clock = MockClock::new(instant);
        (TokenCodec::new(config, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_generate_known_vector() {
        let (codec, _) = codec_at(local(12, 0, 0, 0));
        assert_eq!(codec.generate().as_str(), WINDOW_1200);
    }

    #[test]
    fn test_generate_idempotent_within_window() {
        let (codec, clock) = codec_at(local(12, 0, 0, 0));
        let first = codec.generate();

        for _ in 0..9 {
            clock.advance(TimeDelta::milliseconds(999));
            assert_eq!(codec.generate(), first);
        }
    }

    #[test]
    fn test_generate_rotates_at_boundary() {
        let (codec, clock) = codec_at(local(12, 0, 9, 999));
        let before = codec.generate();
        clock.advance(TimeDelta::milliseconds(1));
        let after = codec.generate();

        assert_ne!(before, after);
        assert_eq!(codec.token_for(&codec.current_window().previous()), before);
    }

    #[test]
    fn test_issue_single_sample() {
        let (codec, _) = codec_at(local(12, 0, 7, 250));
        let issued = codec.issue();

        assert_eq!(issued.window.canonical(), "2024-01-01 12:00:00");
        assert_eq!(issued.token.as_str(), WINDOW_1200);
        assert_eq!(issued.millis_until_next, 2_750);
        assert_eq!(codec.metrics().tokens_issued(), 1);
    }

    #[test]
    fn test_validate_same_instant() {
        let (codec, _) = codec_at(local(12, 0, 4, 321));
        assert!(codec.validate(codec.generate().as_str()));
        assert_eq!(
            codec.check(codec.generate().as_str()),
            Verdict::Accept(AcceptPath::Current)
        );
    }

    #[test]
    fn test_grace_window_scenario() {
        let (codec, clock) = codec_at(local(12, 0, 9, 500));
        assert!(codec.validate(WINDOW_1200));

        clock.set(local(12, 0, 12, 0));
        assert_eq!(codec.check(WINDOW_1200), Verdict::Accept(AcceptPath::Grace));

        clock.set(local(12, 0, 12, 999));
        assert!(codec.validate(WINDOW_1200));

        clock.set(local(12, 0, 13, 0));
        assert_eq!(
            codec.check(WINDOW_1200),
            Verdict::Reject(RejectReason::WindowMismatch)
        );
    }

    #[test]
    fn test_grace_only_looks_back_one_window() {
        let (codec, clock) = codec_at(local(12, 0, 0, 0));
        let token = codec.generate();

        clock.set(local(12, 0, 20, 0));
        assert!(!codec.validate(token.as_str()));
    }

    #[test]
    fn test_future_token_is_rejected() {
        let (codec, clock) = codec_at(local(12, 0, 10, 0));
        let next = codec.generate();

        clock.set(local(12, 0, 9, 900));
        assert!(!codec.validate(next.as_str()));
    }

    #[test]
    fn test_grace_disabled() {
        let config = CodecConfig::builder()
            .with_secret("mmqep2024")
            .without_grace()
            .build()
            .unwrap();
        let clock = MockClock::new(local(12, 0, 10, 0));
        let codec = TokenCodec::new(config, Arc::new(clock));

        assert!(!codec.validate(WINDOW_1200));
    }

    #[test]
    fn test_empty_and_garbage_rejected() {
        let (codec, _) = codec_at(local(12, 0, 1, 0));

        assert_eq!(codec.check(""), Verdict::Reject(RejectReason::EmptyToken));
        assert_eq!(codec.check("  \n"), Verdict::Reject(RejectReason::EmptyToken));
        assert_eq!(
            codec.check("not-a-token"),
            Verdict::Reject(RejectReason::WindowMismatch)
        );
        assert!(!codec.validate("ñ☃\u{0}"));
        assert!(!codec.validate(&"f".repeat(64)));
    }

    #[test]
    fn test_metrics_follow_verdicts() {
        let (codec, clock) = codec_at(local(12, 0, 9, 0));
        let token = codec.generate();

        codec.validate(token.as_str());
        clock.advance(TimeDelta::seconds(2));
        codec.validate(token.as_str());
        codec.validate("");
        codec.validate("garbage");

        let snapshot = codec.metrics().snapshot();
        assert_eq!(snapshot.tokens_issued, 1);
        assert_eq!(snapshot.accepted_current, 1);
        assert_eq!(snapshot.accepted_grace, 1);
        assert_eq!(snapshot.rejected_empty, 1);
        assert_eq!(snapshot.rejected_mismatch, 1);
    }

    #[test]
    fn test_debug_snapshot() {
        let (codec, _) = codec_at(local(12, 0, 11, 250));
        let snapshot = codec.debug_snapshot();

        assert_eq!(snapshot.wall_time, "2024-01-01 12:00:11.250000");
        assert_eq!(snapshot.window, "2024-01-01 12:00:10");
        assert_eq!(snapshot.window_start_second, 10);
        assert_eq!(snapshot.seconds_into_window, 1);
        assert_eq!(snapshot.seconds_remaining, 9);
        assert_eq!(snapshot.previous_token.as_str(), WINDOW_1200);
        assert_eq!(snapshot.current_token, codec.generate());
        assert!(snapshot.grace_active);
    }

    #[test]
    fn test_refresh_timing() {
        let (codec, clock) = codec_at(local(12, 0, 7, 500));
        let timing = codec.refresh_timing();
        assert_eq!(timing.millis_until_refresh, 2_500);
        assert_eq!(timing.server_time, "2024-01-01T12:00:07.500000-05:00");

        clock.set(local(12, 0, 0, 0));
        assert_eq!(codec.millis_until_next_window(), 10_000);
    }

    #[test]
    fn test_codecs_sharing_config_agree() {
        let config = CodecConfig::builder().with_secret("shared").build().unwrap();
        let clock = MockClock::new(local(8, 30, 44, 10));
        let render = TokenCodec::new(config.clone(), Arc::new(clock.clone()));
        let scan = TokenCodec::new(config, Arc::new(clock));

        assert!(scan.validate(render.generate().as_str()));
    }

    #[test]
    fn test_offset_mismatch_breaks_validation() {
        let clock = MockClock::new(local(8, 30, 44, 10));
        let render = TokenCodec::new(
            CodecConfig::builder().with_secret("shared").build().unwrap(),
            Arc::new(clock.clone()),
        );
        let scan = TokenCodec::new(
            CodecConfig::builder()
                .with_secret("shared")
                .with_utc_offset(FixedOffset::east_opt(0).unwrap())
                .build()
                .unwrap(),
            Arc::new(clock),
        );

        assert!(!scan.validate(render.generate().as_str()));
    }
}
