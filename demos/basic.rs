//! Basic example: issue a token and validate it around a rollover.
//!
//! Uses a mock clock so the grace period can be observed without waiting.
//!
//! Run with: `cargo run --example basic`

use chrono::{TimeDelta, TimeZone, Utc};
use std::sync::Arc;
use timeclock_token::infrastructure::mocks::MockClock;
use timeclock_token::{CodecConfig, TokenCodec};
use tracing_subscriber::prelude::*;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new("timeclock_token=debug"))
        .init();

    let config = CodecConfig::builder()
        .with_secret("demo-secret")
        .build()
        .expect("valid config");

    // 12:00:08 at UTC-05:00
    let clock = MockClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 8).unwrap());
    let codec = TokenCodec::new(config, Arc::new(clock.clone()));

    println!("=== Rotating Token Example ===\n");
    println!(
        "Window: {}s, grace: {:?}s, offset: {}\n",
        codec.window_size().as_secs(),
        codec.grace_seconds(),
        codec.utc_offset()
    );

    let token = codec.generate();
    println!("Issued {} for window {}", token, codec.current_window());

    for step in 0..6 {
        let snapshot = codec.debug_snapshot();
        println!(
            "{}  second {} of window {}  -> {:?}",
            snapshot.wall_time,
            snapshot.seconds_into_window,
            snapshot.window,
            codec.check(token.as_str())
        );
        if step < 5 {
            clock.advance(TimeDelta::seconds(1));
        }
    }

    println!("\nEmpty input: {:?}", codec.check(""));

    let metrics = codec.metrics().snapshot();
    println!("\n=== Metrics ===");
    println!("Tokens issued:    {}", metrics.tokens_issued);
    println!("Accepted:         {}", metrics.accepted());
    println!("Rejected:         {}", metrics.rejected());
    println!("Acceptance rate:  {:.0}%", metrics.acceptance_rate() * 100.0);
}
