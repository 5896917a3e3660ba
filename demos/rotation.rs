//! Rotation example: publish the token on every window rollover.
//!
//! Uses the system clock; stop with Ctrl-C or wait for three rotations.
//!
//! Run with: `cargo run --example rotation --features async`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use timeclock_token::{CodecConfig, RotationConfig, RotationTicker, TokenCodec};
use tokio::sync::Notify;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new("timeclock_token=debug"))
        .init();

    let config = CodecConfig::builder()
        .with_secret("demo-secret")
        .build()
        .expect("valid config");
    let codec = TokenCodec::with_system_clock(config);

    println!("=== Rotation Example ===\n");
    let timing = codec.refresh_timing();
    println!(
        "Server time {}, next rotation in {} ms\n",
        timing.server_time, timing.millis_until_refresh
    );

    let published = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(Notify::new());

    let handle = {
        let published = Arc::clone(&published);
        let done = Arc::clone(&done);
        RotationTicker::new(codec, RotationConfig::default()).start(move |window, token| {
            println!("[{}] render QR for {}", window, token);
            if published.fetch_add(1, Ordering::SeqCst) + 1 >= 4 {
                done.notify_one();
            }
        })
    };

    tokio::select! {
        _ = done.notified() => {}
        _ = tokio::signal::ctrl_c() => {}
    }

    handle.shutdown().await.expect("ticker shut down cleanly");
    println!(
        "\nPublished {} tokens",
        published.load(Ordering::SeqCst)
    );
}
