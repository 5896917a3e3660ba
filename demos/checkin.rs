//! Check-in example: kiosk renders, employees scan, the day is listed.
//!
//! Reads `TIMECLOCK_*` from the environment and falls back to a demo secret
//! when none is set.
//!
//! Run with: `TIMECLOCK_SECRET=s3cret cargo run --example checkin`

use chrono::{TimeDelta, TimeZone, Utc};
use std::sync::Arc;
use timeclock_token::infrastructure::mocks::MockClock;
use timeclock_token::{
    CheckInService, CodecConfig, ConfigError, MemoryAttendanceStore, RecordQuery, TokenCodec,
};
use tracing_subscriber::prelude::*;

fn load_config() -> CodecConfig {
    match CodecConfig::from_env() {
        Ok(config) => config,
        Err(ConfigError::MissingRequired { key, .. }) => {
            println!("{} not set, using a demo secret\n", key);
            CodecConfig::builder()
                .with_secret("demo-secret")
                .build()
                .expect("valid config")
        }
        Err(e) => panic!("invalid configuration: {}", e),
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config();

    // 07:59:55 at the configured offset, on a Monday
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 7, 59, 55).unwrap() - TimeDelta::seconds(
        i64::from(config.utc_offset().local_minus_utc()),
    );
    let clock = MockClock::new(start);

    // The kiosk and the scan endpoint are separate codecs over one config
    let kiosk = TokenCodec::new(config.clone(), Arc::new(clock.clone()));
    let scanner = TokenCodec::new(config, Arc::new(clock.clone()));
    let service = CheckInService::new(scanner, Arc::new(MemoryAttendanceStore::new()));

    println!("=== Check-in Example ===\n");

    let scans = [
        ("0911111111", 0, 1),
        ("0922222222", 0, 5),  // scanned just after the rollover
        ("0933333333", 5, 31), // stale code, long after render
        ("", 0, 0),
    ];

    for (cedula, render_after, scan_delay) in scans {
        clock.advance(TimeDelta::seconds(render_after));
        let token = kiosk.generate();
        clock.advance(TimeDelta::seconds(scan_delay));

        match service.register(cedula, token.as_str()) {
            Ok(receipt) => println!(
                "#{} {} at {}",
                receipt.id,
                receipt.record.cedula,
                receipt.record.recorded_at_display()
            ),
            Err(e) => println!("refused {:?}: {}", cedula, e),
        }
    }

    let today = kiosk.now().date_naive();
    println!("\n=== Records for {} ===", today);
    for (id, record) in service.store().query(&RecordQuery::for_day(today)) {
        println!("#{} {} {}", id, record.cedula, record.recorded_at_display());
    }
}
