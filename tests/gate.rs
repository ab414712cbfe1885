use std::time::{Duration, Instant};

use chrono::Utc;
use newspulse::consumer::AdmissionGate;
use newspulse::{Config, MarketEvent};

fn event(symbol: &str, change_percent: f64, volume: u64) -> MarketEvent {
    MarketEvent {
        symbol: symbol.to_string(),
        price: 150.0,
        change_percent,
        volume,
        timestamp: Utc::now(),
    }
}

fn config() -> Config {
    Config::default()
        .min_change_percent(3.0)
        .min_volume_threshold(50_000)
        .dedup_window(Duration::from_secs(1800))
}

#[test]
fn change_below_threshold_rejects_regardless_of_volume() {
    let gate = AdmissionGate::new(&config());
    let now = Instant::now();
    assert!(!gate.should_process(&event("AAPL", 2.0, u64::MAX), now));
    assert!(!gate.should_process(&event("AAPL", -2.9, 1_000_000), now));
}

#[test]
fn negative_change_is_compared_by_magnitude() {
    let gate = AdmissionGate::new(&config());
    let now = Instant::now();
    assert!(gate.should_process(&event("AAPL", -5.0, 100_000), now));
}

#[test]
fn volume_below_threshold_rejects() {
    let gate = AdmissionGate::new(&config());
    let now = Instant::now();
    assert!(!gate.should_process(&event("AAPL", 8.0, 10), now));
    assert!(gate.should_process(&event("AAPL", 8.0, 50_000), now));
}

#[test]
fn dedup_window_suppresses_then_readmits() {
    let mut gate = AdmissionGate::new(&config());
    let t0 = Instant::now();
    let ev = event("AAPL", 8.0, 500_000);

    assert!(gate.should_process(&ev, t0));
    gate.record("AAPL", t0);

    // Within the window: suppressed.
    assert!(!gate.should_process(&ev, t0 + Duration::from_secs(60)));
    assert!(!gate.should_process(&ev, t0 + Duration::from_secs(1799)));

    // After the window elapses: admitted again.
    assert!(gate.should_process(&ev, t0 + Duration::from_secs(1801)));
}

#[test]
fn dedup_is_per_symbol() {
    let mut gate = AdmissionGate::new(&config());
    let t0 = Instant::now();
    gate.record("AAPL", t0);
    assert!(!gate.should_process(&event("AAPL", 8.0, 500_000), t0));
    assert!(gate.should_process(&event("TSLA", 8.0, 500_000), t0));
}

#[test]
fn record_purges_entries_older_than_window() {
    let mut gate = AdmissionGate::new(&config());
    let t0 = Instant::now();

    gate.record("AAPL", t0);
    gate.record("TSLA", t0 + Duration::from_secs(10));
    assert_eq!(gate.len(), 2);

    // Recording past the window drops both stale entries.
    gate.record("NVDA", t0 + Duration::from_secs(4000));
    assert_eq!(gate.len(), 1);
    assert!(!gate.is_empty());
}
