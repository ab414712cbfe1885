use std::env;
use std::time::Duration;

use newspulse::Config;

// Environment mutation is process-global, so defaults and overrides are
// checked in one test to keep it race-free.
#[test]
fn env_overrides_fall_back_to_defaults() {
    let cfg = Config::from_env();
    assert_eq!(cfg.min_change_percent, 3.0);
    assert_eq!(cfg.min_volume_threshold, 50_000);
    assert_eq!(cfg.dedup_window, Duration::from_secs(1800));
    assert_eq!(cfg.cache_ttl, Duration::from_secs(300));
    assert_eq!(cfg.min_call_interval, Duration::from_secs(1));
    assert_eq!(cfg.request_timeout, Duration::from_secs(10));
    assert_eq!(cfg.lookback_days, 1);
    assert_eq!(cfg.api_key, None);

    unsafe {
        env::set_var("FINNHUB_API_KEY", "test-key");
        env::set_var("MIN_CHANGE_PERCENT", "5.5");
        env::set_var("MIN_VOLUME_THRESHOLD", "100000");
        env::set_var("DEDUP_WINDOW_SECS", "600");
        env::set_var("NEWS_CACHE_TTL_SECS", "60");
        env::set_var("NEWS_MIN_CALL_INTERVAL_MS", "250");
    }

    let cfg = Config::from_env();
    assert_eq!(cfg.api_key.as_deref(), Some("test-key"));
    assert_eq!(cfg.min_change_percent, 5.5);
    assert_eq!(cfg.min_volume_threshold, 100_000);
    assert_eq!(cfg.dedup_window, Duration::from_secs(600));
    assert_eq!(cfg.cache_ttl, Duration::from_secs(60));
    assert_eq!(cfg.min_call_interval, Duration::from_millis(250));

    unsafe {
        env::set_var("MIN_CHANGE_PERCENT", "not a number");
    }
    // Unparseable values fall back to the default rather than erroring.
    assert_eq!(Config::from_env().min_change_percent, 3.0);
}

#[test]
fn builder_setters_override_defaults() {
    let cfg = Config::default()
        .api_key("k")
        .min_change_percent(1.0)
        .min_volume_threshold(10)
        .dedup_window(Duration::from_secs(5))
        .cache_ttl(Duration::from_secs(5))
        .min_call_interval(Duration::from_millis(10));
    assert_eq!(cfg.api_key.as_deref(), Some("k"));
    assert_eq!(cfg.min_change_percent, 1.0);
    assert_eq!(cfg.min_volume_threshold, 10);
    assert_eq!(cfg.dedup_window, Duration::from_secs(5));
}
