//! Startup configuration, read once at process start.
//!
//! Every knob has a safe default matching the reference deployment; each can
//! be overridden from the environment via [`Config::from_env`] or through the
//! builder-style setters.

use std::env;
use std::time::Duration;

/// Admission thresholds, time windows, and connection settings for one
/// consumer instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string for the event-bus transport. The crate itself only
    /// ships an in-process bus; this is carried for embedders wiring a real
    /// transport at startup.
    pub bus_url: String,
    /// News provider API token. `None` means unauthenticated requests, which
    /// the provider rejects; useful only against mocks.
    pub api_key: Option<String>,
    /// Minimum absolute `change_percent` for an event to be enriched.
    pub min_change_percent: f64,
    /// Minimum trading volume for an event to be enriched.
    pub min_volume_threshold: u64,
    /// Per-symbol suppression window after a published alert.
    pub dedup_window: Duration,
    /// News result cache lifetime (one TTL bucket).
    pub cache_ttl: Duration,
    /// Minimum interval between any two outbound provider calls.
    pub min_call_interval: Duration,
    /// Per-request timeout on provider calls.
    pub request_timeout: Duration,
    /// How far back to look for company news when enriching an event.
    pub lookback_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus_url: "redis://localhost:6379".to_string(),
            api_key: None,
            min_change_percent: 3.0,
            min_volume_threshold: 50_000,
            dedup_window: Duration::from_secs(1800),
            cache_ttl: Duration::from_secs(300),
            min_call_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            lookback_days: 1,
        }
    }
}

impl Config {
    /// Build a config from the environment, falling back to defaults for any
    /// unset or unparseable variable.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(url) = env::var("BUS_URL") {
            cfg.bus_url = url;
        }
        if let Ok(key) = env::var("FINNHUB_API_KEY")
            && !key.is_empty()
        {
            cfg.api_key = Some(key);
        }
        if let Some(v) = env_parse::<f64>("MIN_CHANGE_PERCENT") {
            cfg.min_change_percent = v;
        }
        if let Some(v) = env_parse::<u64>("MIN_VOLUME_THRESHOLD") {
            cfg.min_volume_threshold = v;
        }
        if let Some(v) = env_parse::<u64>("DEDUP_WINDOW_SECS") {
            cfg.dedup_window = Duration::from_secs(v);
        }
        if let Some(v) = env_parse::<u64>("NEWS_CACHE_TTL_SECS") {
            cfg.cache_ttl = Duration::from_secs(v);
        }
        if let Some(v) = env_parse::<u64>("NEWS_MIN_CALL_INTERVAL_MS") {
            cfg.min_call_interval = Duration::from_millis(v);
        }
        if let Some(v) = env_parse::<u64>("NEWS_REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout = Duration::from_secs(v);
        }
        if let Some(v) = env_parse::<i64>("NEWS_LOOKBACK_DAYS") {
            cfg.lookback_days = v;
        }
        cfg
    }

    /// Override the provider API token.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the minimum absolute change percentage.
    #[must_use]
    pub const fn min_change_percent(mut self, pct: f64) -> Self {
        self.min_change_percent = pct;
        self
    }

    /// Override the minimum volume threshold.
    #[must_use]
    pub const fn min_volume_threshold(mut self, volume: u64) -> Self {
        self.min_volume_threshold = volume;
        self
    }

    /// Override the per-symbol dedup window.
    #[must_use]
    pub const fn dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    /// Override the news cache TTL.
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Override the minimum interval between provider calls.
    #[must_use]
    pub const fn min_call_interval(mut self, interval: Duration) -> Self {
        self.min_call_interval = interval;
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
