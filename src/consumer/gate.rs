use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{config::Config, core::MarketEvent};

/// Stateful admission control deciding whether an event is worth enriching.
///
/// An event is admitted when its absolute change and volume clear the
/// configured thresholds and its symbol has not been alerted on within the
/// dedup window. Rejections are silent and are the expected steady-state
/// outcome for most inputs.
///
/// Both checks and recording take the current instant as an argument, so the
/// gate is pure given its map and a clock.
#[derive(Debug)]
pub struct AdmissionGate {
    min_change_percent: f64,
    min_volume_threshold: u64,
    dedup_window: Duration,
    recently_processed: HashMap<String, Instant>,
}

impl AdmissionGate {
    pub fn new(cfg: &Config) -> Self {
        Self {
            min_change_percent: cfg.min_change_percent,
            min_volume_threshold: cfg.min_volume_threshold,
            dedup_window: cfg.dedup_window,
            recently_processed: HashMap::new(),
        }
    }

    /// Whether `event` should be enriched, given the clock reading `now`.
    pub fn should_process(&self, event: &MarketEvent, now: Instant) -> bool {
        if event.change_percent.abs() < self.min_change_percent {
            debug!(
                symbol = %event.symbol,
                change = event.change_percent,
                "skipping event: change below threshold"
            );
            return false;
        }
        if event.volume < self.min_volume_threshold {
            debug!(
                symbol = %event.symbol,
                volume = event.volume,
                "skipping event: volume below threshold"
            );
            return false;
        }
        if let Some(last) = self.recently_processed.get(&event.symbol)
            && now.saturating_duration_since(*last) < self.dedup_window
        {
            debug!(symbol = %event.symbol, "skipping event: recently processed");
            return false;
        }
        true
    }

    /// Record a published alert for `symbol` at `now`.
    ///
    /// Entries older than the dedup window are purged first, which bounds the
    /// map to roughly the distinct symbols seen in one window.
    pub fn record(&mut self, symbol: &str, now: Instant) {
        let window = self.dedup_window;
        self.recently_processed
            .retain(|_, last| now.saturating_duration_since(*last) <= window);
        self.recently_processed.insert(symbol.to_string(), now);
    }

    /// Number of symbols currently tracked in the dedup map.
    pub fn len(&self) -> usize {
        self.recently_processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recently_processed.is_empty()
    }
}
