use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::PulseError;

/* ----- INBOUND (published by the upstream movement scanner) ----- */

/// A raw price-movement event consumed from the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Stock ticker symbol (short, uppercase).
    pub symbol: String,
    /// Current price at the time of the movement.
    pub price: f64,
    /// Signed percentage change that triggered the event.
    pub change_percent: f64,
    /// Trading volume at the time of the movement.
    pub volume: u64,
    /// When the movement was observed.
    pub timestamp: DateTime<Utc>,
}

impl MarketEvent {
    /// Parse and validate a bus payload.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Json`] if the payload is not valid JSON for this
    /// shape, or [`PulseError::Data`] if a field fails validation (empty or
    /// overlong symbol, non-positive price).
    pub fn from_payload(payload: &str) -> Result<Self, PulseError> {
        let event: Self = serde_json::from_str(payload)?;
        if event.symbol.is_empty() || event.symbol.len() > 10 {
            return Err(PulseError::Data(format!(
                "invalid symbol {:?}",
                event.symbol
            )));
        }
        if event.price <= 0.0 || !event.price.is_finite() {
            return Err(PulseError::Data(format!(
                "non-positive price {} for {}",
                event.price, event.symbol
            )));
        }
        Ok(event)
    }
}

/* ----- OUTBOUND (published by the enrichment consumer) ----- */

/// An enriched alert combining a market movement with news sentiment.
///
/// Constructed once per qualifying event and published exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsAlert {
    pub symbol: String,
    pub price: f64,
    pub change_percent: f64,
    /// Aggregate sentiment score in `[-1, 1]`.
    pub news_sentiment: f64,
    /// Number of articles the sentiment was computed over.
    pub news_count: usize,
    /// Templated one-line summary, at most 400 characters.
    pub news_summary: String,
    /// Up to 3 headlines, in fetch order.
    pub top_headlines: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
