//! The enrichment consumer: the pipeline's orchestrator.
//!
//! One consumer owns one bus subscription and processes events to completion,
//! one at a time: parse, gate, fetch, score, publish. Every per-event failure
//! is terminal for that event only; the loop itself runs until the
//! subscription closes or a shutdown signal fires.
//!
//! Multiple consumer instances may subscribe to the same channel for
//! throughput; each keeps its own dedup map and news cache, trading perfect
//! global deduplication for horizontal scalability.

mod gate;

pub use gate::AdmissionGate;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    bus::{BusSubscription, EventBus},
    config::Config,
    core::{MarketEvent, NewsAlert, PulseError},
    news::{NewsArticle, NewsClient},
    sentiment::{self, SentimentLabel, SentimentResult},
};

/// Channel the upstream scanner publishes raw movement events on.
pub const EVENTS_CHANNEL: &str = "market_events";
/// Channel enriched alerts are published on.
pub const ALERTS_CHANNEL: &str = "news_alerts";

/// Hard cap on the templated alert summary.
const SUMMARY_MAX_CHARS: usize = 400;
/// Headlines carried on an alert, in fetch order.
const ALERT_HEADLINES: usize = 3;
/// Keywords named in the alert summary.
const SUMMARY_KEYWORDS: usize = 3;

#[derive(Debug, Default)]
struct StatsInner {
    processed_events: AtomicU64,
    published_alerts: AtomicU64,
    dedup_entries: AtomicUsize,
    last_processed: std::sync::Mutex<Option<DateTime<Utc>>>,
}

/// Snapshot of the consumer's counters, for external polling.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ConsumerStats {
    /// Events that reached the end of the pipeline (fetch and score
    /// completed), regardless of the publish outcome.
    pub processed_events: u64,
    /// Alerts handed to the bus, including zero-subscriber deliveries.
    pub published_alerts: u64,
    /// Symbols currently tracked in the dedup map.
    pub dedup_entries: usize,
    /// RFC 3339 instant of the most recent processed event.
    pub last_processed: Option<String>,
}

/// Cloneable handle for polling [`ConsumerStats`] while the consumer runs.
#[derive(Debug, Clone)]
pub struct ConsumerStatsHandle {
    inner: Arc<StatsInner>,
}

impl ConsumerStatsHandle {
    pub fn snapshot(&self) -> ConsumerStats {
        let last = self
            .inner
            .last_processed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .map(|ts| ts.to_rfc3339());
        ConsumerStats {
            processed_events: self.inner.processed_events.load(Ordering::Relaxed),
            published_alerts: self.inner.published_alerts.load(Ordering::Relaxed),
            dedup_entries: self.inner.dedup_entries.load(Ordering::Relaxed),
            last_processed: last,
        }
    }
}

/// Consumes market events, enriches qualifying ones, and publishes alerts.
pub struct NewsConsumer<B: EventBus> {
    bus: B,
    client: NewsClient,
    gate: AdmissionGate,
    lookback_days: i64,
    stats: Arc<StatsInner>,
}

impl<B: EventBus> NewsConsumer<B> {
    pub fn new(bus: B, client: NewsClient, cfg: &Config) -> Self {
        Self {
            bus,
            client,
            gate: AdmissionGate::new(cfg),
            lookback_days: cfg.lookback_days,
            stats: Arc::new(StatsInner::default()),
        }
    }

    /// Handle for polling stats from another task while the consumer runs.
    pub fn stats_handle(&self) -> ConsumerStatsHandle {
        ConsumerStatsHandle {
            inner: Arc::clone(&self.stats),
        }
    }

    /// Current stats snapshot.
    pub fn stats(&self) -> ConsumerStats {
        self.stats_handle().snapshot()
    }

    /// Subscribe to [`EVENTS_CHANNEL`] and process events until the
    /// subscription closes.
    ///
    /// # Errors
    ///
    /// Returns an error only if the initial subscription fails; per-event
    /// failures are logged and never terminate the loop.
    pub async fn run(&mut self) -> Result<(), PulseError> {
        let mut sub = self.bus.subscribe(EVENTS_CHANNEL).await?;
        info!(channel = EVENTS_CHANNEL, "listening for market events");
        while let Some(payload) = sub.recv().await {
            self.handle_payload(&payload).await;
        }
        info!("event subscription closed");
        Ok(())
    }

    /// Like [`Self::run`], but also stops promptly when `shutdown` flips to
    /// `true` or its sender is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error only if the initial subscription fails.
    pub async fn run_until(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), PulseError> {
        let mut sub = self.bus.subscribe(EVENTS_CHANNEL).await?;
        info!(channel = EVENTS_CHANNEL, "listening for market events");
        loop {
            tokio::select! {
                payload = sub.recv() => match payload {
                    Some(p) => self.handle_payload(&p).await,
                    None => {
                        info!("event subscription closed");
                        break;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("shutdown requested, stopping consumer");
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Process one raw bus payload. Malformed payloads are dropped.
    pub async fn handle_payload(&mut self, payload: &str) {
        match MarketEvent::from_payload(payload) {
            Ok(event) => self.process_event(&event).await,
            Err(e) => warn!(error = %e, "dropping malformed market event"),
        }
    }

    /// Run one event through the gate/fetch/score/publish pipeline.
    pub async fn process_event(&mut self, event: &MarketEvent) {
        let started = Instant::now();
        info!(
            symbol = %event.symbol,
            change = event.change_percent,
            "processing market event"
        );

        if !self.gate.should_process(event, started) {
            return;
        }

        let articles = self
            .client
            .company_news(&event.symbol, self.lookback_days)
            .await;
        if articles.is_empty() {
            info!(symbol = %event.symbol, "no news found");
            return;
        }

        let sentiment = sentiment::analyze_batch(&articles);
        let alert = build_alert(event, &articles, &sentiment);

        match serde_json::to_string(&alert) {
            Ok(payload) => match self.bus.publish(ALERTS_CHANNEL, &payload).await {
                Ok(subscribers) => {
                    if subscribers == 0 {
                        debug!(symbol = %event.symbol, "alert published to zero subscribers");
                    }
                    self.stats.published_alerts.fetch_add(1, Ordering::Relaxed);
                    self.gate.record(&event.symbol, started);
                    self.stats
                        .dedup_entries
                        .store(self.gate.len(), Ordering::Relaxed);
                    info!(
                        symbol = %event.symbol,
                        sentiment = sentiment.score,
                        articles = sentiment.article_count,
                        "published news alert"
                    );
                }
                Err(e) => error!(symbol = %event.symbol, error = %e, "failed to publish alert"),
            },
            Err(e) => error!(symbol = %event.symbol, error = %e, "failed to serialize alert"),
        }

        // "Processed" means the event reached the end of the pipeline, even
        // when the publish itself failed.
        self.stats.processed_events.fetch_add(1, Ordering::Relaxed);
        *self
            .stats
            .last_processed
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(Utc::now());

        let elapsed_ms = started.elapsed().as_millis();
        debug!(symbol = %event.symbol, %elapsed_ms, "event processed");
    }
}

fn build_alert(
    event: &MarketEvent,
    articles: &[NewsArticle],
    sentiment: &SentimentResult,
) -> NewsAlert {
    NewsAlert {
        symbol: event.symbol.clone(),
        price: event.price,
        change_percent: event.change_percent,
        news_sentiment: sentiment.score,
        news_count: sentiment.article_count,
        news_summary: build_summary(sentiment),
        top_headlines: articles
            .iter()
            .take(ALERT_HEADLINES)
            .map(|a| a.headline.clone())
            .collect(),
        timestamp: Utc::now(),
    }
}

/// Templated one-line summary, capped at 400 characters.
fn build_summary(sentiment: &SentimentResult) -> String {
    let mut summary = match sentiment.label {
        SentimentLabel::Positive => {
            format!("📈 {} positive news articles", sentiment.article_count)
        }
        SentimentLabel::Negative => {
            format!("📉 {} negative news articles", sentiment.article_count)
        }
        SentimentLabel::Neutral => {
            format!("📊 {} neutral news articles", sentiment.article_count)
        }
    };

    if !sentiment.top_keywords.is_empty() {
        let topics: Vec<&str> = sentiment
            .top_keywords
            .iter()
            .take(SUMMARY_KEYWORDS)
            .map(String::as_str)
            .collect();
        summary.push_str(&format!(". Key topics: {}", topics.join(", ")));
    }

    if summary.chars().count() > SUMMARY_MAX_CHARS {
        summary = summary.chars().take(SUMMARY_MAX_CHARS).collect();
    }
    summary
}
