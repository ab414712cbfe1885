//! newspulse: news-sentiment enrichment for market-movement events.
//!
//! The crate receives [`MarketEvent`]s from an [`EventBus`] subscription,
//! filters them through an admission gate (movement/volume thresholds plus a
//! 30-minute per-symbol dedup window), fetches recent company news under a
//! shared rate limit, scores the articles against a fixed financial-sentiment
//! lexicon, and publishes one [`NewsAlert`] per qualifying event.
//!
//! The transport behind the bus and any HTTP observability surface are out of
//! scope; embedders wire a bus implementation (an in-process [`MemoryBus`]
//! is provided) and poll [`ConsumerStats`] / [`FetcherStats`] for metrics.

pub mod bus;
pub mod config;
pub mod consumer;
pub mod core;
pub mod news;
pub mod sentiment;

pub use bus::{EventBus, MemoryBus};
pub use config::Config;
pub use consumer::{ConsumerStats, NewsConsumer};
pub use core::{MarketEvent, NewsAlert, PulseError};
pub use news::{FetcherStats, NewsArticle, NewsClient, NewsClientBuilder};
pub use sentiment::{SentimentLabel, SentimentResult, analyze_batch, score};
