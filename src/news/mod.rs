//! News provider client: rate-limited fetches with a short-lived result cache.
//!
//! All outbound calls from one [`NewsClient`] are serialized through a single
//! minimum-interval gate, so aggregate call rate stays under the provider's
//! quota no matter which method or symbol issues the call. Results are cached
//! per (symbol, category, TTL-bucket); a bucket rolls over every TTL, which
//! makes old keys unreachable, and expired entries are purged lazily on each
//! fetch so the map stays bounded.
//!
//! Fetch failures degrade to an empty article list: the consumer cannot tell
//! "no news" from "provider down", but the two are distinguished in logs and
//! in [`FetcherStats::failed_calls`].

mod api;
mod model;
mod wire;

pub use model::NewsArticle;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;
use tracing::{debug, error, info};
use url::Url;

use crate::{config::Config, core::PulseError};

const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1/";
const USER_AGENT: &str = concat!("newspulse/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
struct CacheEntry {
    articles: Vec<NewsArticle>,
    inserted_at: Instant,
}

#[derive(Debug, Default)]
struct Counters {
    api_calls: AtomicU64,
    cache_hits: AtomicU64,
    failed_calls: AtomicU64,
}

/// Snapshot of the client's call and cache counters.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct FetcherStats {
    /// Outbound provider calls attempted.
    pub api_calls: u64,
    /// Fetches served from the cache without a provider call.
    pub cache_hits: u64,
    /// Calls that failed (network error or non-success status).
    pub failed_calls: u64,
    /// `cache_hits / max(api_calls, 1)`.
    pub hit_ratio: f64,
    /// Distinct keys currently held in the cache.
    pub cached_keys: usize,
}

/// Rate-limited, caching client for the news provider.
///
/// Cheap to clone; clones share the cache, the rate gate, and the counters.
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base: Url,
    api_key: Option<String>,
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
    cache_ttl: Duration,
    // Some(instant) once the first call has gone out; the lock is held across
    // the interval sleep so every caller queues behind one gate.
    last_call: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
    counters: Arc<Counters>,
}

impl NewsClient {
    /// Create a new builder.
    pub fn builder() -> NewsClientBuilder {
        NewsClientBuilder::default()
    }

    /// Build a client from a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn from_config(cfg: &Config) -> Result<Self, PulseError> {
        let mut b = Self::builder()
            .cache_ttl(cfg.cache_ttl)
            .min_call_interval(cfg.min_call_interval)
            .timeout(cfg.request_timeout);
        if let Some(key) = &cfg.api_key {
            b = b.api_key(key);
        }
        b.build()
    }

    /* -------- internal getters used by the api module -------- */

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
    pub(crate) fn base(&self) -> &Url {
        &self.base
    }
    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Fetch recent company news for a symbol.
    ///
    /// On a cache hit the stored articles are returned without any network
    /// call or rate-limit wait. Network or provider failures degrade to an
    /// empty list and are logged; they never surface as errors.
    pub async fn company_news(&self, symbol: &str, days_back: i64) -> Vec<NewsArticle> {
        let key = self.cache_key(symbol, "company_news");
        if let Some(hit) = self.cache_get(&key).await {
            debug!(symbol, "cache hit for company news");
            return hit;
        }

        match api::fetch_company_news(self, symbol, days_back).await {
            Ok(articles) => {
                self.counters.api_calls.fetch_add(1, Ordering::Relaxed);
                info!(symbol, count = articles.len(), "fetched company news");
                self.cache_put(key, articles.clone()).await;
                articles
            }
            Err(e) => {
                self.counters.api_calls.fetch_add(1, Ordering::Relaxed);
                self.counters.failed_calls.fetch_add(1, Ordering::Relaxed);
                error!(symbol, error = %e, "company news fetch failed");
                Vec::new()
            }
        }
    }

    /// Fetch general market news for a category.
    ///
    /// Same caching and failure semantics as [`Self::company_news`].
    pub async fn market_news(&self, category: &str, limit: usize) -> Vec<NewsArticle> {
        let key = self.cache_key("market", category);
        if let Some(hit) = self.cache_get(&key).await {
            debug!(category, "cache hit for market news");
            return hit;
        }

        match api::fetch_market_news(self, category, limit).await {
            Ok(articles) => {
                self.counters.api_calls.fetch_add(1, Ordering::Relaxed);
                info!(category, count = articles.len(), "fetched market news");
                self.cache_put(key, articles.clone()).await;
                articles
            }
            Err(e) => {
                self.counters.api_calls.fetch_add(1, Ordering::Relaxed);
                self.counters.failed_calls.fetch_add(1, Ordering::Relaxed);
                error!(category, error = %e, "market news fetch failed");
                Vec::new()
            }
        }
    }

    /// Snapshot the call/cache counters.
    pub async fn stats(&self) -> FetcherStats {
        let api_calls = self.counters.api_calls.load(Ordering::Relaxed);
        let cache_hits = self.counters.cache_hits.load(Ordering::Relaxed);
        let failed_calls = self.counters.failed_calls.load(Ordering::Relaxed);
        let cached_keys = self.cache.lock().await.len();
        #[allow(clippy::cast_precision_loss)]
        let hit_ratio = cache_hits as f64 / api_calls.max(1) as f64;
        FetcherStats {
            api_calls,
            cache_hits,
            failed_calls,
            hit_ratio,
            cached_keys,
        }
    }

    /* -------- rate gate and cache internals -------- */

    /// Block until at least `min_interval` has passed since the last call.
    ///
    /// Holding the lock across the sleep serializes every outbound call from
    /// this client through one gate.
    pub(crate) async fn rate_limit(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                let wait_ms = wait.as_millis();
                debug!(%wait_ms, "rate limiting outbound call");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn cache_key(&self, subject: &str, category: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let bucket = now / self.cache_ttl.as_secs().max(1);
        format!("{subject}:{category}:{bucket}")
    }

    async fn cache_get(&self, key: &str) -> Option<Vec<NewsArticle>> {
        let mut guard = self.cache.lock().await;
        // Lazy purge: old buckets are unreachable by key, so drop anything
        // past its TTL to keep the map bounded.
        let ttl = self.cache_ttl;
        guard.retain(|_, entry| entry.inserted_at.elapsed() <= ttl);
        let hit = guard.get(key).map(|entry| entry.articles.clone());
        if hit.is_some() {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    async fn cache_put(&self, key: String, articles: Vec<NewsArticle>) {
        let mut guard = self.cache.lock().await;
        guard.insert(
            key,
            CacheEntry {
                articles,
                inserted_at: Instant::now(),
            },
        );
    }
}

/* ----------------------- Builder ----------------------- */

/// Builder for [`NewsClient`].
#[derive(Debug, Default)]
pub struct NewsClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    cache_ttl: Option<Duration>,
    min_interval: Option<Duration>,
    timeout: Option<Duration>,
}

impl NewsClientBuilder {
    /// Override the provider base URL (used by tests to point at a mock).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set the provider API token.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the cache TTL. Default: 5 minutes.
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Override the minimum interval between outbound calls. Default: 1 s.
    #[must_use]
    pub const fn min_call_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Override the per-request timeout. Default: 10 s.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed or the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<NewsClient, PulseError> {
        let base = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let http = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .timeout(self.timeout.unwrap_or(Duration::from_secs(10)))
            .build()?;

        Ok(NewsClient {
            http,
            base,
            api_key: self.api_key,
            cache: Arc::new(Mutex::new(HashMap::new())),
            cache_ttl: self.cache_ttl.unwrap_or(Duration::from_secs(300)),
            last_call: Arc::new(Mutex::new(None)),
            min_interval: self.min_interval.unwrap_or(Duration::from_secs(1)),
            counters: Arc::new(Counters::default()),
        })
    }
}
