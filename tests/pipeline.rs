use std::time::Duration;

use httpmock::{Method::GET, MockServer};
use newspulse::bus::BusSubscription;
use newspulse::consumer::{ALERTS_CHANNEL, EVENTS_CHANNEL};
use newspulse::{Config, EventBus, MemoryBus, NewsAlert, NewsClient, NewsConsumer};
use serde_json::json;
use url::Url;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config() -> Config {
    Config::default()
        .min_change_percent(3.0)
        .min_volume_threshold(50_000)
}

fn client(server: &MockServer) -> NewsClient {
    NewsClient::builder()
        .base_url(Url::parse(&server.base_url()).unwrap())
        .min_call_interval(Duration::ZERO)
        .cache_ttl(Duration::from_secs(3600))
        .build()
        .unwrap()
}

fn event_payload(symbol: &str, change_percent: f64, volume: u64) -> String {
    json!({
        "symbol": symbol,
        "price": 150.0,
        "change_percent": change_percent,
        "volume": volume,
        "timestamp": "2026-08-29T12:00:00Z"
    })
    .to_string()
}

fn mixed_news() -> serde_json::Value {
    json!([
        {
            "headline": "Shares surge",
            "summary": "",
            "url": "https://example.com/1",
            "datetime": 1_700_000_000,
            "source": "TestWire"
        },
        {
            "headline": "Shares crash",
            "summary": "",
            "url": "https://example.com/2",
            "datetime": 1_700_000_100,
            "source": "TestWire"
        }
    ])
}

#[tokio::test]
async fn qualifying_event_produces_one_enriched_alert() {
    let server = MockServer::start();
    let news_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/company-news")
            .query_param("symbol", "AAPL");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(mixed_news());
    });

    let bus = MemoryBus::new();
    let mut alerts = bus.subscribe(ALERTS_CHANNEL).await.unwrap();
    let mut consumer = NewsConsumer::new(bus.clone(), client(&server), &config());

    consumer
        .handle_payload(&event_payload("AAPL", 8.0, 500_000))
        .await;

    news_mock.assert();
    let payload = alerts.recv().await.expect("one alert published");
    let alert: NewsAlert = serde_json::from_str(&payload).unwrap();

    assert_eq!(alert.symbol, "AAPL");
    assert_eq!(alert.price, 150.0);
    assert_eq!(alert.change_percent, 8.0);
    assert_eq!(alert.news_count, 2);
    assert_eq!(
        alert.top_headlines,
        vec!["Shares surge", "Shares crash"]
    );
    // One +1 and one -1 article cancel out.
    assert!(alert.news_sentiment.abs() <= 0.2, "got {}", alert.news_sentiment);
    assert!(alert.news_summary.contains("2 neutral news articles"));
    assert!(alert.news_summary.contains("surge"));
    assert!(alert.news_summary.chars().count() <= 400);

    let stats = consumer.stats();
    assert_eq!(stats.processed_events, 1);
    assert_eq!(stats.published_alerts, 1);
    assert_eq!(stats.dedup_entries, 1);
    assert!(stats.last_processed.is_some());
}

#[tokio::test]
async fn low_volume_event_triggers_no_fetch_and_no_alert() {
    let server = MockServer::start();
    let news_mock = server.mock(|when, then| {
        when.method(GET).path("/company-news");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(mixed_news());
    });

    let bus = MemoryBus::new();
    let mut consumer = NewsConsumer::new(bus, client(&server), &config());

    consumer.handle_payload(&event_payload("AAPL", 8.0, 10)).await;

    news_mock.assert_hits(0);
    let stats = consumer.stats();
    assert_eq!(stats.processed_events, 0);
    assert_eq!(stats.published_alerts, 0);
    assert!(stats.last_processed.is_none());
}

#[tokio::test]
async fn replayed_event_is_deduplicated() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/company-news");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(mixed_news());
    });

    let bus = MemoryBus::new();
    let mut alerts = bus.subscribe(ALERTS_CHANNEL).await.unwrap();
    let mut consumer = NewsConsumer::new(bus.clone(), client(&server), &config());

    let payload = event_payload("AAPL", 8.0, 500_000);
    consumer.handle_payload(&payload).await;
    consumer.handle_payload(&payload).await;

    let stats = consumer.stats();
    assert_eq!(stats.published_alerts, 1);
    assert_eq!(stats.processed_events, 1);

    // Exactly one alert on the wire.
    assert!(alerts.recv().await.is_some());
    assert!(
        tokio::time::timeout(Duration::from_millis(50), alerts.recv())
            .await
            .is_err(),
        "second event must not publish"
    );
}

#[tokio::test]
async fn no_news_is_terminal_without_an_alert() {
    let server = MockServer::start();
    let news_mock = server.mock(|when, then| {
        when.method(GET).path("/company-news");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([]));
    });

    let bus = MemoryBus::new();
    let mut consumer = NewsConsumer::new(bus, client(&server), &config());

    consumer
        .handle_payload(&event_payload("AAPL", 8.0, 500_000))
        .await;

    news_mock.assert();
    let stats = consumer.stats();
    assert_eq!(stats.published_alerts, 0);
    assert_eq!(stats.processed_events, 0);
}

#[tokio::test]
async fn provider_outage_degrades_without_an_alert() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/company-news");
        then.status(502).body("bad gateway");
    });

    let bus = MemoryBus::new();
    let nc = client(&server);
    let mut consumer = NewsConsumer::new(bus, nc.clone(), &config());

    consumer
        .handle_payload(&event_payload("AAPL", 8.0, 500_000))
        .await;

    let stats = consumer.stats();
    assert_eq!(stats.published_alerts, 0);
    // The failed fetch is distinguishable in the fetcher's counters even
    // though the pipeline outcome matches "no news".
    assert_eq!(nc.stats().await.failed_calls, 1);
}

#[tokio::test]
async fn malformed_payloads_are_dropped() {
    let server = MockServer::start();
    let bus = MemoryBus::new();
    let mut consumer = NewsConsumer::new(bus, client(&server), &config());

    consumer.handle_payload("not json at all").await;
    consumer.handle_payload(r#"{"symbol": "AAPL"}"#).await;
    // Validation failures count as malformed too.
    consumer
        .handle_payload(&json!({
            "symbol": "AAPL",
            "price": -1.0,
            "change_percent": 8.0,
            "volume": 500_000,
            "timestamp": "2026-08-29T12:00:00Z"
        }).to_string())
        .await;

    let stats = consumer.stats();
    assert_eq!(stats.processed_events, 0);
    assert_eq!(stats.published_alerts, 0);
}

#[tokio::test]
async fn zero_subscriber_publish_still_counts_as_delivered() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/company-news");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(mixed_news());
    });

    let bus = MemoryBus::new();
    // No alert subscription exists.
    let mut consumer = NewsConsumer::new(bus, client(&server), &config());

    consumer
        .handle_payload(&event_payload("AAPL", 8.0, 500_000))
        .await;

    let stats = consumer.stats();
    assert_eq!(stats.published_alerts, 1);
    assert_eq!(stats.processed_events, 1);
    assert_eq!(stats.dedup_entries, 1);
}

#[tokio::test]
async fn run_loop_consumes_from_the_bus_until_shutdown() {
    init_tracing();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/company-news");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(mixed_news());
    });

    let bus = MemoryBus::new();
    let mut alerts = bus.subscribe(ALERTS_CHANNEL).await.unwrap();
    let mut consumer = NewsConsumer::new(bus.clone(), client(&server), &config());
    let stats = consumer.stats_handle();

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(async move { consumer.run_until(shutdown_rx).await });

    // Give the consumer a moment to subscribe before publishing.
    tokio::time::sleep(Duration::from_millis(50)).await;
    bus.publish(EVENTS_CHANNEL, &event_payload("TSLA", 6.5, 750_000))
        .await
        .unwrap();

    let payload = tokio::time::timeout(Duration::from_secs(5), alerts.recv())
        .await
        .expect("alert within deadline")
        .expect("alert published");
    let alert: NewsAlert = serde_json::from_str(&payload).unwrap();
    assert_eq!(alert.symbol, "TSLA");
    assert_eq!(stats.snapshot().published_alerts, 1);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("consumer stops promptly")
        .unwrap()
        .unwrap();
}
