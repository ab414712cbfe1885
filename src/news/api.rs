use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use tracing::warn;

use crate::{
    core::PulseError,
    news::{NewsClient, model::NewsArticle, wire},
};

/// Items parsed out of a company-news response, oldest truncated.
const COMPANY_NEWS_LIMIT: usize = 10;

pub(super) async fn fetch_company_news(
    client: &NewsClient,
    symbol: &str,
    days_back: i64,
) -> Result<Vec<NewsArticle>, PulseError> {
    let to = Utc::now();
    let from = to - ChronoDuration::days(days_back);

    let mut url = client.base().join("company-news")?;
    url.query_pairs_mut()
        .append_pair("symbol", symbol)
        .append_pair("from", &from.format("%Y-%m-%d").to_string())
        .append_pair("to", &to.format("%Y-%m-%d").to_string());

    fetch_articles(client, url, COMPANY_NEWS_LIMIT).await
}

pub(super) async fn fetch_market_news(
    client: &NewsClient,
    category: &str,
    limit: usize,
) -> Result<Vec<NewsArticle>, PulseError> {
    let mut url = client.base().join("news")?;
    url.query_pairs_mut()
        .append_pair("category", category)
        .append_pair("minId", "0");

    fetch_articles(client, url, limit).await
}

/// Rate-limited GET returning the first `limit` parseable articles.
///
/// Items that fail to parse are skipped individually; a failing item never
/// aborts the batch.
async fn fetch_articles(
    client: &NewsClient,
    url: url::Url,
    limit: usize,
) -> Result<Vec<NewsArticle>, PulseError> {
    client.rate_limit().await;

    let mut req = client.http().get(url);
    if let Some(token) = client.api_key() {
        req = req.header("X-Finnhub-Token", token);
    }

    let resp = req.send().await?;
    if !resp.status().is_success() {
        return Err(PulseError::Status {
            status: resp.status().as_u16(),
            url: resp.url().to_string(),
        });
    }

    let items: Vec<Value> = resp.json().await?;
    let articles = items
        .into_iter()
        .take(limit)
        .filter_map(|raw| match serde_json::from_value::<wire::ArticleItem>(raw) {
            Ok(item) => Some(NewsArticle::from(item)),
            Err(e) => {
                warn!(error = %e, "skipping unparseable news item");
                None
            }
        })
        .collect();

    Ok(articles)
}
