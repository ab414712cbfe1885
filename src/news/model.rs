use serde::{Deserialize, Serialize};

/// A single news article for a symbol, as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// The headline of the article.
    pub headline: String,
    /// A short summary, possibly empty.
    pub summary: String,
    /// A direct link to the article.
    pub url: String,
    /// Provider-native Unix timestamp (seconds) of publication.
    pub published_at: i64,
    /// The publisher (e.g. "Reuters").
    pub source: String,
}
