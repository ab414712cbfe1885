use serde::Deserialize;

use crate::news::model::NewsArticle;

/// One item of the provider's company/market news response.
///
/// Every field is optional on the wire; absent fields fall back to empty
/// defaults so a sparse item still yields a usable article.
#[derive(Deserialize)]
pub(crate) struct ArticleItem {
    pub(crate) headline: Option<String>,
    pub(crate) summary: Option<String>,
    pub(crate) url: Option<String>,
    #[serde(rename = "datetime")]
    pub(crate) published_at: Option<i64>,
    pub(crate) source: Option<String>,
}

impl From<ArticleItem> for NewsArticle {
    fn from(item: ArticleItem) -> Self {
        Self {
            headline: item.headline.unwrap_or_default(),
            summary: item.summary.unwrap_or_default(),
            url: item.url.unwrap_or_default(),
            published_at: item.published_at.unwrap_or_default(),
            source: item.source.unwrap_or_default(),
        }
    }
}
