//! Lexicon-based sentiment scoring for financial news.
//!
//! [`score`] is a pure function over one text; [`analyze_batch`] aggregates a
//! set of articles into a [`SentimentResult`]. There is no model behind this:
//! a fixed two-tier word list is summed, normalized by token count, and
//! clamped, which keeps the score reproducible and cheap.

mod lexicon;

pub use lexicon::vocabulary_size;

use serde::{Deserialize, Serialize};

use crate::news::NewsArticle;

/// Per-article classification threshold on the normalized score.
const ARTICLE_THRESHOLD: f64 = 0.1;
/// Aggregate label threshold on the batch average.
const BATCH_THRESHOLD: f64 = 0.2;
/// How many of the most frequent matched words to surface.
const TOP_KEYWORDS: usize = 5;

/// Overall sentiment direction of a batch of articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        })
    }
}

/// Aggregate sentiment over one batch of articles.
///
/// Computed fresh per enrichment call and never persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Average per-article score, rounded to 3 decimals, in `[-1, 1]`.
    pub score: f64,
    pub label: SentimentLabel,
    pub article_count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    /// Up to 5 matched words, most frequent first; ties keep the order the
    /// words were first seen while scanning articles in input order.
    pub top_keywords: Vec<String>,
    /// `max(0, 1 - population variance)` of the per-article scores; a tight
    /// spread across articles reads as higher confidence.
    pub confidence: f64,
}

/// Score a single text against the lexicon.
///
/// The text is lowercased, stripped to letters and whitespace, and split on
/// whitespace. Each matched token contributes its signed weight; the sum is
/// divided by the total token count, scaled by 10, and clamped to `[-1, 1]`.
/// Zero tokens yields score 0 and no matches. The returned counts are in
/// first-match order.
pub fn score(text: &str) -> (f64, Vec<(String, u32)>) {
    let cleaned = clean(text);
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.is_empty() {
        return (0.0, Vec::new());
    }

    let mut sum = 0i64;
    let mut counts: Vec<(String, u32)> = Vec::new();
    for &token in &tokens {
        if let Some(w) = lexicon::weight(token) {
            sum += i64::from(w);
            if let Some(idx) = counts.iter().position(|(word, _)| word == token) {
                counts[idx].1 += 1;
            } else {
                counts.push((token.to_string(), 1));
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let normalized = (sum as f64 / tokens.len() as f64 * 10.0).clamp(-1.0, 1.0);
    (normalized, counts)
}

/// Aggregate sentiment over a batch of articles.
///
/// Each article is scored over its concatenated headline and summary and
/// classified at ±0.1; the batch label uses the ±0.2 thresholds on the
/// average score. An empty batch is a defined terminal case: zero score,
/// neutral label, confidence 0.
pub fn analyze_batch(articles: &[NewsArticle]) -> SentimentResult {
    if articles.is_empty() {
        return SentimentResult::default();
    }

    let mut scores = Vec::with_capacity(articles.len());
    let mut keywords: Vec<(String, u32)> = Vec::new();
    let mut positive_count = 0;
    let mut negative_count = 0;
    let mut neutral_count = 0;

    for article in articles {
        let text = format!("{} {}", article.headline, article.summary);
        let (article_score, counts) = score(&text);
        scores.push(article_score);

        for (word, n) in counts {
            if let Some(idx) = keywords.iter().position(|(w, _)| *w == word) {
                keywords[idx].1 += n;
            } else {
                keywords.push((word, n));
            }
        }

        if article_score > ARTICLE_THRESHOLD {
            positive_count += 1;
        } else if article_score < -ARTICLE_THRESHOLD {
            negative_count += 1;
        } else {
            neutral_count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let count = articles.len() as f64;
    let avg = scores.iter().sum::<f64>() / count;
    let label = if avg > BATCH_THRESHOLD {
        SentimentLabel::Positive
    } else if avg < -BATCH_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    let variance = scores.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / count;
    let confidence = (1.0 - variance).max(0.0);

    // Stable sort keeps first-seen order among equal counts.
    keywords.sort_by(|a, b| b.1.cmp(&a.1));
    let top_keywords = keywords
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(word, _)| word)
        .collect();

    SentimentResult {
        score: round3(avg),
        label,
        article_count: articles.len(),
        positive_count,
        negative_count,
        neutral_count,
        top_keywords,
        confidence: round3(confidence),
    }
}

fn clean(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphabetic() || c.is_whitespace() { c } else { ' ' })
        .collect()
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
