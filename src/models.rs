use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Case-insensitive match on the backend's label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub sentiment: Sentiment,
    pub score: f64, // intensity; only compared within one sentiment class
}

impl Comment {
    pub fn new(text: impl Into<String>, sentiment: Sentiment, score: f64) -> Self {
        Self {
            text: text.into(),
            sentiment,
            score,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: u64,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    pub suggestions: Option<u64>,
}

impl Stats {
    /// Share of `count` in `total`, or `None` when there is nothing to divide by.
    pub fn percent(&self, count: u64) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(count as f64 / self.total as f64 * 100.0)
        }
    }

    pub fn percent_label(&self, count: u64) -> String {
        match self.percent(count) {
            Some(p) => format!("{:.1}", p),
            None => "n/a".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub summary: String,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestions {
    pub overview: String,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub result_id: String,   // xxh3 of video url + timestamp
    pub video_url: String,
    pub analyzed_at: DateTime<Utc>,
    pub overview: String,
    pub summary: String,
    pub stats: Stats,
    pub positive_clusters: Vec<Cluster>,
    pub negative_clusters: Vec<Cluster>,
    pub suggestions: Option<Suggestions>,
    pub all_comments: Vec<Comment>,
    #[serde(default)]
    pub themes: Vec<Theme>,
    #[serde(default)]
    pub theme_overview: Option<String>,
}

/// Sort key for backend map keys (cluster ids, theme names): canonical integer keys
/// first in numeric order, everything else ties so a stable sort keeps arrival order.
pub fn entry_order_key(key: &str) -> (u8, u32) {
    match integer_key(key) {
        Some(n) => (0, n),
        None => (1, 0),
    }
}

// "0", "7", "12" count; "01", " 2", "+3" and anything at or past u32::MAX do not.
fn integer_key(key: &str) -> Option<u32> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse::<u32>().ok().filter(|n| *n < u32::MAX)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_labels_are_case_insensitive() {
        assert_eq!(Sentiment::from_label("Positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label(" NEGATIVE "), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("neutral"), Some(Sentiment::Neutral));
        assert_eq!(Sentiment::from_label("mixed"), None);
    }

    #[test]
    fn percent_uses_one_decimal_and_handles_empty_total() {
        let stats = Stats {
            total: 3,
            positive: 2,
            negative: 1,
            neutral: 0,
            suggestions: None,
        };
        assert_eq!(stats.percent_label(2), "66.7");
        assert_eq!(stats.percent_label(0), "0.0");

        let empty = Stats::default();
        assert_eq!(empty.percent(5), None);
        assert_eq!(empty.percent_label(5), "n/a");
    }

    #[test]
    fn integer_keys_first_then_arrival_order() {
        let mut ids = vec!["10", "zeta", "2", "alpha", "0", "01"];
        ids.sort_by_key(|id| entry_order_key(id));
        assert_eq!(ids, vec!["0", "2", "10", "zeta", "alpha", "01"]);
    }
}
