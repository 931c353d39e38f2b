use serde::{Deserialize, Serialize};
use indexmap::IndexMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAnalyzeRequest {
    pub url: String,                     // full YouTube video URL
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAnalysis {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub summary: String,                 // "### 🧠 ..." annotated blob
    pub stats: ApiStats,
    #[serde(default)]
    pub positive_clusters: IndexMap<String, ApiCluster>, // arrival order kept
    #[serde(default)]
    pub negative_clusters: IndexMap<String, ApiCluster>,
    #[serde(default)]
    pub suggestions: Option<ApiSuggestions>,
    #[serde(default)]
    pub all_comments: Vec<ApiComment>,
    #[serde(default)]
    pub themes: Option<IndexMap<String, Vec<String>>>,
    #[serde(default)]
    pub theme_overview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub positive: u64,
    #[serde(default)]
    pub negative: u64,
    #[serde(default)]
    pub neutral: u64,
    #[serde(default)]
    pub suggestions: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCluster {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuggestions {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiComment {
    pub text: String,
    pub sentiment: String,               // "positive" | "negative" | "neutral"
    #[serde(default)]
    pub score: f64,                      // ranking only, sign follows sentiment
}
