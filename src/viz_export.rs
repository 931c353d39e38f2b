// src/viz_export.rs
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs,
    path::Path,
};

use crate::models::{AnalysisResult, Cluster, Sentiment};

/* -------------------------------------------------------------------------- */
/* Entry point                                                                */
/* -------------------------------------------------------------------------- */

/// Write chart-ready JSONs for one analysis into `dir`.
pub fn write_all_viz(dir: &Path, r: &AnalysisResult) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {:?}", dir))?;

    // 1) Pie + bar data from the backend's counts
    let sentiment = build_sentiment(r);
    write_json(dir.join("viz.sentiment.json"), &sentiment)?;

    // 2) Cluster sizes per polarity
    let clusters = build_clusters(r);
    write_json(dir.join("viz.clusters.json"), &clusters)?;

    // 3) Word clouds per sentiment class
    let clouds = build_clouds(r);
    write_json(dir.join("viz.clouds.json"), &clouds)?;

    let idx = json!({
        "result_id": r.result_id,
        "video_url": r.video_url,
        "analyzed_at": r.analyzed_at.to_rfc3339(),
        "version": 1,
        "counts": {
            "comments": r.all_comments.len(),
            "positive_clusters": r.positive_clusters.len(),
            "negative_clusters": r.negative_clusters.len(),
        },
        "files": [
            "viz.sentiment.json",
            "viz.clusters.json",
            "viz.clouds.json"
        ]
    });
    write_json(dir.join("viz.index.json"), &idx)?;

    Ok(())
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("write {:?}", path))
}

/* -------------------------------------------------------------------------- */
/* 1) Sentiment distribution                                                  */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VSlice {
    name: &'static str,
    value: u64,
    color: &'static str,
}

#[derive(Serialize)]
struct VBarRow {
    name: &'static str,
    positive: u64,
    negative: u64,
    neutral: u64,
}

#[derive(Serialize)]
struct VSentiment {
    pie: Vec<VSlice>,
    bar: Vec<VBarRow>,
}

const COLORS: [&str; 3] = ["#4caf50", "#f44336", "#ff9800"];

fn build_sentiment(r: &AnalysisResult) -> VSentiment {
    let s = &r.stats;
    let pie = vec![
        VSlice { name: "Positive", value: s.positive, color: COLORS[0] },
        VSlice { name: "Negative", value: s.negative, color: COLORS[1] },
        VSlice { name: "Neutral", value: s.neutral, color: COLORS[2] },
    ];
    let row = VBarRow {
        name: "Comments",
        positive: s.positive,
        negative: s.negative,
        neutral: s.neutral,
    };
    VSentiment { pie, bar: vec![row] }
}

/* -------------------------------------------------------------------------- */
/* 2) Clusters                                                                */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VCluster {
    id: String,
    polarity: Sentiment,
    summary: String,
    examples: usize,
}

#[derive(Serialize)]
struct VClusters {
    clusters: Vec<VCluster>,
}

fn build_clusters(r: &AnalysisResult) -> VClusters {
    let tag = |polarity: Sentiment, cs: &[Cluster]| -> Vec<VCluster> {
        cs.iter()
            .map(|c| VCluster {
                id: c.id.clone(),
                polarity,
                summary: c.summary.clone(),
                examples: c.examples.len(),
            })
            .collect()
    };
    let mut clusters = tag(Sentiment::Positive, &r.positive_clusters);
    clusters.extend(tag(Sentiment::Negative, &r.negative_clusters));
    VClusters { clusters }
}

/* -------------------------------------------------------------------------- */
/* 3) Word clouds                                                             */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VClouds {
    by_sentiment: BTreeMap<Sentiment, Vec<(String, u32)>>,
}

fn build_clouds(r: &AnalysisResult) -> VClouds {
    let mut by_sentiment = BTreeMap::new();
    for s in [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral] {
        let text = r
            .all_comments
            .iter()
            .filter(|c| c.sentiment == s)
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        by_sentiment.insert(s, top_tokens_clean(&text, 40));
    }
    VClouds { by_sentiment }
}

/* --------------------------- CLEAN TOKENIZATION ---------------------------- */

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z\-']+").expect("token pattern"));
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("url pattern"));

fn top_tokens_clean(text: &str, limit: usize) -> Vec<(String, u32)> {
    let s = URL_RE.replace_all(text, " ");
    let stop = stopwords();
    let mut bag: HashMap<String, u32> = HashMap::new();

    for cap in TOKEN_RE.find_iter(&s) {
        let mut t = cap.as_str().to_lowercase().trim_matches('\'').to_string();
        if t.len() < 3 || stop.contains(t.as_str()) {
            continue;
        }
        // Crude plural folding
        if t.ends_with('s') && !t.ends_with("ss") && t.len() > 4 {
            t.pop();
        }
        *bag.entry(t).or_insert(0) += 1;
    }

    let mut v: Vec<(String, u32)> = bag.into_iter().collect();
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    v.truncate(limit);
    v
}

/* ------------------------------ Stop words -------------------------------- */

fn stopwords() -> &'static HashSet<&'static str> {
    static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
        [
            // english
            "the", "and", "but", "then", "for", "with", "was", "were", "been", "being", "that",
            "this", "its", "from", "into", "about", "after", "before", "than", "not", "yes", "more",
            "most", "very", "much", "many", "some", "any", "such", "you", "your", "are", "have",
            "has", "had", "just", "all", "can", "will", "what", "who", "they", "them", "his",
            "her", "she", "him", "our", "out", "one", "get", "got", "how", "why", "when", "it's",
            "i'm", "don't", "too", "also", "even", "really",
            // comment-section noise
            "video", "videos", "channel", "watch", "watching", "subscribe", "lol", "omg",
        ]
        .into_iter()
        .collect()
    });
    &SET
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::full_result;

    #[test]
    fn tokens_drop_stopwords_and_urls() {
        let toks = top_tokens_clean("The vocals! vocals https://x.io/vocals and the song", 10);
        assert_eq!(toks[0], ("vocal".to_string(), 2));
        assert!(toks.iter().any(|(t, _)| t == "song"));
        assert!(!toks.iter().any(|(t, _)| t == "the" || t.contains("http")));
    }

    #[test]
    fn writes_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let r = full_result();
        write_all_viz(dir.path(), &r).unwrap();

        for f in ["viz.sentiment.json", "viz.clusters.json", "viz.clouds.json", "viz.index.json"] {
            assert!(dir.path().join(f).exists(), "missing {}", f);
        }
        let s: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("viz.sentiment.json")).unwrap()).unwrap();
        assert_eq!(s["pie"][0]["value"], 2);
        assert_eq!(s["bar"][0]["neutral"], 1);

        let c: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("viz.clusters.json")).unwrap()).unwrap();
        assert_eq!(c["clusters"][1]["polarity"], "negative");
    }

    #[test]
    fn bundle_key_order_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let r = full_result();
        write_all_viz(dir.path(), &r).unwrap();
        let first_sentiment = fs::read(dir.path().join("viz.sentiment.json")).unwrap();
        let first_clouds = fs::read_to_string(dir.path().join("viz.clouds.json")).unwrap();

        write_all_viz(dir.path(), &r).unwrap();
        assert_eq!(fs::read(dir.path().join("viz.sentiment.json")).unwrap(), first_sentiment);
        assert_eq!(fs::read_to_string(dir.path().join("viz.clouds.json")).unwrap(), first_clouds);

        let pos = |key: &str| first_clouds.find(&format!("\"{}\"", key)).unwrap();
        assert!(pos("positive") < pos("negative"));
        assert!(pos("negative") < pos("neutral"));
    }
}
