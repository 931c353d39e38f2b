use anyhow::{Context, Result};
use chrono::Utc;
use indexmap::IndexMap;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::api_types::*;
use crate::models::*;

/// The only failures a user ever sees from an analysis request.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Please enter a YouTube URL.")]
    MissingUrl,
    /// Transport, status, and decode errors all collapse into this one.
    #[error("Failed to analyze video. Try again.")]
    Failed { detail: String },
}

fn make_result_id(video_url: &str, stamp: &str) -> String {
    format!("{:016x}", xxh3_64(format!("{}|{}", video_url, stamp).as_bytes()))
}

/// Trims the URL and rejects blank input. Non-YouTube hosts are submitted anyway.
pub fn validate_video_url(raw: &str) -> Result<String, AnalyzeError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(AnalyzeError::MissingUrl);
    }
    match url::Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            if !(host.ends_with("youtube.com") || host.ends_with("youtu.be")) {
                warn!("URL host does not look like YouTube - host={}", host);
            }
        }
        Err(e) => warn!("URL did not parse, submitting as-is - url={}, err={}", url, e),
    }
    Ok(url.to_string())
}

/// POST `{url}` to the analysis endpoint; every failure is logged and reported generically.
/// `video_url` is submitted as given, so run it through [`validate_video_url`] first.
pub async fn request_analysis(
    client: &Client,
    api_url: &str,
    video_url: &str,
) -> Result<AnalysisResult, AnalyzeError> {
    match fetch_analysis(client, api_url, video_url).await {
        Ok(result) => Ok(result),
        Err(e) => {
            error!("Analysis request failed - endpoint={}, err={:#}", api_url, e);
            Err(AnalyzeError::Failed {
                detail: format!("{:#}", e),
            })
        }
    }
}

async fn fetch_analysis(client: &Client, api_url: &str, video_url: &str) -> Result<AnalysisResult> {
    let start = std::time::Instant::now();
    debug!("Submitting analysis - endpoint={}, video={}", api_url, video_url);

    let body = ApiAnalyzeRequest {
        url: video_url.to_string(),
    };
    let resp = client
        .post(api_url)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("Request failed for {}", api_url))?;

    let resp = resp
        .error_for_status()
        .with_context(|| format!("HTTP error for {}", api_url))?;

    let api: ApiAnalysis = resp
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {}", api_url))?;

    let result = into_analysis(api, video_url);

    info!(
        "Analysis fetch completed - duration={:.2}s, comments={}, positive_clusters={}, negative_clusters={}",
        start.elapsed().as_secs_f32(),
        result.all_comments.len(),
        result.positive_clusters.len(),
        result.negative_clusters.len()
    );
    Ok(result)
}

/// Maps the wire shape onto the domain model.
pub fn into_analysis(api: ApiAnalysis, video_url: &str) -> AnalysisResult {
    let analyzed_at = Utc::now();
    let mut unknown = 0usize;

    let all_comments: Vec<Comment> = api
        .all_comments
        .into_iter()
        .map(|c| {
            let sentiment = Sentiment::from_label(&c.sentiment).unwrap_or_else(|| {
                unknown += 1;
                Sentiment::Neutral
            });
            Comment::new(c.text, sentiment, c.score)
        })
        .collect();

    if unknown > 0 {
        warn!("Unrecognized sentiment labels treated as neutral - count={}", unknown);
    }

    AnalysisResult {
        result_id: make_result_id(video_url, &analyzed_at.to_rfc3339()),
        video_url: video_url.to_string(),
        analyzed_at,
        overview: api.overview,
        summary: api.summary,
        stats: Stats {
            total: api.stats.total,
            positive: api.stats.positive,
            negative: api.stats.negative,
            neutral: api.stats.neutral,
            suggestions: api.stats.suggestions,
        },
        positive_clusters: into_clusters(api.positive_clusters),
        negative_clusters: into_clusters(api.negative_clusters),
        suggestions: api.suggestions.map(|s| Suggestions {
            overview: s.overview,
            examples: s.examples,
        }),
        all_comments,
        themes: into_themes(api.themes.unwrap_or_default()),
        theme_overview: api.theme_overview.filter(|t| !t.trim().is_empty()),
    }
}

fn into_themes(map: IndexMap<String, Vec<String>>) -> Vec<Theme> {
    let mut themes: Vec<Theme> = map
        .into_iter()
        .map(|(name, phrases)| Theme { name, phrases })
        .collect();
    themes.sort_by_key(|t| entry_order_key(&t.name));
    themes
}

fn into_clusters(map: IndexMap<String, ApiCluster>) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = map
        .into_iter()
        .map(|(id, c)| Cluster {
            id,
            summary: c.summary,
            examples: c.examples,
        })
        .collect();
    clusters.sort_by_key(|c| entry_order_key(&c.id));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_payload() -> serde_json::Value {
        json!({
            "overview": "Viewers loved the chorus.",
            "summary": "### 🧠 Overall\nMostly upbeat.",
            "stats": {"total": 3, "positive": 1, "negative": 1, "neutral": 1, "suggestions": 2},
            "positive_clusters": {
                "10": {"summary": "late", "examples": []},
                "2": {"summary": "vocals", "examples": ["great voice"]}
            },
            "negative_clusters": {"0": {"summary": "length", "examples": ["too long"]}},
            "suggestions": {"overview": "Shorter intro", "examples": ["cut the intro"]},
            "all_comments": [
                {"text": "great song", "sentiment": "positive", "score": 0.9},
                {"text": "too long", "sentiment": "NEGATIVE", "score": -0.7},
                {"text": "hmm", "sentiment": "mixed", "score": 0.0}
            ]
        })
    }

    #[test]
    fn blank_url_is_rejected() {
        assert!(matches!(validate_video_url("   "), Err(AnalyzeError::MissingUrl)));
        assert_eq!(
            validate_video_url(" https://youtu.be/abc ").unwrap(),
            "https://youtu.be/abc"
        );
    }

    #[test]
    fn user_messages_are_fixed() {
        assert_eq!(AnalyzeError::MissingUrl.to_string(), "Please enter a YouTube URL.");
        let failed = AnalyzeError::Failed { detail: "HTTP 502".into() };
        assert_eq!(failed.to_string(), "Failed to analyze video. Try again.");
    }

    #[test]
    fn wire_conversion_orders_clusters_and_maps_labels() {
        let api: ApiAnalysis = serde_json::from_value(backend_payload()).unwrap();
        let r = into_analysis(api, "https://youtu.be/abc");
        let ids: Vec<_> = r.positive_clusters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "10"]);
        assert_eq!(r.all_comments[1].sentiment, Sentiment::Negative);
        assert_eq!(r.all_comments[2].sentiment, Sentiment::Neutral);
        assert_eq!(r.stats.suggestions, Some(2));
        assert_eq!(r.result_id.len(), 16);
        assert!(r.themes.is_empty());
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let api: ApiAnalysis = serde_json::from_value(json!({
            "stats": {"total": 0, "positive": 0, "negative": 0, "neutral": 0}
        }))
        .unwrap();
        let r = into_analysis(api, "u");
        assert!(r.all_comments.is_empty());
        assert!(r.suggestions.is_none());
        assert_eq!(r.stats.suggestions, None);
    }

    #[tokio::test]
    async fn posts_url_and_decodes_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(body_json(json!({"url": "https://youtube.com/watch?v=x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(backend_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let endpoint = format!("{}/analyze", server.uri());
        let r = request_analysis(&client, &endpoint, "https://youtube.com/watch?v=x")
            .await
            .unwrap();
        assert_eq!(r.overview, "Viewers loved the chorus.");
        assert_eq!(r.all_comments.len(), 3);
        assert_eq!(r.video_url, "https://youtube.com/watch?v=x");
    }

    #[test]
    fn themes_and_clusters_keep_backend_order_after_integer_keys() {
        let api: ApiAnalysis = serde_json::from_value(json!({
            "stats": {"total": 0, "positive": 0, "negative": 0, "neutral": 0},
            "negative_clusters": {
                "zeta": {"summary": "z", "examples": []},
                "alpha": {"summary": "a", "examples": []},
                "3": {"summary": "three", "examples": []}
            },
            "themes": {"Vocals": ["voice"], "Audio": ["mix"], "7": ["seven"]}
        }))
        .unwrap();
        let r = into_analysis(api, "u");
        let ids: Vec<_> = r.negative_clusters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "zeta", "alpha"]);
        let names: Vec<_> = r.themes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["7", "Vocals", "Audio"]);
    }

    #[tokio::test]
    async fn submits_url_exactly_as_given() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"url": "https://vimeo.com/1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(backend_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let r = request_analysis(&Client::new(), &server.uri(), "https://vimeo.com/1")
            .await
            .unwrap();
        assert_eq!(r.video_url, "https://vimeo.com/1");
    }

    #[tokio::test]
    async fn server_error_becomes_generic_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = request_analysis(&Client::new(), &server.uri(), "https://youtu.be/x")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::Failed { .. }));
    }

    #[tokio::test]
    async fn malformed_body_becomes_generic_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = request_analysis(&Client::new(), &server.uri(), "https://youtu.be/x")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to analyze video. Try again.");
    }
}
