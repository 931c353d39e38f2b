use anyhow::{Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::export::{export_report, BLOCKS_PER_PAGE};
use crate::fetch::{request_analysis, validate_video_url};
use crate::models::AnalysisResult;
use crate::store::AnalysisStore;
use crate::viz_export::write_all_viz;

pub fn build_client(cfg: &AppConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("Building HTTP client")
}

/// `<output_dir>/<YYYY-MM-DD>-<id prefix>` for one analysis.
pub fn run_dir(output_dir: &Path, r: &AnalysisResult) -> PathBuf {
    let short = &r.result_id[..r.result_id.len().min(8)];
    output_dir.join(format!("{}-{}", r.analyzed_at.format("%Y-%m-%d"), short))
}

/// Clear the store, request a fresh analysis, keep it, and persist its artifacts.
pub async fn run_analysis(
    cfg: &AppConfig,
    client: &Client,
    store: &mut AnalysisStore,
    video_url: &str,
) -> Result<PathBuf> {
    let pipeline_start = std::time::Instant::now();
    let video_url = validate_video_url(video_url)?;
    info!("Analysis started - video={}, endpoint={}", video_url, cfg.api_url);

    // The previous result is gone as soon as a new request begins.
    store.clear()?;

    let result = request_analysis(client, &cfg.api_url, &video_url).await?;
    store.replace(result)?;
    let r = store
        .current()
        .context("analysis missing from store after replace")?;

    let persist_start = std::time::Instant::now();
    let dir = run_dir(&cfg.output_dir, r);
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    debug!("Output directory: {}", dir.display());

    std::fs::write(dir.join("analysis.json"), serde_json::to_vec_pretty(r)?)?;
    debug!("Wrote analysis.json");

    export_report(r, &dir, BLOCKS_PER_PAGE)?;
    write_all_viz(&dir, r)?;
    debug!("Wrote viz bundle");

    info!(
        "Output persisted - duration={:.2}s, directory={}",
        persist_start.elapsed().as_secs_f32(),
        dir.display()
    );
    info!(
        "Analysis completed - total_duration={:.2}s, comments={}",
        pipeline_start.elapsed().as_secs_f32(),
        r.all_comments.len()
    );
    Ok(dir)
}
