use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::models::AnalysisResult;

const STORE_FILE: &str = "current_analysis.json";

/// The session's current analysis. Replaced wholesale, never edited in place.
#[derive(Debug, Default)]
pub struct AnalysisStore {
    current: Option<AnalysisResult>,
    path: Option<PathBuf>,
}

impl AnalysisStore {
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the store backed by `<data_dir>/current_analysis.json`, loading it if present.
    /// A file that no longer decodes is treated as no result.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(STORE_FILE);
        let current = if path.exists() {
            let bytes = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
            match serde_json::from_slice::<AnalysisResult>(&bytes) {
                Ok(result) => {
                    debug!("Loaded stored analysis - id={}, comments={}", result.result_id, result.all_comments.len());
                    Some(result)
                }
                Err(e) => {
                    warn!("Ignoring unreadable stored analysis - path={}, err={}", path.display(), e);
                    None
                }
            }
        } else {
            None
        };
        Ok(Self {
            current,
            path: Some(path),
        })
    }

    pub fn current(&self) -> Option<&AnalysisResult> {
        self.current.as_ref()
    }

    /// Drops the current result before a new request starts.
    pub fn clear(&mut self) -> Result<()> {
        self.current = None;
        if let Some(path) = &self.path {
            if path.exists() {
                std::fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
                debug!("Cleared stored analysis at {}", path.display());
            }
        }
        Ok(())
    }

    pub fn replace(&mut self, result: AnalysisResult) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
            }
            // Write-then-rename; the target is never left half written.
            let tmp = path.with_extension("json.tmp");
            std::fs::write(&tmp, serde_json::to_vec_pretty(&result)?)
                .with_context(|| format!("write {}", tmp.display()))?;
            std::fs::rename(&tmp, path)
                .with_context(|| format!("rename {} to {}", tmp.display(), path.display()))?;
            info!("Stored analysis - id={}, path={}", result.result_id, path.display());
        }
        self.current = Some(result);
        Ok(())
    }
}
