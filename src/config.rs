use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const APP_DIR: &str = "yt_comment_vibes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub output_dir: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000/analyze".to_string(),
            output_dir: PathBuf::from("out"),
            data_dir: None,
            page_size: crate::explore::DEFAULT_PAGE_SIZE,
            timeout_secs: 120,
        }
    }
}

impl AppConfig {
    /// Where the session's user record and current analysis live.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
    }

    /// `VIBES_API_URL` and `VIBES_DATA_DIR` win over the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("VIBES_API_URL").filter(|s| !s.trim().is_empty()) {
            debug!("api_url overridden by VIBES_API_URL");
            self.api_url = url;
        }
        if let Some(dir) = lookup("VIBES_DATA_DIR").filter(|s| !s.trim().is_empty()) {
            debug!("data_dir overridden by VIBES_DATA_DIR");
            self.data_dir = Some(PathBuf::from(dir));
        }
    }
}

/// Default config file location: `VIBES_CONFIG`, else `<VIBES_CONFIG_DIR or config_dir>/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("VIBES_CONFIG") {
        return Some(PathBuf::from(p));
    }
    let base = match std::env::var("VIBES_CONFIG_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => dirs::config_dir()?.join(APP_DIR),
    };
    Some(base.join("config.yaml"))
}

pub fn parse_config(yaml: &str) -> Result<AppConfig> {
    let cfg: AppConfig = serde_yaml::from_str(yaml).context("Parsing config YAML")?;
    if cfg.page_size == 0 {
        return Err(anyhow!("page_size must be at least 1"));
    }
    Ok(cfg)
}

/// An explicit path must exist; the default path is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let (path, required) = match explicit {
        Some(p) => (Some(p.to_path_buf()), true),
        None => (default_config_path(), false),
    };

    let mut cfg = match path {
        Some(p) if p.exists() => {
            debug!("Loading config from {}", p.display());
            let text = std::fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
            parse_config(&text).with_context(|| format!("in {}", p.display()))?
        }
        Some(p) if required => {
            return Err(anyhow!(
                "config not found at {}\n\
                 Example config.yaml:\n\
                 api_url: \"http://127.0.0.1:8000/analyze\"\npage_size: 50\ntimeout_secs: 120\n",
                p.display()
            ));
        }
        _ => {
            debug!("No config file, using defaults");
            AppConfig::default()
        }
    };

    cfg.apply_env(|k| std::env::var(k).ok());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = parse_config("api_url: \"http://backend:9000/analyze\"\n").unwrap();
        assert_eq!(cfg.api_url, "http://backend:9000/analyze");
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.timeout_secs, 120);
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(parse_config("page_size: 0").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| match k {
            "VIBES_API_URL" => Some("http://other/analyze".to_string()),
            "VIBES_DATA_DIR" => Some("/tmp/vibes".to_string()),
            _ => None,
        });
        assert_eq!(cfg.api_url, "http://other/analyze");
        assert_eq!(cfg.data_dir(), PathBuf::from("/tmp/vibes"));
    }

    #[test]
    fn explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.yaml");
        std::fs::write(&p, "page_size: 10\noutput_dir: reports\n").unwrap();
        let cfg = load_config(Some(&p)).unwrap();
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.output_dir, PathBuf::from("reports"));
    }
}
