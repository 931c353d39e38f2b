use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const USER_FILE: &str = "user.json";

/// Placeholder identity kept on disk. Nothing here is verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub logged_in_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    user: Option<UserRecord>,
}

impl Session {
    /// Loads `<data_dir>/user.json` if it exists. An unreadable record is treated as logged out.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(USER_FILE);
        let user = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<UserRecord>(&bytes) {
                Ok(u) => {
                    debug!("Loaded user record - email={}", u.email);
                    Some(u)
                }
                Err(e) => {
                    warn!("Ignoring corrupt user record at {} - {}", path.display(), e);
                    None
                }
            },
            Err(_) => None,
        };
        Self { path, user }
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    /// Returns `Ok(false)` without touching disk when either field is blank.
    pub fn login(&mut self, email: &str, password: &str) -> Result<bool> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Ok(false);
        }
        let record = UserRecord {
            email: email.to_string(),
            logged_in_at: Utc::now(),
        };
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&record)?)
            .with_context(|| format!("write {}", self.path.display()))?;
        info!("Logged in - email={}", record.email);
        self.user = Some(record);
        Ok(true)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.user = None;
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("remove {}", self.path.display()))?;
        }
        info!("Logged out");
        Ok(())
    }
}
