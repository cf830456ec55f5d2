use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::executor::DEFAULT_TIMEOUT_MS;

pub const DEFAULT_DB_PATH: &str = "data/crm.db";
pub const DEFAULT_PROGRESS_PATH: &str = ".sqlgrade/progress.db";
pub const DEFAULT_QUESTIONS_PATH: &str = "questions.yaml";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub progress_path: PathBuf,
    pub questions_path: PathBuf,
    pub query_timeout_ms: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            progress_path: PathBuf::from(DEFAULT_PROGRESS_PATH),
            questions_path: PathBuf::from(DEFAULT_QUESTIONS_PATH),
            query_timeout_ms: DEFAULT_TIMEOUT_MS,
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Applies overrides from `lookup`; values that fail to parse are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = lookup("SQLGRADE_DB") {
            cfg.db_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SQLGRADE_PROGRESS_DB") {
            cfg.progress_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SQLGRADE_QUESTIONS") {
            cfg.questions_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SQLGRADE_TIMEOUT_MS") {
            if let Ok(n) = v.trim().parse() {
                cfg.query_timeout_ms = n;
            }
        }
        if let Some(v) = lookup("SQLGRADE_LOG") {
            cfg.log_level = v;
        }
        cfg
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}
