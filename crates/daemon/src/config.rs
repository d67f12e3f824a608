//! Daemon configuration, read once from `WALKIN_*` environment variables

use std::path::PathBuf;
use std::str::FromStr;
use walkin_core::application::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_TRIAL_DAYS};
use walkin_core::domain::MAX_TRIAL_DAYS;
use walkin_core::{AppError, Result};

const DEFAULT_DB_PATH: &str = "~/.walkin/queue.db";
const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: String,
    pub http_host: String,
    pub http_port: u16,
    pub log_format: LogFormat,
    /// Daily-rolled log files go here in addition to stdout
    pub log_dir: Option<PathBuf>,
    pub max_commit_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub trial_days: i64,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("WALKIN_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let trial_days: i64 = parse_var(&lookup, "WALKIN_TRIAL_DAYS", DEFAULT_TRIAL_DAYS)?;
        if !(0..=MAX_TRIAL_DAYS).contains(&trial_days) {
            return Err(AppError::Config(format!(
                "WALKIN_TRIAL_DAYS must be between 0 and {}",
                MAX_TRIAL_DAYS
            )));
        }

        Ok(Self {
            db_path: shellexpand::tilde(&db_path).into_owned(),
            http_host: lookup("WALKIN_HTTP_HOST").unwrap_or_else(|| DEFAULT_HTTP_HOST.to_string()),
            http_port: parse_var(&lookup, "WALKIN_HTTP_PORT", DEFAULT_HTTP_PORT)?,
            log_format: parse_var(&lookup, "WALKIN_LOG_FORMAT", LogFormat::Pretty)?,
            log_dir: lookup("WALKIN_LOG_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(|d| PathBuf::from(shellexpand::tilde(&d).into_owned())),
            max_commit_attempts: parse_var(
                &lookup,
                "WALKIN_MAX_COMMIT_ATTEMPTS",
                DEFAULT_MAX_ATTEMPTS,
            )?,
            retry_base_delay_ms: parse_var(
                &lookup,
                "WALKIN_RETRY_BASE_DELAY_MS",
                DEFAULT_BASE_DELAY_MS,
            )?,
            trial_days,
        })
    }

    /// sqlx URL for the configured database path
    pub fn database_url(&self) -> String {
        if self.db_path.starts_with("sqlite:") {
            self.db_path.clone()
        } else {
            format!("sqlite://{}", self.db_path)
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {}='{}': {}", name, raw, e))),
    }
}
