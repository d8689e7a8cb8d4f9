//! Configuration module for the campus tree backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::AppError;

const MEGABYTE: usize = 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Root directory for object storage buckets
    pub storage_dir: PathBuf,
    /// Externally visible base URL (storage links, signage links)
    pub public_base_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Upper bound for a single uploaded image, in bytes
    pub max_image_bytes: usize,
    /// File the admin sessions are persisted to
    pub session_file: PathBuf,
    /// Admin session lifetime in hours
    pub session_ttl_hours: i64,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Bootstrap admin account, created at startup when both are set
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("TREES_DB_PATH")
            .unwrap_or_else(|_| "./data/trees.sqlite".to_string())
            .into();

        let storage_dir = env::var("TREES_STORAGE_DIR")
            .unwrap_or_else(|_| "./data/storage".to_string())
            .into();

        let public_base_url = env::var("TREES_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = parse_var("TREES_BIND_ADDR", "127.0.0.1:8080")?;

        let log_level = env::var("TREES_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let max_image_mb: usize = parse_var("TREES_MAX_IMAGE_MB", "5")?;
        let max_image_bytes = max_image_mb.checked_mul(MEGABYTE).ok_or_else(|| {
            AppError::Internal(format!("Invalid TREES_MAX_IMAGE_MB value: {}", max_image_mb))
        })?;

        let session_file = env::var("TREES_SESSION_FILE")
            .unwrap_or_else(|_| "./data/admin_sessions.json".to_string())
            .into();

        let session_ttl_hours = parse_var("TREES_SESSION_TTL_HOURS", "24")?;
        let request_timeout_secs = parse_var("TREES_REQUEST_TIMEOUT_SECS", "30")?;

        let admin_username = non_empty_var("TREES_ADMIN_USERNAME");
        let admin_password = non_empty_var("TREES_ADMIN_PASSWORD");

        Ok(Self {
            db_path,
            storage_dir,
            public_base_url,
            bind_addr,
            log_level,
            max_image_bytes,
            session_file,
            session_ttl_hours,
            request_timeout_secs,
            admin_username,
            admin_password,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, AppError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| AppError::Internal(format!("Invalid {} value: {}", name, raw)))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
