use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Default upload body limit: 25 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum accepted request body size in bytes (default: 25 MiB).
    pub max_upload_bytes: usize,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Where uploaded media lives and how it is addressed.
    pub media: MediaConfig,
}

/// Location and public addressing of uploaded media files.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory files are written to and served from.
    pub root: PathBuf,
    /// URL path prefix media is served under, with a leading slash and no
    /// trailing slash (e.g. `/media`).
    pub url_prefix: String,
    /// Scheme and authority used for absolute media URLs. When unset, the
    /// request's `Host` header is used.
    pub public_base_url: Option<String>,
}

impl MediaConfig {
    /// Load media configuration from environment variables.
    ///
    /// | Env Var           | Default  |
    /// |-------------------|----------|
    /// | `MEDIA_ROOT`      | `media`  |
    /// | `MEDIA_URL`       | `/media` |
    /// | `PUBLIC_BASE_URL` | unset    |
    pub fn from_env() -> Self {
        let root = PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into()));

        let url_prefix =
            normalize_url_prefix(&std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media".into()));

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        Self {
            root,
            url_prefix,
            public_base_url,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `MAX_UPLOAD_BYTES`     | `26214400`              |
    /// | `LOG_FORMAT`           | `text` (or `json`)      |
    ///
    /// See [`JwtConfig::from_env`] and [`MediaConfig::from_env`] for the
    /// remaining variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let log_json = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            log_json,
            jwt: JwtConfig::from_env(),
            media: MediaConfig::from_env(),
        }
    }
}

/// Force a leading slash and strip trailing ones: `media/` -> `/media`.
///
/// # Panics
///
/// Panics if the prefix is empty or `/`, since media cannot share the root
/// path with the API.
fn normalize_url_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    assert!(!trimmed.is_empty(), "MEDIA_URL must not be the root path");
    format!("/{trimmed}")
}
