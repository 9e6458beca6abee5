use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
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
    /// Largest accepted request body, in bytes. Bounds image uploads.
    pub max_upload_bytes: usize,
    pub inference: InferenceConfig,
    /// Initial accurate-mode setting of the session (default: `true`).
    pub accurate_mode: bool,
}

/// Where and how to reach the inference collaborators.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Base URL of the inference service (default: `http://localhost:8000`).
    pub url: String,
    /// Per-request timeout in seconds (default: `20`).
    pub timeout_secs: u64,
    /// Fit guided calibrations in-process instead of calling `/calibrate`.
    pub local_calibration: bool,
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `MAX_UPLOAD_BYTES`       | `20971520`                 |
    /// | `INFERENCE_URL`          | `http://localhost:8000`    |
    /// | `INFERENCE_TIMEOUT_SECS` | `20`                       |
    /// | `ACCURATE_MODE`          | `true`                     |
    /// | `LOCAL_CALIBRATION`      | `false`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "20971520".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let url = std::env::var("INFERENCE_URL").unwrap_or_else(|_| "http://localhost:8000".into());

        let timeout_secs: u64 = std::env::var("INFERENCE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("INFERENCE_TIMEOUT_SECS must be a valid u64");

        let accurate_mode = env_flag("ACCURATE_MODE", true);
        let local_calibration = env_flag("LOCAL_CALIBRATION", false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            inference: InferenceConfig {
                url,
                timeout_secs,
                local_calibration,
            },
            accurate_mode,
        }
    }
}

/// Parse a boolean env var. Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => parse_flag(&raw)
            .unwrap_or_else(|| panic!("{name} must be a boolean, got '{raw}'")),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
