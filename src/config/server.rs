//! HTTP server settings

use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Predictions allowed to run inside the model at once; further
    /// requests wait for a slot
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_predictions: usize,

    /// Whole-request timeout, including time spent waiting for a slot
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    #[serde(default)]
    pub cors: CorsConfig,

    /// Trace every request through tower-http
    #[serde(default = "default_true")]
    pub request_logging: bool,
}

/// Cross-origin settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Allowed origins; empty allows any
    #[serde(default)]
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_concurrent() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_timeout() -> u64 {
    60
}

fn default_max_body_size() -> usize {
    20 * 1024 * 1024 // 20 MB
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_concurrent_predictions: default_max_concurrent(),
            request_timeout_secs: default_timeout(),
            max_body_size: default_max_body_size(),
            cors: CorsConfig::default(),
            request_logging: true,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
