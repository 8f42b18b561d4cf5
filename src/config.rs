//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MBOXFREQ_CONFIG` (environment variable)
//! 2. `~/.config/mboxfreq/config.toml` (Linux/macOS)
//!    `%APPDATA%\mboxfreq\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! Command-line flags override whatever the file provides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default reporting threshold (messages or bytes).
pub const DEFAULT_THRESHOLD: u64 = 50;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub general: LoggingConfig,
    /// Archive scanning settings.
    pub scan: ScanConfig,
    /// Aggregation and reporting settings.
    pub report: ReportConfig,
}

/// Logging settings, handed explicitly to the subscriber setup in `main`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Also write logs to this file (no ANSI colors, never rotated).
    pub log_file: Option<PathBuf>,
}

/// Archive scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Read buffer size in bytes (default: 131072 = 128 KB).
    pub read_buffer_size: usize,
    /// Stop indexing after this many messages.
    pub max_messages: Option<usize>,
    /// Draw progress bars on stderr.
    pub show_progress: bool,
}

/// Aggregation and reporting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Senders must exceed this value to be reported.
    pub threshold: u64,
    /// Append-only file receiving per-message failure records.
    pub error_log: PathBuf,
}

// ── Default implementations ─────────────────────────────────────

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 128 * 1024,
            max_messages: None,
            show_progress: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            error_log: PathBuf::from("error_log.txt"),
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MBOXFREQ_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mboxfreq").join("config.toml"))
}
