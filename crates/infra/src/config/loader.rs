//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required, per system (`ERP`/`CRM`):
//! - `SYNCBRIDGE_<SYS>_BASE_URL`
//! - `SYNCBRIDGE_<SYS>_USERNAME`, `SYNCBRIDGE_<SYS>_PASSWORD`,
//!   `SYNCBRIDGE_<SYS>_APP_KEY`
//! - `SYNCBRIDGE_<SYS>_WEBHOOK_SECRET`
//!
//! Optional:
//! - `SYNCBRIDGE_CACHE_TTL_SECONDS`, `SYNCBRIDGE_CACHE_MAX_CAPACITY`
//! - `SYNCBRIDGE_RETRY_MAX_ATTEMPTS`, `SYNCBRIDGE_RETRY_BACKOFF_MS`

use std::path::{Path, PathBuf};

use syncbridge_domain::{
    CacheConfig, Credentials, Result, RetryConfig, SyncBridgeConfig, SyncError, SystemConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
pub fn load() -> Result<SyncBridgeConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present.
pub fn load_from_env() -> Result<SyncBridgeConfig> {
    let mut cache = CacheConfig::default();
    if let Some(ttl) = env_parse::<u64>("SYNCBRIDGE_CACHE_TTL_SECONDS")? {
        cache.ttl_seconds = ttl;
    }
    if let Some(capacity) = env_parse::<u64>("SYNCBRIDGE_CACHE_MAX_CAPACITY")? {
        cache.max_capacity = capacity;
    }

    let mut retry = RetryConfig::default();
    if let Some(attempts) = env_parse::<u32>("SYNCBRIDGE_RETRY_MAX_ATTEMPTS")? {
        retry.max_attempts = attempts;
    }
    if let Some(backoff) = env_parse::<u64>("SYNCBRIDGE_RETRY_BACKOFF_MS")? {
        retry.backoff_base_ms = backoff;
    }

    Ok(SyncBridgeConfig {
        erp: system_from_env("ERP")?,
        crm: system_from_env("CRM")?,
        cache,
        retry,
    })
}

fn system_from_env(prefix: &str) -> Result<SystemConfig> {
    Ok(SystemConfig {
        base_url: env_var(&format!("SYNCBRIDGE_{prefix}_BASE_URL"))?,
        credentials: Credentials {
            username: env_var(&format!("SYNCBRIDGE_{prefix}_USERNAME"))?,
            password: env_var(&format!("SYNCBRIDGE_{prefix}_PASSWORD"))?,
            app_key: env_var(&format!("SYNCBRIDGE_{prefix}_APP_KEY"))?,
        },
        webhook_secret: env_var(&format!("SYNCBRIDGE_{prefix}_WEBHOOK_SECRET"))?,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
pub fn load_from_file(path: Option<PathBuf>) -> Result<SyncBridgeConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SyncError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SyncError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, detecting the format from the
/// file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<SyncBridgeConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory, up to two parent directories, and the
/// executable's directory for `config.{json,toml}` or
/// `syncbridge.{json,toml}`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for dir in [cwd.clone(), cwd.join(".."), cwd.join("../..")] {
            push_candidates(&mut candidates, &dir);
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            push_candidates(&mut candidates, exe_dir);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn push_candidates(candidates: &mut Vec<PathBuf>, dir: &Path) {
    for name in ["config.json", "config.toml", "syncbridge.json", "syncbridge.toml"] {
        candidates.push(dir.join(name));
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| SyncError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional environment variable; `None` when unset, an error when
/// set but unparseable.
fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| SyncError::Config(format!("Invalid value for {key}: {raw}"))),
        Err(_) => Ok(None),
    }
}
