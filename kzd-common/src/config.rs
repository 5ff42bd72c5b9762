//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "KOZENDO_ROOT_FOLDER";
/// Environment variable overriding the TOML config file location
pub const CONFIG_PATH_ENV: &str = "KOZENDO_CONFIG";
/// Environment variables holding the Gemini API key, in priority order
pub const API_KEY_ENVS: [&str; 2] = ["GOOGLE_API_KEY", "KOZENDO_GEMINI_API_KEY"];
/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "kozendo.db";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5740
}

/// Generative-language API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Models tried in order until one produces an insight
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Attempts per model before moving to the next one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First retry delay; doubles on each further attempt
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Pause before answering with fallback content
    #[serde(default)]
    pub fallback_delay_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            models: default_models(),
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            fallback_delay_ms: 0,
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1/models".to_string()
}

fn default_models() -> Vec<String> {
    vec![
        "gemini-3-flash".to_string(),
        "gemini-2.5-flash".to_string(),
        "gemini-2.0-flash".to_string(),
    ]
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Create the root folder if missing and return the database path inside it
pub fn prepare_root_folder(root_folder: &Path) -> Result<PathBuf> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(root_folder.join(DATABASE_FILE))
}

/// Location of the TOML config file
///
/// `KOZENDO_CONFIG` wins; otherwise the per-user config directory.
pub fn config_file_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|d| d.join("kozendo").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Load the TOML config, falling back to defaults when no file exists
pub fn load_toml_config() -> Result<TomlConfig> {
    let path = config_file_path()?;
    if path.exists() {
        load_toml_config_from(&path)
    } else {
        Ok(TomlConfig::default())
    }
}

pub fn load_toml_config_from(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Resolve the Gemini API key
///
/// **Priority:** `GOOGLE_API_KEY` → `KOZENDO_GEMINI_API_KEY` → TOML `gemini.api_key`
///
/// Returns the key together with the name of the source it came from.
pub fn resolve_api_key(toml_config: &TomlConfig) -> Option<(String, &'static str)> {
    let mut found: Vec<(String, &'static str)> = Vec::new();

    for name in API_KEY_ENVS {
        if let Ok(key) = std::env::var(name) {
            if is_valid_key(&key) {
                found.push((key.trim().to_string(), name));
            }
        }
    }

    if let Some(key) = &toml_config.gemini.api_key {
        if is_valid_key(key) {
            found.push((key.trim().to_string(), "TOML"));
        }
    }

    if found.len() > 1 {
        let sources: Vec<&str> = found.iter().map(|(_, source)| *source).collect();
        warn!(
            "Gemini API key found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    found.into_iter().next()
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("kozendo"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/kozendo"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("kozendo"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/kozendo"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("kozendo"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\kozendo"))
    } else {
        PathBuf::from("./kozendo_data")
    }
}
