//! Configuration management for Phreak
//!
//! Repository-level settings for the browser, the capture cycle and the planner.
//! Every field has a default so a partial `config.toml` is always valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{PhreakError, Result};

/// Repository-level Phreak configuration
///
/// Loaded from `.phreak/config.toml` in the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhreakConfig {
    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Capture cycle settings
    #[serde(default)]
    pub session: SessionSettings,

    /// Planner settings
    #[serde(default)]
    pub planner: PlannerSettings,
}

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Run without a visible window
    #[serde(default)]
    pub headless: bool,

    /// Window width in CSS pixels
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Window height in CSS pixels
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Proxy every request through this server (e.g. `http://localhost:8181`)
    #[serde(default)]
    pub proxy_server: Option<String>,

    /// Override the user agent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Navigation timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Treat a reported pixel ratio of 1 on macOS as 2
    #[serde(default = "default_true")]
    pub correct_macos_ratio: bool,
}

/// Capture cycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Root URL of the in-scope domain; `RETURN DOMAIN` navigates here
    #[serde(default = "default_scoped_domain")]
    pub scoped_domain: String,

    /// Delay after each command so the page can react
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Hide page content in the interactive shell
    #[serde(default)]
    pub quiet: bool,
}

/// Planner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Model used for completions
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Maximum tokens in a planner reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Credentials for the in-scope domain, shown to the planner as `user:password`
    #[serde(default)]
    pub credentials: Option<String>,

    /// Maximum characters of page content included in a prompt
    #[serde(default = "default_content_limit")]
    pub content_limit: usize,

    /// Maximum characters of the current URL included in a prompt
    #[serde(default = "default_url_limit")]
    pub url_limit: usize,
}

// Default value providers
fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    1080
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_scoped_domain() -> String {
    "http://localhost".to_string()
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_max_tokens() -> usize {
    256
}

fn default_content_limit() -> usize {
    4500
}

fn default_url_limit() -> usize {
    100
}

impl PhreakConfig {
    /// Location of the configuration file under `root`
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(".phreak/config.toml")
    }

    /// Load configuration from `.phreak/config.toml` or use defaults
    pub fn load_or_default(root: &Path) -> Result<Self> {
        Self::load_file_or_default(&Self::path_in(root))
    }

    /// Load configuration from an explicit file, falling back to defaults when absent
    pub fn load_file_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config = toml::from_str(&content).map_err(|e| {
                PhreakError::Config(format!("Failed to parse {}: {}", config_path.display(), e))
            })?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `.phreak/config.toml`
    pub fn write_default(root: &Path) -> Result<PathBuf> {
        let config_dir = root.join(".phreak");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = Self::path_in(root);
        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| PhreakError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }
}

impl Default for PhreakConfig {
    fn default() -> Self {
        Self {
            browser: BrowserSettings::default(),
            session: SessionSettings::default(),
            planner: PlannerSettings::default(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            proxy_server: None,
            user_agent: None,
            timeout_seconds: default_timeout_seconds(),
            correct_macos_ratio: true,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            scoped_domain: default_scoped_domain(),
            settle_delay_ms: default_settle_delay_ms(),
            quiet: false,
        }
    }
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            credentials: None,
            content_limit: default_content_limit(),
            url_limit: default_url_limit(),
        }
    }
}
