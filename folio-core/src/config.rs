//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/folio/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/folio/` (~/.config/folio/)
//! - State/Logs: `$XDG_STATE_HOME/folio/` (~/.local/state/folio/)

use crate::error::{Error, Result};
use http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Site identity and build mode
    #[serde(default)]
    pub site: SiteConfig,

    /// Analytics tracking configuration
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Response security headers and content security policy
    #[serde(default)]
    pub security: SecurityConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Site configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Hostname the site is served from; links to it are internal
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Production builds get security headers
    #[serde(default)]
    pub production: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            production: false,
        }
    }
}

fn default_hostname() -> String {
    "heliomedeiros.com".to_string()
}

/// Analytics tracking configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalyticsConfig {
    /// Google Analytics measurement id
    #[serde(default = "default_measurement_id")]
    pub measurement_id: String,

    /// Scroll-depth milestones in percent, ascending
    #[serde(default = "default_milestones")]
    pub milestones: Vec<u8>,

    /// Quiet period before a scroll burst is evaluated
    #[serde(default = "default_scroll_throttle_ms")]
    pub scroll_throttle_ms: u64,

    /// Intersection ratio at which a section counts as viewed
    #[serde(default = "default_section_threshold")]
    pub section_threshold: f64,

    /// Root margin applied to section visibility
    #[serde(default = "default_section_root_margin")]
    pub section_root_margin: String,

    /// How long to wait for the analytics library before giving up
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// How often to check whether the analytics library has loaded
    #[serde(default = "default_ready_poll_ms")]
    pub ready_poll_ms: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            measurement_id: default_measurement_id(),
            milestones: default_milestones(),
            scroll_throttle_ms: default_scroll_throttle_ms(),
            section_threshold: default_section_threshold(),
            section_root_margin: default_section_root_margin(),
            ready_timeout_ms: default_ready_timeout_ms(),
            ready_poll_ms: default_ready_poll_ms(),
        }
    }
}

impl AnalyticsConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        let valid_id = |c: char| c.is_ascii_alphanumeric() || c == '-';
        if self.measurement_id.is_empty() || !self.measurement_id.chars().all(valid_id) {
            return Err(Error::Config(format!(
                "analytics.measurement_id is not a valid measurement id: {:?}",
                self.measurement_id
            )));
        }
        if self.milestones.is_empty() {
            return Err(Error::Config(
                "analytics.milestones must not be empty".to_string(),
            ));
        }
        if self.milestones.iter().any(|m| *m == 0 || *m > 100) {
            return Err(Error::Config(
                "analytics.milestones must be between 1 and 100".to_string(),
            ));
        }
        if self.milestones.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Config(
                "analytics.milestones must be strictly ascending".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.section_threshold) {
            return Err(Error::Config(
                "analytics.section_threshold must be between 0 and 1".to_string(),
            ));
        }
        if self.scroll_throttle_ms == 0 {
            return Err(Error::Config(
                "analytics.scroll_throttle_ms must be positive".to_string(),
            ));
        }
        if self.ready_poll_ms == 0 || self.ready_timeout_ms == 0 {
            return Err(Error::Config(
                "analytics.ready_poll_ms and analytics.ready_timeout_ms must be positive"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn default_measurement_id() -> String {
    "G-GL0Q1PNV4W".to_string()
}

fn default_milestones() -> Vec<u8> {
    vec![25, 50, 75, 90]
}

fn default_scroll_throttle_ms() -> u64 {
    100
}

fn default_section_threshold() -> f64 {
    0.6
}

fn default_section_root_margin() -> String {
    "-80px 0px".to_string()
}

fn default_ready_timeout_ms() -> u64 {
    10_000
}

fn default_ready_poll_ms() -> u64 {
    100
}

/// Security header and content security policy configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// `X-Frame-Options` value
    #[serde(default = "default_frame_options")]
    pub frame_options: String,

    /// `X-Content-Type-Options` value
    #[serde(default = "default_content_type_options")]
    pub content_type_options: String,

    /// `Referrer-Policy` value
    #[serde(default = "default_referrer_policy")]
    pub referrer_policy: String,

    /// Extra origins allowed in `script-src`
    #[serde(default = "default_script_origins")]
    pub script_origins: Vec<String>,

    /// Extra origins allowed in `style-src`
    #[serde(default = "default_style_origins")]
    pub style_origins: Vec<String>,

    /// Extra origins allowed in `font-src`
    #[serde(default = "default_font_origins")]
    pub font_origins: Vec<String>,

    /// Extra origins allowed in `connect-src`
    #[serde(default = "default_connect_origins")]
    pub connect_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            frame_options: default_frame_options(),
            content_type_options: default_content_type_options(),
            referrer_policy: default_referrer_policy(),
            script_origins: default_script_origins(),
            style_origins: default_style_origins(),
            font_origins: default_font_origins(),
            connect_origins: default_connect_origins(),
        }
    }
}

impl SecurityConfig {
    /// Check that every header value is valid HTTP
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("security.frame_options", &self.frame_options),
            ("security.content_type_options", &self.content_type_options),
            ("security.referrer_policy", &self.referrer_policy),
        ] {
            if value.is_empty() {
                return Err(Error::Config(format!("{name} must not be empty")));
            }
            HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("{name} is not a valid header value: {e}")))?;
        }
        let origins = self
            .script_origins
            .iter()
            .chain(&self.style_origins)
            .chain(&self.font_origins)
            .chain(&self.connect_origins);
        for origin in origins {
            if origin.is_empty() || origin.contains(|c: char| c == ';' || c.is_whitespace()) {
                return Err(Error::Config(format!(
                    "invalid content security policy origin: {origin:?}"
                )));
            }
        }
        Ok(())
    }
}

fn default_frame_options() -> String {
    "DENY".to_string()
}

fn default_content_type_options() -> String {
    "nosniff".to_string()
}

fn default_referrer_policy() -> String {
    "strict-origin-when-cross-origin".to_string()
}

fn default_script_origins() -> Vec<String> {
    vec!["https://www.googletagmanager.com".to_string()]
}

fn default_style_origins() -> Vec<String> {
    vec!["fonts.googleapis.com".to_string()]
}

fn default_font_origins() -> Vec<String> {
    vec!["fonts.gstatic.com".to_string()]
}

fn default_connect_origins() -> Vec<String> {
    vec![
        "https://www.google-analytics.com".to_string(),
        "https://analytics.google.com".to_string(),
        "https://*.google-analytics.com".to_string(),
        "https://*.analytics.google.com".to_string(),
    ]
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        if self.site.hostname.is_empty() {
            return Err(Error::Config("site.hostname must not be empty".to_string()));
        }
        self.analytics.validate()?;
        self.security.validate()
    }

    /// Render the resolved configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/folio/config.toml` (~/.config/folio/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("folio").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/folio/` (~/.local/state/folio/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("folio")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/folio/folio.log` (~/.local/state/folio/folio.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("folio.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// Binaries call this before anything else reads these variables.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
