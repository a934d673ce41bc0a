//! Configuration and color scheme management for zaik.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.zaik/config.toml`
//! - Environment overrides (`ZAIK_API_URL`, `ZAIK_ADVENTURE`)
//! - Built-in color schemes for the transcript view
//!
//! # Configuration File
//!
//! ```toml
//! # Backend base address
//! base_url = "http://localhost:8000"
//!
//! # Adventure every new session starts with
//! adventure_id = "halloween_2025"
//!
//! # Optional player name sent with new sessions
//! player_name = "Ada"
//!
//! # Per-request timeout; requests are never retried
//! request_timeout_secs = 30
//!
//! # Color scheme: default, solarized-dark, nord, dracula, tokyo-night
//! color_scheme = "nord"
//!
//! [status_bar]
//! visible = true
//!
//! [loading]
//! frame_ms = 120
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::state::SessionSettings;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ADVENTURE: &str = "halloween_2025";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base address
    pub base_url: String,
    /// Adventure identifier sent on session start
    pub adventure_id: String,
    /// Player name sent on session start
    pub player_name: Option<String>,
    /// Timeout applied to every backend request
    pub request_timeout_secs: u64,
    /// Color scheme name
    pub color_scheme: String,
    /// Status bar settings
    pub status_bar: StatusBarConfig,
    /// Loading indicator settings
    pub loading: LoadingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            adventure_id: DEFAULT_ADVENTURE.to_string(),
            player_name: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            color_scheme: "default".to_string(),
            status_bar: StatusBarConfig::default(),
            loading: LoadingConfig::default(),
        }
    }
}

/// Status bar configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusBarConfig {
    pub visible: bool,
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self { visible: true }
    }
}

/// Loading indicator configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Milliseconds per animation frame
    pub frame_ms: u64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self { frame_ms: 120 }
    }
}

impl Config {
    /// Load configuration from `~/.zaik/config.toml`.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::get_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `ZAIK_API_URL` / `ZAIK_ADVENTURE` from the environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("ZAIK_API_URL").ok(),
            std::env::var("ZAIK_ADVENTURE").ok(),
        );
    }

    fn apply_overrides(&mut self, base_url: Option<String>, adventure_id: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(id) = adventure_id.filter(|a| !a.trim().is_empty()) {
            self.adventure_id = id;
        }
    }

    /// Check the values the client cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".to_string()));
        }
        if self.adventure_id.trim().is_empty() {
            return Err(ConfigError::Invalid("adventure_id must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn loading_frame(&self) -> Duration {
        Duration::from_millis(self.loading.frame_ms.max(16))
    }

    /// Values the session operations are driven with
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            base_url: self.base_url.trim().to_string(),
            adventure_id: self.adventure_id.clone(),
            player_name: self
                .player_name
                .clone()
                .filter(|n| !n.trim().is_empty()),
        }
    }

    /// Get the color scheme
    pub fn get_color_scheme(&self) -> ColorScheme {
        ColorScheme::by_name(&self.color_scheme)
    }

    /// Directory for config and log files
    pub fn data_dir() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".zaik"))
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        Self::data_dir().map(|dir| dir.join("config.toml"))
    }
}

/// Color definition (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Color scheme definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColorScheme {
    pub name: String,

    // Transcript entries
    pub output_fg: Color,
    pub echo_fg: Color,
    pub error_fg: Color,
    pub image_fg: Color,
    pub loading_fg: Color,

    // Command input line
    pub input_fg: Color,
    pub input_disabled_fg: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_alert_bg: Color,
    pub status_alert_fg: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_scheme()
    }
}

impl ColorScheme {
    /// Default color scheme (green phosphor)
    pub fn default_scheme() -> Self {
        Self {
            name: "default".to_string(),

            output_fg: Color::new(0, 220, 90),
            echo_fg: Color::new(200, 255, 200),
            error_fg: Color::new(255, 85, 85),
            image_fg: Color::new(100, 150, 255),
            loading_fg: Color::new(0, 150, 60),

            input_fg: Color::new(230, 255, 230),
            input_disabled_fg: Color::new(90, 110, 90),

            status_bar_bg: Color::new(0, 100, 0),
            status_bar_fg: Color::new(255, 255, 255),
            status_alert_bg: Color::new(200, 200, 0),
            status_alert_fg: Color::new(0, 0, 0),
        }
    }

    /// Solarized Dark scheme
    pub fn solarized_dark() -> Self {
        Self {
            name: "solarized-dark".to_string(),

            output_fg: Color::new(147, 161, 161),
            echo_fg: Color::new(42, 161, 152),
            error_fg: Color::new(220, 50, 47),
            image_fg: Color::new(38, 139, 210),
            loading_fg: Color::new(101, 123, 131),

            input_fg: Color::new(238, 232, 213),
            input_disabled_fg: Color::new(88, 110, 117),

            status_bar_bg: Color::new(7, 54, 66),
            status_bar_fg: Color::new(147, 161, 161),
            status_alert_bg: Color::new(181, 137, 0),
            status_alert_fg: Color::new(0, 43, 54),
        }
    }

    /// Nord scheme
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),

            output_fg: Color::new(216, 222, 233),
            echo_fg: Color::new(136, 192, 208),
            error_fg: Color::new(191, 97, 106),
            image_fg: Color::new(129, 161, 193),
            loading_fg: Color::new(147, 161, 181),

            input_fg: Color::new(236, 239, 244),
            input_disabled_fg: Color::new(76, 86, 106),

            status_bar_bg: Color::new(59, 66, 82),
            status_bar_fg: Color::new(216, 222, 233),
            status_alert_bg: Color::new(235, 203, 139),
            status_alert_fg: Color::new(46, 52, 64),
        }
    }

    /// Dracula scheme
    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),

            output_fg: Color::new(248, 248, 242),
            echo_fg: Color::new(80, 250, 123),
            error_fg: Color::new(255, 85, 85),
            image_fg: Color::new(139, 233, 253),
            loading_fg: Color::new(98, 114, 164),

            input_fg: Color::new(248, 248, 242),
            input_disabled_fg: Color::new(98, 114, 164),

            status_bar_bg: Color::new(68, 71, 90),
            status_bar_fg: Color::new(248, 248, 242),
            status_alert_bg: Color::new(255, 184, 108),
            status_alert_fg: Color::new(40, 42, 54),
        }
    }

    /// Tokyo Night scheme
    pub fn tokyo_night() -> Self {
        Self {
            name: "tokyo-night".to_string(),

            output_fg: Color::new(169, 177, 214),
            echo_fg: Color::new(158, 206, 106),
            error_fg: Color::new(247, 118, 142),
            image_fg: Color::new(122, 162, 247),
            loading_fg: Color::new(86, 95, 137),

            input_fg: Color::new(192, 202, 245),
            input_disabled_fg: Color::new(86, 95, 137),

            status_bar_bg: Color::new(36, 40, 59),
            status_bar_fg: Color::new(169, 177, 214),
            status_alert_bg: Color::new(224, 175, 104),
            status_alert_fg: Color::new(26, 27, 38),
        }
    }

    /// Get scheme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "solarized-dark" | "solarized_dark" | "solarized" => Self::solarized_dark(),
            "nord" => Self::nord(),
            "dracula" => Self::dracula(),
            "tokyo-night" | "tokyo_night" | "tokyonight" => Self::tokyo_night(),
            _ => Self::default_scheme(),
        }
    }

    /// List available schemes
    pub fn list() -> Vec<&'static str> {
        vec!["default", "solarized-dark", "nord", "dracula", "tokyo-night"]
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.adventure_id, "halloween_2025");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml_str(
            r#"
            base_url = "https://zaik.example.com"
            player_name = "Ada"
            color_scheme = "nord"

            [status_bar]
            visible = false
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://zaik.example.com");
        assert_eq!(config.adventure_id, DEFAULT_ADVENTURE);
        assert!(!config.status_bar.visible);
        assert_eq!(config.loading.frame_ms, 120);
        assert_eq!(config.get_color_scheme().name, "nord");

        let settings = config.session_settings();
        assert_eq!(settings.player_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Config::from_toml_str("request_timeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.adventure_id = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.base_url.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_skip_blank_values() {
        let mut config = Config::default();
        config.apply_overrides(Some("http://10.0.0.2:9000".to_string()), Some(" ".to_string()));
        assert_eq!(config.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.adventure_id, DEFAULT_ADVENTURE);
    }

    #[test]
    fn test_blank_player_name_is_dropped() {
        let mut config = Config::default();
        config.player_name = Some("   ".to_string());
        assert!(config.session_settings().player_name.is_none());
    }

    #[test]
    fn test_scheme_lookup() {
        assert_eq!(ColorScheme::by_name("Tokyo_Night").name, "tokyo-night");
        assert_eq!(ColorScheme::by_name("no-such-theme").name, "default");
        for name in ColorScheme::list() {
            assert_eq!(ColorScheme::by_name(name).name, name);
        }
    }
}
