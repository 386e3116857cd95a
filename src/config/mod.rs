// Configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::theme::{ClockTheme, Color};

/// Shortest refresh period accepted from configuration
pub const MIN_REFRESH_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Custom element name the clock is registered under
    pub tag_name: String,

    /// Header text shown above the dial
    pub title: String,

    /// Redraw period in milliseconds
    pub refresh_interval_ms: u64,

    /// Initial accent (header) color, `#rrggbb`
    pub accent: String,

    /// Theme name: "dark" or "light"
    pub theme: String,

    /// Locale override such as "en_US"; environment default when unset
    pub locale: Option<String>,

    /// Initial `width` attribute, passed through verbatim
    pub width: Option<String>,

    /// Initial `height` attribute, passed through verbatim
    pub height: Option<String>,

    /// Explicit font file; discovered when unset
    pub font_path: Option<PathBuf>,

    /// Pixel size used for snapshots when the outer box has no usable size
    pub snapshot_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_name: "analog-clock".to_string(),
            title: "Analog Clock".to_string(),
            refresh_interval_ms: 1000,
            accent: "#ffffff".to_string(),
            theme: "dark".to_string(),
            locale: None,
            width: None,
            height: None,
            font_path: None,
            snapshot_size: 320,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate a specific configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(ConfigError::from)
            .context("Failed to serialize config")?;

        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("analog-clock-widget").join("config.toml"))
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> ConfigResult<()> {
        if self.refresh_interval_ms < MIN_REFRESH_INTERVAL_MS {
            return Err(ConfigError::InvalidValue(format!(
                "refresh_interval_ms must be at least {}, got {}",
                MIN_REFRESH_INTERVAL_MS, self.refresh_interval_ms
            )));
        }
        if Color::from_hex(&self.accent).is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "accent must be a #rrggbb color, got '{}'",
                self.accent
            )));
        }
        if !matches!(self.theme.as_str(), "dark" | "light") {
            return Err(ConfigError::InvalidValue(format!(
                "theme must be 'dark' or 'light', got '{}'",
                self.theme
            )));
        }
        if self.snapshot_size == 0 {
            return Err(ConfigError::InvalidValue(
                "snapshot_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Parsed accent color; white if the string is malformed
    pub fn accent_color(&self) -> Color {
        Color::from_hex(&self.accent).unwrap_or(Color::rgb(255, 255, 255))
    }

    pub fn clock_theme(&self) -> ClockTheme {
        ClockTheme::from_name(&self.theme)
    }
}
