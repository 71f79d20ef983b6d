//! Configuration settings for the rota service.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::schedule::{TimeOfDay, TimeWindow};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("config.toml"),
            PathBuf::from("rota.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("rota/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".rota/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.schedule.window_start >= self.schedule.window_end {
            return Err(ConfigError::Invalid(
                "schedule.window_start must be before schedule.window_end".to_string(),
            )
            .into());
        }
        if self.schedule.units_per_hour <= 0.0 {
            return Err(
                ConfigError::Invalid("schedule.units_per_hour must be > 0".to_string()).into(),
            );
        }
        if self.auth.session_ttl_secs == 0 {
            return Err(
                ConfigError::Invalid("auth.session_ttl_secs must be > 0".to_string()).into(),
            );
        }
        if let Some(ref bootstrap) = self.auth.bootstrap {
            if bootstrap.username.is_empty() {
                return Err(ConfigError::MissingField("auth.bootstrap.username".to_string()).into());
            }
            if bootstrap.password.is_empty() {
                return Err(ConfigError::MissingField("auth.bootstrap.password".to_string()).into());
            }
        }
        Ok(())
    }

    /// The visible calendar window described by the schedule section.
    pub fn time_window(&self) -> TimeWindow {
        TimeWindow {
            start: self.schedule.window_start,
            end: self.schedule.window_end,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// HTTP port.
    pub port: u16,
    /// Enable CORS.
    pub enable_cors: bool,
    /// Allowed origins for CORS.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Enforce authentication on non-public routes.
    pub enabled: bool,
    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,
    /// Admin account created at startup when the user store is empty.
    pub bootstrap: Option<BootstrapAdmin>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session_ttl_secs: 24 * 60 * 60,
            bootstrap: None,
        }
    }
}

/// Bootstrap admin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapAdmin {
    /// Login name.
    pub username: String,
    /// Plaintext password, digested on creation.
    pub password: String,
    /// Email address.
    pub email: String,
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: String::new(),
            email: "admin@localhost".to_string(),
        }
    }
}

/// Schedule rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Start of the visible calendar window.
    pub window_start: TimeOfDay,
    /// End of the visible calendar window.
    pub window_end: TimeOfDay,
    /// Vertical length units per hour of the rendered grid.
    pub units_per_hour: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let window = TimeWindow::default();
        Self {
            window_start: window.start,
            window_end: window.end,
            units_per_hour: 4.0,
        }
    }
}
