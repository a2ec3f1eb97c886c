//! Bot configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/droplink/bot.toml`
//! - Windows: `%APPDATA%/droplink/bot.toml`
//!
//! The bot token is deliberately not a config field; it always comes from
//! the `BOT_TOKEN` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use droplink_hosting::HostingConfig;
use serde::{Deserialize, Serialize};

/// Bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Port for the liveness endpoint (`PORT` env overrides).
    #[serde(default = "default_health_port")]
    pub health_port: u16,

    /// Directory for inbound files (system temp dir by default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,

    /// Largest accepted file in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Upload server discovery endpoint.
    #[serde(default = "default_servers_url")]
    pub servers_url: String,

    /// Upload URL template; `{server}` is replaced by the chosen server.
    #[serde(default = "default_upload_url_pattern")]
    pub upload_url_pattern: String,

    /// Server used whenever discovery fails.
    #[serde(default = "default_fallback_server")]
    pub fallback_server: String,

    /// Upload attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Randomized inter-attempt backoff bounds in seconds.
    #[serde(default = "default_backoff_min_secs")]
    pub backoff_min_secs: f64,
    #[serde(default = "default_backoff_max_secs")]
    pub backoff_max_secs: f64,

    /// Discovery request timeout in seconds.
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,

    /// Total ceiling for one upload attempt in seconds.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,

    /// Minimum interval between status message edits in milliseconds.
    #[serde(default = "default_edit_interval_ms")]
    pub edit_interval_ms: u64,
}

fn default_health_port() -> u16 {
    5000
}

fn default_max_file_bytes() -> u64 {
    4 * 1024 * 1024 * 1024
}

fn default_servers_url() -> String {
    "https://api.gofile.io/servers".into()
}

fn default_upload_url_pattern() -> String {
    "https://{server}.gofile.io/uploadFile".into()
}

fn default_fallback_server() -> String {
    "store1".into()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_min_secs() -> f64 {
    2.0
}

fn default_backoff_max_secs() -> f64 {
    5.0
}

fn default_discovery_timeout_secs() -> u64 {
    10
}

fn default_upload_timeout_secs() -> u64 {
    900
}

fn default_edit_interval_ms() -> u64 {
    1500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            health_port: default_health_port(),
            download_dir: None,
            max_file_bytes: default_max_file_bytes(),
            servers_url: default_servers_url(),
            upload_url_pattern: default_upload_url_pattern(),
            fallback_server: default_fallback_server(),
            max_attempts: default_max_attempts(),
            backoff_min_secs: default_backoff_min_secs(),
            backoff_max_secs: default_backoff_max_secs(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
            upload_timeout_secs: default_upload_timeout_secs(),
            edit_interval_ms: default_edit_interval_ms(),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Saves the current configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Hosting client settings derived from this config.
    pub fn hosting(&self) -> HostingConfig {
        HostingConfig {
            servers_url: self.servers_url.clone(),
            upload_url_pattern: self.upload_url_pattern.clone(),
            fallback_server: self.fallback_server.clone(),
            discovery_timeout: Duration::from_secs(self.discovery_timeout_secs),
            upload_timeout: Duration::from_secs(self.upload_timeout_secs),
            max_attempts: self.max_attempts,
            backoff_min: Duration::from_secs_f64(self.backoff_min_secs),
            backoff_max: Duration::from_secs_f64(self.backoff_max_secs),
        }
    }

    /// Directory inbound files are parked in.
    pub fn download_dir(&self) -> PathBuf {
        match &self.download_dir {
            Some(dir) => PathBuf::from(dir),
            None => std::env::temp_dir().join("droplink"),
        }
    }

    /// Minimum interval between status message edits.
    pub fn edit_interval(&self) -> Duration {
        Duration::from_millis(self.edit_interval_ms)
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("droplink")
            .join("bot.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("droplink").join("bot.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/droplink/bot.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.health_port, 5000);
        assert_eq!(config.max_file_bytes, 4 * 1024 * 1024 * 1024);
        assert_eq!(config.fallback_server, "store1");
        assert_eq!(config.max_attempts, 3);
        assert!(config.download_dir.is_none());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = Config {
            health_port: 8080,
            download_dir: Some("/var/tmp/droplink".into()),
            max_file_bytes: 1024,
            max_attempts: 5,
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.health_port, 8080);
        assert_eq!(parsed.download_dir.as_deref(), Some("/var/tmp/droplink"));
        assert_eq!(parsed.max_file_bytes, 1024);
        assert_eq!(parsed.max_attempts, 5);
    }

    #[test]
    fn config_partial_toml() {
        // Only override the port, rest should use defaults.
        let config: Config = toml::from_str("health_port = 9000").unwrap();
        assert_eq!(config.health_port, 9000);
        assert_eq!(config.fallback_server, "store1");
        assert_eq!(config.upload_timeout_secs, 900);
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().contains("droplink"));
    }

    #[test]
    fn hosting_settings_carry_over() {
        let config = Config {
            backoff_min_secs: 0.5,
            backoff_max_secs: 1.5,
            ..Config::default()
        };
        let hosting = config.hosting();
        assert_eq!(hosting.backoff_min, Duration::from_secs_f64(0.5));
        assert_eq!(hosting.backoff_max, Duration::from_secs_f64(1.5));
        assert_eq!(hosting.max_attempts, 3);
    }

    #[test]
    fn download_dir_defaults_to_temp() {
        let config = Config::default();
        assert!(config.download_dir().ends_with("droplink"));
    }
}
