//! # Configuration
//!
//! [`OcwsConfig`] holds everything needed to reach an OpenClinica
//! webservices instance.
//!
//! ## Loading Priority
//!
//! Configuration is loaded from the first source that provides a value:
//!
//! 1. Explicit struct fields (programmatic construction)
//! 2. Environment variables (`OCWS_URL`, `OCWS_USERNAME`, `OCWS_PASSWORD`)
//! 3. TOML config file at an explicit path
//! 4. `./ocws.toml` in the current directory
//! 5. `~/.config/openclinica-ws/ocws.toml`
//!
//! Individual fields can always be overridden by environment variables,
//! even when loading from a file.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{OcwsError, OcwsResult};

/// Name of the config file searched for in the working and config directories.
pub const CONFIG_FILE_NAME: &str = "ocws.toml";

/// Configuration for an OpenClinica webservices instance.
///
/// The password is kept in plaintext only until a client is created; the
/// wire only ever carries its SHA-1 digest (see [`crate::auth::Credentials`]).
///
/// ```
/// use openclinica_ws::config::OcwsConfig;
///
/// let config = OcwsConfig::new("https://oc.example.org/OpenClinica-ws/", "api", "secret");
/// assert_eq!(config.base_url, "https://oc.example.org/OpenClinica-ws");
/// ```
#[derive(Clone, Deserialize)]
pub struct OcwsConfig {
    /// Base URL of the webservices deployment, without the `/ws/...` suffix.
    pub base_url: String,

    /// OpenClinica account with permission to use the SOAP webservices.
    pub username: String,

    /// Plaintext password of that account.
    pub password: String,

    /// Log every sent envelope and received reply at `debug` level.
    #[serde(default)]
    pub log_messages: bool,
}

impl fmt::Debug for OcwsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcwsConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("log_messages", &self.log_messages)
            .finish()
    }
}

impl OcwsConfig {
    /// Create a config from explicit values.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            username: username.into(),
            password: password.into(),
            log_messages: false,
        }
    }

    /// Load config from environment variables.
    ///
    /// Required: `OCWS_URL`, `OCWS_USERNAME`, `OCWS_PASSWORD`
    ///
    /// Optional: `OCWS_LOG_MESSAGES` (`1`/`true` to enable)
    pub fn from_env() -> OcwsResult<Self> {
        let base_url = required_env("OCWS_URL")?;
        let username = required_env("OCWS_USERNAME")?;
        let password = required_env("OCWS_PASSWORD")?;

        let mut config = Self::new(base_url, username, password);
        if let Some(flag) = env_flag("OCWS_LOG_MESSAGES") {
            config.log_messages = flag;
        }
        Ok(config)
    }

    /// Load config from a TOML file, with environment variable overrides.
    ///
    /// Environment variables take precedence over file values.
    #[cfg(feature = "config-toml")]
    pub fn from_file(path: impl AsRef<Path>) -> OcwsResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| OcwsError::ConfigError {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        let mut config: Self = toml::from_str(&contents)?;

        if let Ok(url) = std::env::var("OCWS_URL") {
            config.base_url = url;
        }
        if let Ok(username) = std::env::var("OCWS_USERNAME") {
            config.username = username;
        }
        if let Ok(password) = std::env::var("OCWS_PASSWORD") {
            config.password = password;
        }
        if let Some(flag) = env_flag("OCWS_LOG_MESSAGES") {
            config.log_messages = flag;
        }

        config.base_url = normalize_base_url(config.base_url);
        Ok(config)
    }

    /// Discover and load config from the standard search path:
    ///
    /// 1. Explicit path (if `Some`)
    /// 2. `OCWS_CONFIG` environment variable
    /// 3. `./ocws.toml`
    /// 4. `~/.config/openclinica-ws/ocws.toml`
    ///
    /// Falls back to environment-variable-only config if no file is found.
    #[cfg(feature = "config-toml")]
    pub fn discover(explicit_path: Option<&Path>) -> OcwsResult<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var("OCWS_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Self::from_file(&local_path);
        }

        if let Some(config_path) = dirs_config_path() {
            if config_path.exists() {
                return Self::from_file(&config_path);
            }
        }

        Self::from_env()
    }

    /// Join the base URL with a service's WSDL path.
    pub fn wsdl_url(&self, wsdl_path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), wsdl_path)
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn required_env(key: &str) -> OcwsResult<String> {
    std::env::var(key).map_err(|_| OcwsError::ConfigError {
        reason: format!("{key} environment variable not set"),
    })
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Platform-appropriate config file path.
#[cfg(feature = "config-toml")]
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|dir| PathBuf::from(dir).join("openclinica-ws").join(CONFIG_FILE_NAME))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME").ok().map(|dir| {
            PathBuf::from(dir)
                .join(".config")
                .join("openclinica-ws")
                .join(CONFIG_FILE_NAME)
        })
    }
}
