//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: YAHOO_AUTH_, nested keys split on `__`)
//! 2. Current working directory: ./config.toml
//! 3. System directory: /etc/yahoo-external-auth/config.toml
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

const ENV_PREFIX: &str = "YAHOO_AUTH_";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Host routes the plugin links to
    #[serde(default)]
    pub routes: RouteConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Public store location, with trailing slash
    ///
    /// Used to build absolute redirect URIs and the plugin configuration URL.
    #[serde(default = "default_store_url")]
    pub store_url: String,
}

impl ServiceConfig {
    /// Store location guaranteed to end with `/`
    pub fn store_location(&self) -> String {
        if self.store_url.ends_with('/') {
            self.store_url.clone()
        } else {
            format!("{}/", self.store_url)
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookie name
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Require HTTPS for the cookie
    #[serde(default)]
    pub secure: bool,

    /// SameSite policy: "strict", "lax" or "none"
    ///
    /// Must stay "lax" or weaker: the OAuth callback is a cross-site navigation.
    #[serde(default = "default_same_site")]
    pub same_site: String,

    /// Inactivity expiry in seconds (0 = browser session)
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,
}

/// Routes owned by the host application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Host customer login page
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            store_url: default_store_url(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secure: false,
            same_site: default_same_site(),
            expiry_secs: default_expiry_secs(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
        }
    }
}

fn default_service_name() -> String {
    "yahoo-external-auth".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_store_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_cookie_name() -> String {
    "yahoo_auth_session".to_string()
}

fn default_same_site() -> String {
    "lax".to_string()
}

fn default_expiry_secs() -> u64 {
    3600
}

fn default_login_path() -> String {
    "/login".to_string()
}

impl Config {
    /// Load configuration from the standard locations
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so that higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override values from the file.
    pub fn load_from(path: &str) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Config file paths in priority order (highest first)
    fn find_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("config.toml"),
            PathBuf::from("/etc/yahoo-external-auth/config.toml"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.store_url, "http://localhost:8080/");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.routes.login_path, "/login");
        assert_eq!(config.session.same_site, "lax");
    }

    #[test]
    fn test_store_location_adds_trailing_slash() {
        let service = ServiceConfig {
            store_url: "https://shop.example.com".to_string(),
            ..ServiceConfig::default()
        };
        assert_eq!(service.store_location(), "https://shop.example.com/");

        let service = ServiceConfig {
            store_url: "https://shop.example.com/".to_string(),
            ..ServiceConfig::default()
        };
        assert_eq!(service.store_location(), "https://shop.example.com/");
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = Config::load_from("does-not-exist.toml").unwrap();
        assert_eq!(config.service.name, "yahoo-external-auth");
    }
}
