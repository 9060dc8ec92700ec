//! Configuration persisted as `osc.toml`

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BIND_ADDRESS, DEFAULT_OSC_PORT, DEFAULT_TARGET_HOST};
use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "osc.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

/// Listening side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// `SO_RCVBUF` in bytes; the OS default when unset
    pub recv_buffer_size: Option<usize>,
    /// Allow binding a port another socket already holds
    pub reuse_address: bool,
}

impl ServerConfig {
    /// `bind_address:port`, bracketing IPv6 literals
    pub fn addr(&self) -> String {
        if self.bind_address.contains(':') {
            format!("[{}]:{}", self.bind_address, self.port)
        } else {
            format!("{}:{}", self.bind_address, self.port)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_OSC_PORT,
            recv_buffer_size: None,
            reuse_address: false,
        }
    }
}

/// Sending side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Local address to send from; an ephemeral one when unset
    pub local_address: Option<String>,
    pub local_port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TARGET_HOST.to_string(),
            port: DEFAULT_OSC_PORT,
            local_address: None,
            local_port: 0,
        }
    }
}

impl OscConfig {
    /// `<platform config dir>/osc.toml`, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "lan-osc", "lan-osc")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write the config, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from [`OscConfig::default_path`], falling back to defaults
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable config: {}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OscConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:9000");
        assert_eq!(config.client.host, "127.0.0.1");
        assert_eq!(config.client.port, DEFAULT_OSC_PORT);
        assert!(config.client.local_address.is_none());
    }

    #[test]
    fn test_ipv6_addr() {
        let config = ServerConfig {
            bind_address: "::1".to_string(),
            port: 57120,
            recv_buffer_size: None,
            reuse_address: false,
        };
        assert_eq!(config.addr(), "[::1]:57120");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("osc.toml");

        let mut config = OscConfig::default();
        config.server.port = 57120;
        config.server.recv_buffer_size = Some(4 << 20);
        config.client.local_address = Some("127.0.0.1".to_string());

        config.save(&path).unwrap();
        assert_eq!(OscConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osc.toml");
        std::fs::write(&path, "[server]\nport = 8000\n").unwrap();

        let config = OscConfig::load(&path).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.client, ClientConfig::default());
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osc.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = OscConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OscConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
