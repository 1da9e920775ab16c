//! Layered configuration and persisted coordinator/DUT identity.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $ZB_HARNESS_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/zb-harness/config.toml
//!   3. ~/.config/zb-harness/config.toml
//!
//! This is the concrete shape of spec.md's "persisted state" contract:
//! callers may store and reload `{ controller_ip, dut_node_id,
//! dut_ieee_address }` in any format; this module is the one this
//! workspace's own CLI uses, not a requirement placed on other callers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub coordinator: CoordinatorConfig,
    pub dut: DutConfig,
    pub schema: SchemaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DutConfig {
    pub node_id: Option<u16>,
    pub ieee_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub xml_paths: Vec<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            coordinator: CoordinatorConfig::default(),
            dut: DutConfig::default(),
            schema: SchemaConfig::default(),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4900,
        }
    }
}

impl Default for DutConfig {
    fn default() -> Self {
        Self {
            node_id: None,
            ieee_address: None,
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self { xml_paths: Vec::new() }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("zb-harness")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────

impl HarnessConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            HarnessConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("ZB_HARNESS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Persist this configuration to `Self::file_path()`.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        let text = toml::to_string_pretty(self).map_err(ConfigError::SerializeFailed)?;
        std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            HarnessConfig::default().save()?;
        }
        Ok(path)
    }

    /// Apply `ZB_*` env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ZB_COORDINATOR_HOST") {
            self.coordinator.host = v;
        }
        if let Ok(v) = std::env::var("ZB_COORDINATOR_PORT") {
            if let Ok(p) = v.parse() {
                self.coordinator.port = p;
            }
        }
        if let Ok(v) = std::env::var("ZB_DUT_NODE_ID") {
            if let Ok(id) = v.trim_start_matches("0x").parse::<u16>().or_else(|_| {
                u16::from_str_radix(v.trim_start_matches("0x"), 16)
            }) {
                self.dut.node_id = Some(id);
            }
        }
        if let Ok(v) = std::env::var("ZB_DUT_IEEE_ADDRESS") {
            self.dut.ieee_address = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_reference_console_port() {
        let config = HarnessConfig::default();
        assert_eq!(config.coordinator.host, "127.0.0.1");
        assert_eq!(config.coordinator.port, 4900);
        assert!(config.dut.node_id.is_none());
    }

    #[test]
    fn write_default_if_missing_creates_a_loadable_file() {
        let tmp = std::env::temp_dir().join(format!("zb-harness-config-test-{}", std::process::id()));
        let config_path = tmp.join("config.toml");
        std::fs::create_dir_all(&tmp).unwrap();

        unsafe {
            std::env::set_var("ZB_HARNESS_CONFIG", config_path.to_str().unwrap());
        }

        let path = HarnessConfig::write_default_if_missing().expect("write_default_if_missing failed");
        assert!(path.exists());

        let config = HarnessConfig::load().expect("load should succeed");
        assert_eq!(config.coordinator.port, 4900);

        unsafe {
            std::env::remove_var("ZB_HARNESS_CONFIG");
        }
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn save_then_load_round_trips_dut_identity() {
        let tmp = std::env::temp_dir().join(format!("zb-harness-config-rt-{}", std::process::id()));
        let config_path = tmp.join("config.toml");
        std::fs::create_dir_all(&tmp).unwrap();

        unsafe {
            std::env::set_var("ZB_HARNESS_CONFIG", config_path.to_str().unwrap());
        }

        let mut config = HarnessConfig::default();
        config.dut.node_id = Some(0xBEEF);
        config.dut.ieee_address = Some("00:11:22:33:44:55:66:77".to_string());
        config.save().expect("save should succeed");

        let reloaded = HarnessConfig::load().expect("load should succeed");
        assert_eq!(reloaded.dut.node_id, Some(0xBEEF));

        unsafe {
            std::env::remove_var("ZB_HARNESS_CONFIG");
        }
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
