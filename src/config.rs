//! Registry configuration
//!
//! Loaded from JSON; missing fields fall back to defaults.

use crate::address::Address;
use crate::error::ConfigError;
use chrono::Duration;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Who may breed a pair of robots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreedingPolicy {
    /// Caller must own both parents
    OwnerOfBoth,
    /// Caller must own at least one parent
    OwnerOfEither,
    /// Anyone may combine any two active robots
    Permissionless,
}

/// Minimum age before a robot may become a parent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaturityConfig {
    /// Maturity for directly minted robots, in seconds
    pub genesis_secs: i64,
    /// Maturity for bred robots, in seconds
    pub offspring_secs: i64,
}

impl Default for MaturityConfig {
    fn default() -> Self {
        Self {
            genesis_secs: 3600,
            offspring_secs: 3600,
        }
    }
}

impl MaturityConfig {
    pub fn threshold(&self, genesis: bool) -> Duration {
        Duration::seconds(if genesis { self.genesis_secs } else { self.offspring_secs })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Collection name
    pub name: String,
    /// Collection ticker symbol
    pub symbol: String,
    /// The single identity allowed to mint
    pub admin: Address,
    pub maturity: MaturityConfig,
    pub breeding_policy: BreedingPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: "crypto robots".to_string(),
            symbol: "cbot".to_string(),
            admin: Address::new("admin"),
            maturity: MaturityConfig::default(),
            breeding_policy: BreedingPolicy::OwnerOfBoth,
        }
    }
}

impl RegistryConfig {
    /// Config with a given admin and defaults elsewhere
    pub fn with_admin(admin: impl Into<Address>) -> Self {
        Self {
            admin: admin.into(),
            ..Self::default()
        }
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!("Loaded registry config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.is_null() {
            return Err(ConfigError::Invalid("admin must not be the null address".into()));
        }
        if self.name.trim().is_empty() || self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("name and symbol must be non-empty".into()));
        }
        if self.maturity.genesis_secs < 0 || self.maturity.offspring_secs < 0 {
            return Err(ConfigError::Invalid("maturity must not be negative".into()));
        }
        Ok(())
    }
}
