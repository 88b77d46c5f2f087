//! Service configuration.
//!
//! Values come from an optional YAML file and are then overridden by
//! environment variables. Every field has a default, so running with no
//! configuration at all gives a local development setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::domain::money::Money;

const CONFIG_PATH_VAR: &str = "HOUSEHOLD_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "household.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    /// Origin allowed to call the API from a browser
    pub cors_origin: String,
    pub currency_symbol: String,
    /// Largest bill total accepted, in major units
    pub max_bill_amount: f64,
    pub max_description_length: usize,
    /// Used when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:household.db".to_string(),
            bind_address: "127.0.0.1:3000".to_string(),
            cors_origin: "http://localhost:8080".to_string(),
            currency_symbol: "$".to_string(),
            max_bill_amount: 1_000_000.0,
            max_description_length: 256,
            log_filter: "info".to_string(),
        }
    }
}

/// The parts of the configuration the bill service cares about
#[derive(Debug, Clone, PartialEq)]
pub struct BillSettings {
    pub currency_symbol: String,
    pub max_bill_amount: Money,
    pub max_description_length: usize,
}

impl Default for BillSettings {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            max_bill_amount: Money::from_cents(100_000_000),
            max_description_length: 256,
        }
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load using `env` to look up variables
    pub fn load_from(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = env(CONFIG_PATH_VAR).map(PathBuf::from).or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });

        let config = match path {
            Some(path) => Self::from_yaml_file(&path)?,
            None => Self::default(),
        };

        config.with_overrides(env)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn with_overrides(mut self, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = env("HOUSEHOLD_DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(address) = env("HOUSEHOLD_BIND_ADDRESS") {
            self.bind_address = address;
        }
        if let Some(origin) = env("HOUSEHOLD_CORS_ORIGIN") {
            self.cors_origin = origin;
        }
        if let Some(amount) = env("HOUSEHOLD_MAX_BILL_AMOUNT") {
            let money: Money = amount
                .parse()
                .with_context(|| format!("Invalid HOUSEHOLD_MAX_BILL_AMOUNT '{}'", amount))?;
            self.max_bill_amount = money.to_major();
        }
        Ok(self)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.bind_address))
    }

    pub fn bill_settings(&self) -> Result<BillSettings> {
        let max_bill_amount = Money::try_from_major(self.max_bill_amount)
            .with_context(|| format!("Invalid max_bill_amount {}", self.max_bill_amount))?;

        Ok(BillSettings {
            currency_symbol: self.currency_symbol.clone(),
            max_bill_amount,
            max_description_length: self.max_description_length,
        })
    }
}
