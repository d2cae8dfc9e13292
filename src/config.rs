//! Configuration for the ledger

use serde::{Deserialize, Serialize};

use crate::types::Currency;
use crate::{Error, Result};

/// Ledger configuration: currencies to register and accounts to open
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Currencies registered at startup
    #[serde(default)]
    pub currencies: Vec<CurrencyDef>,

    /// Accounts opened at startup
    #[serde(default)]
    pub accounts: Vec<AccountDef>,
}

/// Currency definition as configured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyDef {
    /// Unique identifier
    pub id: String,

    /// Fractional decimal places of the minimal unit
    #[serde(default)]
    pub scale: u32,

    /// Optional display symbol
    #[serde(default)]
    pub symbol: Option<String>,
}

impl From<CurrencyDef> for Currency {
    fn from(def: CurrencyDef) -> Self {
        Currency {
            id: crate::types::CurrencyId::new(def.id),
            scale: def.scale,
            symbol: def.symbol,
        }
    }
}

/// Initial account as configured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDef {
    /// Unique identifier
    pub id: String,

    /// Overdraft floors; currencies not listed default to floor 0
    #[serde(default)]
    pub floors: Vec<FloorDef>,
}

/// Overdraft floor for one (account, currency) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorDef {
    /// Currency the floor applies to
    pub currency: String,

    /// Minimum permitted balance (negative grants overdraft)
    pub floor: i64,
}

impl Config {
    /// Load from TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from the path in `LEDGER_CONFIG`, or default to empty
    pub fn from_env() -> Result<Self> {
        match std::env::var("LEDGER_CONFIG") {
            Ok(path) => Self::from_file(path),
            Err(_) => Ok(Config::default()),
        }
    }
}
