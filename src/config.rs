use std::collections::HashMap;
use thiserror::Error;

use crate::engine::{ConsumeOrder, EngineConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Midgard actions URL template; `{WALLETS}` and `{OFFSET}` are
    /// substituted per page. The page size rides along in the template
    /// (Midgard caps it at 50).
    pub midgard_url: String,
    pub basis_method: ConsumeOrder,
    pub detailed_lp: bool,
    pub include_upgrades: bool,
    pub standard_lp: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let midgard_url = env_map
            .get("MIDGARD_URL")
            .cloned()
            .unwrap_or_else(|| {
                "https://midgard.ninerealms.com/v2/actions?address={WALLETS}&offset={OFFSET}&limit=50"
                    .to_string()
            });
        if !midgard_url.contains("{WALLETS}") || !midgard_url.contains("{OFFSET}") {
            return Err(ConfigError::InvalidValue(
                "MIDGARD_URL".to_string(),
                "must contain {WALLETS} and {OFFSET} placeholders".to_string(),
            ));
        }

        let basis_method = match env_map
            .get("BASIS_METHOD")
            .map(|s| s.as_str())
            .unwrap_or("fifo")
        {
            "fifo" => ConsumeOrder::Fifo,
            "lifo" => ConsumeOrder::Lifo,
            other => {
                return Err(ConfigError::InvalidValue(
                    "BASIS_METHOD".to_string(),
                    format!("must be fifo or lifo, got {}", other),
                ))
            }
        };

        let detailed_lp = parse_bool(&env_map, "DETAILED_LP", false)?;
        let include_upgrades = parse_bool(&env_map, "INCLUDE_UPGRADES", false)?;
        let standard_lp = parse_bool(&env_map, "STANDARD_LP", true)?;

        Ok(Config {
            port,
            database_path,
            midgard_url,
            basis_method,
            detailed_lp,
            include_upgrades,
            standard_lp,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            basis_method: self.basis_method,
            detailed_lp: self.detailed_lp,
            include_upgrades: self.include_upgrades,
            standard_lp: self.standard_lp,
        }
    }
}

fn parse_bool(
    env_map: &HashMap<String, String>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match env_map.get(key).map(|s| s.as_str()) {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("must be true or false, got {}", other),
        )),
    }
}
