//! Service configuration read from the environment (and `.env` via dotenvy).

use thiserror::Error;

use crate::domain::aggregates::ShippingPolicy;

const DEFAULT_PORT: u16 = 8083;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    pub max_connections: u32,
    pub currency: String,
    pub shipping: ShippingPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let currency = get("STORE_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()).to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid { key: "STORE_CURRENCY", value: currency });
        }
        Ok(Self {
            database_url,
            port: parse(&get, "PORT")?.unwrap_or(DEFAULT_PORT),
            nats_url: get("NATS_URL"),
            max_connections: parse(&get, "DATABASE_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            currency,
            shipping: ShippingPolicy {
                flat_fee: parse(&get, "SHIPPING_FLAT_FEE")?.unwrap_or(0),
                free_over: parse(&get, "FREE_SHIPPING_OVER")?,
            },
        })
    }
}

fn parse<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|value| value.parse().map_err(|_| ConfigError::Invalid { key, value }))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[("DATABASE_URL", "postgres://localhost/store")]).unwrap();
        assert_eq!(c.port, 8083);
        assert_eq!(c.max_connections, 10);
        assert_eq!(c.currency, "USD");
        assert_eq!(c.nats_url, None);
        assert_eq!(c.shipping, ShippingPolicy::default());
    }

    #[test]
    fn test_database_url_required() {
        assert_eq!(config(&[("DATABASE_URL", "  ")]), Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let c = config(&[
            ("DATABASE_URL", "postgres://db/store"), ("PORT", "9000"), ("STORE_CURRENCY", "eur"),
            ("SHIPPING_FLAT_FEE", "499"), ("FREE_SHIPPING_OVER", "5000"),
        ]).unwrap();
        assert_eq!((c.port, c.currency.as_str()), (9000, "EUR"));
        assert_eq!(c.shipping, ShippingPolicy { flat_fee: 499, free_over: Some(5000) });
        assert!(matches!(config(&[("DATABASE_URL", "x"), ("PORT", "http")]), Err(ConfigError::Invalid { key: "PORT", .. })));
        assert!(matches!(config(&[("DATABASE_URL", "x"), ("STORE_CURRENCY", "EURO")]), Err(ConfigError::Invalid { key: "STORE_CURRENCY", .. })));
    }
}
