use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{config_error, Error};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_MAPS_API_BASE: &str = "maps.googleapis.com";
pub const DEFAULT_MAPS_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct MapsConfig {
    pub api_base: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// `None` when no mapping credential is present; distances then come from
    /// the haversine fallback alone.
    pub maps: Option<MapsConfig>,
    pub maps_timeout: Duration,
    /// `None` keeps delivery orders in memory.
    pub database: Option<DatabaseConfig>,
    pub pricing_table_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = parse(
            "BIND_ADDR",
            &get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
        )?;

        let maps_timeout = match get("MAPS_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse("MAPS_TIMEOUT_MS", &raw)?),
            None => Duration::from_millis(DEFAULT_MAPS_TIMEOUT_MS),
        };

        let maps = get("GOOGLE_MAPS_API_KEY").map(|api_key| MapsConfig {
            api_base: get("GOOGLE_MAPS_API_BASE").unwrap_or_else(|| DEFAULT_MAPS_API_BASE.into()),
            api_key,
            timeout: maps_timeout,
        });

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: match get("DATABASE_MAX_CONNECTIONS") {
                    Some(raw) => parse("DATABASE_MAX_CONNECTIONS", &raw)?,
                    None => DEFAULT_DATABASE_MAX_CONNECTIONS,
                },
            }),
            None => None,
        };

        Ok(Self {
            bind_addr,
            maps,
            maps_timeout,
            database,
            pricing_table_path: get("PRICING_TABLE_PATH").map(PathBuf::from),
        })
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, Error> {
    raw.trim()
        .parse()
        .map_err(|_| config_error(format!("{} has an invalid value: {}", key, raw)))
}

#[test]
fn defaults_without_credentials() {
    let config = Config::from_lookup(|_| None).unwrap();

    assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
    assert_eq!(config.maps, None);
    assert_eq!(config.database, None);
    assert_eq!(config.maps_timeout, Duration::from_millis(5000));
    assert_eq!(config.pricing_table_path, None);
}

#[test]
fn reads_maps_and_database_settings() {
    use std::collections::HashMap;

    let vars = HashMap::from([
        ("GOOGLE_MAPS_API_KEY", "abc"),
        ("MAPS_TIMEOUT_MS", "1500"),
        ("DATABASE_URL", "postgresql://localhost/mealroute"),
        ("DATABASE_MAX_CONNECTIONS", "12"),
        ("BIND_ADDR", "0.0.0.0:8080"),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

    let maps = config.maps.unwrap();
    assert_eq!(maps.api_base, DEFAULT_MAPS_API_BASE);
    assert_eq!(maps.api_key, "abc");
    assert_eq!(maps.timeout, Duration::from_millis(1500));
    assert_eq!(config.database.unwrap().max_connections, 12);
    assert_eq!(config.bind_addr.port(), 8080);
}

#[test]
fn blank_key_counts_as_absent() {
    let config = Config::from_lookup(|key| match key {
        "GOOGLE_MAPS_API_KEY" => Some("  ".into()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.maps, None);
}

#[test]
fn rejects_malformed_numbers() {
    let err = Config::from_lookup(|key| match key {
        "MAPS_TIMEOUT_MS" => Some("soon".into()),
        _ => None,
    })
    .unwrap_err();

    assert_eq!(err.code, 1);
    assert!(err.message.contains("MAPS_TIMEOUT_MS"));
}
