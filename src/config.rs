//! Runtime configuration read from the environment (and `.env`).
//!
//! | variable                 | default                                  |
//! |--------------------------|------------------------------------------|
//! | `CTA_BUS_API_KEY`        | required                                 |
//! | `CTA_TRAIN_API_KEY`      | required                                 |
//! | `CTA_BUS_STOP_ID`        | `2192`                                   |
//! | `CTA_TRAIN_STATION_ID`   | `40330`                                  |
//! | `CTA_TRAIN_MAX_RESULTS`  | `5`                                      |
//! | `CTA_BUS_ENDPOINT`       | Bus Tracker v2 `getpredictions`          |
//! | `CTA_TRAIN_ENDPOINT`     | Train Tracker `ttarrivals.aspx`          |
//! | `CTA_HTTP_TIMEOUT_SECS`  | `10`                                     |
//! | `CTA_BUS_STOP_NAME`      | `Stop <CTA_BUS_STOP_ID>`                 |
//! | `CTA_TRAIN_STATION_NAME` | `Grand (Red Line)`                       |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::train::DEFAULT_MAX_RESULTS;

pub const DEFAULT_BUS_ENDPOINT: &str = "http://www.ctabustracker.com/bustime/api/v2/getpredictions";
pub const DEFAULT_TRAIN_ENDPOINT: &str = "http://lapi.transitchicago.com/api/1.0/ttarrivals.aspx";
pub const DEFAULT_BUS_STOP_ID: &str = "2192";
pub const DEFAULT_TRAIN_STATION_ID: &str = "40330";
pub const DEFAULT_TRAIN_STATION_NAME: &str = "Grand (Red Line)";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct Config {
    pub bus_api_key: String,
    pub train_api_key: String,
    pub bus_stop_id: String,
    pub train_station_id: String,
    pub train_max_results: u32,
    pub bus_endpoint: String,
    pub train_endpoint: String,
    pub http_timeout: Duration,
    pub bus_stop_name: String,
    pub train_station_name: String,
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source; blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| var(name).ok_or_else(|| anyhow!("{name} must be set"));

        let bus_stop_id =
            var("CTA_BUS_STOP_ID").unwrap_or_else(|| DEFAULT_BUS_STOP_ID.to_string());
        let timeout_secs = parse_or(
            "CTA_HTTP_TIMEOUT_SECS",
            var("CTA_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        Ok(Self {
            bus_api_key: required("CTA_BUS_API_KEY")?,
            train_api_key: required("CTA_TRAIN_API_KEY")?,
            bus_stop_name: var("CTA_BUS_STOP_NAME")
                .unwrap_or_else(|| format!("Stop {bus_stop_id}")),
            bus_stop_id,
            train_station_id: var("CTA_TRAIN_STATION_ID")
                .unwrap_or_else(|| DEFAULT_TRAIN_STATION_ID.to_string()),
            train_max_results: parse_or(
                "CTA_TRAIN_MAX_RESULTS",
                var("CTA_TRAIN_MAX_RESULTS"),
                DEFAULT_MAX_RESULTS,
            )?,
            bus_endpoint: var("CTA_BUS_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_BUS_ENDPOINT.to_string()),
            train_endpoint: var("CTA_TRAIN_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_TRAIN_ENDPOINT.to_string()),
            http_timeout: Duration::from_secs(timeout_secs),
            train_station_name: var("CTA_TRAIN_STATION_NAME")
                .unwrap_or_else(|| DEFAULT_TRAIN_STATION_NAME.to_string()),
        })
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

// API keys stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bus_api_key", &"<redacted>")
            .field("train_api_key", &"<redacted>")
            .field("bus_stop_id", &self.bus_stop_id)
            .field("train_station_id", &self.train_station_id)
            .field("train_max_results", &self.train_max_results)
            .field("bus_endpoint", &self.bus_endpoint)
            .field("train_endpoint", &self.train_endpoint)
            .field("http_timeout", &self.http_timeout)
            .field("bus_stop_name", &self.bus_stop_name)
            .field("train_station_name", &self.train_station_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    const KEYS: [(&str, &str); 2] = [
        ("CTA_BUS_API_KEY", "bus-key"),
        ("CTA_TRAIN_API_KEY", "train-key"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&KEYS)).unwrap();

        assert_eq!(config.bus_api_key, "bus-key");
        assert_eq!(config.train_api_key, "train-key");
        assert_eq!(config.bus_stop_id, "2192");
        assert_eq!(config.train_station_id, "40330");
        assert_eq!(config.train_max_results, 5);
        assert_eq!(config.bus_endpoint, DEFAULT_BUS_ENDPOINT);
        assert_eq!(config.train_endpoint, DEFAULT_TRAIN_ENDPOINT);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.bus_stop_name, "Stop 2192");
        assert_eq!(config.train_station_name, "Grand (Red Line)");
    }

    #[test]
    fn test_overrides() {
        let mut vars = KEYS.to_vec();
        vars.extend([
            ("CTA_BUS_STOP_ID", "1532"),
            ("CTA_TRAIN_STATION_ID", "41320"),
            ("CTA_TRAIN_MAX_RESULTS", "3"),
            ("CTA_HTTP_TIMEOUT_SECS", " 5 "),
            ("CTA_TRAIN_STATION_NAME", "Belmont"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.bus_stop_id, "1532");
        assert_eq!(config.bus_stop_name, "Stop 1532");
        assert_eq!(config.train_station_id, "41320");
        assert_eq!(config.train_max_results, 3);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.train_station_name, "Belmont");
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[("CTA_TRAIN_API_KEY", "train-key")])).unwrap_err();
        assert!(err.to_string().contains("CTA_BUS_API_KEY"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let vars = [("CTA_BUS_API_KEY", "bus-key"), ("CTA_TRAIN_API_KEY", "  ")];
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let mut vars = KEYS.to_vec();
        vars.push(("CTA_TRAIN_MAX_RESULTS", "five"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("CTA_TRAIN_MAX_RESULTS"));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = Config::from_lookup(lookup(&KEYS)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("bus-key"));
        assert!(!debug.contains("train-key"));
    }
}
