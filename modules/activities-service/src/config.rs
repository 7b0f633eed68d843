//! Service configuration read from the environment (and `.env`).

use crate::error::StartupError;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATA_PATH: &str = "./data/activities.json";
const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("ACTIVITIES_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| StartupError::Config {
                name: "ACTIVITIES_PORT",
                value: raw,
            })?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("ACTIVITIES_HOST").unwrap_or(defaults.host),
            port,
            data_path: lookup("ACTIVITIES_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            static_dir: lookup("ACTIVITIES_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.addr(), "127.0.0.1:8000");
        assert!(config.static_dir.join("index.html").is_file());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ACTIVITIES_HOST", "0.0.0.0"),
            ("ACTIVITIES_PORT", "9200"),
            ("ACTIVITIES_DATA_PATH", "/var/lib/activities.json"),
            ("ACTIVITIES_STATIC_DIR", "/srv/static"),
        ]))
        .unwrap();
        assert_eq!(config.addr(), "0.0.0.0:9200");
        assert_eq!(config.data_path, PathBuf::from("/var/lib/activities.json"));
        assert_eq!(config.static_dir, PathBuf::from("/srv/static"));
    }

    #[test]
    fn test_bad_port_is_an_error() {
        let err = Config::from_lookup(lookup(&[("ACTIVITIES_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("ACTIVITIES_PORT"));
    }
}
