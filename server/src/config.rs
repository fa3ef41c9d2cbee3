use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

const DEFAULT_PORT: &str = "8000";
const DEFAULT_DATA: &str = "data/salaries.json";

pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("SALARY_PORT", DEFAULT_PORT),
            data_path: try_load("SALARY_DATA", DEFAULT_DATA),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            data_path: PathBuf::from(DEFAULT_DATA),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Reads `key`, falling back to `default` when it is unset or does not parse.
fn try_load<T: FromStr + Default>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default.parse()
        })
        .unwrap_or_else(|_| T::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_load_uses_default_when_unset() {
        let port: u16 = try_load("SALARY_TEST_UNSET_PORT", "8000");
        assert_eq!(port, 8000);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.data_path, PathBuf::from("data/salaries.json"));
    }
}
