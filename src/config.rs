use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};

// Spark cloud addresses and limits, matching the official Spark CLI.
const AUTH_URL: &str = "https://api.spark.io/oauth/token";
const API_URL: &str = "https://api.spark.io/v1/devices";
const SPARK_CONFIG: &str = ".spark/spark.config.json";
const FETCH_TIMEOUT_SECS: u64 = 60;

/// Endpoints, credential path and limits shared by every component.
#[derive(Clone, Debug)]
pub struct CloudConfig {
    pub auth_url: String,
    pub api_url: String,
    /// Credential cache file, shared with the Spark CLI.
    pub credentials_path: PathBuf,
    /// Hard per-request deadline for a single variable fetch.
    pub fetch_timeout: Duration,
}

/// Optional overrides read from the config file; anything absent keeps its
/// default. Mostly useful for pointing at a staging cloud.
#[derive(Deserialize, Debug, Default)]
struct Overrides {
    auth_url: Option<String>,
    api_url: Option<String>,
    credentials_path: Option<PathBuf>,
    fetch_timeout_secs: Option<u64>,
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("sparkmon/config.toml"))
}

impl CloudConfig {
    /// Defaults pointing at the public Spark cloud.
    pub fn defaults() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(Self {
            auth_url: AUTH_URL.to_string(),
            api_url: API_URL.to_string(),
            credentials_path: home.join(SPARK_CONFIG),
            fetch_timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
        })
    }

    /// Defaults merged with any overrides found at [`config_path`].
    pub fn load() -> Result<Self> {
        let mut config = Self::defaults()?;
        let path = config_path()?;
        if !path.exists() {
            return Ok(config);
        }

        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let overrides: Overrides = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.apply(overrides);
        Ok(config)
    }

    fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.auth_url {
            self.auth_url = url;
        }
        if let Some(url) = overrides.api_url {
            self.api_url = url;
        }
        if let Some(path) = overrides.credentials_path {
            self.credentials_path = path;
        }
        if let Some(secs) = overrides.fetch_timeout_secs {
            self.fetch_timeout = Duration::from_secs(secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_public_cloud() {
        let config = CloudConfig::defaults().unwrap();
        assert_eq!(config.auth_url, "https://api.spark.io/oauth/token");
        assert_eq!(config.api_url, "https://api.spark.io/v1/devices");
        assert!(config.credentials_path.ends_with(".spark/spark.config.json"));
        assert_eq!(config.fetch_timeout, Duration::from_secs(60));
    }

    #[test]
    fn overrides_replace_only_named_fields() {
        let mut config = CloudConfig::defaults().unwrap();
        let overrides: Overrides = toml::from_str(
            r#"
            api_url = "http://localhost:8080/v1/devices"
            fetch_timeout_secs = 5
            "#,
        )
        .unwrap();
        config.apply(overrides);

        assert_eq!(config.api_url, "http://localhost:8080/v1/devices");
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.auth_url, "https://api.spark.io/oauth/token");
    }

    #[test]
    fn empty_override_file_keeps_defaults() {
        let mut config = CloudConfig::defaults().unwrap();
        let expected = config.auth_url.clone();
        config.apply(toml::from_str("").unwrap());
        assert_eq!(config.auth_url, expected);
    }
}
