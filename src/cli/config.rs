use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".azure-deploy.toml";

/// Defaults for values not given on the command line or in the environment.
/// The client secret is never read from the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub resource_group: Option<String>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
    #[serde(default)]
    pub unique_deployment_names: Option<bool>,
    #[serde(default)]
    pub management_endpoint: Option<String>,
    #[serde(default)]
    pub authority_host: Option<String>,
}

impl Config {
    /// Load `.azure-deploy.toml` from the working directory, falling back to the user config dir.
    /// No file at either place is not an error.
    pub fn load() -> Result<Option<Self>> {
        match config_path() {
            Some(path) => load_config_from_path(&path).map(Some),
            None => Ok(None),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("azure-deploy").join("config.toml"))
        .filter(|path| path.exists())
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.as_ref().display()))?;
    tracing::debug!(path = %path.as_ref().display(), "loaded config");
    Ok(config)
}

/// Pick the flag/env value, then the config value; empty strings count as unset.
pub fn require(arg: Option<String>, config: Option<&String>, flag: &str) -> Result<String> {
    match arg
        .filter(|v| !v.is_empty())
        .or_else(|| config.filter(|v| !v.is_empty()).cloned())
    {
        Some(value) => Ok(value),
        None => bail!("missing required value: --{}", flag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.subscription, None);
        assert_eq!(config.poll_interval_secs, None);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
subscription = "00000000-0000-0000-0000-000000000001"
tenant = "contoso.onmicrosoft.com"
client_id = "app-id"
resource_group = "rg-integration"
poll_interval_secs = 10
unique_deployment_names = true
management_endpoint = "https://management.usgovcloudapi.net"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.tenant.as_deref(), Some("contoso.onmicrosoft.com"));
        assert_eq!(config.resource_group.as_deref(), Some("rg-integration"));
        assert_eq!(config.poll_interval_secs, Some(10));
        assert_eq!(config.unique_deployment_names, Some(true));
        assert_eq!(config.authority_host, None);
    }

    #[test]
    fn test_load_config_not_found() {
        let result = load_config_from_path("/nonexistent/.azure-deploy.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "tenant = \"t1\"\n").unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.tenant.as_deref(), Some("t1"));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "poll_interval_secs = \"soon\"\n").unwrap();
        assert!(load_config_from_path(&path).is_err());
    }

    #[test]
    fn test_require_prefers_arg() {
        let from_config = "cfg".to_string();
        assert_eq!(
            require(Some("arg".to_string()), Some(&from_config), "tenant").unwrap(),
            "arg"
        );
        assert_eq!(require(None, Some(&from_config), "tenant").unwrap(), "cfg");
        assert_eq!(
            require(Some(String::new()), Some(&from_config), "tenant").unwrap(),
            "cfg"
        );
    }

    #[test]
    fn test_require_missing() {
        let err = require(None, None, "client_secret").unwrap_err();
        assert_eq!(err.to_string(), "missing required value: --client_secret");
    }
}
