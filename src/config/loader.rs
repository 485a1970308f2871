//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables that fill the mirror hostnames of the help page.
const MIRROR_VARS: [&str; 5] = ["D1", "D2", "D3", "D4", "D5"];

/// Why a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[source] std::io::Error),

    #[error("invalid TOML: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid configuration: {}", list_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn list_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay the disguise variables (`URL302`, `URL`, `D1`..`D5`) onto `config`.
///
/// Unset or empty variables leave the file value untouched. Any `D*` variable
/// being set replaces the whole mirror list.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(url302) = lookup("URL302") {
        config.disguise.url302 = url302;
    }
    if let Some(url) = lookup("URL") {
        config.disguise.url = url;
    }

    let mirrors: Vec<Option<String>> = MIRROR_VARS.iter().map(|key| lookup(*key)).collect();
    if mirrors.iter().any(Option::is_some) {
        config.disguise.mirrors = mirrors.into_iter().map(Option::unwrap_or_default).collect();
    }
}
