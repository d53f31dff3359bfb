use super::types::*;
use crate::config::{bool_from_str, expand_env_vars, expand_tilde, unexpanded_env_vars};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Load config from an optional YAML file, then apply environment overrides
/// from the process environment and validate.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with_env(path, |name| std::env::var(name).ok())
}

/// Same as [`load_config`] with an injectable environment lookup.
pub fn load_config_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    // Expand environment variables in the YAML string before parsing
    let yaml_string = expand_env_vars(&yaml_string);
    check_unexpanded_vars(&yaml_string)?;

    let config: Config = serde_yaml::from_str(&yaml_string).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        ))
    })?;

    Ok(config)
}

/// Checks for unexpanded environment variables and returns a helpful error.
/// Comment lines are not checked.
fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let content: Vec<&str> = yaml_string
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect();
    let unexpanded_vars = unexpanded_env_vars(&content.join("\n"));

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    let error_msg = if unexpanded_vars.len() == 1 {
        format!(
            "Environment variable $env{{{0}}} is not set.\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variable: export {0}=<value>\n\
             2. Replace $env{{{0}}} in the config file with an actual value",
            unexpanded_vars[0]
        )
    } else {
        format!(
            "Environment variables are not set: {}\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variables\n\
             2. Replace the variables in the config file with actual values",
            unexpanded_vars.join(", ")
        )
    };

    Err(ConfigError::Validation(error_msg))
}

/// Overlays the documented environment variables on top of `config`.
/// Unset and empty variables leave the existing value alone.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(value) = get("OCM_CLUSTER_ID") {
        config.cluster_id = value;
    }
    if let Some(value) = get("OCM_POLL_INTERVAL_MINUTES") {
        config.poller.interval_minutes = parse_number("OCM_POLL_INTERVAL_MINUTES", &value)?;
    }
    if let Some(value) = get("OCM_PAGE_SIZE") {
        config.poller.page_size = parse_number("OCM_PAGE_SIZE", &value)?;
    }
    if let Some(value) = get("OCM_SECRET_NAME") {
        config.secret.name = value;
    }
    if let Some(value) = get("OCM_SECRET_NAMESPACE") {
        config.secret.namespace = value;
    }
    if let Some(value) = get("SECRET_STORE_PATH") {
        config.secret_store.path = PathBuf::from(value);
    }
    if let Some(value) = get("DEBUG") {
        config.debug = bool_from_str(&value);
    }

    if let Some(value) = get("BACKEND_TYPE") {
        config.backend.backend_type = value.parse().map_err(|e: String| {
            ConfigError::Validation(format!("BACKEND_TYPE={}: {}", value, e))
        })?;
    }

    let es = &mut config.backend.elasticsearch;
    if let Some(value) = get("BACKEND_ES_URL") {
        es.url = value;
    }
    if let Some(value) = get("BACKEND_ES_INDEX") {
        es.index = value;
    }
    if let Some(value) = get("BACKEND_ES_AUTH_TYPE") {
        es.auth_type = value;
    }
    if let Some(value) = get("BACKEND_ES_SECRET_NAME") {
        es.secret.name = value;
    }
    if let Some(value) = get("BACKEND_ES_SECRET_NAMESPACE") {
        es.secret.namespace = value;
    }
    if let Some(value) = get("BACKEND_ES_CERT") {
        es.tls.cert = PathBuf::from(value);
    }
    if let Some(value) = get("BACKEND_ES_KEY") {
        es.tls.key = PathBuf::from(value);
    }
    if let Some(value) = get("BACKEND_ES_TLS_VERIFY") {
        es.tls.verify = bool_from_str(&value);
    }
    if let Some(value) = get("BACKEND_ES_BATCH_SIZE") {
        es.batch_size = parse_number("BACKEND_ES_BATCH_SIZE", &value)?;
    }

    Ok(())
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        ConfigError::Validation(format!(
            "unable to convert environment variable [{}={}] to a number: {}",
            name, value, e
        ))
    })
}

fn expand_paths(config: &mut Config) {
    config.secret_store.path = expand_tilde(&config.secret_store.path);
    config.backend.elasticsearch.tls.cert = expand_tilde(&config.backend.elasticsearch.tls.cert);
    config.backend.elasticsearch.tls.key = expand_tilde(&config.backend.elasticsearch.tls.key);
}

/// Collects every problem with the config rather than stopping at the first.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.cluster_id.trim().is_empty() {
        errors.push("missing cluster id (set cluster_id or OCM_CLUSTER_ID)".to_string());
    }

    let interval = config.poller.interval_minutes;
    if interval < MIN_POLL_INTERVAL_MINUTES {
        errors.push(format!(
            "poller interval [{}] less than minimum allowed [{}]",
            interval, MIN_POLL_INTERVAL_MINUTES
        ));
    } else if interval > MAX_POLL_INTERVAL_MINUTES {
        errors.push(format!(
            "poller interval [{}] greater than maximum allowed [{}]",
            interval, MAX_POLL_INTERVAL_MINUTES
        ));
    }

    if config.poller.page_size == 0 {
        errors.push("poller.page_size must be greater than 0".to_string());
    }

    if config.secret.name.is_empty() || config.secret.namespace.is_empty() {
        errors.push("secret name and namespace must not be empty".to_string());
    }

    if config.backend.backend_type == BackendType::Elasticsearch {
        let es = &config.backend.elasticsearch;
        if es.url.is_empty() {
            errors.push("backend.elasticsearch.url must not be empty".to_string());
        }
        if es.index.is_empty() {
            errors.push("backend.elasticsearch.index must not be empty".to_string());
        }
        if es.batch_size == 0 {
            errors.push("backend.elasticsearch.batch_size must be greater than 0".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}
