use crate::config::generate::generate_starter_config;
use crate::config::{user_config_path, Config};
use std::fs;
use std::path::{Path, PathBuf};

const SYSTEM_CONFIG_PATH: &str = "/etc/ocm-log-forwarder/config.yml";

pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    let config_path = user_config_path().unwrap_or_else(|| PathBuf::from(SYSTEM_CONFIG_PATH));
    write_config(&config_content, &config_path)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

/// Writes `content` to `path`, creating parent directories. An existing file
/// is never overwritten.
pub fn write_config(content: &str, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        return Err(format!(
            "config file already exists at {}; remove it first or use --stdout",
            path.display()
        )
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content)?;
    Ok(())
}

/// Prints the resolved config (file, then environment) as YAML.
pub fn show(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
