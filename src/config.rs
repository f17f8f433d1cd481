use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "_config.yml";

/// The slice of the project configuration the launcher cares about. The
/// engine owns the full file; unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub fn config_exists(root: &Path) -> bool {
    root.join(CONFIG_FILE).is_file()
}

pub fn load(root: &Path) -> Result<Config, Box<dyn Error>> {
    let raw = fs::read_to_string(root.join(CONFIG_FILE))
        .map_err(|e| format!("Failed to read {}: {}", CONFIG_FILE, e))?;
    let config: Config = serde_yaml::from_str(&raw)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE, e))?;
    Ok(config)
}
