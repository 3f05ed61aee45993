use std::env;
use std::path::Path;

use tracing::{info, warn};

use super::models::Config;

pub fn load_config(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&expand_env_vars(&contents))?;
    Ok(config)
}

/// Load `path` when it exists, otherwise build the config from the
/// environment defaults.
pub fn load_or_default(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    if Path::new(path).exists() {
        info!("Loading configuration from {}", path);
        load_config(path)
    } else {
        info!("No configuration file at {}, using environment defaults", path);
        Ok(Config::default())
    }
}

/// Replace `${VAR}` references with values from the environment. Unset
/// variables expand to the empty string; an unterminated `${` is kept as is.
pub fn expand_env_vars(contents: &str) -> String {
    let mut expanded = String::with_capacity(contents.len());
    let mut rest = contents;

    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match env::var(name) {
                    Ok(value) => expanded.push_str(&value),
                    Err(_) => warn!("Environment variable {} is not set", name),
                }
                rest = &after[end + 1..];
            }
            None => {
                expanded.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    expanded.push_str(rest);
    expanded
}
