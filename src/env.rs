use std::path::Path;

use tracing::{info, warn};

/// Which env files were applied. Startup runs before the tracing subscriber
/// exists, so the result is logged later through [`LoadedEnvironment::log`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadedEnvironment {
    pub loaded: Vec<String>,
    pub missing: Vec<String>,
}

impl LoadedEnvironment {
    pub fn log(&self) {
        for path in &self.missing {
            warn!("Environment file {} not found, skipping", path);
        }
        for path in &self.loaded {
            info!("Loaded environment from: {}", path);
        }
    }
}

/// Loads `config/common.env`, `config/<service>.env` and `.secrets.env`, later
/// files overriding earlier ones.
pub fn load_environment(service_name: &str) -> Result<LoadedEnvironment, dotenvy::Error> {
    let service_file = format!("config/{}.env", service_name);
    let env_files = ["config/common.env", service_file.as_str(), ".secrets.env"];

    let mut environment = LoadedEnvironment::default();
    for env_file in env_files {
        if load_env_file(env_file)? {
            environment.loaded.push(env_file.to_string());
        } else {
            environment.missing.push(env_file.to_string());
        }
    }

    Ok(environment)
}

fn load_env_file(path: &str) -> Result<bool, dotenvy::Error> {
    if !Path::new(path).exists() {
        return Ok(false);
    }

    dotenvy::from_filename_override(path)?;
    Ok(true)
}
