use config::File;
use std::env;
use std::path::{Path, PathBuf};

use super::ConfigError;
use super::models::{FileConfig, LoadedConfig, split_list};
use super::validation;
use crate::router::DestinationEntry;

const CONFIG_ENV_VAR: &str = "NOTIFYBOX_CONFIG";
const URLS_ENV_VAR: &str = "NOTIFYBOX_URLS";
const DEFAULT_CONFIG_FILES: [&str; 3] = ["notifybox.yml", "notifybox.yaml", "notifybox.toml"];

/// Load from explicit paths, the environment and the default file locations
///
/// Order of the resulting entries:
/// 1. explicit paths, then paths listed in `NOTIFYBOX_CONFIG`
/// 2. default files in the working directory, only if neither of the above named any
/// 3. URLs from `NOTIFYBOX_URLS`
pub fn load(explicit: &[PathBuf]) -> Result<LoadedConfig, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let mut paths = explicit.to_vec();
    if let Some(value) = env::var_os(CONFIG_ENV_VAR) {
        paths.extend(env::split_paths(&value).filter(|path| !path.as_os_str().is_empty()));
    }

    let mut loaded = if paths.is_empty() {
        load_defaults()?
    } else {
        load_from_paths(&paths)?
    };

    if let Ok(value) = env::var(URLS_ENV_VAR) {
        let entries = env_entries(&value);
        validation::validate_entries(URLS_ENV_VAR, &entries)?;
        tracing::debug!(count = entries.len(), "Loaded destinations from {}", URLS_ENV_VAR);
        loaded.entries.extend(entries);
    }

    Ok(loaded)
}

/// Load the given files in order; every path must exist
pub fn load_from_paths(paths: &[PathBuf]) -> Result<LoadedConfig, ConfigError> {
    let mut loaded = LoadedConfig::default();
    for path in paths {
        merge_file(&mut loaded, path)?;
    }
    Ok(loaded)
}

fn load_defaults() -> Result<LoadedConfig, ConfigError> {
    let mut loaded = LoadedConfig::default();
    for name in DEFAULT_CONFIG_FILES {
        let path = Path::new(name);
        if path.exists() {
            merge_file(&mut loaded, path)?;
        } else {
            tracing::debug!("No configuration file at {}", path.display());
        }
    }
    Ok(loaded)
}

fn merge_file(loaded: &mut LoadedConfig, path: &Path) -> Result<(), ConfigError> {
    let file = read_file(path)?;
    let source_name = path.display().to_string();

    if let Some(fallback) = &file.fallback {
        let tags = fallback.tags.clone().into_vec();
        validation::validate_fallback_tags(&source_name, &tags)?;
        for tag in tags {
            if !loaded.fallback_tags.contains(&tag) {
                loaded.fallback_tags.push(tag);
            }
        }
    }

    let entries = file.into_entries();
    validation::validate_entries(&source_name, &entries)?;

    tracing::info!(count = entries.len(), "Loaded destinations from {}", source_name);
    loaded.entries.extend(entries);
    Ok(())
}

/// Parse one YAML or TOML file, format chosen by extension
pub fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    config::Config::builder()
        .add_source(File::from(path))
        .build()
        .and_then(|config| config.try_deserialize())
        .map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })
}

fn env_entries(value: &str) -> Vec<DestinationEntry> {
    split_list(value)
        .into_iter()
        .map(DestinationEntry::untagged)
        .collect()
}
