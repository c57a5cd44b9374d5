use crate::types::*;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::PathBuf;

pub const APP_NAME: &str = "pythonup";
pub const CONFIG_DIR_NAME: &str = ".pythonup";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ACTIVE_VERSIONS_FILE_NAME: &str = "active-versions.txt";

pub const SETTING_KEYS: &[&str] = &[
    "install_root",
    "scripts_dir",
    "commands_dir",
    "catalog_dir",
    "dispatcher_path",
    "force_32bit",
];

pub fn get_user_data_dir() -> Result<PathBuf> {
    let path = match std::env::var_os("PYTHONUP_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::data_local_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?
            .join(APP_NAME),
    };
    tracing::debug!("User data directory: {}", path.display());
    fs::create_dir_all(&path)?;
    Ok(path)
}

pub fn get_config_file_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("PYTHONUP_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    let path = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME);
    tracing::debug!("Config file path: {}", path.display());
    Ok(path)
}

pub fn load_settings() -> Result<Settings> {
    let config_path = get_config_file_path()?;

    let mut settings = if config_path.exists() {
        let content = fs::read_to_string(&config_path).with_context(|| {
            format!("Could not read config file at {}", config_path.display())
        })?;
        serde_json::from_str(&content).with_context(|| "Could not parse config file as JSON")?
    } else {
        Settings::default()
    };

    // Environment overrides win over the file
    for key in SETTING_KEYS {
        let var = format!("PYTHONUP_{}", key.to_uppercase());
        if let Ok(value) = std::env::var(&var) {
            tracing::debug!("Applying {} override", var);
            apply_setting(&mut settings, key, &value)?;
        }
    }

    Ok(settings)
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let config_path = get_config_file_path()?;
    let config_dir = config_path
        .parent()
        .ok_or_else(|| anyhow!("Invalid config path"))?;

    fs::create_dir_all(config_dir)?;

    let content = serde_json::to_string_pretty(settings)?;
    fs::write(&config_path, content)?;

    Ok(())
}

pub fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                format!("_{}", c.to_lowercase())
            } else {
                c.to_string()
            }
        })
        .collect::<String>()
        .trim_start_matches('_')
        .to_lowercase()
}

fn parse_bool(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

pub fn get_setting(settings: &Settings, key: &str) -> Option<String> {
    let value = match normalize_key(key).as_str() {
        "install_root" => settings.install_root.clone(),
        "scripts_dir" => settings.scripts_dir.clone(),
        "commands_dir" => settings.commands_dir.clone(),
        "catalog_dir" => settings.catalog_dir.clone(),
        "dispatcher_path" => settings.dispatcher_path.clone(),
        "force_32bit" => settings.force_32bit.to_string(),
        _ => return None,
    };
    Some(value)
}

pub fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match normalize_key(key).as_str() {
        "install_root" => settings.install_root = value.to_string(),
        "scripts_dir" => settings.scripts_dir = value.to_string(),
        "commands_dir" => settings.commands_dir = value.to_string(),
        "catalog_dir" => settings.catalog_dir = value.to_string(),
        "dispatcher_path" => settings.dispatcher_path = value.to_string(),
        "force_32bit" => settings.force_32bit = parse_bool(value),
        other => {
            return Err(anyhow!(
                "'{}' is not a valid configuration setting. Valid settings: {}",
                other,
                SETTING_KEYS.join(", ")
            ))
        }
    }
    Ok(())
}

pub fn reset_setting(settings: &mut Settings, key: &str) -> Result<()> {
    let defaults = Settings::default();
    let key = normalize_key(key);
    let value = get_setting(&defaults, &key).ok_or_else(|| {
        anyhow!(
            "'{}' is not a valid configuration setting. Valid settings: {}",
            key,
            SETTING_KEYS.join(", ")
        )
    })?;
    apply_setting(settings, &key, &value)
}

/// Every filesystem location a single run touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub install_root: PathBuf,
    pub scripts_dir: PathBuf,
    pub commands_dir: PathBuf,
    pub catalog_dir: PathBuf,
    pub dispatcher: PathBuf,
    pub active_versions_file: PathBuf,
}

impl Layout {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let data_dir = get_user_data_dir()?;
        Ok(Self {
            install_root: PathBuf::from(&settings.install_root),
            scripts_dir: PathBuf::from(&settings.scripts_dir),
            commands_dir: PathBuf::from(&settings.commands_dir),
            catalog_dir: PathBuf::from(&settings.catalog_dir),
            dispatcher: PathBuf::from(&settings.dispatcher_path),
            active_versions_file: data_dir.join(ACTIVE_VERSIONS_FILE_NAME),
        })
    }
}
