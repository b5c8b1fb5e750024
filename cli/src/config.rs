use std::path::Path;

use serde::{Deserialize, Serialize};
use swapix_common::config::{
    ConfigContentProvider, ConfigSerializer, ConfigStore, FileContentConfigProvider, Validate,
    YamlConfigSerializer,
};
use swapix_common::games::match3::{AllStatistics, LevelCatalog, Progression};
use swapix_common::log;

const CONFIG_FILE_NAME: &str = "swapix_config.yaml";
const MAX_AUTOPLAY_MOVES: u32 = 10_000;

pub type CliConfigStore = ConfigStore<FileContentConfigProvider, CliConfig>;
pub type ProfileStore = ConfigStore<FileContentConfigProvider, PlayerProfile>;

pub fn get_config_path() -> String {
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        return exe_dir.join(CONFIG_FILE_NAME).to_string_lossy().into_owned();
    }
    CONFIG_FILE_NAME.to_string()
}

/// Relative paths inside the config file are taken relative to the config file itself.
pub fn resolve_beside(config_path: &str, file: &str) -> String {
    let file_path = Path::new(file);
    if file_path.is_absolute() {
        return file.to_string();
    }
    match Path::new(config_path).parent() {
        Some(dir) => dir.join(file_path).to_string_lossy().into_owned(),
        None => file.to_string(),
    }
}

/// A missing file falls back to the built-in levels; a malformed one is an error.
pub fn load_catalog(path: &str) -> Result<LevelCatalog, String> {
    let provider = FileContentConfigProvider::new(path);
    let Some(content) = provider.get_config_content()? else {
        log!("Levels file {} not found, using built-in levels", path);
        return Ok(LevelCatalog::built_in());
    };
    let catalog: LevelCatalog = YamlConfigSerializer.deserialize(&content)?;
    catalog
        .validate()
        .map_err(|e| format!("Levels file {}: {}", path, e))?;
    Ok(catalog)
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct CliConfig {
    #[serde(default)]
    pub levels_file: Option<String>,
    pub profile_file: String,
    pub autoplay: AutoplayConfig,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<(), String> {
        if self.profile_file.is_empty() {
            return Err("profile_file must not be empty".to_string());
        }
        if let Some(levels_file) = &self.levels_file
            && levels_file.is_empty()
        {
            return Err("levels_file must not be empty when set".to_string());
        }
        self.autoplay.validate()?;
        Ok(())
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            levels_file: None,
            profile_file: "swapix_profile.yaml".to_string(),
            autoplay: AutoplayConfig::default(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct AutoplayConfig {
    pub max_moves: u32,
}

impl Validate for AutoplayConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_moves == 0 {
            return Err("autoplay max_moves must be greater than 0".to_string());
        }
        if self.max_moves > MAX_AUTOPLAY_MOVES {
            return Err(format!(
                "autoplay max_moves must not exceed {}",
                MAX_AUTOPLAY_MOVES
            ));
        }
        Ok(())
    }
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self { max_moves: 200 }
    }
}

/// Everything the player earns across runs.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Clone)]
pub struct PlayerProfile {
    #[serde(default)]
    pub statistics: AllStatistics,
    #[serde(default)]
    pub progression: Progression,
}

impl Validate for PlayerProfile {
    fn validate(&self) -> Result<(), String> {
        self.statistics.validate()?;
        self.progression.validate()?;
        Ok(())
    }
}
