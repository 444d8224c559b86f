use anyhow::{Context, Result};
use directories::ProjectDirs;
use glint_vision::{Classifier, DetectorConfig};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub static CONFIG_PATH: Lazy<PathBuf> = Lazy::new(|| {
    if let Some(path) = std::env::var_os("GLINT_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    if let Some(path) = option_env!("GLINT_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    ProjectDirs::from("", "", "glint")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("glint.toml"))
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Produce annotated copies of classified images
    pub show_result: bool,
    pub detector: DetectorConfig,
}

impl Config {
    /// The one classifier a process should build and hand around.
    pub fn classifier(&self) -> Result<Classifier> {
        let classifier = Classifier::new(self.detector.clone()).context("building classifier")?;
        Ok(classifier.with_show_result(self.show_result))
    }
}

/// Read the detector settings, falling back to defaults when no file exists.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    match std::fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw)
            .with_context(|| format!("{} is not a valid glint config", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
    }
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("serializing config")?;
    std::fs::write(path, data).with_context(|| format!("cannot write {}", path.display()))
}
