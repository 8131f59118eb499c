//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::cache::DEFAULT_TTL;
use crate::core::Project;

/// Valve lookup configuration with layered hierarchy
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding "Valve Sheet.csv" and "Zone Sheet.csv"
    /// (relative paths resolve against the project root)
    pub data_dir: Option<PathBuf>,

    /// Seconds before cached sheet data is refetched
    pub cache_ttl_secs: Option<u64>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/valves/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.valves/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(dir) = std::env::var("VALVES_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }
        if let Ok(ttl) = std::env::var("VALVES_CACHE_TTL") {
            match ttl.trim().parse::<u64>() {
                Ok(secs) => config.cache_ttl_secs = Some(secs),
                Err(_) => log::warn!("Ignoring VALVES_CACHE_TTL={:?}: not a number of seconds", ttl),
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        if is_blank_yaml(&contents) {
            return Some(Config::default());
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "valves")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.cache_ttl_secs.is_some() {
            self.cache_ttl_secs = other.cache_ttl_secs;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Resolve the sheet directory
    ///
    /// Falls back to `<project>/data`, or `./data` outside a project.
    pub fn data_dir(&self, project: Option<&Project>) -> PathBuf {
        let base = project
            .map(|p| p.root().to_path_buf())
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        match &self.data_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base.join(dir),
            None => base.join(Project::DATA_DIR),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL)
    }
}

/// A document with nothing but comments and whitespace
fn is_blank_yaml(contents: &str) -> bool {
    contents
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}
