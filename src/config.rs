use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{tlog_debug, tlog_warn, Error, Result};

pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Raw configuration loaded from `~/.taskdeps/config.toml`.
///
/// Values are looked up by dotted key (`dependencies.max_depth`) so that
/// each component reads only the section it owns.
#[derive(Debug, Clone, Default)]
pub struct Config {
    table: toml::Table,
}

impl Config {
    pub fn app_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".taskdeps"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::from_path(&Self::config_path()?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        tlog_debug!("Config::from_path path={}", path.display());
        if !path.exists() {
            tlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(contents)?;
        Ok(Self { table })
    }

    /// Look up a dotted key, returning `default` when the key is absent or
    /// holds a value of the wrong type.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.lookup(key) else {
            return default;
        };
        match value.clone().try_into::<T>() {
            Ok(v) => v,
            Err(e) => {
                tlog_warn!("Config key {} has unexpected type ({}), using default", key, e);
                default
            }
        }
    }

    fn lookup(&self, key: &str) -> Option<&toml::Value> {
        let mut parts = key.split('.');
        let mut current = self.table.get(parts.next()?)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }
}

/// Settings that govern dependency validation and readiness.
///
/// Read once when a resolver is constructed and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyConfig {
    /// Longest dependency chain an edge insertion may produce.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Skip the would-cycle check during validation.
    #[serde(default)]
    pub allow_cycles: bool,
    /// Whether a FAILED dependency keeps its dependents blocked.
    #[serde(default = "default_true")]
    pub fail_on_dependency_error: bool,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_true() -> bool {
    true
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_cycles: false,
            fail_on_dependency_error: true,
        }
    }
}

impl DependencyConfig {
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        let dep_config = Self {
            max_depth: config.get("dependencies.max_depth", defaults.max_depth),
            allow_cycles: config.get("dependencies.allow_cycles", defaults.allow_cycles),
            fail_on_dependency_error: config.get(
                "dependencies.fail_on_dependency_error",
                defaults.fail_on_dependency_error,
            ),
        };
        tlog_debug!(
            "DependencyConfig loaded: max_depth={}, allow_cycles={}, fail_on_dependency_error={}",
            dep_config.max_depth,
            dep_config.allow_cycles,
            dep_config.fail_on_dependency_error
        );
        dep_config
    }
}
