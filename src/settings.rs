use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::segmentation::{ExtensionRule, Policy};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Overrides the settings file location.
pub const CONFIG_ENV: &str = "FLIGHTSORT_CONFIG";
/// Looked up inside the input directory when `FLIGHTSORT_CONFIG` is unset.
pub const CONFIG_FILE_NAME: &str = "flightsort.json";

/// Startup settings: the initial policy and the category table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub policy: Policy,
    pub categories: ExtensionRule,
}

/// Read-only settings source. Nothing is ever written back.
pub struct SettingsStore {
    path: Option<PathBuf>,
    data: Settings,
}

impl SettingsStore {
    /// Resolve the settings path for `input_dir` and load it.
    pub fn for_input_dir(input_dir: &Path) -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(explicit) => Some(PathBuf::from(explicit)),
            None => {
                let local = input_dir.join(CONFIG_FILE_NAME);
                local.exists().then_some(local)
            }
        };
        Self::new(path)
    }

    /// Load settings from `path`. A missing path means defaults; an explicit
    /// path that can't be read is an error; a file that doesn't parse falls
    /// back to defaults with a warning.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let data = match &path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read settings from {}", path.display()))?;
                match serde_json::from_str(&contents) {
                    Ok(settings) => {
                        log_info!("Loaded settings from {}", path.display());
                        settings
                    }
                    Err(err) => {
                        log_warn!("Ignoring settings in {}: {err}", path.display());
                        Settings::default()
                    }
                }
            }
            None => Settings::default(),
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn policy(&self) -> Policy {
        self.data.policy.clone()
    }

    pub fn categories(&self) -> ExtensionRule {
        self.data.categories.clone()
    }
}
