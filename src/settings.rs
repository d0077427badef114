use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QuoteError, Result};
use crate::model::{DEFAULT_PROFILE, Document};

pub const DEFAULT_DATA_ROOT: &str = "~/Documents/Quotations";
pub const DEFAULT_NUMBER_PREFIX: &str = "TAINS/Q";
pub const PROFILE_FILE: &str = "profile.toml";

fn default_prefix() -> String {
    DEFAULT_NUMBER_PREFIX.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    pub data_root: String,
    #[serde(default = "default_prefix")]
    pub number_prefix: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_root: DEFAULT_DATA_ROOT.to_string(),
            number_prefix: default_prefix(),
        }
    }
}

impl AppSettings {
    pub fn root(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(&self.data_root))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("output")
    }

    pub fn template_dir(&self) -> PathBuf {
        self.root().join("templates")
    }

    pub fn profile_path(&self) -> PathBuf {
        self.root().join(PROFILE_FILE)
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "quotation-maker", "app") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

/// `None` when no settings have been saved yet.
pub fn load_settings(path: &Path) -> Result<Option<AppSettings>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| QuoteError::io(path, e))?;
    let settings = toml::from_str(&content).map_err(|source| QuoteError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(settings))
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<()> {
    let toml_str = toml::to_string_pretty(settings)?;
    fs::write(path, toml_str).map_err(|e| QuoteError::io(path, e))?;
    debug!(path = %path.display(), "saved settings");
    Ok(())
}

/// Reads the seed profile, writing the built-in one on first use.
pub fn load_profile(path: &Path) -> Result<Document> {
    if path.exists() {
        return Document::load(path);
    }
    println!("✨ Initializing default profile...");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| QuoteError::io(parent, e))?;
    }
    fs::write(path, DEFAULT_PROFILE).map_err(|e| QuoteError::io(path, e))?;
    Document::builtin()
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}
