//! Export configuration and its on-disk location.
//!
//! Options come from a JSON file (explicit `--config`, or `gmdump.json` in
//! the config directory) and are then overridden by CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Default options file name.
pub const OPTIONS_FILE: &str = "gmdump.json";

/// Configuration for overriding default application paths
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Create PathConfig from CLI arguments and environment variables
    ///
    /// Priority: CLI args → ENV var (GMDUMP_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var("GMDUMP_CONFIG_DIR").ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Get path to a configuration file
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. GMDUMP_CONFIG_DIR environment variable
/// 3. Current folder IF it holds gmdump.json
/// 4. Platform-specific config directory from dirs-next (default)
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(name)
}

fn get_config_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(current_dir) = std::env::current_dir() {
        if current_dir.join(OPTIONS_FILE).exists() {
            return current_dir;
        }
    }

    if let Some(dir) = dirs_next::config_dir() {
        return dir.join("gmdump");
    }

    PathBuf::from(".")
}

/// Which asset kinds to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSelection {
    pub sprites: bool,
    pub sounds: bool,
    pub rooms: bool,
    pub options: bool,
}

impl Default for AssetSelection {
    fn default() -> Self {
        Self {
            sprites: true,
            sounds: true,
            rooms: true,
            options: true,
        }
    }
}

impl AssetSelection {
    pub fn none() -> Self {
        Self {
            sprites: false,
            sounds: false,
            rooms: false,
            options: false,
        }
    }
}

/// Sprite translation switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteOptions {
    /// Keep frame PNGs already present in the output folder.
    pub skip_existing: bool,
    /// Fill lost textures with a checker instead of transparency.
    pub missing_texture: bool,
    /// Try to recover ellipse/diamond collision shapes.
    pub shaped_masks: bool,
    /// Minimum similarity for a shape match (0..1).
    pub shaped_mask_precision: f64,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            skip_existing: false,
            missing_texture: true,
            shaped_masks: true,
            shaped_mask_precision: 0.98,
        }
    }
}

/// Everything the exporter can be told.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub assets: AssetSelection,
    /// Use the game's texture groups instead of a single Default group.
    pub texture_groups: bool,
    /// Use the game's audio groups instead of audiogroup_default.
    pub audio_groups: bool,
    /// List option sets for every platform, not just Main and Windows.
    pub other_platform_options: bool,
    pub sprites: SpriteOptions,
    /// Worker threads; defaults to the CPU count.
    pub workers: Option<usize>,
    /// Folder whose files become included files.
    pub datafiles: Option<PathBuf>,
}

impl ExportOptions {
    /// Read options from a JSON file. Missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read options: {}", path.display()))?;
        let options = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse options: {}", path.display()))?;
        info!("Loaded export options from {}", path.display());
        Ok(options)
    }

    /// Options for this run.
    ///
    /// An explicit file must load; the default file is used when present and
    /// built-in defaults otherwise.
    pub fn resolve(explicit: Option<&Path>, paths: &PathConfig) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default_file = config_file(OPTIONS_FILE, paths);
        if default_file.is_file() {
            return Self::load(&default_file);
        }

        debug!("No options file at {}, using defaults", default_file.display());
        Ok(Self::default())
    }

    /// Worker thread count, never zero.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }
}
