use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{AssetSelection, ExportOptions};

// Build version with backend info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Images: image 0.25 (png)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Asset kinds selectable with `--only`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssetArg {
    Sprites,
    Sounds,
    Rooms,
    Options,
}

/// Decompiled game archive to GameMaker project exporter
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Decompiled archive dump (JSON, texture pages next to it)
    #[arg(value_name = "DUMP")]
    pub dump: PathBuf,

    /// Output project directory (default: ./<game name>)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Export options file (JSON); default: gmdump.json in the config directory
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory whose files become included files
    #[arg(short = 'd', long = "datafiles", value_name = "DIR")]
    pub datafiles: Option<PathBuf>,

    /// Export only these asset kinds (can be specified multiple times)
    #[arg(long = "only", value_enum, value_name = "KIND")]
    pub only: Vec<AssetArg>,

    /// Use the game's texture groups instead of Default
    #[arg(long = "texture-groups")]
    pub texture_groups: bool,

    /// Use the game's audio groups instead of audiogroup_default
    #[arg(long = "audio-groups")]
    pub audio_groups: bool,

    /// List option sets for all platforms
    #[arg(long = "other-platforms")]
    pub other_platforms: bool,

    /// Keep frame images already present in the output directory
    #[arg(short = 's', long = "skip-existing")]
    pub skip_existing: bool,

    /// Fill lost textures with transparency instead of a placeholder
    #[arg(long = "no-missing-texture")]
    pub no_missing_texture: bool,

    /// Do not try to recover ellipse/diamond collision masks
    #[arg(long = "no-shaped-masks")]
    pub no_shaped_masks: bool,

    /// Similarity needed for a collision shape match (0..1)
    #[arg(long = "mask-precision", value_name = "RATIO")]
    pub mask_precision: Option<f64>,

    /// Worker threads (default: CPU count)
    #[arg(short = 'j', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Enable debug logging to file (default: gmdump.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Args {
    /// Apply command-line overrides on top of file options.
    ///
    /// Flags only ever switch features on or off relative to the file;
    /// absent flags leave the file value alone.
    pub fn apply(&self, options: &mut ExportOptions) {
        if !self.only.is_empty() {
            let mut assets = AssetSelection::none();
            for kind in &self.only {
                match kind {
                    AssetArg::Sprites => assets.sprites = true,
                    AssetArg::Sounds => assets.sounds = true,
                    AssetArg::Rooms => assets.rooms = true,
                    AssetArg::Options => assets.options = true,
                }
            }
            options.assets = assets;
        }

        options.texture_groups |= self.texture_groups;
        options.audio_groups |= self.audio_groups;
        options.other_platform_options |= self.other_platforms;
        options.sprites.skip_existing |= self.skip_existing;
        if self.no_missing_texture {
            options.sprites.missing_texture = false;
        }
        if self.no_shaped_masks {
            options.sprites.shaped_masks = false;
        }
        if let Some(precision) = self.mask_precision {
            options.sprites.shaped_mask_precision = precision.clamp(0.0, 1.0);
        }
        if self.workers.is_some() {
            options.workers = self.workers;
        }
        if self.datafiles.is_some() {
            options.datafiles = self.datafiles.clone();
        }
    }
}
