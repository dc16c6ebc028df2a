//! Decompiled asset graph.
//!
//! Read-only view of a game archive as produced by the decompiler: sprites,
//! sounds, rooms, groups and general info. The exporter never mutates it.
//! A graph is loaded from a JSON dump whose texture pages are PNG files
//! stored next to it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;

/// Whole decompiled archive.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceData {
    pub general: GeneralInfo,
    pub sprites: Vec<SourceSprite>,
    pub sounds: Vec<SourceSound>,
    pub rooms: Vec<SourceRoom>,
    pub audio_groups: Vec<SourceAudioGroup>,
    pub texture_groups: Vec<SourceTextureGroup>,
    /// Texture page image files, relative to the dump.
    pub pages: Vec<PathBuf>,
    /// Directory the dump was loaded from (runtime-only).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl SourceData {
    /// Load a JSON dump from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dump: {}", path.display()))?;
        let mut data: SourceData = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse dump: {}", path.display()))?;

        data.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        info!(
            "Loaded '{}': {} sprites, {} sounds, {} rooms, {} texture pages",
            data.general.name,
            data.sprites.len(),
            data.sounds.len(),
            data.rooms.len(),
            data.pages.len()
        );
        debug!("Dump base directory: {}", data.base_dir.display());
        Ok(data)
    }

    /// Absolute path of texture page `index`, if it exists in the dump.
    pub fn page_path(&self, index: usize) -> Option<PathBuf> {
        self.pages.get(index).map(|p| self.base_dir.join(p))
    }

    /// Resolve a dump-relative file path.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.base_dir.join(relative)
    }
}

/// Game-wide metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralInfo {
    pub name: String,
    pub display_name: String,
    /// Active build configuration; "Default" unless the game used another.
    pub config: String,
    pub game_speed: u32,
    /// Room names in play order.
    pub room_order: Vec<String>,
    pub fullscreen: bool,
    pub interpolate_pixels: bool,
    pub vsync: bool,
    pub borderless: bool,
    pub resizable: bool,
    pub show_cursor: bool,
}

impl Default for GeneralInfo {
    fn default() -> Self {
        Self {
            name: "Project".to_string(),
            display_name: String::new(),
            config: "Default".to_string(),
            game_speed: 30,
            room_order: Vec::new(),
            fullscreen: false,
            interpolate_pixels: false,
            vsync: false,
            borderless: false,
            resizable: false,
            show_cursor: true,
        }
    }
}

/// Collision mask layout stored with a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SepMaskType {
    #[default]
    AxisAlignedRect,
    Precise,
    RotatedRect,
}

/// One frame's placement inside a texture page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct TexturePageItem {
    pub source_x: u32,
    pub source_y: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub target_x: u32,
    pub target_y: u32,
    pub target_width: u32,
    pub target_height: u32,
    pub bounding_width: u32,
    pub bounding_height: u32,
    /// Index into [`SourceData::pages`].
    pub page: usize,
}

/// Nine-slice block as stored in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SourceNineSlice {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub enabled: bool,
    /// Raw tile modes: left, top, right, bottom, centre.
    pub tile_modes: [u8; 5],
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceSprite {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub origin_x: i32,
    pub origin_y: i32,
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_top: i32,
    pub margin_bottom: i32,
    /// Raw bbox mode (0 automatic, 1 full image, 2 manual).
    pub bbox_mode: u32,
    pub sep_masks: SepMaskType,
    /// Packed 1-bit rows, MSB first, `ceil(width / 8)` bytes per row.
    pub collision_masks: Vec<Vec<u8>>,
    /// One entry per frame; `None` when the archive lost the texture.
    pub textures: Vec<Option<TexturePageItem>>,
    pub playback_speed: f32,
    /// Raw speed type (0 frames per second, 1 frames per game frame).
    pub playback_speed_type: u32,
    pub nine_slice: Option<SourceNineSlice>,
}

impl SourceSprite {
    /// Mask raster size.
    pub fn mask_dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSound {
    pub name: String,
    /// Original file name of the sound, including extension.
    pub file: String,
    pub volume: f32,
    pub pitch: f32,
    pub flags: u32,
    pub audio_group: String,
    /// Extracted audio data, relative to the dump.
    pub data: Option<PathBuf>,
}

impl Default for SourceSound {
    fn default() -> Self {
        Self {
            name: String::new(),
            file: String::new(),
            volume: 1.0,
            pitch: 0.0,
            flags: 0,
            audio_group: "audiogroup_default".to_string(),
            data: None,
        }
    }
}

impl SourceSound {
    pub const FLAG_EMBEDDED: u32 = 0x1;
    pub const FLAG_COMPRESSED: u32 = 0x2;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceRoom {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceAudioGroup {
    pub name: String,
}

/// Texture group declared by the game, with the sprites packed into it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceTextureGroup {
    pub name: String,
    pub sprites: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dump_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{
                "general": { "name": "MyGame" },
                "sprites": [
                    { "name": "spr_a", "width": 16, "height": 16,
                      "sep_masks": "Precise",
                      "textures": [ { "source_width": 16, "source_height": 16 }, null ] }
                ],
                "pages": ["page0.png"]
            }"#,
        )
        .unwrap();

        let data = SourceData::load(&path).unwrap();
        assert_eq!(data.general.name, "MyGame");
        assert_eq!(data.general.config, "Default");
        assert_eq!(data.sprites.len(), 1);
        assert_eq!(data.sprites[0].sep_masks, SepMaskType::Precise);
        assert_eq!(data.sprites[0].textures.len(), 2);
        assert!(data.sprites[0].textures[1].is_none());
        assert_eq!(data.page_path(0), Some(dir.path().join("page0.png")));
        assert_eq!(data.page_path(1), None);
    }

    #[test]
    fn test_load_missing_dump_fails() {
        assert!(SourceData::load("/nonexistent/dump.json").is_err());
    }
}
