//! Sprite resource and its translator.
//!
//! A decompiled sprite keeps its frames as regions on shared texture pages
//! and its collision as raw masks. Translation turns that back into a
//! `.yy` description with one PNG per frame, a looping frames sequence and a
//! best guess at the authoring-time origin and collision shape.

use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use indexmap::IndexMap;
use log::{debug, trace};
use serde::Serialize;

use super::sequence::{GMSequence, PlaybackSpeedType};
use super::{Payload, Resource, TranslateError};
use crate::config::SpriteOptions;
use crate::export::ExportContext;
use crate::ids::{self, IdPath};
use crate::shapes::{self, BoundingBox, MaskShape};
use crate::source::{SepMaskType, SourceNineSlice, SourceSprite, TexturePageItem};
use crate::texture_groups::CONSOLE_GROUP;
use crate::utils::imaging;

/// Resource folder on disk.
pub const FOLDER: &str = "sprites";

/// Project folder every sprite is parented to.
pub const PARENT_FOLDER: &str = "Sprites";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum BboxMode {
    Automatic,
    FullImage,
    Manual,
}

impl BboxMode {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => BboxMode::FullImage,
            2 => BboxMode::Manual,
            _ => BboxMode::Automatic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum CollisionKind {
    Precise,
    Rectangle,
    Ellipse,
    Diamond,
    PrecisePerFrame,
    RotatedRectangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum SpriteType {
    Bitmap,
    Swf,
    Spine,
}

/// Named origin points; `row * 3 + column` for the nine anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum Origin {
    TopLeft,
    TopCentre,
    TopRight,
    MiddleLeft,
    MiddleCentre,
    MiddleRight,
    BottomLeft,
    BottomCentre,
    BottomRight,
    Custom,
}

impl Origin {
    const ANCHORS: [Origin; 9] = [
        Origin::TopLeft,
        Origin::TopCentre,
        Origin::TopRight,
        Origin::MiddleLeft,
        Origin::MiddleCentre,
        Origin::MiddleRight,
        Origin::BottomLeft,
        Origin::BottomCentre,
        Origin::BottomRight,
    ];
}

into_u8!(BboxMode, CollisionKind, SpriteType, Origin, TileMode, HighlightStyle, BlendMode);

/// Pick the named origin matching a pixel offset.
///
/// Each axis must sit exactly on its start, floored middle or end; a miss on
/// either axis makes the whole origin `Custom`.
pub fn infer_origin(x: i32, y: i32, width: u32, height: u32) -> Origin {
    fn anchor(offset: i32, size: u32) -> Option<usize> {
        let (offset, size) = (offset as i64, size as i64);
        if offset == size / 2 {
            Some(1)
        } else if offset == size {
            Some(2)
        } else if offset == 0 {
            Some(0)
        } else {
            None
        }
    }

    match (anchor(x, width), anchor(y, height)) {
        (Some(column), Some(row)) => Origin::ANCHORS[row * 3 + column],
        _ => Origin::Custom,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum TileMode {
    Stretch,
    Repeat,
    Mirror,
    BlankRepeat,
    Hide,
}

impl TileMode {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => TileMode::Repeat,
            2 => TileMode::Mirror,
            3 => TileMode::BlankRepeat,
            4 => TileMode::Hide,
            _ => TileMode::Stretch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum HighlightStyle {
    Inverted,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum BlendMode {
    Normal,
    Add,
    Subtract,
    Multiply,
}

const DEFAULT_GUIDE_COLOUR: u32 = 4_294_902_015;
const DEFAULT_HIGHLIGHT_COLOUR: u32 = 1_728_023_040;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GMNineSliceData {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub guide_colour: [u32; 4],
    pub highlight_colour: u32,
    pub highlight_style: HighlightStyle,
    pub enabled: bool,
    /// Left, top, right, bottom, centre.
    pub tile_mode: [TileMode; 5],
    pub loaded_version: Option<()>,
    pub resource_version: &'static str,
    pub resource_type: &'static str,
}

impl From<&SourceNineSlice> for GMNineSliceData {
    fn from(source: &SourceNineSlice) -> Self {
        Self {
            left: source.left,
            top: source.top,
            right: source.right,
            bottom: source.bottom,
            guide_colour: [DEFAULT_GUIDE_COLOUR; 4],
            highlight_colour: DEFAULT_HIGHLIGHT_COLOUR,
            highlight_style: HighlightStyle::Inverted,
            enabled: source.enabled,
            tile_mode: source.tile_modes.map(TileMode::from_raw),
            loaded_version: None,
            resource_version: "1.0",
            resource_type: "GMNineSliceData",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GMSpriteFrame {
    pub name: String,
    pub resource_version: &'static str,
    pub tags: Vec<String>,
    pub resource_type: &'static str,
}

impl GMSpriteFrame {
    fn new(name: String) -> Self {
        Self {
            name,
            resource_version: "1.1",
            tags: Vec::new(),
            resource_type: "GMSpriteFrame",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GMImageLayer {
    pub visible: bool,
    pub is_locked: bool,
    pub blend_mode: BlendMode,
    pub opacity: f32,
    pub display_name: String,
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    pub resource_type: &'static str,
}

impl GMImageLayer {
    fn new(name: String) -> Self {
        Self {
            visible: true,
            is_locked: false,
            blend_mode: BlendMode::Normal,
            opacity: 100.0,
            display_name: "default".to_string(),
            resource_version: "1.0",
            name,
            tags: Vec::new(),
            resource_type: "GMImageLayer",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GMSprite {
    pub bbox_mode: BboxMode,
    pub collision_kind: CollisionKind,
    #[serde(rename = "type")]
    pub sprite_type: SpriteType,
    pub origin: Origin,
    pub pre_multiply_alpha: bool,
    pub edge_filtering: bool,
    pub collision_tolerance: u8,
    pub swf_precision: f32,
    #[serde(rename = "bbox_left")]
    pub bbox_left: i32,
    #[serde(rename = "bbox_right")]
    pub bbox_right: i32,
    #[serde(rename = "bbox_top")]
    pub bbox_top: i32,
    #[serde(rename = "bbox_bottom")]
    pub bbox_bottom: i32,
    #[serde(rename = "HTile")]
    pub h_tile: bool,
    #[serde(rename = "VTile")]
    pub v_tile: bool,
    /// Excluded from atlas packing.
    #[serde(rename = "For3D")]
    pub for_3d: bool,
    #[serde(rename = "DynamicTexturePage")]
    pub dynamic_texture_page: bool,
    pub width: u32,
    pub height: u32,
    pub texture_group_id: IdPath,
    pub swatch_colours: Option<Vec<u32>>,
    pub grid_x: u32,
    pub grid_y: u32,
    pub frames: Vec<GMSpriteFrame>,
    pub sequence: GMSequence,
    pub layers: Vec<GMImageLayer>,
    pub nine_slice: Option<GMNineSliceData>,
    pub parent: IdPath,
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    pub resource_type: &'static str,

    /// Frame bitmaps keyed by file stem, relative to the sprite folder.
    #[serde(skip)]
    images: IndexMap<String, Arc<RgbaImage>>,
}

impl GMSprite {
    /// Translate one decompiled sprite.
    ///
    /// Fails only when a frame's pixels cannot be extracted; the caller drops
    /// the sprite and carries on with the rest.
    pub fn translate(source: &SourceSprite, ctx: &ExportContext) -> Result<Self, TranslateError> {
        let name = ids::sanitize_name(&source.name);
        let id = IdPath::resource(&name, FOLDER);
        let options = &ctx.options.sprites;

        let bbox = BoundingBox::new(
            source.margin_left,
            source.margin_top,
            source.margin_right,
            source.margin_bottom,
        );

        let mut sprite = Self {
            bbox_mode: BboxMode::from_raw(source.bbox_mode),
            collision_kind: collision_kind(source, &bbox, options),
            sprite_type: SpriteType::Bitmap,
            origin: infer_origin(source.origin_x, source.origin_y, source.width, source.height),
            pre_multiply_alpha: false,
            edge_filtering: false,
            collision_tolerance: 0,
            swf_precision: 2.525,
            bbox_left: bbox.left,
            bbox_right: bbox.right,
            bbox_top: bbox.top,
            bbox_bottom: bbox.bottom,
            h_tile: false,
            v_tile: false,
            for_3d: false,
            dynamic_texture_page: false,
            width: source.width,
            height: source.height,
            texture_group_id: IdPath::texture_group(crate::texture_groups::DEFAULT_GROUP),
            swatch_colours: None,
            grid_x: 0,
            grid_y: 0,
            frames: Vec::with_capacity(source.textures.len()),
            sequence: GMSequence::for_sprite(
                &id,
                source.playback_speed,
                PlaybackSpeedType::from_raw(source.playback_speed_type),
                (source.origin_x, source.origin_y),
            ),
            layers: vec![GMImageLayer::new(ids::content_id(&format!("{name}.layer")))],
            nine_slice: source.nine_slice.as_ref().map(GMNineSliceData::from),
            parent: IdPath::folder(PARENT_FOLDER),
            resource_version: "1.0",
            name,
            tags: Vec::new(),
            resource_type: "GMSprite",
            images: IndexMap::new(),
        };

        if ctx.texture_groups.is_enabled() {
            let assignment = ctx.texture_groups.resolve(&source.name);
            sprite.for_3d = assignment.dedicated_page;
            sprite.texture_group_id = IdPath::texture_group(&assignment.group);
        }

        for (index, texture) in source.textures.iter().enumerate() {
            if texture.is_none() {
                ctx.texture_groups.use_console_group();
                sprite.texture_group_id = IdPath::texture_group(CONSOLE_GROUP);
                if !options.missing_texture {
                    // An empty bitmap cannot be auto-trimmed
                    sprite.bbox_mode = BboxMode::Manual;
                }
            }
            sprite.add_frame(index, texture.as_ref(), ctx)?;
        }

        debug!(
            "Sprite {}: {} frames, origin {:?}, collision {:?}, group {}",
            sprite.name,
            sprite.frames.len(),
            sprite.origin,
            sprite.collision_kind,
            sprite.texture_group_id.name
        );
        Ok(sprite)
    }

    /// Record frame `index` and materialize its bitmap.
    fn add_frame(
        &mut self,
        index: usize,
        texture: Option<&TexturePageItem>,
        ctx: &ExportContext,
    ) -> Result<(), TranslateError> {
        let frame_id = ids::content_id(&format!("{}.{}", self.name, index));
        self.frames.push(GMSpriteFrame::new(frame_id.clone()));
        self.sequence.add_frame_key(
            index,
            ids::content_id(&format!("{}.{}k", self.name, index)),
            IdPath::new(frame_id.clone(), self.sequence.sprite_id.path.clone()),
        );

        let existing = ctx.output_root.join(ids::frame_image_path(&self.name, &frame_id));
        if ctx.options.sprites.skip_existing && existing.exists() {
            trace!("Keeping existing frame {}", existing.display());
            return Ok(());
        }

        let image = match texture {
            Some(item) => ctx
                .textures
                .texture_for(item)
                .map_err(|error| TranslateError::Texture { frame: index, error })?,
            None if ctx.options.sprites.missing_texture => {
                imaging::missing_texture(self.bbox(), self.width, self.height)
            }
            None => imaging::transparent(self.width, self.height),
        };

        // Layer file and canonical frame file are the same bitmap
        let image = Arc::new(image);
        let layer = format!("layers/{}/{}", frame_id, self.layers[0].name);
        self.images.insert(frame_id, Arc::clone(&image));
        self.images.insert(layer, image);
        Ok(())
    }

    fn bbox(&self) -> (i32, i32, i32, i32) {
        (self.bbox_left, self.bbox_top, self.bbox_right, self.bbox_bottom)
    }

    /// Materialized frame bitmaps by key.
    pub fn images(&self) -> &IndexMap<String, Arc<RgbaImage>> {
        &self.images
    }
}

/// Collision kind from mask layout, with shape recovery for single masks.
fn collision_kind(source: &SourceSprite, bbox: &BoundingBox, options: &SpriteOptions) -> CollisionKind {
    match source.sep_masks {
        SepMaskType::AxisAlignedRect => CollisionKind::Rectangle,
        SepMaskType::RotatedRect => CollisionKind::RotatedRectangle,
        SepMaskType::Precise => match source.collision_masks.as_slice() {
            [] => CollisionKind::Rectangle,
            [mask] => {
                if !options.shaped_masks || !bbox.is_classifiable() {
                    return CollisionKind::Precise;
                }
                let (width, height) = source.mask_dimensions();
                let raster = imaging::decode_mask(mask, width, height);
                match shapes::classify(&raster, bbox, options.shaped_mask_precision) {
                    MaskShape::Ellipse => CollisionKind::Ellipse,
                    MaskShape::Diamond => CollisionKind::Diamond,
                    MaskShape::Precise => CollisionKind::Precise,
                }
            }
            _ => CollisionKind::PrecisePerFrame,
        },
    }
}

impl Resource for GMSprite {
    fn name(&self) -> &str {
        &self.name
    }

    fn directory(&self) -> PathBuf {
        ids::resource_dir(&self.name, FOLDER)
    }

    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn payloads(&self) -> Vec<Payload> {
        self.images
            .iter()
            .map(|(key, image)| Payload::Image {
                file: PathBuf::from(format!("{key}.png")),
                image: Arc::clone(image),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportOptions;
    use crate::source::{SourceData, SourceTextureGroup};
    use crate::utils::imaging::{TextureError, TextureSource};
    use image::Rgba;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Texture source that hands out solid frames and counts reads
    #[derive(Default)]
    struct CountingTextures {
        reads: Arc<AtomicUsize>,
        fail: bool,
    }

    impl TextureSource for CountingTextures {
        fn texture_for(&self, item: &TexturePageItem) -> Result<RgbaImage, TextureError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TextureError::PageMissing(item.page));
            }
            Ok(RgbaImage::from_pixel(item.bounding_width, item.bounding_height, Rgba([1, 2, 3, 255])))
        }
    }

    fn item() -> TexturePageItem {
        TexturePageItem {
            source_width: 16,
            source_height: 16,
            target_width: 16,
            target_height: 16,
            bounding_width: 16,
            bounding_height: 16,
            ..Default::default()
        }
    }

    fn sprite(name: &str, frames: usize) -> SourceSprite {
        SourceSprite {
            name: name.to_string(),
            width: 16,
            height: 16,
            margin_right: 15,
            margin_bottom: 15,
            textures: vec![Some(item()); frames],
            playback_speed: 15.0,
            ..Default::default()
        }
    }

    fn context(source: SourceData, options: ExportOptions, textures: CountingTextures, root: &Path) -> ExportContext {
        ExportContext::new(options, source, Box::new(textures), root.to_path_buf())
    }

    #[test]
    fn test_origin_inference() {
        assert_eq!(infer_origin(0, 0, 64, 64), Origin::TopLeft);
        assert_eq!(infer_origin(32, 32, 64, 64), Origin::MiddleCentre);
        assert_eq!(infer_origin(64, 64, 64, 64), Origin::BottomRight);
        assert_eq!(infer_origin(5, 0, 64, 64), Origin::Custom);
        assert_eq!(infer_origin(0, 5, 64, 64), Origin::Custom);
        assert_eq!(infer_origin(32, 0, 64, 64), Origin::TopCentre);
        assert_eq!(infer_origin(0, 64, 64, 64), Origin::BottomLeft);
        // Floored middle
        assert_eq!(infer_origin(2, 2, 5, 5), Origin::MiddleCentre);
    }

    #[test]
    fn test_frames_match_sequence() {
        let source = SourceData { sprites: vec![sprite("spr_walk", 3)], ..Default::default() };
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(source, ExportOptions::default(), CountingTextures::default(), dir.path());

        let out = GMSprite::translate(&ctx.source.sprites[0], &ctx).unwrap();
        assert_eq!(out.frames.len(), 3);
        assert_eq!(out.sequence.length, 3.0);
        assert_eq!(out.sequence.frame_keys().len(), 3);
        assert_eq!(out.layers.len(), 1);
        assert_eq!(out.sequence.playback_speed, 15.0);
        assert_eq!(out.parent.path, "folders/Sprites.yy");

        // Two keys per frame, sharing one bitmap
        assert_eq!(out.images().len(), 6);
        let frame = &out.frames[1].name;
        let layer_key = format!("layers/{}/{}", frame, out.layers[0].name);
        assert!(Arc::ptr_eq(&out.images()[frame], &out.images()[&layer_key]));

        for (i, key) in out.sequence.frame_keys().iter().enumerate() {
            assert_eq!(key.key, i as f32);
            assert_eq!(key.channels["0"].id.name, out.frames[i].name);
        }
    }

    #[test]
    fn test_translation_is_deterministic() {
        let source = SourceData { sprites: vec![sprite("spr_a", 2)], ..Default::default() };
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(source, ExportOptions::default(), CountingTextures::default(), dir.path());

        let a = GMSprite::translate(&ctx.source.sprites[0], &ctx).unwrap();
        let b = GMSprite::translate(&ctx.source.sprites[0], &ctx).unwrap();
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
        assert_eq!(a.images().keys().collect::<Vec<_>>(), b.images().keys().collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_texture_transparent_forces_manual_bbox() {
        let mut src = sprite("spr_lost", 1);
        src.textures = vec![None];
        let source = SourceData { sprites: vec![src], ..Default::default() };

        let mut options = ExportOptions::default();
        options.sprites.missing_texture = false;
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(source, options, CountingTextures::default(), dir.path());

        let out = GMSprite::translate(&ctx.source.sprites[0], &ctx).unwrap();
        assert_eq!(out.bbox_mode, BboxMode::Manual);
        assert_eq!(out.texture_group_id.name, CONSOLE_GROUP);
        assert!(ctx.texture_groups.console_group_used());

        let image = &out.images()[&out.frames[0].name];
        assert_eq!(image.dimensions(), (16, 16));
        assert!(image.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_missing_texture_placeholder_keeps_bbox_mode() {
        let mut src = sprite("spr_lost", 1);
        src.textures = vec![None];
        let source = SourceData { sprites: vec![src], ..Default::default() };
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(source, ExportOptions::default(), CountingTextures::default(), dir.path());

        let out = GMSprite::translate(&ctx.source.sprites[0], &ctx).unwrap();
        assert_eq!(out.bbox_mode, BboxMode::Automatic);
        let image = &out.images()[&out.frames[0].name];
        assert_eq!(image.get_pixel(0, 0), &Rgba([255, 0, 255, 255]));
    }

    #[test]
    fn test_skip_existing_never_reads_pixels() {
        let source = SourceData { sprites: vec![sprite("spr_done", 1)], ..Default::default() };
        let dir = tempfile::tempdir().unwrap();

        let mut options = ExportOptions::default();
        options.sprites.skip_existing = true;

        let frame_id = ids::content_id("spr_done.0");
        let existing = dir.path().join(ids::frame_image_path("spr_done", &frame_id));
        std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
        std::fs::write(&existing, b"png").unwrap();

        let textures = CountingTextures::default();
        let reads = Arc::clone(&textures.reads);
        let ctx = context(source, options, textures, dir.path());

        let out = GMSprite::translate(&ctx.source.sprites[0], &ctx).unwrap();
        assert_eq!(out.frames.len(), 1);
        assert_eq!(out.frames[0].name, frame_id);
        assert!(out.images().is_empty());
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_texture_failure_aborts_sprite() {
        let source = SourceData { sprites: vec![sprite("spr_bad", 2)], ..Default::default() };
        let dir = tempfile::tempdir().unwrap();
        let textures = CountingTextures { fail: true, ..Default::default() };
        let ctx = context(source, ExportOptions::default(), textures, dir.path());

        let result = GMSprite::translate(&ctx.source.sprites[0], &ctx);
        assert!(matches!(result, Err(TranslateError::Texture { frame: 0, .. })));
    }

    #[test]
    fn test_collision_kinds() {
        let options = SpriteOptions::default();
        let bbox = BoundingBox::new(0, 0, 15, 15);

        let mut src = sprite("spr_c", 1);
        assert_eq!(collision_kind(&src, &bbox, &options), CollisionKind::Rectangle);

        src.sep_masks = SepMaskType::RotatedRect;
        assert_eq!(collision_kind(&src, &bbox, &options), CollisionKind::RotatedRectangle);

        src.sep_masks = SepMaskType::Precise;
        src.collision_masks = vec![vec![0; 32], vec![0; 32]];
        assert_eq!(collision_kind(&src, &bbox, &options), CollisionKind::PrecisePerFrame);

        // Single full mask: a square, not a shape
        src.collision_masks = vec![vec![0xFF; 32]];
        assert_eq!(collision_kind(&src, &bbox, &options), CollisionKind::Precise);

        // Heuristics off
        let off = SpriteOptions { shaped_masks: false, ..options };
        assert_eq!(collision_kind(&src, &bbox, &off), CollisionKind::Precise);
    }

    #[test]
    fn test_collision_recovers_ellipse() {
        let bbox = BoundingBox::new(2, 2, 22, 22);
        let raster = shapes::ellipse_reference(24, 24, &bbox);

        // Pack the raster back into 1-bit rows
        let mut bits = vec![0u8; 3 * 24];
        for (x, y, p) in raster.enumerate_pixels() {
            if p[0] != 0 {
                bits[y as usize * 3 + x as usize / 8] |= 0x80 >> (x % 8);
            }
        }

        let mut src = sprite("spr_ball", 1);
        src.width = 24;
        src.height = 24;
        src.sep_masks = SepMaskType::Precise;
        src.collision_masks = vec![bits];
        assert_eq!(collision_kind(&src, &bbox, &SpriteOptions::default()), CollisionKind::Ellipse);
    }

    #[test]
    fn test_texture_group_assignment() {
        let source = SourceData {
            sprites: vec![sprite("spr_a", 1), sprite("spr_b", 1)],
            texture_groups: vec![SourceTextureGroup { name: "tg_ui".into(), sprites: vec!["spr_a".into()] }],
            ..Default::default()
        };
        let options = ExportOptions { texture_groups: true, ..Default::default() };
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(source, options, CountingTextures::default(), dir.path());

        let a = GMSprite::translate(&ctx.source.sprites[0], &ctx).unwrap();
        assert_eq!(a.texture_group_id, IdPath::texture_group("tg_ui"));
        assert!(!ctx.texture_groups.console_group_used());

        let b = GMSprite::translate(&ctx.source.sprites[1], &ctx).unwrap();
        assert_eq!(b.texture_group_id.name, CONSOLE_GROUP);
        assert!(ctx.texture_groups.console_group_used());
    }

    #[test]
    fn test_nine_slice_copied() {
        let mut src = sprite("spr_panel", 1);
        src.nine_slice = Some(SourceNineSlice {
            left: 4,
            top: 4,
            right: 4,
            bottom: 4,
            enabled: true,
            tile_modes: [0, 1, 2, 3, 4],
        });
        let source = SourceData { sprites: vec![src], ..Default::default() };
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(source, ExportOptions::default(), CountingTextures::default(), dir.path());

        let out = GMSprite::translate(&ctx.source.sprites[0], &ctx).unwrap();
        let nine = out.nine_slice.as_ref().unwrap();
        assert!(nine.enabled);
        assert_eq!(
            nine.tile_mode,
            [TileMode::Stretch, TileMode::Repeat, TileMode::Mirror, TileMode::BlankRepeat, TileMode::Hide]
        );

        let json: serde_json::Value = serde_json::from_str(&out.to_json().unwrap()).unwrap();
        assert_eq!(json["nineSlice"]["tileMode"][4], 4);
        assert_eq!(json["bbox_right"], 15);
        assert_eq!(json["For3D"], false);
        assert_eq!(json["resourceType"], "GMSprite");
    }
}
