//! Image helpers: texture extraction, placeholder synthesis, mask decoding.
//!
//! Texture pages are decoded lazily, once per page, and shared between
//! worker threads. Every extracted frame is an owned RGBA buffer.

use std::path::PathBuf;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use log::{debug, trace};
use once_cell::sync::OnceCell;

use crate::source::{SourceData, TexturePageItem};

/// Texture extraction errors
#[derive(Debug, Clone)]
pub enum TextureError {
    PageMissing(usize),
    PageDecode { page: usize, reason: String },
    OutOfBounds { page: usize, item: TexturePageItem },
    /// Zero-sized region or bounding canvas.
    EmptyRegion { page: usize, item: TexturePageItem },
}

impl std::fmt::Display for TextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureError::PageMissing(page) => write!(f, "Texture page {} not in dump", page),
            TextureError::PageDecode { page, reason } => {
                write!(f, "Texture page {} failed to decode: {}", page, reason)
            }
            TextureError::OutOfBounds { page, item } => write!(
                f,
                "Region {}x{}+{}+{} lies outside texture page {}",
                item.source_width, item.source_height, item.source_x, item.source_y, page
            ),
            TextureError::EmptyRegion { page, item } => write!(
                f,
                "Empty region {}x{} (canvas {}x{}) on texture page {}",
                item.source_width, item.source_height, item.bounding_width, item.bounding_height, page
            ),
        }
    }
}

impl std::error::Error for TextureError {}

/// Source of frame pixels.
///
/// Implemented by [`TexturePages`] for real dumps; tests plug in their own.
pub trait TextureSource: Send + Sync {
    /// Pixels of one texture page item, placed on its bounding canvas.
    fn texture_for(&self, item: &TexturePageItem) -> Result<RgbaImage, TextureError>;
}

/// Texture pages of a dump, decoded on first use.
pub struct TexturePages {
    paths: Vec<PathBuf>,
    pages: Vec<OnceCell<Arc<RgbaImage>>>,
}

impl TexturePages {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        let pages = paths.iter().map(|_| OnceCell::new()).collect();
        Self { paths, pages }
    }

    pub fn from_source(source: &SourceData) -> Self {
        let paths = (0..source.pages.len())
            .filter_map(|i| source.page_path(i))
            .collect();
        Self::new(paths)
    }

    fn page(&self, index: usize) -> Result<Arc<RgbaImage>, TextureError> {
        let cell = self.pages.get(index).ok_or(TextureError::PageMissing(index))?;
        cell.get_or_try_init(|| {
            let path = &self.paths[index];
            debug!("Decoding texture page {}: {}", index, path.display());
            image::open(path)
                .map(|img| Arc::new(img.to_rgba8()))
                .map_err(|e| TextureError::PageDecode {
                    page: index,
                    reason: e.to_string(),
                })
        })
        .cloned()
    }
}

impl TextureSource for TexturePages {
    fn texture_for(&self, item: &TexturePageItem) -> Result<RgbaImage, TextureError> {
        let page = self.page(item.page)?;
        extract_item(&page, item)
    }
}

/// Cut one texture page item out of its page.
///
/// The stored region is scaled to its target size when the packer shrank it
/// and then pasted at its target offset on a bounding-size canvas.
pub fn extract_item(page: &RgbaImage, item: &TexturePageItem) -> Result<RgbaImage, TextureError> {
    if item.source_width == 0 || item.source_height == 0 || item.bounding_width == 0 || item.bounding_height == 0 {
        return Err(TextureError::EmptyRegion { page: item.page, item: *item });
    }
    let fits_x = item.source_x.checked_add(item.source_width).is_some_and(|r| r <= page.width());
    let fits_y = item.source_y.checked_add(item.source_height).is_some_and(|b| b <= page.height());
    if !fits_x || !fits_y {
        return Err(TextureError::OutOfBounds { page: item.page, item: *item });
    }

    let mut region = imageops::crop_imm(
        page,
        item.source_x,
        item.source_y,
        item.source_width,
        item.source_height,
    )
    .to_image();

    let (target_w, target_h) = (item.target_width.max(1), item.target_height.max(1));
    if item.target_width != 0
        && item.target_height != 0
        && (target_w, target_h) != region.dimensions()
    {
        trace!(
            "Rescaling region {:?} -> {}x{}",
            region.dimensions(),
            target_w,
            target_h
        );
        region = imageops::resize(&region, target_w, target_h, FilterType::Nearest);
    }

    let canvas_w = item.bounding_width.max(region.width());
    let canvas_h = item.bounding_height.max(region.height());
    let mut canvas = RgbaImage::new(canvas_w, canvas_h);
    imageops::replace(&mut canvas, &region, item.target_x as i64, item.target_y as i64);
    Ok(canvas)
}

/// Fully transparent canvas.
pub fn transparent(width: u32, height: u32) -> RgbaImage {
    RgbaImage::new(width.max(1), height.max(1))
}

/// Magenta/black checker standing in for a lost texture.
///
/// The 2x2 pattern is stretched (nearest neighbour) over the bounding box
/// and, when the box does not cover the whole sprite, pasted at the box
/// offset on a transparent sprite-size canvas.
pub fn missing_texture(bbox: (i32, i32, i32, i32), width: u32, height: u32) -> RgbaImage {
    let (left, top, right, bottom) = bbox;
    let bbox_w = (right - left + 1).max(1) as u32;
    let bbox_h = (bottom - top + 1).max(1) as u32;

    let mut pattern = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
    pattern.put_pixel(0, 0, Rgba([255, 0, 255, 255]));
    pattern.put_pixel(1, 1, Rgba([255, 0, 255, 255]));

    let filled = imageops::resize(&pattern, bbox_w, bbox_h, FilterType::Nearest);
    if bbox_w == width && bbox_h == height {
        return filled;
    }

    let mut canvas = transparent(width, height);
    imageops::replace(&mut canvas, &filled, left as i64, top as i64);
    canvas
}

/// Unpack a 1-bit collision mask into a black/white raster.
///
/// Rows are `ceil(width / 8)` bytes, most significant bit first. Missing
/// trailing bytes read as empty.
pub fn decode_mask(bits: &[u8], width: u32, height: u32) -> GrayImage {
    let stride = width.div_ceil(8) as usize;
    GrayImage::from_fn(width, height, |x, y| {
        let byte = bits.get(y as usize * stride + (x / 8) as usize).copied().unwrap_or(0);
        let set = byte & (0x80 >> (x % 8)) != 0;
        Luma([if set { 255 } else { 0 }])
    })
}
