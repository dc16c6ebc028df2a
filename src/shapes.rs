//! Collision shape inference.
//!
//! The archive only keeps per-pixel collision masks, not the shape the
//! author picked. For single-mask sprites we rasterize an ellipse and a
//! diamond inscribed in the bounding box and compare each against the mask;
//! a close enough match recovers the original shape kind.

use image::{GrayImage, Luma};
use rayon::prelude::*;

/// Boxes this small (in either axis) are never classified.
pub const MIN_EXTENT: i32 = 3;

/// Grow/inset applied to the reference shapes.
const EPSILON: f32 = 0.1;

/// Inclusive bounding box in sprite pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Both extents exceed [`MIN_EXTENT`].
    pub fn is_classifiable(&self) -> bool {
        self.right - self.left > MIN_EXTENT && self.bottom - self.top > MIN_EXTENT
    }

    fn center(&self) -> (f32, f32) {
        (
            (self.left + (self.right - 1)) as f32 / 2.0,
            (self.top + (self.bottom - 1)) as f32 / 2.0,
        )
    }

    fn half_extents(&self) -> (f32, f32) {
        (
            ((self.right - 1) - self.left) as f32 / 2.0,
            ((self.bottom - 1) - self.top) as f32 / 2.0,
        )
    }
}

/// Result of mask classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskShape {
    Precise,
    Ellipse,
    Diamond,
}

/// Classify a single collision mask.
///
/// Ellipse is tested first and wins ties with diamond.
pub fn classify(mask: &GrayImage, bbox: &BoundingBox, threshold: f64) -> MaskShape {
    if !bbox.is_classifiable() {
        return MaskShape::Precise;
    }

    let (width, height) = mask.dimensions();

    let ellipse = ellipse_reference(width, height, bbox);
    if similarity(mask, &ellipse) >= threshold {
        return MaskShape::Ellipse;
    }

    let diamond = diamond_reference(width, height, bbox);
    if similarity(mask, &diamond) >= threshold {
        return MaskShape::Diamond;
    }

    MaskShape::Precise
}

/// Filled ellipse inscribed in `bbox` on a black canvas.
pub fn ellipse_reference(width: u32, height: u32, bbox: &BoundingBox) -> GrayImage {
    let (cx, cy) = bbox.center();
    let (hx, hy) = bbox.half_extents();
    let (rx, ry) = (hx + EPSILON, hy + EPSILON);

    GrayImage::from_fn(width, height, |x, y| {
        let dx = (x as f32 - cx) / rx;
        let dy = (y as f32 - cy) / ry;
        fill(dx * dx + dy * dy <= 1.0)
    })
}

/// Filled rhombus through the bbox edge midpoints (inset) on a black canvas.
pub fn diamond_reference(width: u32, height: u32, bbox: &BoundingBox) -> GrayImage {
    let (cx, cy) = bbox.center();
    let (hx, hy) = bbox.half_extents();
    let (rx, ry) = ((hx - EPSILON).max(f32::EPSILON), (hy - EPSILON).max(f32::EPSILON));

    GrayImage::from_fn(width, height, |x, y| {
        let dx = (x as f32 - cx).abs() / rx;
        let dy = (y as f32 - cy).abs() / ry;
        fill(dx + dy <= 1.0)
    })
}

/// `1 - mean absolute error`, both rasters normalized to 0..1.
///
/// Rasters of different size never match.
pub fn similarity(a: &GrayImage, b: &GrayImage) -> f64 {
    if a.dimensions() != b.dimensions() {
        return 0.0;
    }
    let (width, height) = a.dimensions();
    let pixels = width as u64 * height as u64;
    if pixels == 0 {
        return 1.0;
    }

    let row = width as usize;
    let error: u64 = a
        .as_raw()
        .par_chunks(row)
        .zip(b.as_raw().par_chunks(row))
        .map(|(ra, rb)| {
            ra.iter()
                .zip(rb)
                .map(|(&pa, &pb)| pa.abs_diff(pb) as u64)
                .sum::<u64>()
        })
        .sum();

    1.0 - error as f64 / (pixels as f64 * 255.0)
}

fn fill(inside: bool) -> Luma<u8> {
    Luma([if inside { 255 } else { 0 }])
}
