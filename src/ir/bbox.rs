//! Axis-aligned bounding boxes stored as corner pairs.

use super::coord::Coord;
use super::{Normalized, Pixel};

/// A box given by its top-left (`min`) and bottom-right (`max`) corners.
///
/// Nothing here clamps or reorders the corners. A YOLO record that spills
/// past the image edge, or has a negative width, produces a box that says
/// exactly that; callers that care can ask [`is_ordered`](Self::is_ordered).
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub min: Coord<TSpace>,
    pub max: Coord<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            min: Coord::new(xmin, ymin),
            max: Coord::new(xmax, ymax),
        }
    }

    /// Builds a box from its center point and size.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        let half_w = w / 2.0;
        let half_h = h / 2.0;
        Self::from_xyxy(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }

    /// Returns `(cx, cy, w, h)`.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            self.width(),
            self.height(),
        )
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.min.x
    }

    #[inline]
    pub fn ymin(&self) -> f64 {
        self.min.y
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.max.x
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.max.y
    }

    /// Negative when the corners are swapped on the x axis.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Negative when the corners are swapped on the y axis.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// True when `min <= max` on both axes.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.min.x)
            .field("ymin", &self.min.y)
            .field("xmax", &self.max.x)
            .field("ymax", &self.max.y)
            .finish()
    }
}

impl BBoxXYXY<Normalized> {
    /// Scales a normalized box up to an image of `image_width` x `image_height` pixels.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BBoxXYXY<Pixel> {
        BBoxXYXY::from_xyxy(
            self.min.x * image_width,
            self.min.y * image_height,
            self.max.x * image_width,
            self.max.y * image_height,
        )
    }
}

impl BBoxXYXY<Pixel> {
    /// Inverse of `to_pixel` on a normalized box.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_xyxy(
            self.min.x / image_width,
            self.min.y / image_height,
            self.max.x / image_width,
            self.max.y / image_height,
        )
    }
}
