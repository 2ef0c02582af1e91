//! Coordinate space markers.
//!
//! YOLO boxes live in normalized space, KITTI boxes in pixel space. The
//! markers are uninhabited types used only as type parameters, so a box in
//! one space cannot be written out as if it were in the other.

use std::fmt;

/// Absolute pixel coordinates, origin at the top-left corner of the image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Coordinates expressed as fractions of the image width and height.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
