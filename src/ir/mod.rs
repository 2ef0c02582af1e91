//! Label geometry and the two on-disk label formats.
//!
//! Boxes are carried as corner pairs tagged with their coordinate space, so
//! a normalized YOLO box has to go through
//! [`BBoxXYXY::to_pixel`] before it can end up in a KITTI record.
//!
//! # Example
//!
//! ```
//! use yolo2kitti::ir::{BBoxXYXY, KittiRecord, Normalized};
//!
//! let norm: BBoxXYXY<Normalized> = BBoxXYXY::from_cxcywh(0.5, 0.5, 0.2, 0.2);
//! let record = KittiRecord::new("license_plate", norm.to_pixel(100.0, 100.0));
//! assert_eq!(
//!     record.to_string(),
//!     "license_plate 0.0 0 -1.0 40.00 40.00 60.00 60.00 0 0 0 0 0 0"
//! );
//! ```

mod bbox;
mod coord;
pub mod io_kitti;
pub mod io_yolo;
mod space;

pub use bbox::BBoxXYXY;
pub use coord::Coord;
pub use io_kitti::KittiRecord;
pub use io_yolo::{ExtraFieldsPolicy, YoloRecord};
pub use space::{Normalized, Pixel};
