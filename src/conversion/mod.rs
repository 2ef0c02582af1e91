//! YOLO to KITTI conversion.
//!
//! [`denormalize`] and [`convert_record`] are the per-box transform; the
//! [`batch`] module walks folder triplets and writes files; [`report`]
//! describes what a run did and skipped.

pub mod batch;
pub mod report;

pub use batch::{
    convert_folder, convert_label_file, run_batch, BatchPlan, FileOutcome, FolderTriplet,
};
pub use report::{BatchCounts, BatchIssue, BatchReport, IssueCode, IssueSeverity};

use crate::error::Yolo2KittiError;
use crate::ir::{BBoxXYXY, ExtraFieldsPolicy, KittiRecord, Pixel, YoloRecord};
use crate::mapping::ClassMapping;

/// Extension used to find companion images when none is configured.
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Pixel dimensions of a companion image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Per-run conversion settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Extension (without the dot) of companion images.
    pub image_extension: String,
    /// Handling of label lines with more than five fields.
    pub extra_fields: ExtraFieldsPolicy,
    /// Name written for class ids missing from the mapping. `None` skips
    /// those lines instead.
    pub fallback_class: Option<String>,
    /// Draw a progress bar per folder on stderr.
    pub show_progress: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            extra_fields: ExtraFieldsPolicy::default(),
            fallback_class: None,
            show_progress: false,
        }
    }
}

/// Validate a user-supplied image extension, dropping one leading dot.
pub fn normalize_image_extension(raw: &str) -> Result<String, Yolo2KittiError> {
    let ext = raw.trim();
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() || ext.contains(['/', '\\', '.']) || ext.contains(char::is_whitespace) {
        return Err(Yolo2KittiError::InvalidImageExtension(raw.to_string()));
    }
    Ok(ext.to_string())
}

/// Scale a YOLO box to pixel corners on an image of the given size.
///
/// ```text
/// x_left   = (x_center - width/2)  * W
/// y_top    = (y_center - height/2) * H
/// x_right  = (x_center + width/2)  * W
/// y_bottom = (y_center + height/2) * H
/// ```
///
/// Results are not clamped to the image.
pub fn denormalize(record: &YoloRecord, image: ImageSize) -> BBoxXYXY<Pixel> {
    record
        .bbox()
        .to_pixel(f64::from(image.width), f64::from(image.height))
}

/// Convert one YOLO record into a KITTI record.
///
/// Fails with [`Yolo2KittiError::UnmappedClassId`] when the class id has no
/// name in `mapping` and no fallback is configured.
pub fn convert_record(
    record: &YoloRecord,
    image: ImageSize,
    mapping: &ClassMapping,
    options: &ConvertOptions,
) -> Result<KittiRecord, Yolo2KittiError> {
    let class_name = mapping
        .name_for(record.class_id)
        .or(options.fallback_class.as_deref())
        .ok_or(Yolo2KittiError::UnmappedClassId {
            class_id: record.class_id,
        })?;

    Ok(KittiRecord::new(class_name, denormalize(record, image)))
}
