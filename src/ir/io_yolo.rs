//! YOLO label line parsing.
//!
//! One line per box: `<class_id> <x_center> <y_center> <width> <height>`,
//! coordinates normalized to the image size.

use std::fs;
use std::path::Path;

use super::{BBoxXYXY, Normalized};
use crate::error::Yolo2KittiError;

/// File extension of YOLO label files.
pub const LABEL_EXTENSION: &str = "txt";

const BBOX_TOKENS: usize = 5;

/// What to do with lines carrying more than the five bbox tokens
/// (segmentation polygons, keypoints, confidence columns, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExtraFieldsPolicy {
    /// Skip the line and report it.
    #[default]
    Reject,
    /// Convert the leading bbox tokens and drop the rest.
    Ignore,
}

/// One parsed YOLO box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloRecord {
    pub class_id: u64,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloRecord {
    /// The record's box in normalized corner form.
    pub fn bbox(&self) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_cxcywh(self.x_center, self.y_center, self.width, self.height)
    }
}

/// Read a whole label file as UTF-8 text.
pub fn read_label_file(path: &Path) -> Result<String, Yolo2KittiError> {
    fs::read_to_string(path).map_err(|source| Yolo2KittiError::LabelFileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a single label line.
///
/// Blank lines yield `Ok(None)`. `line_num` is 1-based and only used for
/// error messages.
pub fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
    extra_fields: ExtraFieldsPolicy,
) -> Result<Option<YoloRecord>, Yolo2KittiError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parse_err = |message: String| Yolo2KittiError::YoloLabelParse {
        path: file_path.to_path_buf(),
        line: line_num,
        message,
    };

    // One past the bbox tokens is enough to detect extra fields.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(BBOX_TOKENS + 1).collect();

    if tokens.len() < BBOX_TOKENS {
        return Err(parse_err(format!(
            "expected {BBOX_TOKENS} tokens, found {}",
            tokens.len()
        )));
    }

    if tokens.len() > BBOX_TOKENS && extra_fields == ExtraFieldsPolicy::Reject {
        return Err(parse_err(
            "line has more than 5 fields (segmentation/pose/extra attributes); \
             pass --extra-fields ignore to convert the bbox part"
                .to_string(),
        ));
    }

    let class_id = tokens[0].parse::<u64>().map_err(|_| {
        parse_err(format!(
            "invalid class_id '{}'; expected non-negative integer",
            tokens[0]
        ))
    })?;

    let field = |idx: usize, name: &str| -> Result<f64, Yolo2KittiError> {
        let raw = tokens[idx];
        let value = raw.parse::<f64>().map_err(|_| {
            parse_err(format!(
                "invalid {name} '{raw}'; expected floating-point number"
            ))
        })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(parse_err(format!("{name} '{raw}' is not finite")))
        }
    };

    Ok(Some(YoloRecord {
        class_id,
        x_center: field(1, "x_center")?,
        y_center: field(2, "y_center")?,
        width: field(3, "width")?,
        height: field(4, "height")?,
    }))
}

/// Fuzz-only entrypoint for YOLO single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), Yolo2KittiError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1, ExtraFieldsPolicy::Ignore)?;
    Ok(())
}
