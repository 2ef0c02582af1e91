//! KITTI 2D label lines.
//!
//! A full KITTI object line looks like:
//!
//! ```text
//! type truncated occluded alpha left top right bottom h w l x y z rotation_y [score]
//! ```
//!
//! Only `type` and the four image-plane corners are meaningful when the source
//! is a 2D detector label. Lines are written with fixed placeholders:
//! `0.0 0 -1.0` before the box and six zeros after it, which is the 2D-only
//! layout consumed by detection training toolkits.

use std::fmt;
use std::fs;
use std::path::Path;

use super::{BBoxXYXY, Pixel};
use crate::error::Yolo2KittiError;

/// type, truncated, occluded, alpha and the four box corners.
const KITTI_MIN_FIELDS: usize = 8;
/// Fifteen object fields plus an optional detection score.
const KITTI_MAX_FIELDS: usize = 16;

/// One KITTI object line.
#[derive(Clone, Debug, PartialEq)]
pub struct KittiRecord {
    pub class_name: String,
    pub truncated: f64,
    pub occluded: u8,
    pub alpha: f64,
    pub bbox: BBoxXYXY<Pixel>,
}

impl KittiRecord {
    /// A record with the placeholder truncation/occlusion/alpha values.
    pub fn new(class_name: impl Into<String>, bbox: BBoxXYXY<Pixel>) -> Self {
        Self {
            class_name: class_name.into(),
            truncated: 0.0,
            occluded: 0,
            alpha: -1.0,
            bbox,
        }
    }
}

impl fmt::Display for KittiRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.1} {} {:.1} {:.2} {:.2} {:.2} {:.2} 0 0 0 0 0 0",
            self.class_name,
            self.truncated,
            self.occluded,
            self.alpha,
            self.bbox.xmin(),
            self.bbox.ymin(),
            self.bbox.xmax(),
            self.bbox.ymax(),
        )
    }
}

/// Render records as file content, one line each, trailing newline included.
pub fn to_kitti_string(records: &[KittiRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out
}

/// Write `records` to `path`, replacing any existing file.
pub fn write_kitti_file(path: &Path, records: &[KittiRecord]) -> Result<(), Yolo2KittiError> {
    fs::write(path, to_kitti_string(records)).map_err(|source| Yolo2KittiError::KittiWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse one KITTI line back into a record.
///
/// Reads the type, the placeholders and the 2D box; any trailing 3D fields or
/// score are accepted but not kept. Blank lines yield `Ok(None)`.
pub fn parse_kitti_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<KittiRecord>, Yolo2KittiError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parse_err = |message: String| Yolo2KittiError::KittiLabelParse {
        path: file_path.to_path_buf(),
        line: line_num,
        message,
    };

    let tokens: Vec<&str> = trimmed
        .split_whitespace()
        .take(KITTI_MAX_FIELDS + 1)
        .collect();
    if !(KITTI_MIN_FIELDS..=KITTI_MAX_FIELDS).contains(&tokens.len()) {
        return Err(parse_err(format!(
            "expected {KITTI_MIN_FIELDS} to {KITTI_MAX_FIELDS} fields, found {}",
            tokens.len()
        )));
    }

    let number = |idx: usize, name: &str| -> Result<f64, Yolo2KittiError> {
        tokens[idx]
            .parse::<f64>()
            .map_err(|_| parse_err(format!("invalid {name} '{}'", tokens[idx])))
    };

    let truncated = number(1, "truncated")?;
    let occluded = tokens[2]
        .parse::<u8>()
        .map_err(|_| parse_err(format!("invalid occluded '{}'", tokens[2])))?;
    let alpha = number(3, "alpha")?;
    let bbox = BBoxXYXY::from_xyxy(
        number(4, "left")?,
        number(5, "top")?,
        number(6, "right")?,
        number(7, "bottom")?,
    );

    Ok(Some(KittiRecord {
        class_name: tokens[0].to_string(),
        truncated,
        occluded,
        alpha,
        bbox,
    }))
}

/// Fuzz-only entrypoint for KITTI single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_kitti_line(input: &str) -> Result<(), Yolo2KittiError> {
    let _ = parse_kitti_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}
