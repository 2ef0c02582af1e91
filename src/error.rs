use std::path::PathBuf;
use thiserror::Error;

/// The main error type for yolo2kitti operations.
#[derive(Debug, Error)]
pub enum Yolo2KittiError {
    #[error("Invalid class mapping JSON: {source}")]
    ClassMappingParse {
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "The number of label, output, and image folders must match \
         (got {labels} label, {outputs} output, {images} image folder(s))"
    )]
    FolderCountMismatch {
        labels: usize,
        outputs: usize,
        images: usize,
    },

    #[error("Invalid image extension '{0}'")]
    InvalidImageExtension(String),

    #[error("Failed to create output folder {path}: {source}")]
    OutputDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list label folder {path}: {message}")]
    LabelDirRead { path: PathBuf, message: String },

    #[error("Failed to read label file {path}: {source}")]
    LabelFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image not found for label {label_path} (expected {expected})")]
    ImageNotFound {
        label_path: PathBuf,
        expected: PathBuf,
    },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Image {path} has unusable dimensions {width}x{height}")]
    ImageDimensionInvalid {
        path: PathBuf,
        width: usize,
        height: usize,
    },

    #[error("Failed to parse YOLO label {path}:{line}: {message}")]
    YoloLabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to parse KITTI label {path}:{line}: {message}")]
    KittiLabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("class_id {class_id} is not in the class mapping")]
    UnmappedClassId { class_id: u64 },

    #[error("Failed to write KITTI label {path}: {source}")]
    KittiWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[source] serde_json::Error),
}
