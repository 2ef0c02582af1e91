#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// A minimal uncompressed 24-bit BMP of the given size.
///
/// Image headers are sniffed from content, so these bytes also serve as a
/// stand-in for `.jpg` companions.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write image file");
}

pub fn write_label(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, content).expect("write label file");
}

/// Folders for one dataset split: `labels/<name>`, `images/<name>` and the
/// not-yet-created `kitti/<name>` output.
pub struct Split {
    pub labels: PathBuf,
    pub images: PathBuf,
    pub output: PathBuf,
}

pub fn split(root: &Path, name: &str) -> Split {
    let split = Split {
        labels: root.join("labels").join(name),
        images: root.join("images").join(name),
        output: root.join("kitti").join(name),
    };
    fs::create_dir_all(&split.labels).expect("create labels dir");
    fs::create_dir_all(&split.images).expect("create images dir");
    split
}
