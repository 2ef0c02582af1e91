//! Fuzz target for KITTI single-line label parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo2kitti::ir::io_kitti::fuzz_parse_kitti_line;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    if let Ok(line) = std::str::from_utf8(data) {
        let _ = fuzz_parse_kitti_line(line);
    }
});
