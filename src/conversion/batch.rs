//! Folder-triplet batch driver.
//!
//! Label, output and image folders are paired positionally. Each label file
//! `<stem>.txt` needs a companion image `<stem>.<ext>` in the paired image
//! folder; only the image's header is read, to learn its pixel size.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use walkdir::WalkDir;

use super::report::{BatchIssue, BatchReport, IssueSeverity};
use super::{convert_record, ConvertOptions, ImageSize};
use crate::error::Yolo2KittiError;
use crate::ir::io_kitti::write_kitti_file;
use crate::ir::io_yolo::{parse_label_line, read_label_file, LABEL_EXTENSION};
use crate::mapping::ClassMapping;

/// One (labels, output, images) folder pairing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderTriplet {
    pub labels: PathBuf,
    pub output: PathBuf,
    pub images: PathBuf,
}

/// An ordered list of folder triplets whose pairing has been checked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchPlan {
    triplets: Vec<FolderTriplet>,
}

impl BatchPlan {
    /// Zip three parallel folder lists into triplets.
    ///
    /// Fails without touching the filesystem if the lists differ in length.
    pub fn from_folder_lists(
        labels: Vec<PathBuf>,
        outputs: Vec<PathBuf>,
        images: Vec<PathBuf>,
    ) -> Result<Self, Yolo2KittiError> {
        if labels.len() != outputs.len() || labels.len() != images.len() {
            return Err(Yolo2KittiError::FolderCountMismatch {
                labels: labels.len(),
                outputs: outputs.len(),
                images: images.len(),
            });
        }

        let triplets = labels
            .into_iter()
            .zip(outputs)
            .zip(images)
            .map(|((labels, output), images)| FolderTriplet {
                labels,
                output,
                images,
            })
            .collect();

        Ok(Self { triplets })
    }

    pub fn triplets(&self) -> &[FolderTriplet] {
        &self.triplets
    }

    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }
}

/// Result of converting one label file.
#[derive(Clone, Debug)]
pub struct FileOutcome {
    pub output_path: PathBuf,
    pub lines_written: usize,
    /// Lines that were skipped, one issue each.
    pub line_issues: Vec<BatchIssue>,
}

/// Convert every triplet in `plan`, in order.
///
/// A triplet whose output folder cannot be created or whose label folder
/// cannot be listed is recorded as an error and the next triplet is tried.
pub fn run_batch(plan: &BatchPlan, mapping: &ClassMapping, options: &ConvertOptions) -> BatchReport {
    let mut report = BatchReport::new();

    for triplet in plan.triplets() {
        info!(
            "Processing: {} -> {}",
            triplet.labels.display(),
            triplet.output.display()
        );
        report.counts.folders += 1;

        match convert_folder(triplet, mapping, options, &mut report) {
            Ok(()) => info!(
                "Conversion completed. KITTI labels saved in '{}'",
                triplet.output.display()
            ),
            Err(err) => {
                error!("{}", err);
                report.counts.folders_failed += 1;
                let path = match &err {
                    Yolo2KittiError::OutputDirCreate { .. } => &triplet.output,
                    _ => &triplet.labels,
                };
                report.add(BatchIssue::from_error(IssueSeverity::Error, &err, path, None));
            }
        }
    }

    report
}

/// Convert all label files of one triplet, accumulating into `report`.
///
/// Per-file and per-line problems are logged and recorded; only a failure
/// to prepare the output folder or list the label folder is returned.
pub fn convert_folder(
    triplet: &FolderTriplet,
    mapping: &ClassMapping,
    options: &ConvertOptions,
    report: &mut BatchReport,
) -> Result<(), Yolo2KittiError> {
    fs::create_dir_all(&triplet.output).map_err(|source| Yolo2KittiError::OutputDirCreate {
        path: triplet.output.clone(),
        source,
    })?;

    let (label_files, unreadable) = list_label_files(&triplet.labels)?;
    for issue in unreadable {
        warn!("{}", issue);
        report.add(issue);
    }

    let pb = create_progress_bar(
        label_files.len() as u64,
        &triplet.labels.display().to_string(),
        options.show_progress,
    );

    for label_path in &label_files {
        report.counts.label_files += 1;

        match convert_label_file(label_path, &triplet.images, &triplet.output, mapping, options) {
            Ok(outcome) => {
                report.counts.files_written += 1;
                report.counts.lines_written += outcome.lines_written;
                report.counts.lines_skipped += outcome.line_issues.len();
                for issue in outcome.line_issues {
                    pb.suspend(|| warn!("{}", issue));
                    report.add(issue);
                }
            }
            Err(err) => {
                pb.suspend(|| warn!("Skipping {}: {}", label_path.display(), err));
                report.counts.files_skipped += 1;
                report.add(BatchIssue::from_error(
                    IssueSeverity::Warning,
                    &err,
                    label_path,
                    None,
                ));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(())
}

/// Convert one YOLO label file into `<stem>.txt` under `output_dir`.
///
/// Returns an error, and writes nothing, when the companion image is missing
/// or unreadable, or the label file itself cannot be read. Bad lines are
/// skipped and listed in the outcome.
pub fn convert_label_file(
    label_path: &Path,
    image_dir: &Path,
    output_dir: &Path,
    mapping: &ClassMapping,
    options: &ConvertOptions,
) -> Result<FileOutcome, Yolo2KittiError> {
    let stem = label_path
        .file_stem()
        .ok_or_else(|| Yolo2KittiError::LabelFileRead {
            path: label_path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "label path has no file name"),
        })?;

    let image_path = image_dir.join(with_extension_appended(stem, &options.image_extension));
    if !image_path.is_file() {
        return Err(Yolo2KittiError::ImageNotFound {
            label_path: label_path.to_path_buf(),
            expected: image_path,
        });
    }
    let image = read_image_dimensions(&image_path)?;

    let content = read_label_file(label_path)?;
    let mut records = Vec::new();
    let mut line_issues = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        let parsed = parse_label_line(line, label_path, line_num, options.extra_fields)
            .and_then(|row| {
                row.map(|row| convert_record(&row, image, mapping, options))
                    .transpose()
            });

        match parsed {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(err) => line_issues.push(BatchIssue::from_error(
                IssueSeverity::Warning,
                &err,
                label_path,
                Some(line_num),
            )),
        }
    }

    let output_path = output_dir.join(with_extension_appended(stem, LABEL_EXTENSION));
    write_kitti_file(&output_path, &records)?;

    Ok(FileOutcome {
        output_path,
        lines_written: records.len(),
        line_issues,
    })
}

/// `<stem>.<ext>` without disturbing dots already inside the stem.
fn with_extension_appended(stem: &OsStr, ext: &str) -> OsString {
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(ext);
    name
}

/// Label files directly inside `dir`, sorted by file name.
///
/// Entries that cannot be inspected (dangling symlinks, permission errors)
/// are returned as warnings next to the usable files; only a failure to read
/// `dir` itself is an error.
fn list_label_files(dir: &Path) -> Result<(Vec<PathBuf>, Vec<BatchIssue>), Yolo2KittiError> {
    if !dir.is_dir() {
        return Err(Yolo2KittiError::LabelDirRead {
            path: dir.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut files = Vec::new();
    let mut unreadable = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => match source.path() {
                Some(path) if source.depth() > 0 => {
                    let path = path.to_path_buf();
                    let err = Yolo2KittiError::LabelDirRead {
                        path: dir.to_path_buf(),
                        message: format!("skipping unreadable entry: {source}"),
                    };
                    unreadable.push(BatchIssue::from_error(
                        IssueSeverity::Warning,
                        &err,
                        &path,
                        None,
                    ));
                    continue;
                }
                _ => {
                    return Err(Yolo2KittiError::LabelDirRead {
                        path: dir.to_path_buf(),
                        message: format!("failed while listing directory: {source}"),
                    })
                }
            },
        };

        if entry.file_type().is_file() && has_label_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    unreadable.sort_by(|a, b| a.path.cmp(&b.path));
    Ok((files, unreadable))
}

/// `.txt` only, matched exactly: outputs are always written as `<stem>.txt`,
/// so `a.TXT` next to `a.txt` would otherwise overwrite it.
fn has_label_extension(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(LABEL_EXTENSION))
}

fn read_image_dimensions(path: &Path) -> Result<ImageSize, Yolo2KittiError> {
    let size = imagesize::size(path).map_err(|source| Yolo2KittiError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let invalid = || Yolo2KittiError::ImageDimensionInvalid {
        path: path.to_path_buf(),
        width: size.width,
        height: size.height,
    };

    let width: u32 = size.width.try_into().map_err(|_| invalid())?;
    let height: u32 = size.height.try_into().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok(ImageSize::new(width, height))
}

fn create_progress_bar(len: u64, label: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
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
        bytes.extend_from_slice(&[0u8; 24]);
        bytes.resize(file_size as usize, 0);
        bytes
    }

    fn mapping() -> ClassMapping {
        ClassMapping::from_json_str(r#"{"0": "license_plate", "1": "Pedestrian"}"#)
            .expect("mapping")
    }

    struct Dirs {
        _temp: tempfile::TempDir,
        labels: PathBuf,
        images: PathBuf,
        output: PathBuf,
    }

    fn dirs() -> Dirs {
        let temp = tempfile::tempdir().expect("create temp dir");
        let labels = temp.path().join("labels");
        let images = temp.path().join("images");
        let output = temp.path().join("kitti");
        fs::create_dir_all(&labels).expect("labels dir");
        fs::create_dir_all(&images).expect("images dir");
        Dirs {
            _temp: temp,
            labels,
            images,
            output,
        }
    }

    #[test]
    fn plan_rejects_mismatched_lists() {
        let err = BatchPlan::from_folder_lists(
            vec!["a".into(), "b".into()],
            vec!["x".into()],
            vec!["i".into(), "j".into()],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            Yolo2KittiError::FolderCountMismatch {
                labels: 2,
                outputs: 1,
                images: 2
            }
        ));
    }

    #[test]
    fn plan_pairs_positionally() {
        let plan = BatchPlan::from_folder_lists(
            vec!["l1".into(), "l2".into()],
            vec!["o1".into(), "o2".into()],
            vec!["i1".into(), "i2".into()],
        )
        .expect("plan");

        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan.triplets()[1],
            FolderTriplet {
                labels: "l2".into(),
                output: "o2".into(),
                images: "i2".into(),
            }
        );
    }

    #[test]
    fn converts_file_and_skips_bad_lines() {
        let d = dirs();
        fs::create_dir_all(&d.output).expect("output dir");
        fs::write(d.images.join("car.jpg"), bmp_bytes(100, 100)).expect("image");
        let label = d.labels.join("car.txt");
        fs::write(
            &label,
            "0 0.5 0.5 0.2 0.2\n\n7 0.5 0.5 0.2 0.2\n1 0.1\n1 0.25 0.25 0.5 0.5\n",
        )
        .expect("label");

        let outcome = convert_label_file(
            &label,
            &d.images,
            &d.output,
            &mapping(),
            &ConvertOptions::default(),
        )
        .expect("convert");

        assert_eq!(outcome.output_path, d.output.join("car.txt"));
        assert_eq!(outcome.lines_written, 2);
        let lines: Vec<usize> = outcome.line_issues.iter().filter_map(|i| i.line).collect();
        assert_eq!(lines, vec![3, 4]);

        let written = fs::read_to_string(&outcome.output_path).expect("read output");
        assert_eq!(
            written,
            "license_plate 0.0 0 -1.0 40.00 40.00 60.00 60.00 0 0 0 0 0 0\n\
             Pedestrian 0.0 0 -1.0 0.00 0.00 50.00 50.00 0 0 0 0 0 0\n"
        );
    }

    #[test]
    fn missing_image_writes_nothing() {
        let d = dirs();
        fs::create_dir_all(&d.output).expect("output dir");
        let label = d.labels.join("lonely.txt");
        fs::write(&label, "0 0.5 0.5 0.2 0.2\n").expect("label");

        let err = convert_label_file(
            &label,
            &d.images,
            &d.output,
            &mapping(),
            &ConvertOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Yolo2KittiError::ImageNotFound { .. }));
        assert!(!d.output.join("lonely.txt").exists());
    }

    #[test]
    fn unreadable_image_is_reported() {
        let d = dirs();
        fs::create_dir_all(&d.output).expect("output dir");
        fs::write(d.images.join("junk.jpg"), b"not an image").expect("image");
        let label = d.labels.join("junk.txt");
        fs::write(&label, "0 0.5 0.5 0.2 0.2\n").expect("label");

        let err = convert_label_file(
            &label,
            &d.images,
            &d.output,
            &mapping(),
            &ConvertOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Yolo2KittiError::ImageDimensionRead { .. }));
        assert!(!d.output.join("junk.txt").exists());
    }

    #[test]
    fn dotted_stems_keep_their_full_name() {
        let d = dirs();
        fs::create_dir_all(&d.output).expect("output dir");
        fs::write(d.images.join("frame.0001.png"), bmp_bytes(10, 10)).expect("image");
        let label = d.labels.join("frame.0001.txt");
        fs::write(&label, "0 0.5 0.5 1.0 1.0\n").expect("label");

        let options = ConvertOptions {
            image_extension: "png".to_string(),
            ..Default::default()
        };
        let outcome = convert_label_file(&label, &d.images, &d.output, &mapping(), &options)
            .expect("convert");

        assert_eq!(outcome.output_path, d.output.join("frame.0001.txt"));
    }

    #[test]
    fn folder_run_counts_files_and_lines() {
        let d = dirs();
        fs::write(d.images.join("a.jpg"), bmp_bytes(20, 10)).expect("image a");
        fs::write(d.labels.join("a.txt"), "0 0.5 0.5 0.5 0.5\n9 0.5 0.5 0.5 0.5\n")
            .expect("label a");
        fs::write(d.labels.join("b.txt"), "0 0.5 0.5 0.5 0.5\n").expect("label b");
        fs::write(d.labels.join("notes.md"), "ignored").expect("non-label file");

        let triplet = FolderTriplet {
            labels: d.labels.clone(),
            output: d.output.clone(),
            images: d.images.clone(),
        };
        let mut report = BatchReport::new();
        convert_folder(&triplet, &mapping(), &ConvertOptions::default(), &mut report)
            .expect("folder converts");

        assert_eq!(report.counts.label_files, 2);
        assert_eq!(report.counts.files_written, 1);
        assert_eq!(report.counts.files_skipped, 1);
        assert_eq!(report.counts.lines_written, 1);
        assert_eq!(report.counts.lines_skipped, 1);
        assert!(d.output.join("a.txt").is_file());
        assert!(!d.output.join("b.txt").exists());
    }

    #[test]
    fn missing_label_folder_fails_the_triplet_only() {
        let d = dirs();
        fs::write(d.images.join("a.jpg"), bmp_bytes(8, 8)).expect("image");
        fs::write(d.labels.join("a.txt"), "0 0.5 0.5 0.5 0.5\n").expect("label");

        let second_output = d.output.with_file_name("kitti2");
        let plan = BatchPlan::from_folder_lists(
            vec![d.labels.with_file_name("nope"), d.labels.clone()],
            vec![d.output.clone(), second_output.clone()],
            vec![d.images.clone(), d.images.clone()],
        )
        .expect("plan");

        let report = run_batch(&plan, &mapping(), &ConvertOptions::default());

        assert_eq!(report.counts.folders, 2);
        assert_eq!(report.counts.folders_failed, 1);
        assert_eq!(report.error_count(), 1);
        assert!(second_output.join("a.txt").is_file());
    }

    #[test]
    fn label_extension_is_matched_exactly() {
        let d = dirs();
        fs::write(d.labels.join("lower.txt"), "").expect("lower label");
        fs::write(d.labels.join("upper.TXT"), "").expect("upper label");
        fs::write(d.labels.join("mixed.Txt"), "").expect("mixed label");

        let (files, unreadable) = list_label_files(&d.labels).expect("list labels");

        assert_eq!(files, vec![d.labels.join("lower.txt")]);
        assert!(unreadable.is_empty());
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        let d = dirs();
        let path = d.images.join("flat.bmp");
        fs::write(&path, bmp_bytes(0, 0)).expect("image");

        match read_image_dimensions(&path) {
            Err(Yolo2KittiError::ImageDimensionInvalid { .. })
            | Err(Yolo2KittiError::ImageDimensionRead { .. }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
