//! yolo2kitti: batch converter from YOLO to KITTI object detection labels.
//!
//! YOLO labels store one normalized `class cx cy w h` box per line; KITTI
//! labels store absolute pixel corners plus placeholder 3D fields. Converting
//! needs each image's pixel size, which is read from the header of the
//! companion image sharing the label's file stem.
//!
//! # Modules
//!
//! - [`ir`]: box geometry and the YOLO/KITTI line formats
//! - [`mapping`]: class id to class name table
//! - [`conversion`]: the per-box transform and the folder batch driver
//! - [`error`]: error types

pub mod conversion;
pub mod error;
pub mod ir;
pub mod mapping;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::warn;

pub use conversion::{
    convert_record, denormalize, run_batch, BatchPlan, BatchReport, ConvertOptions, ImageSize,
};
pub use error::Yolo2KittiError;
pub use mapping::ClassMapping;

use conversion::normalize_image_extension;
use ir::ExtraFieldsPolicy;

/// Convert YOLO label folders to KITTI label folders.
///
/// Label, output and image folders are paired by position.
#[derive(Parser)]
#[command(name = "yolo2kitti")]
#[command(version, about)]
struct Cli {
    /// YOLO label folders to process.
    #[arg(short = 'l', long = "label-folders", num_args = 1.., required = true)]
    label_folders: Vec<PathBuf>,

    /// KITTI label folders to write, one per label folder.
    #[arg(short = 'o', long = "output-folders", num_args = 1.., required = true)]
    output_folders: Vec<PathBuf>,

    /// Image folders holding the companion images, one per label folder (alias: -img).
    #[arg(short = 'i', long = "image-folders", num_args = 1.., required = true)]
    image_folders: Vec<PathBuf>,

    /// Class mapping as a JSON object, e.g. '{"0": "license_plate"}' (alias: -map).
    #[arg(short = 'm', long = "class-mapping")]
    class_mapping: String,

    /// Extension of the companion images.
    #[arg(long, default_value = conversion::DEFAULT_IMAGE_EXTENSION)]
    image_extension: String,

    /// How to treat label lines with more than five fields.
    #[arg(long, value_enum, default_value_t = ExtraFieldsArg::Reject)]
    extra_fields: ExtraFieldsArg,

    /// Class name to write for ids missing from the mapping (e.g. DontCare).
    /// Without it such lines are skipped.
    #[arg(long)]
    fallback_class: Option<String>,

    /// Format of the summary printed after the run.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,

    /// Do not draw progress bars.
    #[arg(long)]
    no_progress: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ExtraFieldsArg {
    /// Skip the line and report it.
    Reject,
    /// Convert the first five fields and drop the rest.
    Ignore,
}

impl From<ExtraFieldsArg> for ExtraFieldsPolicy {
    fn from(arg: ExtraFieldsArg) -> Self {
        match arg {
            ExtraFieldsArg::Reject => ExtraFieldsPolicy::Reject,
            ExtraFieldsArg::Ignore => ExtraFieldsPolicy::Ignore,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the yolo2kitti CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`. Only
/// configuration problems are returned as errors; anything skipped during
/// conversion ends up in the printed report.
pub fn run() -> Result<(), Yolo2KittiError> {
    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));

    let mapping = ClassMapping::from_json_str(&cli.class_mapping)?;
    let plan =
        BatchPlan::from_folder_lists(cli.label_folders, cli.output_folders, cli.image_folders)?;
    let options = ConvertOptions {
        image_extension: normalize_image_extension(&cli.image_extension)?,
        extra_fields: cli.extra_fields.into(),
        fallback_class: cli.fallback_class,
        show_progress: !cli.no_progress,
    };

    if mapping.is_empty() && options.fallback_class.is_none() {
        warn!("Class mapping is empty; every box will be skipped");
    }

    let report = run_batch(&plan, &mapping, &options);

    match cli.report {
        ReportFormat::Text => print!("{}", report),
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).map_err(Yolo2KittiError::ReportSerialize)?;
            println!("{}", json);
        }
    }

    Ok(())
}

/// Options that consume exactly the next argument as their value.
const SINGLE_VALUE_FLAGS: &[&str] = &[
    "-m",
    "--class-mapping",
    "--image-extension",
    "--extra-fields",
    "--fallback-class",
    "--report",
];

/// Rewrite the multi-letter single-dash flags `-img` and `-map` to their long
/// forms; clap only supports single-character short flags.
///
/// Only tokens in flag position are touched: values of single-value options
/// and everything after `--` pass through unchanged.
fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut value_pending = false;
    let mut after_separator = false;

    args.into_iter()
        .map(|arg| {
            if after_separator || std::mem::take(&mut value_pending) {
                return arg;
            }

            let arg = match arg.to_str() {
                Some("--") => {
                    after_separator = true;
                    arg
                }
                Some("-img") => OsString::from("--image-folders"),
                Some("-map") => OsString::from("--class-mapping"),
                _ => arg,
            };
            value_pending = arg
                .to_str()
                .is_some_and(|flag| SINGLE_VALUE_FLAGS.contains(&flag));
            arg
        })
        .collect()
}
