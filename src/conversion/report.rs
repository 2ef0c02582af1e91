//! Batch report types.
//!
//! Collects what a run did (counts) and everything it had to skip (issues),
//! so the CLI can print a summary or emit it as JSON.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Yolo2KittiError;

/// Summary of one `run_batch` call.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchReport {
    pub counts: BatchCounts,
    pub issues: Vec<BatchIssue>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: BatchIssue) {
        self.issues.push(issue);
    }

    pub fn error_count(&self) -> usize {
        self.count_severity(IssueSeverity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count_severity(IssueSeverity::Warning)
    }

    /// Issues with the given code, in the order they were recorded.
    pub fn issues_with_code(&self, code: IssueCode) -> impl Iterator<Item = &BatchIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    /// True when nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn count_severity(&self, severity: IssueSeverity) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .count()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        writeln!(
            f,
            "Converted {} of {} label file(s) across {} folder(s) ({} skipped)",
            c.files_written, c.label_files, c.folders, c.files_skipped
        )?;
        writeln!(
            f,
            "  {} box(es) written, {} line(s) skipped",
            c.lines_written, c.lines_skipped
        )?;
        if c.folders_failed > 0 {
            writeln!(f, "  {} folder(s) failed", c.folders_failed)?;
        }

        for (title, severity) in [
            ("Errors", IssueSeverity::Error),
            ("Warnings", IssueSeverity::Warning),
        ] {
            let count = self.count_severity(severity);
            if count == 0 {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{} ({}):", title, count)?;
            for issue in self.issues.iter().filter(|i| i.severity == severity) {
                writeln!(f, "  - {}", issue)?;
            }
        }

        Ok(())
    }
}

/// Running totals for a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    /// Folder triplets attempted.
    pub folders: usize,
    /// Triplets abandoned because their output or label folder was unusable.
    pub folders_failed: usize,
    /// Label files found across all label folders.
    pub label_files: usize,
    pub files_written: usize,
    pub files_skipped: usize,
    pub lines_written: usize,
    pub lines_skipped: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// A file or line was skipped; the rest of its folder was converted.
    Warning,
    /// A whole folder triplet was abandoned.
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    OutputDirCreate,
    LabelDirRead,
    LabelFileRead,
    ImageNotFound,
    ImageUnreadable,
    MalformedLine,
    UnmappedClass,
    OutputWrite,
    Other,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::OutputDirCreate => "output_dir_create",
            IssueCode::LabelDirRead => "label_dir_read",
            IssueCode::LabelFileRead => "label_file_read",
            IssueCode::ImageNotFound => "image_not_found",
            IssueCode::ImageUnreadable => "image_unreadable",
            IssueCode::MalformedLine => "malformed_line",
            IssueCode::UnmappedClass => "unmapped_class",
            IssueCode::OutputWrite => "output_write",
            IssueCode::Other => "other",
        }
    }

    /// Classify an error raised while converting.
    pub fn for_error(err: &Yolo2KittiError) -> Self {
        match err {
            Yolo2KittiError::OutputDirCreate { .. } => IssueCode::OutputDirCreate,
            Yolo2KittiError::LabelDirRead { .. } => IssueCode::LabelDirRead,
            Yolo2KittiError::LabelFileRead { .. } => IssueCode::LabelFileRead,
            Yolo2KittiError::ImageNotFound { .. } => IssueCode::ImageNotFound,
            Yolo2KittiError::ImageDimensionRead { .. }
            | Yolo2KittiError::ImageDimensionInvalid { .. } => IssueCode::ImageUnreadable,
            Yolo2KittiError::YoloLabelParse { .. } => IssueCode::MalformedLine,
            Yolo2KittiError::UnmappedClassId { .. } => IssueCode::UnmappedClass,
            Yolo2KittiError::KittiWrite { .. } => IssueCode::OutputWrite,
            _ => IssueCode::Other,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One skipped line, file, or folder.
#[derive(Clone, Debug, Serialize)]
pub struct BatchIssue {
    pub severity: IssueSeverity,
    pub code: IssueCode,
    pub message: String,
    /// The label file or folder the issue is about.
    pub path: PathBuf,
    /// 1-based line number for line-level issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl BatchIssue {
    pub fn from_error(
        severity: IssueSeverity,
        err: &Yolo2KittiError,
        path: &Path,
        line: Option<usize>,
    ) -> Self {
        Self {
            severity,
            code: IssueCode::for_error(err),
            message: err.to_string(),
            path: path.to_path_buf(),
            line,
        }
    }
}

impl fmt::Display for BatchIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.code)?;
        match self.line {
            // Parse errors already carry their location in the message.
            Some(line) if self.code != IssueCode::MalformedLine => {
                write!(f, "{}:{}: {}", self.path.display(), line, self.message)
            }
            _ => f.write_str(&self.message),
        }
    }
}
