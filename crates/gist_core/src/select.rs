use std::fmt;

use gist_logging::gist_warn;
use thiserror::Error;

use crate::config::Config;
use crate::file::{LocalFile, KB};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("no files to upload")]
    NoFiles,
}

/// Why a candidate path was left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    NotFound,
    NotRegularFile,
    Unreadable(String),
    TooLarge { size: u64, max: u64 },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::NotFound => write!(f, "not found"),
            ExclusionReason::NotRegularFile => write!(f, "not a regular file"),
            ExclusionReason::Unreadable(message) => write!(f, "unreadable: {message}"),
            ExclusionReason::TooLarge { size, max } => write!(
                f,
                "file exceeds {:.0}KB: {size} ({:.1}KB)",
                kb(*max),
                kb(*size)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub path: String,
    pub reason: ExclusionReason,
}

/// Result of filtering the input paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub files: Vec<LocalFile>,
    pub excluded: Vec<Exclusion>,
}

/// Filter `paths` down to the files eligible for upload.
///
/// Missing and oversized files are dropped with a warning; the run only fails
/// when nothing is left.
pub fn select_files<I, S>(paths: I, config: &Config) -> Result<Selection, SelectError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut files = Vec::new();
    let mut excluded = Vec::new();

    for raw in paths {
        let raw = raw.as_ref();
        let file = LocalFile::new(raw, config.is_dry_run());
        match check_file(&file, config) {
            Ok(()) => files.push(file),
            Err(reason) => {
                gist_warn!("excluding {} from upload: {}", raw, reason);
                excluded.push(Exclusion {
                    path: raw.to_string(),
                    reason,
                });
            }
        }
    }

    if files.is_empty() {
        return Err(SelectError::NoFiles);
    }
    Ok(Selection { files, excluded })
}

fn check_file(file: &LocalFile, config: &Config) -> Result<(), ExclusionReason> {
    match file.exists() {
        Ok(true) => {}
        Ok(false) => return Err(ExclusionReason::NotFound),
        Err(err) => return Err(ExclusionReason::Unreadable(err.to_string())),
    }

    match file.is_regular_file() {
        Ok(true) => {}
        Ok(false) => return Err(ExclusionReason::NotRegularFile),
        Err(err) => return Err(ExclusionReason::Unreadable(err.to_string())),
    }

    if !config.allow_large_files {
        let size = file
            .size()
            .map_err(|err| ExclusionReason::Unreadable(err.to_string()))?;
        if size > config.max_file_size {
            return Err(ExclusionReason::TooLarge {
                size,
                max: config.max_file_size,
            });
        }
    }

    Ok(())
}

fn kb(bytes: u64) -> f64 {
    bytes as f64 / KB as f64
}
