use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const KB: u64 = 1024;

/// Files larger than this are skipped unless large files are allowed.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * KB;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("unable to derive a file name from {0:?}")]
    InvalidName(PathBuf),
    #[error("{0} is not valid UTF-8 text")]
    NotText(String),
}

impl FileError {
    fn io(path: &Path, source: io::Error) -> Self {
        FileError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// A candidate local file. Filesystem state is queried on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    path: PathBuf,
    dry_run: bool,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            path: path.into(),
            dry_run,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn exists(&self) -> Result<bool, FileError> {
        self.path
            .try_exists()
            .map_err(|err| FileError::io(&self.path, err))
    }

    pub fn is_regular_file(&self) -> Result<bool, FileError> {
        fs::metadata(&self.path)
            .map(|meta| meta.is_file())
            .map_err(|err| FileError::io(&self.path, err))
    }

    /// Size in bytes.
    pub fn size(&self) -> Result<u64, FileError> {
        fs::metadata(&self.path)
            .map(|meta| meta.len())
            .map_err(|err| FileError::io(&self.path, err))
    }

    /// Final path component, used as the gist file name.
    pub fn display_name(&self) -> Result<String, FileError> {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| FileError::InvalidName(self.path.clone()))
    }

    pub fn read_content(&self) -> Result<String, FileError> {
        let bytes = fs::read(&self.path).map_err(|err| FileError::io(&self.path, err))?;
        String::from_utf8(bytes).map_err(|_| FileError::NotText(self.path.display().to_string()))
    }
}
