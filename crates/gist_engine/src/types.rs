use std::collections::BTreeMap;
use std::fmt;

use gist_core::LocalFile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of a create-gist request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGist {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub public: bool,
    pub files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistFile {
    pub content: String,
}

impl NewGist {
    pub fn single(
        name: impl Into<String>,
        content: impl Into<String>,
        public: bool,
        description: Option<String>,
    ) -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            name.into(),
            GistFile {
                content: content.into(),
            },
        );
        Self {
            description,
            public,
            files,
        }
    }
}

/// The subset of the create-gist response the uploader cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedGist {
    pub id: String,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct GistError {
    pub kind: FailureKind,
    pub message: String,
}

impl GistError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Io,
    InvalidName,
    InvalidContent,
    InvalidToken,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
    Cancelled,
    TaskFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Io => write!(f, "io error"),
            FailureKind::InvalidName => write!(f, "invalid file name"),
            FailureKind::InvalidContent => write!(f, "invalid content"),
            FailureKind::InvalidToken => write!(f, "invalid api token"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::TaskFailed => write!(f, "upload task failed"),
        }
    }
}

/// Result of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub file: LocalFile,
    pub result: Result<CreatedGist, GistError>,
}

impl UploadOutcome {
    pub fn error(&self) -> Option<&GistError> {
        self.result.as_ref().err()
    }
}
