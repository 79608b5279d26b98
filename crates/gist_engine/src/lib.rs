//! Gist engine: remote client and concurrent upload dispatch.
mod client;
mod dispatch;
mod types;

pub use client::{GistClient, GistSettings, ReqwestGistClient, DEFAULT_API_URL};
pub use dispatch::{report_outcomes, Dispatcher, UploadOptions, UploadSummary};
pub use tokio_util::sync::CancellationToken;
pub use types::{CreatedGist, FailureKind, GistError, GistFile, NewGist, UploadOutcome};
