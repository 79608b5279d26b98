//! Gist core: run configuration, local file descriptors and upload selection.
mod config;
mod file;
mod select;

pub use config::{
    token_from_env, ApiToken, Config, ConfigError, Mode, RunFlags, Visibility,
    GITHUB_API_TOKEN_ENV, GITHUB_API_URL_ENV,
};
pub use file::{FileError, LocalFile, DEFAULT_MAX_FILE_SIZE, KB};
pub use select::{select_files, Exclusion, ExclusionReason, SelectError, Selection};
