use std::fmt;

use thiserror::Error;

use crate::file::{DEFAULT_MAX_FILE_SIZE, KB};

/// Environment variable holding the GitHub API token.
pub const GITHUB_API_TOKEN_ENV: &str = "GITHUB_API_TOKEN";

/// Environment variable overriding the GitHub API base URL.
pub const GITHUB_API_URL_ENV: &str = "GITHUB_API_URL";

/// What a run does with the selected files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Upload,
    DryRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Secret,
    Public,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// Bearer token for the remote API. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Raw command-line values before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFlags {
    pub upload: bool,
    pub dry_run: bool,
    pub allow_large_files: bool,
    pub public: bool,
    pub max_size_kb: Option<u64>,
    pub description: Option<String>,
    pub paths: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable required but missing: {0}")]
    MissingToken(&'static str),
    #[error("Nothing to do: pass --upload or --dryrun")]
    NothingToDo,
    #[error("Can't upload and dryrun at the same time")]
    ConflictingModes,
    #[error("Selected --upload with no files")]
    NoInputFiles,
}

/// Validated, immutable settings for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub allow_large_files: bool,
    pub max_file_size: u64,
    pub visibility: Visibility,
    pub description: Option<String>,
    pub token: ApiToken,
    pub paths: Vec<String>,
}

impl Config {
    /// Validate the flags and token. The token is checked first so a missing
    /// credential fails before anything else is looked at.
    pub fn from_flags(flags: RunFlags, token: Option<String>) -> Result<Self, ConfigError> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .map(ApiToken)
            .ok_or(ConfigError::MissingToken(GITHUB_API_TOKEN_ENV))?;

        let mode = match (flags.upload, flags.dry_run) {
            (false, false) => return Err(ConfigError::NothingToDo),
            (true, true) => return Err(ConfigError::ConflictingModes),
            (true, false) => Mode::Upload,
            (false, true) => Mode::DryRun,
        };

        if mode == Mode::Upload && flags.paths.is_empty() {
            return Err(ConfigError::NoInputFiles);
        }

        let max_file_size = flags
            .max_size_kb
            .map(|kb| kb.saturating_mul(KB))
            .unwrap_or(DEFAULT_MAX_FILE_SIZE);
        let visibility = if flags.public {
            Visibility::Public
        } else {
            Visibility::Secret
        };

        Ok(Self {
            mode,
            allow_large_files: flags.allow_large_files,
            max_file_size,
            visibility,
            description: flags.description,
            token,
            paths: flags.paths,
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == Mode::DryRun
    }
}

/// Read the API token from the process environment.
pub fn token_from_env() -> Option<String> {
    std::env::var(GITHUB_API_TOKEN_ENV).ok()
}
