use std::sync::Arc;

use gist_core::{Config, FileError, LocalFile, Visibility};
use gist_logging::{gist_debug, gist_error, gist_info, gist_warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::GistClient;
use crate::{CreatedGist, FailureKind, GistError, NewGist, UploadOutcome};

/// Per-run settings applied to every gist created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub visibility: Visibility,
    pub description: Option<String>,
}

impl UploadOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            visibility: config.visibility,
            description: config.description.clone(),
        }
    }
}

/// Fans out one upload task per file and collects every outcome.
pub struct Dispatcher {
    client: Arc<dyn GistClient>,
    options: UploadOptions,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn GistClient>, options: UploadOptions) -> Self {
        Self { client, options }
    }

    /// Upload `files` concurrently.
    ///
    /// Dry-run files are only described. Outcomes are returned in completion
    /// order, one per uploaded file; a task that panicked is reported last
    /// with `FailureKind::TaskFailed`.
    pub async fn dispatch(
        &self,
        files: Vec<LocalFile>,
        cancel: CancellationToken,
    ) -> Vec<UploadOutcome> {
        let (dry, live): (Vec<_>, Vec<_>) = files.into_iter().partition(LocalFile::is_dry_run);

        if !dry.is_empty() {
            gist_info!("Doing dry run, nothing will be uploaded");
            for file in &dry {
                describe(file, &self.options);
            }
        }
        if live.is_empty() {
            return Vec::new();
        }

        let expected = live.len();
        // Capacity matches the task count so no sender ever waits.
        let (tx, mut rx) = mpsc::channel::<UploadOutcome>(expected);

        let mut handles = Vec::with_capacity(expected);
        for file in live {
            let tx = tx.clone();
            let client = self.client.clone();
            let options = self.options.clone();
            let cancel = cancel.clone();
            let task_file = file.clone();
            let handle = tokio::spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        Err(GistError::new(FailureKind::Cancelled, "upload cancelled"))
                    }
                    result = upload_file(client.as_ref(), &task_file, &options) => result,
                };
                let _ = tx.send(UploadOutcome { file: task_file, result }).await;
            });
            handles.push((file, handle));
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(expected);
        // Closes once every task has either reported or died.
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }

        // A task that panicked never reported; give its file an outcome.
        for (file, handle) in handles {
            if let Err(err) = handle.await {
                gist_debug!("upload task for {} failed: {}", file.path().display(), err);
                outcomes.push(UploadOutcome {
                    file,
                    result: Err(GistError::new(FailureKind::TaskFailed, err.to_string())),
                });
            }
        }
        outcomes
    }
}

async fn upload_file(
    client: &dyn GistClient,
    file: &LocalFile,
    options: &UploadOptions,
) -> Result<CreatedGist, GistError> {
    let name = file
        .display_name()
        .map_err(|err| GistError::new(FailureKind::InvalidName, err.to_string()))?;
    let reader = file.clone();
    let content = tokio::task::spawn_blocking(move || reader.read_content())
        .await
        .map_err(|err| GistError::new(FailureKind::TaskFailed, err.to_string()))?
        .map_err(|err| match err {
            FileError::NotText(_) => GistError::new(FailureKind::InvalidContent, err.to_string()),
            _ => GistError::new(FailureKind::Io, err.to_string()),
        })?;

    gist_debug!("creating gist for {} ({} bytes)", name, content.len());
    let gist = NewGist::single(
        name,
        content,
        options.visibility.is_public(),
        options.description.clone(),
    );
    client.create_gist(&gist).await
}

fn describe(file: &LocalFile, options: &UploadOptions) {
    let name = file
        .display_name()
        .unwrap_or_else(|_| file.path().display().to_string());
    let size = file
        .size()
        .map(|bytes| format!("{bytes} bytes"))
        .unwrap_or_else(|err| err.to_string());
    gist_info!(
        "would upload {} ({}, {:?} gist)",
        name,
        size,
        options.visibility
    );
}

/// Counts of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Log every outcome and return the tallies.
pub fn report_outcomes(outcomes: &[UploadOutcome]) -> UploadSummary {
    let mut summary = UploadSummary::default();
    for outcome in outcomes {
        match &outcome.result {
            Ok(gist) => {
                summary.succeeded += 1;
                let name = outcome
                    .file
                    .display_name()
                    .unwrap_or_else(|_| outcome.file.path().display().to_string());
                gist_info!("created gist {} ({})", gist.html_url, name);
            }
            Err(err) => {
                summary.failed += 1;
                let name = match outcome.file.display_name() {
                    Ok(name) => name,
                    Err(name_err) => {
                        gist_warn!("{}", name_err);
                        outcome.file.path().display().to_string()
                    }
                };
                gist_error!("create gist failed ({}): {}", name, err);
            }
        }
    }
    if !outcomes.is_empty() {
        gist_info!(
            "{} of {} uploads succeeded",
            summary.succeeded,
            outcomes.len()
        );
    }
    summary
}
