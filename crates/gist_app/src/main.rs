use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use gist_core::{select_files, token_from_env, Config, ConfigError, GITHUB_API_URL_ENV};
use gist_engine::{
    report_outcomes, CancellationToken, Dispatcher, GistSettings, ReqwestGistClient,
    UploadOptions, DEFAULT_API_URL,
};
use gist_logging::{gist_debug, gist_error, gist_warn, LogDestination};
use log::LevelFilter;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Args::parse_from(cli::normalize_args(std::env::args_os()));

    let destination = match &args.log_file {
        Some(path) => LogDestination::TerminalAndFile(path.clone()),
        None => LogDestination::Terminal,
    };
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    gist_logging::initialize(destination, level);

    match run(&args, &RunEnv::from_process()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::NothingToDo)) {
                let _ = cli::Args::command().print_help();
            }
            gist_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Values the run reads from the process environment.
#[derive(Debug, Clone)]
struct RunEnv {
    token: Option<String>,
    api_url: String,
}

impl RunEnv {
    fn from_process() -> Self {
        Self {
            token: token_from_env(),
            api_url: api_url_or_default(std::env::var(GITHUB_API_URL_ENV).ok()),
        }
    }
}

fn api_url_or_default(value: Option<String>) -> String {
    value
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

async fn run(args: &cli::Args, env: &RunEnv) -> anyhow::Result<()> {
    let config = Config::from_flags(args.run_flags(), env.token.clone())?;
    gist_debug!("{:?}", config);

    let selection = select_files(&config.paths, &config)?;

    let settings = GistSettings::with_api_url(env.api_url.clone());
    let client = ReqwestGistClient::new(settings, &config.token)
        .context("failed to create GitHub client")?;

    let cancel = CancellationToken::new();
    watch_for_interrupt(cancel.clone());

    let dispatcher = Dispatcher::new(Arc::new(client), UploadOptions::from_config(&config));
    let outcomes = dispatcher.dispatch(selection.files, cancel).await;
    report_outcomes(&outcomes);
    Ok(())
}

fn watch_for_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            gist_warn!("interrupted, cancelling outstanding uploads");
            cancel.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Once;

    use gist_core::SelectError;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn init_logging() {
        static INIT: Once = Once::new();
        INIT.call_once(gist_logging::initialize_for_tests);
    }

    fn args(list: &[&str]) -> cli::Args {
        let mut full = vec!["gist-upload"];
        full.extend_from_slice(list);
        cli::Args::parse_from(cli::normalize_args(full))
    }

    fn env_for(server: &MockServer) -> RunEnv {
        RunEnv {
            token: Some("run-token".to_string()),
            api_url: server.uri(),
        }
    }

    async fn mount_create(server: &MockServer, expected: u64) {
        Mock::given(method("POST"))
            .and(path("/gists"))
            .and(header("authorization", "Bearer run-token"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "g1",
                "html_url": "https://gist.example/g1"
            })))
            .expect(expected)
            .mount(server)
            .await;
    }

    #[test]
    fn api_url_falls_back_to_github() {
        assert_eq!(api_url_or_default(None), DEFAULT_API_URL);
        assert_eq!(api_url_or_default(Some("  ".to_string())), DEFAULT_API_URL);
        assert_eq!(
            api_url_or_default(Some("http://ghe.local/api/v3".to_string())),
            "http://ghe.local/api/v3"
        );
    }

    #[tokio::test]
    async fn uploads_selected_files_to_configured_api() {
        init_logging();
        let server = MockServer::start().await;
        mount_create(&server, 2).await;
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "one").unwrap();
        fs::write(&b, "two").unwrap();
        let missing = dir.path().join("missing.txt");

        let a = a.display().to_string();
        let b = b.display().to_string();
        let missing = missing.display().to_string();
        run(&args(&["-upload", &a, &missing, &b]), &env_for(&server))
            .await
            .expect("run ok");
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        init_logging();
        let server = MockServer::start().await;
        mount_create(&server, 0).await;
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, "one").unwrap();

        let a = a.display().to_string();
        run(&args(&["-dryrun", &a]), &env_for(&server))
            .await
            .expect("run ok");
    }

    #[tokio::test]
    async fn upload_failures_do_not_fail_the_run() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gists"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, "one").unwrap();

        let a = a.display().to_string();
        assert!(run(&args(&["-upload", &a]), &env_for(&server)).await.is_ok());
    }

    #[tokio::test]
    async fn config_errors_stop_before_any_request() {
        init_logging();
        let server = MockServer::start().await;
        mount_create(&server, 0).await;

        let no_token = RunEnv {
            token: None,
            ..env_for(&server)
        };
        let err = run(&args(&["-upload", "a.txt"]), &no_token).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingToken(_))
        ));

        let err = run(&args(&["-upload", "-dryrun", "a.txt"]), &env_for(&server))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ConflictingModes)
        ));
    }

    #[tokio::test]
    async fn empty_selection_stops_before_any_request() {
        init_logging();
        let server = MockServer::start().await;
        mount_create(&server, 0).await;
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.txt").display().to_string();

        let err = run(&args(&["-upload", &missing]), &env_for(&server))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<SelectError>(), Some(&SelectError::NoFiles));
    }
}
