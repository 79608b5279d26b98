use std::time::Duration;

use gist_core::ApiToken;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};

use crate::{CreatedGist, FailureKind, GistError, NewGist};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct GistSettings {
    pub api_url: String,
    pub user_agent: String,
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

impl Default for GistSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: concat!("gist-upload/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: None,
            request_timeout: None,
        }
    }
}

impl GistSettings {
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }
}

/// Remote capability the dispatcher depends on.
#[async_trait::async_trait]
pub trait GistClient: Send + Sync {
    async fn create_gist(&self, gist: &NewGist) -> Result<CreatedGist, GistError>;
}

/// GitHub REST client authenticated with a static bearer token.
#[derive(Debug, Clone)]
pub struct ReqwestGistClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestGistClient {
    pub fn new(settings: GistSettings, token: &ApiToken) -> Result<Self, GistError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|err| GistError::new(FailureKind::InvalidToken, err.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        let agent = HeaderValue::from_str(&settings.user_agent)
            .map_err(|err| GistError::new(FailureKind::Network, err.to_string()))?;
        headers.insert(USER_AGENT, agent);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| GistError::new(FailureKind::Network, err.to_string()))?;

        let endpoint = format!("{}/gists", settings.api_url.trim_end_matches('/'));
        Ok(Self { client, endpoint })
    }
}

#[async_trait::async_trait]
impl GistClient for ReqwestGistClient {
    async fn create_gist(&self, gist: &NewGist) -> Result<CreatedGist, GistError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(gist)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GistError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{status} {}", body.trim()),
            ));
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        serde_json::from_str(&body)
            .map_err(|err| GistError::new(FailureKind::InvalidResponse, err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GistError {
    if err.is_timeout() {
        return GistError::new(FailureKind::Timeout, err.to_string());
    }
    GistError::new(FailureKind::Network, err.to_string())
}
