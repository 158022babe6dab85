//! Client for the upstream (GitHub-style) OAuth identity provider.

use gatehouse_core::config::UpstreamConfig;
use gatehouse_core::Identity;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The token endpoint answered without an access token.
    #[error("upstream token response has no access_token (error: {0})")]
    MissingToken(String),

    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct UpstreamUser {
    login: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: UpstreamConfig,
    redirect_uri: String,
}

impl UpstreamClient {
    /// `redirect_uri` is this server's `/callback` URL as registered upstream.
    pub fn new(config: UpstreamConfig, redirect_uri: String) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("gatehouse/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            config,
            redirect_uri,
        })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Upstream authorize URL carrying `state` unchanged.
    pub fn authorize_url(&self, state: &str) -> Result<String, UpstreamError> {
        let mut url = Url::parse(&self.config.authorize_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.config.scope)
            .append_pair("state", state)
            .append_pair("response_type", "code");
        Ok(url.into())
    }

    /// Exchange an authorization code. The token endpoint answers form-encoded.
    pub async fn exchange_code(&self, code: &str) -> Result<String, UpstreamError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let resp = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(UpstreamError::Status(resp.status()));
        }

        let body = resp.text().await?;
        let mut error = None;
        for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
            match key.as_ref() {
                "access_token" if !value.is_empty() => return Ok(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }
        Err(UpstreamError::MissingToken(
            error.unwrap_or_else(|| "none".to_string()),
        ))
    }

    /// Resolve the user behind an upstream access token.
    pub async fn fetch_identity(&self, access_token: &str) -> Result<Identity, UpstreamError> {
        let resp = self
            .http
            .get(&self.config.user_url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(UpstreamError::Status(resp.status()));
        }

        let user: UpstreamUser = resp.json().await?;
        Ok(Identity {
            name: user
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| user.login.clone()),
            login: user.login,
            email: user.email,
            access_token: access_token.to_string(),
        })
    }
}
