use std::fmt;

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::{Result, CLIENT_PLATFORM};

/// Bearer credential issued by the login endpoint.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn header_value(&self) -> String {
        format!("Token {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(..)")
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// One-time code, forwarded as is when present.
    pub totp: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("totp", &self.totp.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    supports_mfa: bool,
    trusted_device: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    totp: Option<&'a str>,
}

impl<'a> From<&'a Credentials> for LoginRequest<'a> {
    fn from(creds: &'a Credentials) -> Self {
        Self {
            username: &creds.username,
            password: &creds.password,
            supports_mfa: true,
            trusted_device: false,
            totp: creds.totp.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Token,
}

/// Exchanges a username and password for a token.
#[tracing::instrument(skip(http, creds), fields(username = %creds.username))]
pub async fn login(http: &reqwest::Client, base: &Url, creds: &Credentials) -> Result<Token> {
    let res: TokenResponse = http
        .post(base.join("auth/login/")?)
        .header("Client-Platform", CLIENT_PLATFORM)
        .json(&LoginRequest::from(creds))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    info!("Logged in.");
    Ok(res.token)
}

/// Asks the service to extend the lifetime of `token`, returning the token to
/// use from now on.
#[tracing::instrument(skip(http, token))]
pub async fn extend_token(http: &reqwest::Client, base: &Url, token: &Token) -> Result<Token> {
    let res: TokenResponse = http
        .post(base.join("auth/extend-token/")?)
        .header(AUTHORIZATION, token.header_value())
        .header("Client-Platform", CLIENT_PLATFORM)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    info!("Extended token.");
    Ok(res.token)
}
