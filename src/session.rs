use anyhow::{Context, Result};
use clap::ArgMatches;
use monarch::{Client, Credentials, Token};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::settings::Settings;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no token found; pass --token, or --username and --password to log in")]
    MissingCredentials,
    #[error("--password is required when logging in as {0}")]
    MissingPassword(String),
}

/// Auth values given on the command line. They win over settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides<'a> {
    pub token: Option<&'a str>,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub totp: Option<&'a str>,
}

impl<'a> From<&'a ArgMatches> for Overrides<'a> {
    fn from(matches: &'a ArgMatches) -> Self {
        Self {
            token: matches.value_of("token"),
            username: matches.value_of("username"),
            password: matches.value_of("password"),
            totp: matches.value_of("totp"),
        }
    }
}

#[derive(Debug)]
pub enum Auth {
    Token(Token),
    Login(Credentials),
}

/// Picks how to authenticate. An explicit token beats credentials, and a
/// command line value beats the same value from settings.
pub fn resolve(settings: &Settings, overrides: &Overrides) -> Result<Auth, SessionError> {
    if let Some(token) = overrides.token.or(settings.token.as_deref()) {
        return Ok(Auth::Token(Token::new(token)));
    }

    let username = overrides
        .username
        .or(settings.username.as_deref())
        .ok_or(SessionError::MissingCredentials)?;
    let password = overrides
        .password
        .or(settings.password.as_deref())
        .ok_or_else(|| SessionError::MissingPassword(username.to_string()))?;

    Ok(Auth::Login(Credentials {
        username: username.to_string(),
        password: password.to_string(),
        totp: overrides
            .totp
            .or(settings.totp.as_deref())
            .map(String::from),
    }))
}

/// Parses the configured API root. Endpoint paths are joined onto it, so a
/// missing trailing slash is added to keep the last path segment.
pub fn api_url(settings: &Settings) -> Result<Url> {
    let mut raw = settings.api_url.clone();
    if !raw.ends_with('/') {
        raw.push('/');
    }

    Url::parse(&raw).with_context(|| format!("invalid api_url {:?}", settings.api_url))
}

/// Resolves a token, logging in first when only credentials are available.
#[tracing::instrument(skip_all)]
pub async fn token(settings: &Settings, overrides: &Overrides<'_>) -> Result<Token> {
    match resolve(settings, overrides)? {
        Auth::Token(token) => Ok(token),
        Auth::Login(creds) => {
            info!("Logging in as {}.", creds.username);
            let token = monarch::login(&reqwest::Client::new(), &api_url(settings)?, &creds)
                .await
                .context("login failed")?;
            Ok(token)
        }
    }
}

pub async fn connect(settings: &Settings, overrides: &Overrides<'_>) -> Result<Client> {
    let token = token(settings, overrides).await?;
    Ok(Client::with_base(&api_url(settings)?, token)?)
}

pub(crate) async fn print_login(settings: &Settings, overrides: &Overrides<'_>) -> Result<()> {
    let token = token(settings, overrides).await?;
    println!("{}", token.as_str());

    Ok(())
}

pub(crate) async fn print_extended(settings: &Settings, overrides: &Overrides<'_>) -> Result<()> {
    let token = token(settings, overrides).await?;
    let extended = monarch::extend_token(&reqwest::Client::new(), &api_url(settings)?, &token)
        .await
        .context("token extension failed")?;
    println!("{}", extended.as_str());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            api_url: "https://api.monarchmoney.com/".into(),
            app_url: "https://app.monarchmoney.com".into(),
            page_size: 100,
            token: None,
            username: None,
            password: None,
            totp: None,
        }
    }

    #[test]
    fn api_url_keeps_path_prefix() {
        let mut s = settings();
        s.api_url = "http://127.0.0.1:4000/api".into();

        let base = api_url(&s).unwrap();
        assert_eq!(base.as_str(), "http://127.0.0.1:4000/api/");
        assert_eq!(
            base.join("graphql").unwrap().as_str(),
            "http://127.0.0.1:4000/api/graphql"
        );
        assert_eq!(api_url(&settings()).unwrap().as_str(), "https://api.monarchmoney.com/");
    }

    #[test]
    fn totp_falls_back_to_settings() {
        let mut s = settings();
        s.username = Some("me@example.com".into());
        s.password = Some("hunter2".into());
        s.totp = Some("111111".into());

        match resolve(&s, &Overrides::default()).unwrap() {
            Auth::Login(creds) => assert_eq!(creds.totp.as_deref(), Some("111111")),
            other => panic!("unexpected auth: {:?}", other),
        }

        let overrides = Overrides {
            totp: Some("222222"),
            ..Default::default()
        };
        match resolve(&s, &overrides).unwrap() {
            Auth::Login(creds) => assert_eq!(creds.totp.as_deref(), Some("222222")),
            other => panic!("unexpected auth: {:?}", other),
        }
    }

    #[test]
    fn flag_token_wins() {
        let mut s = settings();
        s.token = Some("from-settings".into());
        s.username = Some("me@example.com".into());
        let overrides = Overrides {
            token: Some("from-flag"),
            ..Default::default()
        };

        match resolve(&s, &overrides).unwrap() {
            Auth::Token(t) => assert_eq!(t.as_str(), "from-flag"),
            other => panic!("unexpected auth: {:?}", other),
        }
    }

    #[test]
    fn settings_token_beats_flag_credentials() {
        let mut s = settings();
        s.token = Some("from-settings".into());
        let overrides = Overrides {
            username: Some("me@example.com"),
            password: Some("hunter2"),
            ..Default::default()
        };

        assert!(matches!(resolve(&s, &overrides).unwrap(), Auth::Token(_)));
    }

    #[test]
    fn credentials_mix_flags_and_settings() {
        let mut s = settings();
        s.password = Some("from-env".into());
        let overrides = Overrides {
            username: Some("me@example.com"),
            totp: Some("654321"),
            ..Default::default()
        };

        match resolve(&s, &overrides).unwrap() {
            Auth::Login(creds) => {
                assert_eq!(creds.username, "me@example.com");
                assert_eq!(creds.password, "from-env");
                assert_eq!(creds.totp.as_deref(), Some("654321"));
            }
            other => panic!("unexpected auth: {:?}", other),
        }
    }

    #[test]
    fn missing_credentials() {
        assert_eq!(
            resolve(&settings(), &Overrides::default()).unwrap_err(),
            SessionError::MissingCredentials
        );

        let overrides = Overrides {
            username: Some("me@example.com"),
            ..Default::default()
        };
        assert_eq!(
            resolve(&settings(), &overrides).unwrap_err(),
            SessionError::MissingPassword("me@example.com".into())
        );
    }
}
