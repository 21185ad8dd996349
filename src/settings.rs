use config::{Config, Environment, File};
use serde::Deserialize;

use crate::CLIENT_NAME;

const CONFIG_NAME: &str = "config.toml";
const APP_URL: &str = "https://app.monarchmoney.com";
const PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api_url: String,
    /// Web app root, used to build links to transactions.
    pub app_url: String,
    pub page_size: usize,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub totp: Option<String>,
}

impl Settings {
    pub fn new(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut s = Config::builder()
            .set_default("api_url", monarch::API_URL.as_str())?
            .set_default("app_url", APP_URL)?
            .set_default("page_size", PAGE_SIZE)?;

        if let Some(path) = config_path {
            s = s.add_source(File::with_name(path));
        } else {
            s = s.add_source(File::with_name(&default_config_path()).required(false));
        }

        s.add_source(Environment::with_prefix("MONARCH"))
            .build()?
            .try_deserialize()
    }
}

pub(crate) fn default_config_path() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(CLIENT_NAME)
        .join(CONFIG_NAME)
        .display()
        .to_string()
}
