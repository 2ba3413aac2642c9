use std::{fs, io::ErrorKind, path::Path};

use serde::Deserialize;
use shared::domain::MAX_TEXT_UNITS;
use url::Url;

use crate::{error::ConfigError, messages::Locale};

pub const SETTINGS_FILE: &str = "translator.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub max_input_chars: usize,
    pub locale: Locale,
    /// No client-side timeout unless set.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            max_input_chars: MAX_TEXT_UNITS,
            locale: Locale::EnUs,
            request_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn server_base(&self) -> Result<Url, ConfigError> {
        Url::parse(self.server_url.trim()).map_err(|source| ConfigError::InvalidServerUrl {
            value: self.server_url.clone(),
            source,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    max_input_chars: Option<usize>,
    locale: Option<String>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> Result<ClientSettings, ConfigError> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file if it exists, then environment overrides.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ConfigError> {
    let mut settings = ClientSettings::default();

    let file_cfg = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<FileSettings>(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?,
        Err(err) if err.kind() == ErrorKind::NotFound => FileSettings::default(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.max_input_chars {
        settings.max_input_chars = v;
    }
    if let Some(v) = file_cfg.locale {
        settings.locale = parse_locale(&v)?;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }

    if let Some(v) = env("TRANSLATOR_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__MAX_INPUT_CHARS") {
        settings.max_input_chars = v.parse().map_err(|_| ConfigError::InvalidValue {
            key: "max_input_chars",
            value: v.clone(),
        })?;
    }
    if let Some(v) = env("APP__LOCALE") {
        settings.locale = parse_locale(&v)?;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = Some(v.parse().map_err(|_| ConfigError::InvalidValue {
            key: "request_timeout_secs",
            value: v.clone(),
        })?);
    }

    validate(&settings)?;
    Ok(settings)
}

fn parse_locale(raw: &str) -> Result<Locale, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: "locale",
        value: raw.to_string(),
    })
}

pub fn validate(settings: &ClientSettings) -> Result<(), ConfigError> {
    settings.server_base()?;
    if settings.max_input_chars == 0 {
        return Err(ConfigError::InvalidValue {
            key: "max_input_chars",
            value: "0".into(),
        });
    }
    Ok(())
}
