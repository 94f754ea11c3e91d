//! Runtime configuration.
//!
//! Settings resolve with the precedence builder value (CLI flag), then
//! environment variable, then default. `main` loads `.env` via `dotenvy`
//! before building settings, so `.env` entries behave like environment
//! variables.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::answer_service::DEFAULT_API_URL;

/// Environment variable for the answer service base URL.
pub const ENV_API_URL: &str = "ASKFORM_API_URL";
/// Environment variable for the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "ASKFORM_TIMEOUT_SECS";
/// Environment variable for the message locale (`zh` or `en`).
pub const ENV_LOCALE: &str = "ASKFORM_LOCALE";
/// Environment variable for the TUI log file path.
pub const ENV_LOG_FILE: &str = "ASKFORM_LOG_FILE";

/// Errors from resolving configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API URL '{0}'")]
    InvalidUrl(String),

    #[error("invalid timeout '{0}': expected a positive whole number of seconds")]
    InvalidTimeout(String),

    #[error("unknown locale '{0}': expected 'zh' or 'en'")]
    UnknownLocale(String),
}

/// Language of user-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    /// Returns the fixed message shown when a request fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use askform::config::Locale;
    ///
    /// assert_eq!(Locale::Zh.failure_message(), "请求失败，请稍后再试");
    /// assert_eq!(Locale::En.failure_message(), "Request failed, please try again later");
    /// ```
    pub fn failure_message(self) -> &'static str {
        match self {
            Locale::Zh => "请求失败，请稍后再试",
            Locale::En => "Request failed, please try again later",
        }
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "zh_cn" => Ok(Locale::Zh),
            "en" | "en-us" | "en_us" => Ok(Locale::En),
            _ => Err(ConfigError::UnknownLocale(s.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Zh => write!(f, "zh"),
            Locale::En => write!(f, "en"),
        }
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub timeout: Option<Duration>,
    pub locale: Locale,
    pub log_file: PathBuf,
}

impl Settings {
    /// Resolves settings from the environment and defaults only.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        SettingsBuilder::new().build()
    }
}

/// Builder for [`Settings`]; unset values fall back to the environment.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    api_url: Option<String>,
    timeout: Option<Duration>,
    locale: Option<Locale>,
    log_file: Option<PathBuf>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Resolves every setting.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unparsable or non-`http(s)` URL, a
    /// missing or zero timeout value, or an unknown locale, whether it came
    /// from the builder or the environment.
    pub fn build(self) -> Result<Settings, ConfigError> {
        let api_url = match self.api_url {
            Some(url) => url,
            None => env_var(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        };
        let url =
            reqwest::Url::parse(&api_url).map_err(|_| ConfigError::InvalidUrl(api_url.clone()))?;
        // "localhost:5000" parses with scheme "localhost"
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(api_url));
        }

        let timeout = match self.timeout {
            Some(timeout) => Some(timeout),
            None => env_var(ENV_TIMEOUT_SECS)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map(Duration::from_secs)
                        .map_err(|_| ConfigError::InvalidTimeout(raw))
                })
                .transpose()?,
        };
        // A zero timeout would fail every request before it is sent
        if let Some(timeout) = timeout
            && timeout.is_zero()
        {
            return Err(ConfigError::InvalidTimeout(timeout.as_secs().to_string()));
        }

        let locale = match self.locale {
            Some(locale) => locale,
            None => env_var(ENV_LOCALE)
                .map(|raw| raw.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        let log_file = self
            .log_file
            .or_else(|| env_var(ENV_LOG_FILE).map(PathBuf::from))
            .unwrap_or_else(default_log_file);

        Ok(Settings {
            api_url,
            timeout,
            locale,
            log_file,
        })
    }
}

/// Reads a non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Returns `{data_dir}/askform/askform.log`, using the temp dir if no data dir exists.
///
/// `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
fn default_log_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("askform")
        .join("askform.log")
}
