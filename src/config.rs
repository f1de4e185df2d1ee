use std::time::Duration;

use anyhow::Result;
use unic_langid::LanguageIdentifier;

use crate::config::errors::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpPort(u16);

#[derive(Clone, Debug)]
pub struct SupportedLanguages(Vec<LanguageIdentifier>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpClientTimeout(Duration);

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    pub store_domain: String,
    pub api_version: String,
    pub access_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub http_port: HttpPort,
    pub external_base: String,
    pub storefront: StorefrontConfig,
    pub store_name: String,
    pub store_description: String,
    pub supported_languages: SupportedLanguages,
    pub user_agent: String,
    pub http_client_timeout: HttpClientTimeout,
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::EnvVarRequired(key.to_string()))
        };
        let default = |key: &str, default_value: &str| -> String {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default_value.to_string())
        };

        let http_port: HttpPort = default("HTTP_PORT", "8080").try_into()?;
        let external_base = require("EXTERNAL_BASE")?;

        let storefront = StorefrontConfig {
            store_domain: require("STOREFRONT_DOMAIN")?,
            api_version: default("STOREFRONT_API_VERSION", "2024-10"),
            access_token: lookup("STOREFRONT_ACCESS_TOKEN").filter(|value| !value.is_empty()),
        };

        let supported_languages: SupportedLanguages =
            default("SUPPORTED_LANGUAGES", "en-us,fr-ca").try_into()?;

        let http_client_timeout: HttpClientTimeout =
            default("HTTP_CLIENT_TIMEOUT", "8").try_into()?;

        Ok(Self {
            version: version()?,
            http_port,
            external_base,
            storefront,
            store_name: default("STORE_NAME", "Storefront"),
            store_description: default("STORE_DESCRIPTION", "Welcome to the store"),
            supported_languages,
            user_agent: default(
                "USER_AGENT",
                &format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            ),
            http_client_timeout,
        })
    }
}

pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet().into())
}

impl TryFrom<String> for HttpPort {
    type Error = anyhow::Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse::<u16>()
            .map(Self)
            .map_err(|err| ConfigError::PortParsingFailed(err).into())
    }
}

impl AsRef<u16> for HttpPort {
    fn as_ref(&self) -> &u16 {
        &self.0
    }
}

impl TryFrom<String> for SupportedLanguages {
    type Error = anyhow::Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let languages = value
            .split(',')
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .map(|language| {
                language
                    .parse::<LanguageIdentifier>()
                    .map_err(|_| ConfigError::InvalidLanguage(language.to_string()))
            })
            .collect::<Result<Vec<LanguageIdentifier>, ConfigError>>()?;

        if languages.is_empty() {
            return Err(ConfigError::EmptyLanguages().into());
        }

        Ok(Self(languages))
    }
}

impl AsRef<Vec<LanguageIdentifier>> for SupportedLanguages {
    fn as_ref(&self) -> &Vec<LanguageIdentifier> {
        &self.0
    }
}

impl TryFrom<String> for HttpClientTimeout {
    type Error = anyhow::Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse::<u64>()
            .map(|seconds| Self(Duration::from_secs(seconds)))
            .map_err(|err| ConfigError::TimeoutParsingFailed(err).into())
    }
}

impl AsRef<Duration> for HttpClientTimeout {
    fn as_ref(&self) -> &Duration {
        &self.0
    }
}

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("error-config-env-var-required Environment variable {0} must be set")]
        EnvVarRequired(String),

        #[error("error-config-version-not-set Version not set")]
        VersionNotSet(),

        #[error("error-config-port-parsing-failed Parsing HTTP_PORT failed: {0}")]
        PortParsingFailed(std::num::ParseIntError),

        #[error("error-config-timeout-parsing-failed Parsing HTTP_CLIENT_TIMEOUT failed: {0}")]
        TimeoutParsingFailed(std::num::ParseIntError),

        #[error("error-config-invalid-language Invalid language in SUPPORTED_LANGUAGES: {0}")]
        InvalidLanguage(String),

        #[error("error-config-empty-languages SUPPORTED_LANGUAGES must name at least one language")]
        EmptyLanguages(),
    }
}
