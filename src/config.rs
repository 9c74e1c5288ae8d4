use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::fmt;

/// Fully validated gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub credentials: Credentials,
    pub platform: PlatformConfig,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: String,
    pub port: u16,
    /// Directory served for static assets (scripts, styles)
    pub public_dir: String,
}

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Base URL of the video platform REST API
    pub api_url: String,
    /// Name given to every archive this gateway starts
    pub archive_name: String,
}

/// Project credentials for the video platform
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Destination bucket for archive output. Absent values are sent upstream as null.
#[derive(Debug, Clone, Default)]
pub struct StorageSettings {
    pub bucket: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub certificate: Option<String>,
}

/// Flat key layout shared by config files and environment variables
#[derive(Debug, Deserialize)]
struct RawConfig {
    tokbox_api_key: Option<String>,
    tokbox_secret: Option<String>,
    bind: String,
    port: u16,
    api_url: String,
    archive_name: String,
    public_dir: String,
    access_key: Option<String>,
    secret: Option<String>,
    certificate: Option<String>,
    bucket: Option<String>,
}

pub const MISSING_CREDENTIALS: &str =
    "You must specify TOKBOX_API_KEY and TOKBOX_SECRET environment variables";

impl Config {
    /// Load defaults, then the optional file at `path`, then the process environment.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Self::defaults()?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::default())
            .build()
            .context("Failed to read configuration")?;

        Self::from_settings(settings)
    }

    /// Builder pre-populated with every default value
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(config::Config::builder()
            .set_default("bind", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("api_url", "https://api.opentok.com")?
            .set_default("archive_name", "Archive Gateway Recording")?
            .set_default("public_dir", "public")?)
    }

    pub fn from_settings(settings: config::Config) -> Result<Self> {
        let raw: RawConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;

        let (api_key, api_secret) = match (non_empty(raw.tokbox_api_key), non_empty(raw.tokbox_secret)) {
            (Some(key), Some(secret)) => (key, secret),
            _ => bail!(MISSING_CREDENTIALS),
        };

        Ok(Self {
            service: ServiceConfig {
                bind: raw.bind,
                port: raw.port,
                public_dir: raw.public_dir,
            },
            credentials: Credentials {
                api_key,
                api_secret,
            },
            platform: PlatformConfig {
                api_url: raw.api_url.trim_end_matches('/').to_string(),
                archive_name: raw.archive_name,
            },
            storage: StorageSettings {
                bucket: raw.bucket,
                access_key: raw.access_key,
                secret_key: raw.secret,
                certificate: raw.certificate,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
