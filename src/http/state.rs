use crate::config::{Config, Credentials, StorageSettings};
use crate::platform::{Session, VideoPlatform};
use crate::views::Views;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Shared application state for HTTP handlers
///
/// Built once after the session exists and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Video platform the handlers delegate to
    pub platform: Arc<dyn VideoPlatform>,

    /// The one session created at startup
    pub session_id: Arc<str>,

    pub credentials: Arc<Credentials>,

    /// Destination pushed by `/start`
    pub storage: Arc<StorageSettings>,

    /// Name given to archives started through this gateway
    pub archive_name: Arc<str>,

    pub views: Arc<Views>,
}

impl AppState {
    pub fn new(platform: Arc<dyn VideoPlatform>, session: Session, config: &Config) -> Result<Self> {
        let views = Views::new().context("Failed to load page templates")?;

        Ok(Self {
            platform,
            session_id: session.session_id.into(),
            credentials: Arc::new(config.credentials.clone()),
            storage: Arc::new(config.storage.clone()),
            archive_name: config.platform.archive_name.as_str().into(),
            views: Arc::new(views),
        })
    }
}
