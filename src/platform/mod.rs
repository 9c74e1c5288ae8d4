//! Video platform integration
//!
//! The gateway never owns sessions or archives; it only asks the platform to
//! create, list, start, stop and delete them. `VideoPlatform` is the seam the
//! HTTP layer talks to, `OpenTokClient` is the REST implementation.

pub mod auth;
mod client;
mod error;
mod messages;
pub mod token;

pub use client::OpenTokClient;
pub use error::PlatformError;
pub use messages::{
    Archive, ArchiveList, ArchiveOptions, MediaMode, Role, Session, StorageConfig,
    StorageOutcome,
};

/// Operations the gateway needs from the video platform
#[async_trait::async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Create a new session
    async fn create_session(&self, media_mode: MediaMode) -> Result<Session, PlatformError>;

    /// Mint a client access token scoped to `session_id` and `role`
    fn generate_token(&self, session_id: &str, role: Role) -> Result<String, PlatformError>;

    /// List archives, newest first
    async fn list_archives(&self, offset: u32, count: u32) -> Result<ArchiveList, PlatformError>;

    async fn get_archive(&self, archive_id: &str) -> Result<Archive, PlatformError>;

    async fn start_archive(
        &self,
        session_id: &str,
        options: &ArchiveOptions,
    ) -> Result<Archive, PlatformError>;

    async fn stop_archive(&self, archive_id: &str) -> Result<Archive, PlatformError>;

    async fn delete_archive(&self, archive_id: &str) -> Result<(), PlatformError>;

    /// Push archive storage settings, authorized by a caller-built assertion
    ///
    /// Only transport failures are errors; any HTTP status the platform answers
    /// with is reported back in the outcome.
    async fn configure_storage(
        &self,
        assertion: &str,
        storage: &StorageConfig,
    ) -> Result<StorageOutcome, PlatformError>;
}
