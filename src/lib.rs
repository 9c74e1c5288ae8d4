pub mod config;
pub mod http;
pub mod platform;
pub mod views;

pub use config::Config;
pub use http::{create_router, AppState};
pub use platform::{Archive, ArchiveList, OpenTokClient, PlatformError, VideoPlatform};
