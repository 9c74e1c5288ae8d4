//! HTTP surface of the gateway
//!
//! - GET / - Landing page
//! - GET /host, GET /participant - Session credentials for browser clients
//! - GET /history?page=N - Archive history, five per page
//! - GET /download/:archive_id - Redirect to an archive's download URL
//! - POST /start - Push storage settings, then start an archive
//! - POST /startold - Start an archive without touching storage settings
//! - GET /stop/:archive_id - Stop an archive
//! - GET /delete/:archive_id - Delete an archive
//! - GET|POST /callback - Platform webhook receiver
//! - GET /health - Health check

mod extract;
mod handlers;
pub mod pagination;
mod routes;
mod state;

pub use handlers::{HistoryQuery, StartArchiveRequest};
pub use routes::create_router;
pub use state::AppState;
