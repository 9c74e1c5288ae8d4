use super::extract::FormOrJson;
use super::pagination::{Pagination, PAGE_SIZE};
use super::state::AppState;
use crate::platform::auth::{self, STORAGE_NONCE};
use crate::platform::{ArchiveOptions, Role, StorageConfig};
use crate::views::ClientPage;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt::Display;
use tracing::{error, info, warn};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// 1-based page number (default: 1)
    pub page: Option<u32>,
}

/// Body of `/start` and `/startold`
///
/// `hasAudio` and `hasVideo` are presence flags: any value, including an
/// unchecked-looking one, turns the track on. Only absence turns it off.
#[derive(Debug, Default, Deserialize)]
pub struct StartArchiveRequest {
    #[serde(rename = "hasAudio", default, deserialize_with = "present")]
    pub has_audio: bool,

    #[serde(rename = "hasVideo", default, deserialize_with = "present")]
    pub has_video: bool,

    /// `composed` or `individual`, forwarded untouched
    #[serde(rename = "outputMode")]
    pub output_mode: Option<String>,
}

/// Any value at all, `null` included, means the field was sent
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Value::deserialize(deserializer).map(|_| true)
}

impl StartArchiveRequest {
    fn into_options(self, name: &str) -> ArchiveOptions {
        ArchiveOptions {
            name: Some(name.to_string()),
            has_audio: self.has_audio,
            has_video: self.has_video,
            output_mode: self.output_mode,
        }
    }
}

// ============================================================================
// Response helpers
// ============================================================================

/// 500 carrying `"<context>. error=<message>"`
fn upstream_failure(context: String, err: impl Display) -> Response {
    error!("{}: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("{}. error={}", context, err),
    )
        .into_response()
}

/// 302 Found, the status browsers expect from a plain redirect
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn page(result: Result<String, minijinja::Error>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => upstream_failure("Could not render page".to_string(), e),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn index(State(state): State<AppState>) -> Response {
    page(state.views.index())
}

/// GET /host
/// Fresh moderator token for the host client
pub async fn host(State(state): State<AppState>) -> Response {
    match state.platform.generate_token(&state.session_id, Role::Moderator) {
        Ok(token) => page(state.views.host(&ClientPage {
            api_key: &state.credentials.api_key,
            session_id: &state.session_id,
            token: &token,
        })),
        Err(e) => upstream_failure("Could not generate token".to_string(), e),
    }
}

/// GET /participant
/// Participants currently get the same moderator role as the host
pub async fn participant(State(state): State<AppState>) -> Response {
    match state.platform.generate_token(&state.session_id, Role::Moderator) {
        Ok(token) => page(state.views.participant(&ClientPage {
            api_key: &state.credentials.api_key,
            session_id: &state.session_id,
            token: &token,
        })),
        Err(e) => upstream_failure("Could not generate token".to_string(), e),
    }
}

/// POST /callback
/// Log whatever the platform sent and echo it back unchanged
pub async fn callback(headers: HeaderMap, body: Bytes) -> Response {
    info!("Callback received ({} bytes)", body.len());
    match serde_json::from_slice::<Value>(&body) {
        Ok(json) => info!(
            "Callback payload: {}",
            serde_json::to_string_pretty(&json).unwrap_or_default()
        ),
        Err(_) => info!("Callback payload: {}", String::from_utf8_lossy(&body)),
    }

    let content_type = headers.get(header::CONTENT_TYPE).cloned();
    let mut response = (StatusCode::OK, body).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response
}

/// GET /callback
pub async fn callback_probe() -> impl IntoResponse {
    info!("Callback probe");
    (StatusCode::OK, "you are in callbackurl")
}

/// GET /history?page=N
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let page_number = query.page.unwrap_or(1).max(1);
    let offset = Pagination::offset_for(page_number);

    match state.platform.list_archives(offset, PAGE_SIZE).await {
        Ok(list) => {
            let pagination = Pagination::new(page_number, list.count);
            page(state.views.history(
                &list.items,
                pagination.show_previous.as_deref(),
                pagination.show_next.as_deref(),
            ))
        }
        Err(e) => upstream_failure("Could not list archives".to_string(), e),
    }
}

/// GET /download/:archive_id
pub async fn download(
    State(state): State<AppState>,
    Path(archive_id): Path<String>,
) -> Response {
    match state.platform.get_archive(&archive_id).await {
        Ok(archive) => match archive.url {
            Some(url) => found(&url),
            None => upstream_failure(
                format!("Could not get archive {}", archive_id),
                "archive has no download URL yet",
            ),
        },
        Err(e) => upstream_failure(format!("Could not get archive {}", archive_id), e),
    }
}

/// POST /start
/// Point archive storage at the configured bucket, then start recording
pub async fn start_archive(
    State(state): State<AppState>,
    FormOrJson(req): FormOrJson<StartArchiveRequest>,
) -> Response {
    info!("Start archive request: {:?}", req);
    let failure = || format!("Could not start archive for session {}", state.session_id);

    let assertion = match auth::project_assertion(
        &state.credentials.api_key,
        &state.credentials.api_secret,
        STORAGE_NONCE,
    ) {
        Ok(assertion) => assertion,
        Err(e) => return upstream_failure(failure(), e),
    };

    let storage = StorageConfig::s3(&state.storage);
    match state.platform.configure_storage(&assertion, &storage).await {
        Ok(outcome) if outcome.is_success() => {
            info!("Storage configured (HTTP {}): {}", outcome.status, outcome.body);
        }
        // A rejected configuration does not block the archive
        Ok(outcome) => {
            warn!(
                "Storage configuration rejected (HTTP {}): {}",
                outcome.status, outcome.body
            );
        }
        Err(e) => return upstream_failure(failure(), e),
    }

    let options = req.into_options(&state.archive_name);
    match state.platform.start_archive(&state.session_id, &options).await {
        Ok(archive) => {
            info!("Archive {} started", archive.id);
            Json(archive).into_response()
        }
        Err(e) => upstream_failure(failure(), e),
    }
}

/// POST /startold
/// Start recording with whatever storage the project already has
pub async fn start_archive_direct(
    State(state): State<AppState>,
    FormOrJson(req): FormOrJson<StartArchiveRequest>,
) -> Response {
    info!("Start archive request (no storage update): {:?}", req);

    let options = req.into_options(&state.archive_name);
    match state.platform.start_archive(&state.session_id, &options).await {
        Ok(archive) => Json(archive).into_response(),
        Err(e) => upstream_failure(
            format!("Could not start archive for session {}", state.session_id),
            e,
        ),
    }
}

/// GET /stop/:archive_id
pub async fn stop_archive(
    State(state): State<AppState>,
    Path(archive_id): Path<String>,
) -> Response {
    info!("Stopping archive {}", archive_id);

    match state.platform.stop_archive(&archive_id).await {
        Ok(archive) => Json(archive).into_response(),
        Err(e) => upstream_failure(format!("Could not stop archive {}", archive_id), e),
    }
}

/// GET /delete/:archive_id
pub async fn delete_archive(
    State(state): State<AppState>,
    Path(archive_id): Path<String>,
) -> Response {
    info!("Deleting archive {}", archive_id);

    match state.platform.delete_archive(&archive_id).await {
        Ok(()) => found("/history"),
        Err(e) => upstream_failure(format!("Could not delete archive {}", archive_id), e),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
