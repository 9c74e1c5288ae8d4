// Shared fixtures for the HTTP integration tests
//
// `MockPlatform` records every call the handlers make and answers from canned
// data, so routes can be exercised in-process without a network.

#![allow(dead_code)]

use archive_gateway::config::Config;
use archive_gateway::platform::token::{self, TokenRequest};
use archive_gateway::platform::{
    Archive, ArchiveList, ArchiveOptions, MediaMode, Role, Session, StorageConfig,
    StorageOutcome,
};
use archive_gateway::{create_router, AppState, PlatformError, VideoPlatform};
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const API_KEY: &str = "123456";
pub const API_SECRET: &str = "project-secret";
pub const SESSION_ID: &str = "2_MX4xMjM0NTZ-fjE3MDAwMDAwMDAwMDB-c2Vzc2lvbg";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List { offset: u32, count: u32 },
    Get(String),
    Start { session_id: String, options: ArchiveOptions },
    Stop(String),
    Delete(String),
    ConfigureStorage { assertion: String, storage: StorageConfig },
}

#[derive(Debug, Clone, Copy)]
pub enum StorageBehaviour {
    Accept,
    Reject(u16),
    Unreachable,
}

pub struct MockPlatform {
    pub calls: Mutex<Vec<Call>>,
    pub archives: Vec<Archive>,
    pub total: u64,
    /// When set, every archive call fails with this message
    pub failure: Option<String>,
    pub storage: StorageBehaviour,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            archives: Vec::new(),
            total: 0,
            failure: None,
            storage: StorageBehaviour::Accept,
        }
    }
}

impl MockPlatform {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), PlatformError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(PlatformError::Api {
                status: 404,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub fn archive(id: &str, status: &str, url: Option<&str>) -> Archive {
    serde_json::from_value(json!({
        "id": id,
        "name": "demo",
        "status": status,
        "sessionId": SESSION_ID,
        "hasAudio": true,
        "hasVideo": true,
        "outputMode": "composed",
        "createdAt": 1_700_000_000_000i64,
        "duration": 30,
        "url": url,
        "partnerId": 123456,
    }))
    .unwrap()
}

#[async_trait::async_trait]
impl VideoPlatform for MockPlatform {
    async fn create_session(&self, media_mode: MediaMode) -> Result<Session, PlatformError> {
        Ok(Session {
            session_id: SESSION_ID.to_string(),
            media_mode,
        })
    }

    fn generate_token(&self, session_id: &str, role: Role) -> Result<String, PlatformError> {
        token::mint(API_KEY, API_SECRET, &TokenRequest::new(session_id, role))
    }

    async fn list_archives(&self, offset: u32, count: u32) -> Result<ArchiveList, PlatformError> {
        self.record(Call::List { offset, count })?;
        Ok(ArchiveList {
            count: self.total,
            items: self.archives.clone(),
        })
    }

    async fn get_archive(&self, archive_id: &str) -> Result<Archive, PlatformError> {
        self.record(Call::Get(archive_id.to_string()))?;
        Ok(archive(
            archive_id,
            "available",
            Some(&format!("https://cdn.example.com/{}.mp4", archive_id)),
        ))
    }

    async fn start_archive(
        &self,
        session_id: &str,
        options: &ArchiveOptions,
    ) -> Result<Archive, PlatformError> {
        self.record(Call::Start {
            session_id: session_id.to_string(),
            options: options.clone(),
        })?;
        Ok(archive("new-archive", "started", None))
    }

    async fn stop_archive(&self, archive_id: &str) -> Result<Archive, PlatformError> {
        self.record(Call::Stop(archive_id.to_string()))?;
        Ok(archive(archive_id, "stopped", None))
    }

    async fn delete_archive(&self, archive_id: &str) -> Result<(), PlatformError> {
        self.record(Call::Delete(archive_id.to_string()))
    }

    async fn configure_storage(
        &self,
        assertion: &str,
        storage: &StorageConfig,
    ) -> Result<StorageOutcome, PlatformError> {
        self.calls.lock().unwrap().push(Call::ConfigureStorage {
            assertion: assertion.to_string(),
            storage: storage.clone(),
        });
        match self.storage {
            StorageBehaviour::Accept => Ok(StorageOutcome {
                status: 200,
                body: json!({"type": "s3"}),
            }),
            StorageBehaviour::Reject(status) => Ok(StorageOutcome {
                status,
                body: json!({"message": "Invalid storage configuration"}),
            }),
            StorageBehaviour::Unreachable => {
                // A malformed URL fails inside reqwest without touching the network
                let err = reqwest::Client::new()
                    .get("not a url")
                    .send()
                    .await
                    .unwrap_err();
                Err(PlatformError::Transport(err))
            }
        }
    }
}

pub fn config() -> Config {
    let settings = Config::defaults()
        .unwrap()
        .set_override("tokbox_api_key", API_KEY)
        .unwrap()
        .set_override("tokbox_secret", API_SECRET)
        .unwrap()
        .set_override("bucket", "recordings")
        .unwrap()
        .set_override("access_key", "AKIA")
        .unwrap()
        .set_override("secret", "s3-secret")
        .unwrap()
        .set_override("archive_name", "Test Recording")
        .unwrap()
        .build()
        .unwrap();
    Config::from_settings(settings).unwrap()
}

pub fn app(platform: Arc<MockPlatform>) -> Router {
    app_with(platform)
}

/// Router over any platform implementation, e.g. a real client aimed at a mock server
pub fn app_with(platform: Arc<dyn VideoPlatform>) -> Router {
    let session = Session {
        session_id: SESSION_ID.to_string(),
        media_mode: MediaMode::Routed,
    };
    let state = AppState::new(platform, session, &config()).unwrap();
    create_router(state, concat!(env!("CARGO_MANIFEST_DIR"), "/public"))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_form(app: Router, uri: &str, form: &str) -> TestResponse {
    let request = Request::post(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(app, request).await
}

/// Value of a `data-*` attribute in rendered HTML, with entity escapes undone
pub fn data_attr(html: &str, name: &str) -> String {
    let marker = format!("data-{}=\"", name);
    let start = html.find(&marker).unwrap() + marker.len();
    let end = start + html[start..].find('"').unwrap();
    html[start..end]
        .replace("&#x2f;", "/")
        .replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
