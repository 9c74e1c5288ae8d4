use super::auth::{self, AUTH_HEADER};
use super::messages::{
    Archive, ArchiveList, ArchiveOptions, MediaMode, Role, Session, StorageConfig, StorageOutcome,
};
use super::token::{self, TokenRequest};
use super::{PlatformError, VideoPlatform};
use crate::config::Credentials;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// REST client for the OpenTok / Vonage Video API
pub struct OpenTokClient {
    http: reqwest::Client,
    credentials: Credentials,
    api_url: Url,
}

#[derive(Debug, Deserialize)]
struct CreatedSession {
    session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartArchiveBody<'a> {
    session_id: &'a str,
    #[serde(flatten)]
    options: &'a ArchiveOptions,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl OpenTokClient {
    pub fn new(credentials: Credentials, api_url: &str) -> Result<Self, PlatformError> {
        let parsed = Url::parse(api_url).map_err(|e| PlatformError::InvalidUrl {
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(PlatformError::InvalidUrl {
                url: api_url.to_string(),
                reason: "not a base URL".to_string(),
            });
        }

        Ok(Self {
            http: reqwest::Client::new(),
            credentials,
            api_url: parsed,
        })
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // Always Ok: cannot-be-a-base URLs are rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn archive_url(&self, tail: &[&str]) -> Url {
        let mut segments = vec!["v2", "project", self.credentials.api_key.as_str(), "archive"];
        segments.extend_from_slice(tail);
        self.endpoint(&segments)
    }

    /// Request carrying a freshly signed project assertion
    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, PlatformError> {
        let nonce = uuid::Uuid::new_v4().to_string();
        let assertion = auth::project_assertion(
            &self.credentials.api_key,
            &self.credentials.api_secret,
            &nonce,
        )?;

        debug!("{} {}", method, url);
        Ok(self
            .http
            .request(method, url)
            .header(AUTH_HEADER, assertion)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, PlatformError> {
        let response = check(builder.send().await?).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlatformError::Decode(e.to_string()))
    }
}

/// Archive ids travel as one path segment; dot segments would be collapsed
/// into a different endpoint, so they are refused outright
fn archive_segment(archive_id: &str) -> Result<&str, PlatformError> {
    match archive_id {
        "" | "." | ".." => Err(PlatformError::InvalidArchiveId(archive_id.to_string())),
        id => Ok(id),
    }
}

/// Turn a non-success response into `PlatformError::Api`
async fn check(response: Response) -> Result<Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string()
        });

    Err(PlatformError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl VideoPlatform for OpenTokClient {
    async fn create_session(&self, media_mode: MediaMode) -> Result<Session, PlatformError> {
        let url = self.endpoint(&["session", "create"]);
        let form = [
            ("p2p.preference", media_mode.p2p_preference()),
            ("archiveMode", "manual"),
        ];

        let created: Vec<CreatedSession> = self
            .send_json(self.request(Method::POST, url)?.form(&form))
            .await?;
        let session_id = created
            .into_iter()
            .next()
            .map(|s| s.session_id)
            .ok_or_else(|| PlatformError::Decode("session list was empty".to_string()))?;

        info!("Created session {} ({:?})", session_id, media_mode);
        Ok(Session {
            session_id,
            media_mode,
        })
    }

    fn generate_token(&self, session_id: &str, role: Role) -> Result<String, PlatformError> {
        token::mint(
            &self.credentials.api_key,
            &self.credentials.api_secret,
            &TokenRequest::new(session_id, role),
        )
    }

    async fn list_archives(&self, offset: u32, count: u32) -> Result<ArchiveList, PlatformError> {
        let builder = self
            .request(Method::GET, self.archive_url(&[]))?
            .query(&[("offset", offset), ("count", count)]);
        self.send_json(builder).await
    }

    async fn get_archive(&self, archive_id: &str) -> Result<Archive, PlatformError> {
        let url = self.archive_url(&[archive_segment(archive_id)?]);
        self.send_json(self.request(Method::GET, url)?).await
    }

    async fn start_archive(
        &self,
        session_id: &str,
        options: &ArchiveOptions,
    ) -> Result<Archive, PlatformError> {
        let body = StartArchiveBody {
            session_id,
            options,
        };
        let builder = self.request(Method::POST, self.archive_url(&[]))?.json(&body);
        let archive: Archive = self.send_json(builder).await?;
        info!("Started archive {} for session {}", archive.id, session_id);
        Ok(archive)
    }

    async fn stop_archive(&self, archive_id: &str) -> Result<Archive, PlatformError> {
        let url = self.archive_url(&[archive_segment(archive_id)?, "stop"]);
        let archive: Archive = self.send_json(self.request(Method::POST, url)?).await?;
        info!("Stopped archive {}", archive.id);
        Ok(archive)
    }

    async fn delete_archive(&self, archive_id: &str) -> Result<(), PlatformError> {
        let url = self.archive_url(&[archive_segment(archive_id)?]);
        check(self.request(Method::DELETE, url)?.send().await?).await?;
        info!("Deleted archive {}", archive_id);
        Ok(())
    }

    async fn configure_storage(
        &self,
        assertion: &str,
        storage: &StorageConfig,
    ) -> Result<StorageOutcome, PlatformError> {
        let response = self
            .http
            .put(self.archive_url(&["storage"]))
            .header(AUTH_HEADER, assertion)
            .json(storage)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(StorageOutcome { status, body })
    }
}
