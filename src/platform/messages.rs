use crate::config::StorageSettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How media flows between clients of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaMode {
    /// Media goes through the platform's media servers (required for archiving)
    Routed,
}

impl MediaMode {
    /// Value of the `p2p.preference` field on session creation
    pub fn p2p_preference(self) -> &'static str {
        match self {
            MediaMode::Routed => "disabled",
        }
    }
}

/// Client role carried by an access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Moderator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Moderator => "moderator",
        }
    }
}

/// A session created on the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub media_mode: MediaMode,
}

/// Archive as reported by the platform
///
/// Fields the gateway does not interpret are kept in `extra` so the object is
/// relayed to browsers unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archive {
    pub id: String,

    /// started, stopped, uploaded, available, expired, failed, ...
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default)]
    pub has_audio: bool,

    #[serde(default)]
    pub has_video: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_mode: Option<String>,

    /// Download location, only set once the archive is available
    #[serde(default)]
    pub url: Option<String>,

    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of archives plus the total across all pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveList {
    pub count: u64,
    #[serde(default)]
    pub items: Vec<Archive>,
}

/// Options for starting an archive
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub has_audio: bool,
    pub has_video: bool,
    /// `composed` or `individual`; passed through as given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_mode: Option<String>,
}

/// Archive storage target pushed before an archive is started
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub config: S3Target,
    pub fallback: String,
    pub certificate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Target {
    pub bucket: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl StorageConfig {
    /// S3 target without fallback to platform storage
    pub fn s3(settings: &StorageSettings) -> Self {
        Self {
            kind: "s3".to_string(),
            config: S3Target {
                bucket: settings.bucket.clone(),
                access_key: settings.access_key.clone(),
                secret_key: settings.secret_key.clone(),
            },
            fallback: "none".to_string(),
            certificate: settings.certificate.clone(),
        }
    }
}

/// Whatever the storage endpoint answered
#[derive(Debug, Clone, PartialEq)]
pub struct StorageOutcome {
    pub status: u16,
    /// JSON body, or the raw text as a string, or null when empty
    pub body: Value,
}

impl StorageOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
