//! Server-rendered pages
//!
//! Templates are compiled into the binary so the gateway runs from any
//! working directory.

use crate::platform::Archive;
use chrono::{DateTime, Utc};
use minijinja::{context, Environment, Error};
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("host.html", include_str!("../templates/host.html")),
    ("participant.html", include_str!("../templates/participant.html")),
    ("history.html", include_str!("../templates/history.html")),
];

/// Credentials handed to the browser client
#[derive(Debug, Serialize)]
pub struct ClientPage<'a> {
    pub api_key: &'a str,
    pub session_id: &'a str,
    pub token: &'a str,
}

/// One line of the archive history table
#[derive(Debug, Serialize)]
struct ArchiveRow<'a> {
    id: &'a str,
    name: &'a str,
    created: String,
    duration: u64,
    status: &'a str,
    downloadable: bool,
    deletable: bool,
}

impl<'a> From<&'a Archive> for ArchiveRow<'a> {
    fn from(archive: &'a Archive) -> Self {
        let status = archive.status.as_deref().unwrap_or("unknown");
        Self {
            id: &archive.id,
            name: archive.name.as_deref().unwrap_or(&archive.id),
            created: archive
                .created_at
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default(),
            duration: archive.duration.unwrap_or(0),
            status,
            downloadable: archive.url.is_some(),
            deletable: matches!(status, "available" | "uploaded" | "expired" | "failed" | "stopped"),
        }
    }
}

pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn index(&self) -> Result<String, Error> {
        self.env.get_template("index.html")?.render(context!())
    }

    pub fn host(&self, page: &ClientPage<'_>) -> Result<String, Error> {
        self.env.get_template("host.html")?.render(page)
    }

    pub fn participant(&self, page: &ClientPage<'_>) -> Result<String, Error> {
        self.env.get_template("participant.html")?.render(page)
    }

    pub fn history(
        &self,
        archives: &[Archive],
        show_previous: Option<&str>,
        show_next: Option<&str>,
    ) -> Result<String, Error> {
        let rows: Vec<ArchiveRow<'_>> = archives.iter().map(ArchiveRow::from).collect();
        self.env.get_template("history.html")?.render(context! {
            archives => rows,
            show_previous => show_previous,
            show_next => show_next,
        })
    }
}
