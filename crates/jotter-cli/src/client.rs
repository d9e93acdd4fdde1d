//! HTTP client for the Jotter server
//!
//! Every request carries the configured owner id in the owner header. Failed
//! requests surface the server's `{"message": ...}` body as the error.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use jotter_core::{Config, NewNote, Note, NoteBackend, NoteUpdate};

/// Request timeout in seconds
const REQUEST_TIMEOUT: u64 = 10;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}

/// A downloaded PDF export
#[derive(Debug)]
pub struct Export {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    owner_header: String,
    owner: String,
}

impl ApiClient {
    pub fn new(base_url: &str, owner_header: &str, owner: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .user_agent(concat!("jotter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            owner_header: owner_header.to_string(),
            owner: owner.to_string(),
        })
    }

    /// Build a client from the configured server and owner
    pub fn from_config(config: &Config) -> Result<Self> {
        let owner = config.owner.as_deref().filter(|o| !o.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No owner configured.\n\
                 Set one with: jotter config set owner <your-id>"
            )
        })?;
        Self::new(&config.server_url, &config.owner_header, owner)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(self.owner_header.as_str(), self.owner.as_str())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Could not reach server at {}", self.base_url))?;
        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .context("Server sent an unexpected response")
    }

    pub async fn list_notes(&self, tag: Option<&str>) -> Result<Vec<Note>> {
        let mut builder = self.request(Method::GET, "/notes");
        if let Some(tag) = tag {
            builder = builder.query(&[("tag", tag)]);
        }
        self.send_json(builder).await
    }

    pub async fn get_note(&self, id: Uuid) -> Result<Note> {
        self.send_json(self.request(Method::GET, &format!("/notes/{}", id)))
            .await
    }

    pub async fn create(&self, note: &NewNote) -> Result<Note> {
        self.send_json(self.request(Method::POST, "/notes").json(note))
            .await
    }

    pub async fn update(&self, id: Uuid, update: &NoteUpdate) -> Result<Note> {
        self.send_json(
            self.request(Method::PUT, &format!("/notes/{}", id))
                .json(update),
        )
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("/notes/{}", id)))
            .await?;
        Ok(())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Note>> {
        self.send_json(
            self.request(Method::GET, "/notes/search")
                .query(&[("query", query)]),
        )
        .await
    }

    pub async fn export(&self, id: Uuid) -> Result<Export> {
        let response = self
            .send(self.request(Method::GET, &format!("/notes/{}/export", id)))
            .await?;

        let filename = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| format!("{}.pdf", id));
        let bytes = response
            .bytes()
            .await
            .context("Failed to download export")?
            .to_vec();

        Ok(Export { filename, bytes })
    }

    pub async fn tags(&self) -> Result<Vec<TagCount>> {
        self.send_json(self.request(Method::GET, "/tags")).await
    }
}

#[async_trait]
impl NoteBackend for ApiClient {
    async fn create_note(&self, note: &NewNote) -> Result<Note> {
        self.create(note).await
    }

    async fn update_note(&self, id: Uuid, update: &NoteUpdate) -> Result<Note> {
        self.update(id, update).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    bail!("{} ({})", error_message(&body), status)
}

/// Pull the message out of an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => error.message,
        Err(_) if body.trim().is_empty() => "Request failed".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let client = ApiClient::new("http://localhost:5000/", "x-owner-id", "alice").unwrap();
        assert_eq!(client.url("/notes"), "http://localhost:5000/notes");
    }

    #[test]
    fn test_from_config_requires_owner() {
        let config = Config::default();
        assert!(ApiClient::from_config(&config).is_err());

        let config = Config {
            owner: Some("alice".to_string()),
            ..Config::default()
        };
        assert!(ApiClient::from_config(&config).is_ok());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"message":"Note not found"}"#), "Note not found");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(""), "Request failed");
    }

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"Groceries.pdf\""),
            Some("Groceries.pdf".to_string())
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=notes.pdf"),
            Some("notes.pdf".to_string())
        );
        assert_eq!(filename_from_disposition("attachment"), None);
    }
}
