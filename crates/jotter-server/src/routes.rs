//! HTTP routes
//!
//! - GET    /notes             - List the owner's notes (`?tag=` filters)
//! - POST   /notes             - Create a note
//! - GET    /notes/search      - Search by `?query=`
//! - GET    /notes/:id         - Fetch one note
//! - PUT    /notes/:id         - Partial update
//! - DELETE /notes/:id         - Delete
//! - GET    /notes/:id/export  - Download as PDF
//! - GET    /tags              - Tag usage counts
//! - GET    /health            - Liveness, no owner required

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::debug;

use jotter_core::{export, parse_note_id, NewNote, Note, NoteService, NoteUpdate};

use crate::auth::Owner;
use crate::error::ApiError;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Mutex<NoteService>>,
    pub owner_header: HeaderName,
}

impl AppState {
    pub fn new(service: NoteService, owner_header: &str) -> Result<Self> {
        let owner_header = HeaderName::from_bytes(owner_header.as_bytes())
            .with_context(|| format!("Invalid owner header name: {}", owner_header))?;
        Ok(Self {
            service: Arc::new(Mutex::new(service)),
            owner_header,
        })
    }

    fn service(&self) -> Result<MutexGuard<'_, NoteService>, ApiError> {
        self.service
            .lock()
            .map_err(|_| ApiError::Internal("Note service lock poisoned".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/search", get(search_notes))
        .route(
            "/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/notes/:id/export", get(export_note))
        .route("/tags", get(list_tags))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_notes(
    State(state): State<AppState>,
    Owner(owner): Owner,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let Query(params) = params?;
    let service = state.service()?;
    let notes = match params.tag.as_deref().map(str::trim) {
        Some(tag) if !tag.is_empty() => service.list_by_tag(&owner, tag)?,
        _ => service.list(&owner)?,
    };
    Ok(Json(notes))
}

async fn create_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    payload: Result<Json<NewNote>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(new) = payload?;
    let note = state.service()?.create(&owner, new)?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn get_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    Ok(Json(state.service()?.get_owned(id, &owner)?))
}

async fn update_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    payload: Result<Json<NoteUpdate>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    let Json(update) = payload?;
    if update.is_empty() {
        debug!("Empty update for note {}", id);
    }
    Ok(Json(state.service()?.update(id, &owner, update)?))
}

async fn delete_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_note_id(&id)?;
    state.service()?.delete(id, &owner)?;
    Ok(Json(json!({ "message": "Note removed" })))
}

async fn search_notes(
    State(state): State<AppState>,
    Owner(owner): Owner,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let Query(params) = params?;
    Ok(Json(state.service()?.search(&owner, &params.query)?))
}

async fn export_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_note_id(&id)?;
    let note = state.service()?.get_owned(id, &owner)?;

    let pdf = export::render(&note)?;
    let disposition = format!("attachment; filename=\"{}\"", export::filename(&note.title));

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    ))
}

async fn list_tags(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<Vec<TagCount>>, ApiError> {
    let tags = state
        .service()?
        .tags(&owner)?
        .into_iter()
        .map(|(name, count)| TagCount { name, count })
        .collect();
    Ok(Json(tags))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
