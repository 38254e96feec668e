//! Route handlers.
//!
//! Store calls do blocking filesystem I/O, so each one runs on the blocking
//! pool and is awaited before the response is built.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::commands;
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::storage::resolver::basename;
use crate::storage::{DocumentStore, StorageError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileQuery {
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirQuery {
    pub dir_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    pub file_name: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub old_name: Option<String>,
    pub new_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirRequest {
    pub dir_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ContentBody {
    pub content: String,
}

/// Run a store operation on the blocking pool.
async fn run<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn DocumentStore) -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    let result = tokio::task::spawn_blocking(move || op(store.as_ref())).await?;
    Ok(result?)
}

fn message(message: &'static str) -> Json<MessageBody> {
    Json(MessageBody { message })
}

/// Quote-safe ASCII rendering of a file name for `Content-Disposition`.
fn disposition_name(name: &str) -> String {
    basename(name)
        .unwrap_or("document.pdf")
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub async fn read_inline(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = query.file_name.unwrap_or_default();

    let disposition = format!("inline; filename=\"{}\"", disposition_name(&name));
    let bytes = run(&state, move |store| commands::read_raw(store, &name)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

pub async fn read_text(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Json<ContentBody>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = query.file_name.unwrap_or_default();

    let content = run(&state, move |store| commands::read_text(store, &name)).await?;
    Ok(Json(ContentBody { content }))
}

pub async fn write(
    State(state): State<Arc<AppState>>,
    body: Result<Json<WriteRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = body.file_name.unwrap_or_default();
    let content = body.content.unwrap_or_default();

    let done = run(&state, move |store| commands::write(store, &name, &content)).await?;
    Ok(message(done))
}

pub async fn append(
    State(state): State<Arc<AppState>>,
    body: Result<Json<WriteRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = body.file_name.unwrap_or_default();
    let content = body.content.unwrap_or_default();

    let done = run(&state, move |store| commands::append(store, &name, &content)).await?;
    Ok(message(done))
}

pub async fn rename(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let old_name = body.old_name.unwrap_or_default();
    let new_name = body.new_name.unwrap_or_default();

    let done = run(&state, move |store| {
        commands::rename(store, &old_name, &new_name)
    })
    .await?;
    Ok(message(done))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = query.file_name.unwrap_or_default();

    let done = run(&state, move |store| commands::delete(store, &name)).await?;
    Ok(message(done))
}

pub async fn create_dir(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DirRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = body.dir_name.unwrap_or_default();

    let done = run(&state, move |store| commands::create_dir(store, &name)).await?;
    Ok(message(done))
}

pub async fn delete_dir(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DirQuery>, QueryRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = query.dir_name.unwrap_or_default();

    let done = run(&state, move |store| commands::delete_dir(store, &name)).await?;
    Ok(message(done))
}
