//! Document question endpoint

use std::path::Path;

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::InvokeResponse;

/// Extension assumed for uploads without one
const DEFAULT_EXTENSION: &str = "pdf";

struct Upload {
    filename: String,
    data: Vec<u8>,
}

/// POST /invoke - Answer a question about the uploaded document
pub async fn invoke(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<InvokeResponse>> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("invoke", %request_id);

    handle(state, multipart).instrument(span).await
}

async fn handle(state: AppState, mut multipart: Multipart) -> Result<Json<InvokeResponse>> {
    let start = Instant::now();
    let mut query: Option<String> = None;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        Error::InvalidRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "query" => {
                let text = field.text().await.map_err(|e| {
                    Error::InvalidRequest(format!("Failed to read query: {}", e))
                })?;
                query = Some(text);
            }
            "pdf_file" | "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("upload.{}", DEFAULT_EXTENSION));
                let data = field.bytes().await.map_err(|e| {
                    Error::InvalidRequest(format!("Failed to read file: {}", e))
                })?;
                upload = Some(Upload {
                    filename,
                    data: data.to_vec(),
                });
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let query = query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| Error::InvalidRequest("Missing 'query' field".to_string()))?;
    let upload = upload
        .ok_or_else(|| Error::InvalidRequest("Missing 'pdf_file' field".to_string()))?;

    tracing::info!(
        "Question about {} ({} bytes): {}",
        upload.filename,
        upload.data.len(),
        query
    );

    let extension = Path::new(&upload.filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(DEFAULT_EXTENSION);

    // Removed on drop, including when the request is cancelled
    let temp = tempfile::Builder::new()
        .prefix("docqa-")
        .suffix(&format!(".{}", extension))
        .tempfile()?;
    tokio::fs::write(temp.path(), &upload.data).await?;

    let result = state.pipeline().run(temp.path(), &query).await;

    if let Err(e) = temp.close() {
        tracing::warn!("Failed to remove temporary upload: {}", e);
    }

    let outcome = result?;
    tracing::info!(
        "Answered with {} retrieved chunks in {:.1}s",
        outcome.retrieved.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(Json(InvokeResponse::new(outcome.answer, &outcome.retrieved)))
}
