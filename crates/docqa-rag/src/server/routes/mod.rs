//! HTTP routes

pub mod invoke;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all routes
pub fn app_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/invoke",
            post(invoke::invoke).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/health", get(health_check))
        .route("/api/info", get(info))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Ask a question about one uploaded document",
        "endpoints": {
            "POST /invoke": "Multipart form with 'query' and 'pdf_file'; returns the answer and the retrieved chunks",
            "GET /health": "Liveness check",
            "GET /api/info": "This document"
        },
        "pipeline": state.pipeline().stage_names(),
        "embeddings": {
            "provider": config.embeddings.provider,
            "model": config.embeddings.model,
        },
        "llm": {
            "provider": config.llm.provider,
            "model": config.llm.model,
        },
        "chunking": {
            "chunk_size": config.chunking.chunk_size,
            "chunk_overlap": config.chunking.chunk_overlap,
        },
        "top_k": state.pipeline().top_k(),
        "max_upload_size": config.server.max_upload_size,
    }))
}
