//! HTTP server for document question answering

pub mod routes;
pub mod state;

use axum::Router;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Question-answering HTTP server
pub struct RagServer {
    state: AppState,
}

impl RagServer {
    /// Create a server with the providers selected by configuration
    pub fn new(config: RagConfig) -> Result<Self> {
        Ok(Self::from_state(AppState::new(config)?))
    }

    /// Create a server around prepared state
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    fn config(&self) -> &RagConfig {
        self.state.config()
    }

    /// Shared state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware
    pub fn router(&self) -> Router {
        let server = &self.config().server;

        let mut router = routes::app_routes(server.max_upload_size)
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if server.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config().server.host, self.config().server.port)
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::config(format!("Invalid address: {}", e)))?;

        let router = self.router();

        tracing::info!("Starting server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}
