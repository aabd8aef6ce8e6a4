//! Document question-answering server
//!
//! Run with: cargo run -p docqa-rag --bin docqa-server

use std::path::PathBuf;

use docqa_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                        DocQA RAG                          ║
║          Ask questions about one uploaded document        ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config_path = std::env::var_os("DOCQA_CONFIG").map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!(
        "  - Embeddings: {:?} / {} at {}",
        config.embeddings.provider,
        config.embeddings.model,
        config.embeddings.endpoint()
    );
    tracing::info!(
        "  - LLM: {:?} / {} at {}",
        config.llm.provider,
        config.llm.model,
        config.llm.endpoint()
    );
    tracing::info!(
        "  - Chunking: size {} / overlap {}, top_k {}",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
        config.retrieval.top_k
    );

    let server = RagServer::new(config)?;

    // Providers may come up after the API, so only warn
    let state = server.state();
    match state.embedder().health_check().await {
        Ok(true) => tracing::info!("Embedding provider {} is reachable", state.embedder().name()),
        Ok(false) | Err(_) => {
            tracing::warn!("Embedding provider {} is not reachable yet", state.embedder().name())
        }
    }
    match state.llm().health_check().await {
        Ok(true) => tracing::info!("LLM provider {} is reachable", state.llm().name()),
        Ok(false) | Err(_) => {
            tracing::warn!("LLM provider {} is not reachable yet", state.llm().name());
            tracing::warn!("  For Ollama: ollama serve && ollama pull {}", state.llm().model());
        }
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /invoke   - Upload a document (pdf_file) with a question (query)");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
