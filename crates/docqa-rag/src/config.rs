//! Configuration for the question-answering service

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Embedding provider configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Language model configuration
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable permissive CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window width in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks of the same page
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl ChunkingConfig {
    /// Check the window parameters
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum number of chunks handed to the generator
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Backend serving embeddings or completions
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI-compatible HTTP API
    OpenAi,
}

impl ProviderKind {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => Err(Error::config(format!("Unknown provider: {}", other))),
        }
    }

    /// Default endpoint for the provider
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider backend
    pub provider: ProviderKind,
    /// Embedding model name
    pub model: String,
    /// Base URL; the provider default is used when unset
    pub base_url: Option<String>,
    /// API key (required for OpenAI)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
    /// Maximum texts per embedding request (OpenAI accepts at most 2048)
    pub batch_size: usize,
}

/// Upper bound on `embeddings.batch_size`
pub const MAX_EMBEDDING_BATCH: usize = 2048;

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            model: "nomic-embed-text".to_string(),
            base_url: None,
            api_key: None,
            timeout_secs: 60,
            max_retries: 2,
            batch_size: 256,
        }
    }
}

impl EmbeddingConfig {
    /// Effective base URL
    pub fn endpoint(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider backend
    pub provider: ProviderKind,
    /// Generation model name
    pub model: String,
    /// Base URL; the provider default is used when unset
    pub base_url: Option<String>,
    /// API key (required for OpenAI)
    pub api_key: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            model: "llama3.2:3b".to_string(),
            base_url: None,
            api_key: None,
            temperature: 0.0, // Factual answers
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

impl LlmConfig {
    /// Effective base URL
    pub fn endpoint(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            Error::config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DOCQA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DOCQA_PORT") {
            self.server.port = parse_number("DOCQA_PORT", &port)?;
        }
        if let Some(size) = lookup("DOCQA_CHUNK_SIZE") {
            self.chunking.chunk_size = parse_number("DOCQA_CHUNK_SIZE", &size)?;
        }
        if let Some(overlap) = lookup("DOCQA_CHUNK_OVERLAP") {
            self.chunking.chunk_overlap = parse_number("DOCQA_CHUNK_OVERLAP", &overlap)?;
        }
        if let Some(k) = lookup("DOCQA_TOP_K") {
            self.retrieval.top_k = parse_number("DOCQA_TOP_K", &k)?;
        }
        if let Some(provider) = lookup("DOCQA_EMBED_PROVIDER") {
            self.embeddings.provider = ProviderKind::parse(&provider)?;
        }
        if let Some(model) = lookup("DOCQA_EMBED_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(provider) = lookup("DOCQA_LLM_PROVIDER") {
            self.llm.provider = ProviderKind::parse(&provider)?;
        }
        if let Some(model) = lookup("DOCQA_LLM_MODEL") {
            self.llm.model = model;
        }

        // Provider-scoped endpoints and credentials only fill sections using that provider
        for (provider, base_url, api_key) in [
            (
                self.embeddings.provider,
                &mut self.embeddings.base_url,
                &mut self.embeddings.api_key,
            ),
            (self.llm.provider, &mut self.llm.base_url, &mut self.llm.api_key),
        ] {
            match provider {
                ProviderKind::Ollama => {
                    if let Some(url) = lookup("OLLAMA_BASE_URL") {
                        *base_url = Some(url);
                    }
                }
                ProviderKind::OpenAi => {
                    if let Some(url) = lookup("OPENAI_BASE_URL") {
                        *base_url = Some(url);
                    }
                    if api_key.is_none() {
                        *api_key = lookup("OPENAI_API_KEY");
                    }
                }
            }
        }

        Ok(())
    }

    /// Validate the configuration before serving requests
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.retrieval.top_k == 0 {
            return Err(Error::config("top_k must be at least 1"));
        }
        if self.embeddings.batch_size == 0 || self.embeddings.batch_size > MAX_EMBEDDING_BATCH {
            return Err(Error::config(format!(
                "embeddings.batch_size must be between 1 and {}, got {}",
                MAX_EMBEDDING_BATCH, self.embeddings.batch_size
            )));
        }
        if self.embeddings.model.trim().is_empty() {
            return Err(Error::config("embeddings.model must not be empty"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(Error::config("llm.model must not be empty"));
        }
        if self.embeddings.provider == ProviderKind::OpenAi
            && !has_key(self.embeddings.api_key.as_deref())
        {
            return Err(Error::config(
                "embeddings.api_key (or OPENAI_API_KEY) is required for the openai provider",
            ));
        }
        if self.llm.provider == ProviderKind::OpenAi && !has_key(self.llm.api_key.as_deref()) {
            return Err(Error::config(
                "llm.api_key (or OPENAI_API_KEY) is required for the openai provider",
            ));
        }

        Ok(())
    }
}

fn has_key(key: Option<&str>) -> bool {
    key.map_or(false, |k| !k.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{} must be a number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 50);
        assert_eq!(config.retrieval.top_k, 5);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let mut config = RagConfig::default();
        config.chunking.chunk_overlap = 500;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.chunking.chunk_size = 0;
        config.chunking.chunk_overlap = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_embedding_batch_size_bounds() {
        let mut config = RagConfig::default();
        assert_eq!(config.embeddings.batch_size, 256);

        config.embeddings.batch_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.embeddings.batch_size = MAX_EMBEDDING_BATCH + 1;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.embeddings.batch_size = MAX_EMBEDDING_BATCH;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_openai_requires_key() {
        let mut config = RagConfig::default();
        config.llm.provider = ProviderKind::OpenAi;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.llm.api_key = Some("   ".to_string());
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.llm.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RagConfig::default();
        config
            .apply_env(env(&[
                ("DOCQA_PORT", "9001"),
                ("DOCQA_TOP_K", "2"),
                ("DOCQA_LLM_PROVIDER", "openai"),
                ("OPENAI_API_KEY", "sk-env"),
                ("OLLAMA_BASE_URL", "http://ollama:11434"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9001);
        assert_eq!(config.retrieval.top_k, 2);
        assert_eq!(config.llm.provider, ProviderKind::OpenAi);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-env"));
        // Embeddings stay on Ollama and must not pick up the OpenAI key
        assert_eq!(config.embeddings.api_key, None);
        assert_eq!(config.embeddings.endpoint(), "http://ollama:11434");
        assert_eq!(config.llm.endpoint(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_env_rejects_garbage_numbers() {
        let mut config = RagConfig::default();
        let result = config.apply_env(env(&[("DOCQA_CHUNK_SIZE", "big")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_toml() {
        let config: RagConfig = toml::from_str(
            r#"
            [chunking]
            chunk_size = 800

            [llm]
            provider = "openai"
            model = "gpt-4o-mini"
            api_key = "sk-file"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 800);
        assert_eq!(config.chunking.chunk_overlap, 50);
        assert_eq!(config.llm.provider, ProviderKind::OpenAi);
        assert_eq!(config.server.port, 8000);
        assert!(config.validate().is_ok());
    }
}
