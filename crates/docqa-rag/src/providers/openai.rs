//! OpenAI-compatible providers for embeddings and chat completions

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{EmbeddingConfig, LlmConfig, MAX_EMBEDDING_BATCH};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::http::{build_client, retry_request};
use super::llm::LlmProvider;

const SYSTEM_PROMPT: &str =
    "You answer questions about a single document using only the context you are given.";

/// Authenticated client for an OpenAI-compatible API
struct OpenAiClient {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl OpenAiClient {
    fn new(
        api_key: Option<&str>,
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::config("missing OpenAI API key"))?;

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|_| Error::config("invalid OpenAI API key"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client: build_client(timeout_secs, headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedding provider backed by the `/embeddings` endpoint
pub struct OpenAiEmbedder {
    api: OpenAiClient,
    model: String,
    batch_size: usize,
}

impl OpenAiEmbedder {
    /// Create a new OpenAI embedder; fails without an API key
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            api: OpenAiClient::new(
                config.api_key.as_deref(),
                &config.endpoint(),
                config.timeout_secs,
                config.max_retries,
            )?,
            model: config.model.clone(),
            batch_size: config.batch_size.clamp(1, MAX_EMBEDDING_BATCH),
        })
    }

    /// Maximum texts sent in one request
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.api.base_url);

        let mut data = retry_request(self.api.max_retries, || {
            let client = self.api.client.clone();
            let url = url.clone();

            async move {
                let request = EmbeddingRequest {
                    model: &self.model,
                    input: inputs,
                };
                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::embedding(format!(
                        "OpenAI returned {}: {}",
                        status, body
                    )));
                }

                let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
                    Error::embedding(format!("Failed to parse embedding response: {}", e))
                })?;
                Ok(parsed.data)
            }
        })
        .await?;

        if data.len() != inputs.len() {
            return Err(Error::embedding(format!(
                "OpenAI returned {} embeddings for {} inputs",
                data.len(),
                inputs.len()
            )));
        }

        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("OpenAI returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        // Sequential sub-requests; any failure fails the whole batch
        for (i, batch) in texts.chunks(self.batch_size).enumerate() {
            tracing::debug!(
                "Embedding batch {} ({} texts) with {}",
                i + 1,
                batch.len(),
                self.model
            );
            embeddings.extend(self.request(batch).await?);
        }

        Ok(embeddings)
    }

    async fn health_check(&self) -> Result<bool> {
        self.api.health_check().await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Language model provider backed by `/chat/completions`
pub struct OpenAiLlm {
    api: OpenAiClient,
    model: String,
    temperature: f32,
}

impl OpenAiLlm {
    /// Create a new OpenAI chat provider; fails without an API key
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            api: OpenAiClient::new(
                config.api_key.as_deref(),
                &config.endpoint(),
                config.timeout_secs,
                config.max_retries,
            )?,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api.base_url);

        tracing::info!("Generating answer with model: {}", self.model);

        retry_request(self.api.max_retries, || {
            let client = self.api.client.clone();
            let url = url.clone();

            async move {
                let body = ChatRequest {
                    model: &self.model,
                    temperature: self.temperature,
                    messages: vec![
                        ChatMessage {
                            role: "system",
                            content: SYSTEM_PROMPT,
                        },
                        ChatMessage {
                            role: "user",
                            content: prompt,
                        },
                    ],
                };
                let response = client
                    .post(&url)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| Error::generation(format!("Chat request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    return Err(Error::generation(format!(
                        "OpenAI returned {}: {}",
                        status, text
                    )));
                }

                let parsed: ChatResponse = response.json().await.map_err(|e| {
                    Error::generation(format!("Failed to parse chat response: {}", e))
                })?;

                parsed
                    .choices
                    .into_iter()
                    .find_map(|choice| choice.message.content)
                    .ok_or_else(|| Error::generation("OpenAI response had no message content"))
            }
        })
        .await
    }

    async fn health_check(&self) -> Result<bool> {
        self.api.health_check().await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
