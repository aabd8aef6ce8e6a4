//! Deterministic in-process providers for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

const DIMENSIONS: usize = 27;

/// Letter-frequency embedder: identical texts map to identical vectors
#[derive(Default)]
pub struct HashEmbedder {
    calls: AtomicUsize,
    failing: bool,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An embedder whose every call fails
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failing: true,
        }
    }

    /// Number of texts embedded so far (including failed attempts)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        // Last slot is a bias term so no vector is all zeros.
        let mut vector = vec![0.0f32; DIMENSIONS];
        for c in text.chars().flat_map(char::to_lowercase) {
            if c.is_ascii_lowercase() {
                vector[(c as u8 - b'a') as usize] += 1.0;
            }
        }
        vector[DIMENSIONS - 1] = 1.0;
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Error::embedding("embedding backend unavailable"));
        }
        Ok(Self::vector_for(text))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.failing)
    }

    fn name(&self) -> &str {
        "fake-hash"
    }
}

/// LLM that records prompts and answers with a fixed prefix
#[derive(Default)]
pub struct RecordingLlm {
    prompts: Mutex<Vec<String>>,
    failing: bool,
}

impl RecordingLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// An LLM whose every call fails
    pub fn failing() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if self.failing {
            return Err(Error::generation("model timed out"));
        }
        Ok(format!("Answer based on {} prompt characters", prompt.chars().count()))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.failing)
    }

    fn name(&self) -> &str {
        "fake-recording"
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}
