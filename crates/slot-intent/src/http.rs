//! HTTP client for any OpenAI-compatible `/v1/embeddings` endpoint.

use crate::{EmbeddingError, EmbeddingProvider};
use async_trait::async_trait;
use std::time::Duration;

pub struct HttpEmbeddingProvider {
    endpoint: String,
    model: String,
    dim: usize,
    client: reqwest::Client,
}

impl HttpEmbeddingProvider {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        dim: usize,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            dim,
            client,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        #[derive(serde::Serialize)]
        struct EmbedReq<'a> {
            model: &'a str,
            input: &'a str,
        }
        // Expected response: { data: [{ embedding: [f32] }] }
        #[derive(serde::Deserialize)]
        struct EmbedItem {
            embedding: Vec<f32>,
        }
        #[derive(serde::Deserialize)]
        struct EmbedResp {
            data: Vec<EmbedItem>,
        }

        let req = EmbedReq {
            model: &self.model,
            input: text,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&req)
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(EmbeddingError::Request(format!("HTTP {}", resp.status())));
        }

        let body: EmbedResp = resp
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;
        let vector = body
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty data array".into()))?;
        if self.dim != 0 && vector.len() != self.dim {
            tracing::warn!(
                expected = self.dim,
                got = vector.len(),
                "embedding dimension mismatch"
            );
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "http"
    }
}
