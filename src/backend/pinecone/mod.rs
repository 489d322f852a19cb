
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::RagError;
use crate::Result;
use crate::backend::http::{self, DEFAULT_RETRY_ATTEMPTS, HttpError};
use crate::backend::{ScoredMatch, VectorIndex, VectorRecord};
use crate::config::PineconeConfig;

/// Client for the data plane of a single Pinecone index.
#[derive(Debug, Clone)]
pub struct PineconeClient {
    index_host: Url,
    api_key: String,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    namespace: &'a str,
    include_metadata: bool,
}

/// Some store responses omit `matches` entirely when a namespace is empty;
/// the default keeps that a valid, empty result rather than a decode error.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredMatch>,
}

impl PineconeClient {
    #[inline]
    pub fn new(config: &PineconeConfig) -> Result<Self> {
        let index_host = config
            .index_url()
            .map_err(|e| RagError::Config(e.to_string()))?;

        if !config.index_name.is_empty() {
            debug!(
                "Pinecone client for index '{}' at {}",
                config.index_name, index_host
            );
        }

        Ok(Self {
            index_host,
            api_key: config.api_key.clone(),
            agent: http::agent_with_timeout(config.timeout_secs),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    fn post<T: Serialize>(&self, path: &str, request: &T) -> std::result::Result<String, HttpError> {
        let url = self
            .index_host
            .join(path)
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        let body = serde_json::to_string(request)
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        http::post_json_with_retry(
            &self.agent,
            &url,
            &[("Api-Key", self.api_key.as_str())],
            &body,
            self.retry_attempts,
        )
    }
}

fn store_error(error: &HttpError) -> RagError {
    match error {
        HttpError::Timeout => RagError::Timeout("Pinecone request".to_string()),
        other => RagError::Store(format!("Pinecone request failed: {other}")),
    }
}

impl VectorIndex for PineconeClient {
    #[inline]
    fn upsert(&self, records: &[VectorRecord], namespace: &str) -> Result<()> {
        debug!(
            "Upserting {} records into namespace '{}'",
            records.len(),
            namespace
        );

        let request = UpsertRequest {
            vectors: records,
            namespace,
        };
        self.post("/vectors/upsert", &request)
            .map_err(|e| store_error(&e))?;

        Ok(())
    }

    #[inline]
    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
        include_metadata: bool,
    ) -> Result<Vec<ScoredMatch>> {
        debug!("Querying namespace '{}' for top {}", namespace, top_k);

        let request = QueryRequest {
            vector,
            top_k,
            namespace,
            include_metadata,
        };
        let response_text = self.post("/query", &request).map_err(|e| store_error(&e))?;

        let response: QueryResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::Store(format!("Failed to parse query response: {e}")))?;

        debug!("Query returned {} matches", response.matches.len());
        Ok(response.matches)
    }
}
