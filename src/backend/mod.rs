mod http;
pub mod openai;
pub mod pinecone;

use serde::{Deserialize, Serialize};

use crate::Result;

pub use openai::OpenAiClient;
pub use pinecone::PineconeClient;

/// Metadata stored alongside every vector so retrieved matches carry enough
/// text to build the generation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Path of the source file
    pub source: String,
    /// The chunk's raw text
    pub text: String,
}

/// One (id, vector, metadata) triple persisted in the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// A similarity-search hit, already normalized to a single shape at the
/// client boundary regardless of what the store returned.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<ChunkMetadata>,
}

/// Turns a text into its embedding vector.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Upserts and queries vector records within a namespace.
pub trait VectorIndex: Send + Sync {
    fn upsert(&self, records: &[VectorRecord], namespace: &str) -> Result<()>;

    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
        include_metadata: bool,
    ) -> Result<Vec<ScoredMatch>>;
}

/// Produces a natural-language answer from a system instruction and a user
/// message.
pub trait Generator: Send + Sync {
    fn generate(&self, system: &str, user: &str) -> Result<String>;
}
