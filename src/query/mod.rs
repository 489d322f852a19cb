#[cfg(test)]
mod tests;

use tracing::{debug, info};

use crate::Result;
use crate::backend::{Embedder, Generator, VectorIndex};

/// Answer returned when the similarity search finds nothing. A miss is a
/// valid outcome for the caller, not a failure.
pub const NO_MATCH_ANSWER: &str = "No relevant answer found.";

const SYSTEM_PROMPT: &str = "Answer the user's question concisely, in a few sentences at most, \
     using only the provided context. If the context does not contain the \
     answer, say so.";

/// The three-step query pipeline: embed the question, retrieve similar
/// chunks from one namespace, and ask the chat model to compose an answer
/// from them.
///
/// Providers are injected so tests can substitute doubles, and the namespace
/// is fixed at construction time.
pub struct QueryService {
    embedder: Box<dyn Embedder>,
    index: Box<dyn VectorIndex>,
    generator: Box<dyn Generator>,
    namespace: String,
    top_k: usize,
}

impl QueryService {
    #[inline]
    pub fn new(
        embedder: Box<dyn Embedder>,
        index: Box<dyn VectorIndex>,
        generator: Box<dyn Generator>,
        namespace: String,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            generator,
            namespace,
            top_k,
        }
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Answer a natural-language question. Any step failure propagates to
    /// the caller; only an empty search result short-circuits, with the
    /// fixed no-match answer.
    #[inline]
    pub fn answer(&self, question: &str) -> Result<String> {
        debug!("Answering question in namespace '{}'", self.namespace);

        let embedding = self.embedder.embed(question)?;

        let matches = self
            .index
            .query(&embedding, self.top_k, &self.namespace, true)?;

        if matches.is_empty() {
            info!("No matches in namespace '{}'", self.namespace);
            return Ok(NO_MATCH_ANSWER.to_string());
        }

        // matches arrive in descending similarity order; keep that order in
        // the context so the most relevant text comes first
        let context = matches
            .iter()
            .filter_map(|m| m.metadata.as_ref())
            .map(|metadata| metadata.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let user_message = format!("Question: {question}\nContext:\n{context}");
        let answer = self.generator.generate(SYSTEM_PROMPT, &user_message)?;

        Ok(answer.trim().to_string())
    }
}
