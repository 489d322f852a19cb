use super::*;
use crate::RagError;
use crate::backend::{ChunkMetadata, ScoredMatch, VectorRecord};
use std::sync::{Arc, Mutex};

struct FixedEmbedder {
    vector: Vec<f32>,
}

impl Embedder for FixedEmbedder {
    fn embed(&self, _text: &str) -> crate::Result<Vec<f32>> {
        Ok(self.vector.clone())
    }
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> crate::Result<Vec<f32>> {
        Err(RagError::Embedding("stub failure".to_string()))
    }
}

type SeenQuery = Arc<Mutex<Option<(Vec<f32>, usize, String, bool)>>>;

struct FixedIndex {
    matches: Vec<ScoredMatch>,
    seen_query: SeenQuery,
}

impl FixedIndex {
    fn with_matches(matches: Vec<ScoredMatch>) -> (Self, SeenQuery) {
        let seen = SeenQuery::default();
        (
            Self {
                matches,
                seen_query: Arc::clone(&seen),
            },
            seen,
        )
    }
}

impl VectorIndex for FixedIndex {
    fn upsert(&self, _records: &[VectorRecord], _namespace: &str) -> crate::Result<()> {
        Ok(())
    }

    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
        include_metadata: bool,
    ) -> crate::Result<Vec<ScoredMatch>> {
        *self.seen_query.lock().expect("lock is never poisoned") = Some((
            vector.to_vec(),
            top_k,
            namespace.to_string(),
            include_metadata,
        ));
        Ok(self.matches.clone())
    }
}

struct FailingIndex;

impl VectorIndex for FailingIndex {
    fn upsert(&self, _records: &[VectorRecord], _namespace: &str) -> crate::Result<()> {
        Ok(())
    }

    fn query(
        &self,
        _vector: &[f32],
        _top_k: usize,
        _namespace: &str,
        _include_metadata: bool,
    ) -> crate::Result<Vec<ScoredMatch>> {
        Err(RagError::Store("stub failure".to_string()))
    }
}

type SeenPrompt = Arc<Mutex<Option<(String, String)>>>;

/// Records the prompt it was called with and echoes a fixed answer.
struct RecordingGenerator {
    seen: SeenPrompt,
}

impl RecordingGenerator {
    fn new() -> (Self, SeenPrompt) {
        let seen = SeenPrompt::default();
        (
            Self {
                seen: Arc::clone(&seen),
            },
            seen,
        )
    }
}

impl Generator for RecordingGenerator {
    fn generate(&self, system: &str, user: &str) -> crate::Result<String> {
        *self.seen.lock().expect("lock is never poisoned") =
            Some((system.to_string(), user.to_string()));
        Ok("  the answer  ".to_string())
    }
}

fn scored(id: &str, score: f32, text: &str) -> ScoredMatch {
    ScoredMatch {
        id: id.to_string(),
        score,
        metadata: Some(ChunkMetadata {
            source: format!("/docs/{id}.txt"),
            text: text.to_string(),
        }),
    }
}

#[test]
fn context_joins_match_texts_in_order() {
    let (generator, prompt) = RecordingGenerator::new();
    let (index, _) = FixedIndex::with_matches(vec![
        scored("a", 0.95, "first chunk"),
        scored("b", 0.80, "second chunk"),
        scored("c", 0.60, "third chunk"),
    ]);
    let service = QueryService::new(
        Box::new(FixedEmbedder {
            vector: vec![0.1, 0.9],
        }),
        Box::new(index),
        Box::new(generator),
        "specs".to_string(),
        3,
    );

    let answer = service.answer("what is this?").expect("answer succeeds");
    assert_eq!(answer, "the answer");

    let seen = prompt.lock().expect("lock is never poisoned").clone();
    let (_system, user) = seen.expect("generator was called");
    assert!(user.contains("Question: what is this?"));
    assert!(user.contains("first chunk\n\nsecond chunk\n\nthird chunk"));
}

#[test]
fn no_matches_returns_fixed_answer() {
    let (generator, prompt) = RecordingGenerator::new();
    let (index, _) = FixedIndex::with_matches(Vec::new());
    let service = QueryService::new(
        Box::new(FixedEmbedder { vector: vec![0.5] }),
        Box::new(index),
        Box::new(generator),
        "specs".to_string(),
        3,
    );

    let answer = service.answer("anything?").expect("answer succeeds");
    assert_eq!(answer, NO_MATCH_ANSWER);
    assert!(
        prompt.lock().expect("lock is never poisoned").is_none(),
        "generator must not be called on a miss"
    );
}

#[test]
fn query_uses_namespace_and_top_k_with_metadata() {
    let (generator, _) = RecordingGenerator::new();
    let (index, seen_query) = FixedIndex::with_matches(vec![scored("a", 0.9, "text")]);
    let service = QueryService::new(
        Box::new(FixedEmbedder {
            vector: vec![1.0, 2.0],
        }),
        Box::new(index),
        Box::new(generator),
        "my-namespace".to_string(),
        7,
    );

    service.answer("q").expect("answer succeeds");

    let seen = seen_query.lock().expect("lock is never poisoned").clone();
    let (vector, top_k, namespace, include_metadata) = seen.expect("index was queried");
    assert_eq!(vector, vec![1.0, 2.0]);
    assert_eq!(top_k, 7);
    assert_eq!(namespace, "my-namespace");
    assert!(include_metadata);
}

#[test]
fn embedding_failure_propagates() {
    let (generator, _) = RecordingGenerator::new();
    let (index, _) = FixedIndex::with_matches(Vec::new());
    let service = QueryService::new(
        Box::new(FailingEmbedder),
        Box::new(index),
        Box::new(generator),
        "specs".to_string(),
        3,
    );

    assert!(matches!(
        service.answer("q"),
        Err(RagError::Embedding(_))
    ));
}

#[test]
fn store_failure_propagates() {
    let (generator, _) = RecordingGenerator::new();
    let service = QueryService::new(
        Box::new(FixedEmbedder { vector: vec![0.5] }),
        Box::new(FailingIndex),
        Box::new(generator),
        "specs".to_string(),
        3,
    );

    assert!(matches!(service.answer("q"), Err(RagError::Store(_))));
}

#[test]
fn generation_failure_propagates() {
    struct FailingGenerator;
    impl Generator for FailingGenerator {
        fn generate(&self, _system: &str, _user: &str) -> crate::Result<String> {
            Err(RagError::Generation("stub failure".to_string()))
        }
    }

    let (index, _) = FixedIndex::with_matches(vec![scored("a", 0.9, "text")]);
    let service = QueryService::new(
        Box::new(FixedEmbedder { vector: vec![0.5] }),
        Box::new(index),
        Box::new(FailingGenerator),
        "specs".to_string(),
        3,
    );

    assert!(matches!(
        service.answer("q"),
        Err(RagError::Generation(_))
    ));
}
