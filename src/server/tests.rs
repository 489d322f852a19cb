use super::*;
use crate::RagError;
use crate::backend::{ChunkMetadata, Embedder, Generator, ScoredMatch, VectorIndex, VectorRecord};
use axum::body::Body;
use axum::http::{Request, header};
use serde_json::{Value, json};
use tower::util::ServiceExt;

struct StubEmbedder;

impl Embedder for StubEmbedder {
    fn embed(&self, _text: &str) -> crate::Result<Vec<f32>> {
        Ok(vec![0.1, 0.2])
    }
}

struct StubIndex {
    matches: Vec<ScoredMatch>,
}

impl VectorIndex for StubIndex {
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
        Ok(self.matches.clone())
    }
}

struct StubGenerator;

impl Generator for StubGenerator {
    fn generate(&self, _system: &str, _user: &str) -> crate::Result<String> {
        Ok("a generated answer".to_string())
    }
}

struct FailingGenerator;

impl Generator for FailingGenerator {
    fn generate(&self, _system: &str, _user: &str) -> crate::Result<String> {
        Err(RagError::Generation("model unavailable".to_string()))
    }
}

fn test_router(matches: Vec<ScoredMatch>, generator: Box<dyn Generator>) -> Router {
    let service = QueryService::new(
        Box::new(StubEmbedder),
        Box::new(StubIndex { matches }),
        generator,
        "specs".to_string(),
        3,
    );
    router(Arc::new(service))
}

fn one_match() -> Vec<ScoredMatch> {
    vec![ScoredMatch {
        id: "doc.txt-chunk-1".to_string(),
        score: 0.9,
        metadata: Some(ChunkMetadata {
            source: "/docs/doc.txt".to_string(),
            text: "relevant text".to_string(),
        }),
    }]
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("can read body");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
async fn root_serves_html_page() {
    let app = test_router(one_match(), Box::new(StubGenerator));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .body(Body::empty())
                .expect("can build request"),
        )
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("can read body");
    let page = String::from_utf8_lossy(&bytes);
    assert!(page.contains("<!DOCTYPE html>"));
    assert!(page.contains("/query"));
}

#[tokio::test]
async fn query_returns_answer_json() {
    let app = test_router(one_match(), Box::new(StubGenerator));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/query")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "query": "what is this?" }).to_string(),
                ))
                .expect("can build request"),
        )
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "answer": "a generated answer" })
    );
}

#[tokio::test]
async fn query_with_no_matches_returns_fixed_answer() {
    let app = test_router(Vec::new(), Box::new(StubGenerator));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/query")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "query": "anything" }).to_string()))
                .expect("can build request"),
        )
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "answer": crate::query::NO_MATCH_ANSWER })
    );
}

#[tokio::test]
async fn pipeline_failure_returns_json_error() {
    let app = test_router(one_match(), Box::new(FailingGenerator));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/query")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "query": "boom" }).to_string()))
                .expect("can build request"),
        )
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(
        body["error"]
            .as_str()
            .expect("error field present")
            .contains("model unavailable")
    );
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let app = test_router(one_match(), Box::new(StubGenerator));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/query")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .expect("can build request"),
        )
        .await
        .expect("request succeeds");

    assert!(response.status().is_client_error());
}
