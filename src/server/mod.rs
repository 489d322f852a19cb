//! Web front end: serves the landing page and exposes the query service
//! over HTTP.
//!
//! Endpoints:
//!   GET  /       → landing page HTML
//!   POST /query  → `{"query": string}` in, `{"answer": string}` out

#[cfg(test)]
mod tests;

mod html;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::Result;
use crate::query::QueryService;
use html::INDEX_HTML;

type AppState = Arc<QueryService>;

#[derive(Debug, Deserialize)]
struct QueryBody {
    query: String,
}

#[derive(Debug, Serialize)]
struct AnswerBody {
    answer: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Build the application router around a query service whose namespace was
/// fixed at startup.
#[inline]
pub fn router(service: Arc<QueryService>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/query", post(handle_query))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Serve the front end until the process is stopped.
#[inline]
pub async fn serve(service: Arc<QueryService>, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(
        "Serving namespace '{}' on http://{}",
        service.namespace(),
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(service)).await?;
    Ok(())
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn handle_query(
    State(service): State<AppState>,
    Json(body): Json<QueryBody>,
) -> impl IntoResponse {
    // the pipeline is blocking network I/O end to end
    let result = tokio::task::spawn_blocking(move || service.answer(&body.query)).await;

    match result {
        Ok(Ok(answer)) => (StatusCode::OK, Json(AnswerBody { answer })).into_response(),
        Ok(Err(e)) => {
            error!("Query pipeline failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Query task panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "internal error".to_string(),
                }),
            )
                .into_response()
        }
    }
}
