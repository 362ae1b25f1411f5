// Detection handlers.
//
// POST /api/detect/database: submitted text vs every stored document (auth)
// POST /api/detect/direct: two submitted texts vs each other (public)
//
// Scoring is synchronous CPU work over the whole corpus, so it runs on the
// blocking pool. A failure there fails only this request.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use tracing::{error, info};

use crate::similarity::detection::{compare_texts, detect_against_corpus};
use crate::web::{api_error, AppState, AuthUser};

#[derive(Deserialize)]
pub struct DatabaseDetectionRequest {
    text: String,
}

#[derive(Deserialize)]
pub struct DirectComparisonRequest {
    text1: String,
    text2: String,
}

/// POST /api/detect/database: check a text against the stored corpus.
pub async fn database_detection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<DatabaseDetectionRequest>,
) -> Response {
    let corpus = match state.db.list_document_texts().await {
        Ok(texts) => texts,
        Err(e) => {
            error!(error = %e, "DB error loading documents");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };

    let text = body.text;
    let report =
        match tokio::task::spawn_blocking(move || detect_against_corpus(&text, &corpus)).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                error!(error = %e, "Similarity scoring failed");
                return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Similarity scoring failed");
            }
            Err(e) => {
                error!(error = %e, "Similarity scoring task panicked");
                return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Similarity scoring failed");
            }
        };

    info!(
        user_id = user.user_id,
        username = %user.username,
        documents = report.matches.len(),
        best_score = report.best_match().map(|m| m.score).unwrap_or(0.0),
        "Database detection complete"
    );

    Json(serde_json::json!({
        "detection_type": "database",
        "results": report.matches,
        "similarity_scores": report.scores(),
        "top_common_terms": report.top_common_terms,
    }))
    .into_response()
}

/// POST /api/detect/direct: compare two texts.
pub async fn direct_comparison(Json(body): Json<DirectComparisonRequest>) -> Response {
    let DirectComparisonRequest { text1, text2 } = body;
    let report = match tokio::task::spawn_blocking(move || compare_texts(&text1, &text2)).await {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            error!(error = %e, "Similarity scoring failed");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Similarity scoring failed");
        }
        Err(e) => {
            error!(error = %e, "Similarity scoring task panicked");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Similarity scoring failed");
        }
    };

    Json(serde_json::json!({
        "detection_type": "direct",
        "similarity_score": report.similarity,
        "similarity_percent": report.similarity_percent(),
        "top_common_terms": report.top_common_terms,
    }))
    .into_response()
}
