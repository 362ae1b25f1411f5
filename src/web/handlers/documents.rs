// Reference corpus handlers.
//
// POST /api/documents: add a text to the corpus
// GET  /api/documents: list stored documents with a short preview
//
// A failed insert is rolled back by the store and reported as a 500; the
// server keeps serving.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use tracing::{error, info};

use crate::output::preview;
use crate::web::{api_error, AppState, AuthUser};

const PREVIEW_CHARS: usize = 80;

#[derive(Deserialize)]
pub struct AddDocumentRequest {
    text: String,
}

/// POST /api/documents: store a new reference document.
pub async fn add_document(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AddDocumentRequest>,
) -> Response {
    match state
        .db
        .store_document_text(&body.text, Some(user.user_id))
        .await
    {
        Ok(id) => {
            info!(
                document_id = id,
                user_id = user.user_id,
                username = %user.username,
                "Document added"
            );
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "id": id,
                    "message": "Content added to the database successfully.",
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, user_id = user.user_id, "Failed to add document");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to add document")
        }
    }
}

/// GET /api/documents: list stored documents.
pub async fn list_documents(State(state): State<AppState>) -> Response {
    match state.db.list_documents().await {
        Ok(documents) => {
            let items: Vec<serde_json::Value> = documents
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "id": d.id,
                        "preview": preview(&d.text, PREVIEW_CHARS),
                        "submitted_by": d.submitted_by,
                        "created_at": d.created_at,
                    })
                })
                .collect();
            Json(serde_json::json!({
                "documents": items,
                "total": documents.len(),
            }))
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "DB error listing documents");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}
