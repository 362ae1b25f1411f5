// Database trait: backend-agnostic async interface for all DB operations.
//
// The similarity code never touches this; request handlers and the CLI
// load texts through it, hand them to the pure scoring functions, and store
// new documents through it. Async so the connection lock can be awaited
// from axum handlers without blocking the runtime.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{Document, User};

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Documents ---

    /// Store a document text and return its ID. Rolled back on failure.
    async fn store_document_text(&self, text: &str, submitted_by: Option<i64>) -> Result<i64>;

    /// Every stored document text, oldest first.
    async fn list_document_texts(&self) -> Result<Vec<String>>;

    /// Every stored document with metadata, oldest first.
    async fn list_documents(&self) -> Result<Vec<Document>>;

    async fn document_count(&self) -> Result<i64>;

    // --- Users ---

    /// Create a user. Returns `None` if the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn user_count(&self) -> Result<i64>;
}
