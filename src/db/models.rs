// Data models: Rust structs that map to database rows.
//
// Kept apart from the queries so the web layer and CLI can use them without
// depending on rusqlite directly.

use serde::Serialize;

/// A stored reference document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: i64,
    pub text: String,
    /// The user who added it (None when added from the CLI)
    pub submitted_by: Option<i64>,
    pub created_at: String,
}

/// A registered account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}
