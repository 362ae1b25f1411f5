// Database queries: CRUD operations for all tables.
//
// Every SQL statement lives here; the rest of the app goes through the
// Database trait or these free functions.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{Document, User};

// --- Documents ---

/// Store a document inside a transaction.
///
/// If the insert fails the transaction is dropped without commit, which
/// rolls it back, so no partial row is left behind.
pub fn store_document_text(
    conn: &mut Connection,
    text: &str,
    submitted_by: Option<i64>,
) -> Result<i64> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO documents (text, submitted_by) VALUES (?1, ?2)",
        params![text, submitted_by],
    )
    .context("Failed to insert document")?;
    let id = tx.last_insert_rowid();
    tx.commit().context("Failed to commit document")?;
    Ok(id)
}

/// All document texts, oldest first.
pub fn list_document_texts(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT text FROM documents ORDER BY id")?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut texts = Vec::new();
    for row in rows {
        texts.push(row?);
    }
    Ok(texts)
}

/// All documents with metadata, oldest first.
pub fn list_documents(conn: &Connection) -> Result<Vec<Document>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, submitted_by, created_at FROM documents ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Document {
            id: row.get(0)?,
            text: row.get(1)?,
            submitted_by: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?;

    let mut documents = Vec::new();
    for row in rows {
        documents.push(row?);
    }
    Ok(documents)
}

pub fn document_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
    Ok(count)
}

// --- Users ---

/// Create a user. Returns `None` if the username is already taken.
pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> Result<Option<i64>> {
    let inserted = conn.execute(
        "INSERT INTO users (username, password_hash) VALUES (?1, ?2)
         ON CONFLICT(username) DO NOTHING",
        params![username, password_hash],
    )?;
    if inserted == 0 {
        return Ok(None);
    }
    Ok(Some(conn.last_insert_rowid()))
}

pub fn find_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
    )?;
    let user = stmt.query_row(params![username], user_from_row).optional()?;
    Ok(user)
}

pub fn find_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    let mut stmt =
        conn.prepare("SELECT id, username, password_hash, created_at FROM users WHERE id = ?1")?;
    let user = stmt.query_row(params![id], user_from_row).optional()?;
    Ok(user)
}

pub fn user_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}
