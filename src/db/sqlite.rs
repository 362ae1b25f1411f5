// SqliteDatabase: rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across an .await on anything else.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{Document, User};
use super::traits::Database;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn store_document_text(&self, text: &str, submitted_by: Option<i64>) -> Result<i64> {
        let mut conn = self.conn.lock().await;
        super::queries::store_document_text(&mut conn, text, submitted_by)
    }

    async fn list_document_texts(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().await;
        super::queries::list_document_texts(&conn)
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let conn = self.conn.lock().await;
        super::queries::list_documents(&conn)
    }

    async fn document_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::document_count(&conn)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock().await;
        super::queries::create_user(&conn, username, password_hash)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().await;
        super::queries::find_user_by_username(&conn, username)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn.lock().await;
        super::queries::find_user_by_id(&conn, id)
    }

    async fn user_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::user_count(&conn)
    }
}
