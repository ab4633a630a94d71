mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use time::OffsetDateTime;

use crate::catalog::TagCatalog;
use crate::models::{Document, DocumentId, TagId, TagRecord};

use schema::INITIAL_SCHEMA;

/// SQLite-backed tag catalog and document store.
///
/// The connection sits behind a mutex so the database can be shared with
/// async tasks. No lock is held across an `.await`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    /// Opens a file-based SQLite database at the given path.
    ///
    /// Creates the database file if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open catalog at {}", path.display()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        conn.execute_batch(INITIAL_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Locks and returns the underlying connection.
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("catalog connection lock poisoned"))
    }

    /// Inserts a document or replaces its title and body.
    pub fn upsert_document(&self, document: &Document) -> Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.connection()?.execute(
            "INSERT INTO documents (id, title, body, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, body = excluded.body,
             updated_at = excluded.updated_at",
            (
                document.id.as_str(),
                &document.title,
                &document.content,
                now,
            ),
        )?;
        Ok(())
    }

    /// Loads a document with the titles of its linked tags.
    pub fn get_document(&self, id: &DocumentId) -> Result<Option<Document>> {
        let found = self
            .connection()?
            .query_row(
                "SELECT title, body FROM documents WHERE id = ?1",
                [id.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((title, body)) = found else {
            return Ok(None);
        };

        let tags = self
            .tags_for_document(id)?
            .into_iter()
            .map(|t| t.title().to_string())
            .collect();
        Ok(Some(Document::new(id.clone(), title, body).with_tags(tags)))
    }

    /// Returns every tag in the catalog ordered by id.
    pub fn list_tags(&self) -> Result<Vec<TagRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT id, title FROM tags ORDER BY id")?;
        let tags = stmt
            .query_map([], |row| {
                Ok(TagRecord::new(TagId::new(row.get(0)?), row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    fn tags_for_document(&self, id: &DocumentId) -> Result<Vec<TagRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.title FROM tags t
             JOIN document_tags dt ON dt.tag_id = t.id
             WHERE dt.document_id = ?1
             ORDER BY dt.created_at, t.id",
        )?;
        let tags = stmt
            .query_map([id.as_str()], |row| {
                Ok(TagRecord::new(TagId::new(row.get(0)?), row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }
}

#[async_trait]
impl TagCatalog for Database {
    async fn find_by_title_query(&self, query: &str) -> Result<Vec<TagRecord>> {
        // SQLite's lower() only folds ASCII, so match in Rust.
        let needle = query.to_lowercase();
        Ok(self
            .list_tags()?
            .into_iter()
            .filter(|t| t.title().to_lowercase().contains(&needle))
            .collect())
    }

    async fn create_tag(&self, title: &str) -> Result<TagRecord> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO tags (title, created_at) VALUES (?1, ?2)",
            (title, now),
        )
        .with_context(|| format!("Failed to create tag '{title}'"))?;

        Ok(TagRecord::new(TagId::new(conn.last_insert_rowid()), title))
    }

    async fn link_tag_to_document(&self, tag_id: TagId, document_id: &DocumentId) -> Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.connection()?
            .execute(
                "INSERT OR IGNORE INTO document_tags (document_id, tag_id, created_at)
                 VALUES (?1, ?2, ?3)",
                (document_id.as_str(), tag_id.get(), now),
            )
            .with_context(|| format!("Failed to link tag {tag_id} to document {document_id}"))?;
        Ok(())
    }

    async fn document_tags(&self, document_id: &DocumentId) -> Result<Vec<TagRecord>> {
        self.tags_for_document(document_id)
    }
}
