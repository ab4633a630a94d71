/// Schema for the local tag catalog.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
pub const INITIAL_SCHEMA: &str = r#"
-- Tags table: titles are not unique, mirroring host catalogs
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    created_at INTEGER
);

-- Documents known to the local host
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL DEFAULT '',
    updated_at INTEGER
);

-- Junction table: the composite key makes linking idempotent
CREATE TABLE IF NOT EXISTS document_tags (
    document_id TEXT NOT NULL,
    tag_id INTEGER NOT NULL,
    created_at INTEGER,
    PRIMARY KEY (document_id, tag_id),
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_tags_title ON tags(title COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_document_tags_tag ON document_tags(tag_id);
"#;
