//! SQLite schema for forms, fields, records, content, owners and tags.

use sqlx::SqlitePool;

use crate::Result;

/// Statements run in order by [`ensure_schema`]; each is idempotent.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS datafos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        approval INTEGER NOT NULL DEFAULT 0,
        listtemplate TEXT NOT NULL DEFAULT '',
        singletemplate TEXT NOT NULL DEFAULT '',
        asearchtemplate TEXT NOT NULL DEFAULT '',
        addtemplate TEXT NOT NULL DEFAULT '',
        rsstemplate TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS datafos_fields (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dataid INTEGER NOT NULL,
        type TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        required INTEGER NOT NULL DEFAULT 0,
        param1 TEXT,
        param2 TEXT,
        param3 TEXT,
        param4 TEXT,
        param5 TEXT,
        param6 TEXT,
        param7 TEXT,
        param8 TEXT,
        param9 TEXT,
        param10 TEXT
    )",
    "CREATE INDEX IF NOT EXISTS datafos_fields_dataid_idx ON datafos_fields (dataid)",
    "CREATE TABLE IF NOT EXISTS datafos_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dataid INTEGER NOT NULL,
        userid INTEGER NOT NULL,
        groupid INTEGER NOT NULL DEFAULT 0,
        approved INTEGER NOT NULL DEFAULT 0,
        timecreated INTEGER NOT NULL,
        timemodified INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS datafos_records_dataid_idx ON datafos_records (dataid)",
    "CREATE TABLE IF NOT EXISTS datafos_content (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        fieldid INTEGER NOT NULL,
        recordid INTEGER NOT NULL,
        content TEXT,
        content1 TEXT,
        content2 TEXT,
        content3 TEXT,
        content4 TEXT,
        UNIQUE (fieldid, recordid)
    )",
    "CREATE INDEX IF NOT EXISTS datafos_content_recordid_idx ON datafos_content (recordid)",
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY,
        firstname TEXT NOT NULL DEFAULT '',
        lastname TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        rawname TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tag_instances (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tagid INTEGER NOT NULL,
        itemid INTEGER NOT NULL,
        UNIQUE (tagid, itemid)
    )",
    "CREATE INDEX IF NOT EXISTS tag_instances_itemid_idx ON tag_instances (itemid)",
];

/// Create every table and index that does not exist yet.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!(statements = SCHEMA.len(), "Schema ensured");
    Ok(())
}
