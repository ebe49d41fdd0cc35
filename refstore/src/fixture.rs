// Scratch Zotero databases for tests. Only the tables the queries touch.

use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

pub(crate) struct FixtureDb {
    _dir: TempDir,
    pub path: PathBuf,
}

impl FixtureDb {
    /// Create an empty library database in a temp directory.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zotero.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "
            CREATE TABLE itemTypes (
                itemTypeID INTEGER PRIMARY KEY AUTOINCREMENT,
                typeName TEXT NOT NULL UNIQUE
            );
            CREATE TABLE items (
                itemID INTEGER PRIMARY KEY,
                itemTypeID INTEGER NOT NULL,
                key TEXT NOT NULL UNIQUE
            );
            CREATE TABLE fields (
                fieldID INTEGER PRIMARY KEY AUTOINCREMENT,
                fieldName TEXT NOT NULL UNIQUE
            );
            CREATE TABLE itemDataValues (
                valueID INTEGER PRIMARY KEY AUTOINCREMENT,
                value TEXT
            );
            CREATE TABLE itemData (
                itemID INTEGER NOT NULL,
                fieldID INTEGER NOT NULL,
                valueID INTEGER NOT NULL
            );
            CREATE TABLE deletedItems (
                itemID INTEGER PRIMARY KEY
            );
            CREATE TABLE creators (
                creatorID INTEGER PRIMARY KEY AUTOINCREMENT,
                firstName TEXT,
                lastName TEXT
            );
            CREATE TABLE itemCreators (
                itemID INTEGER NOT NULL,
                creatorID INTEGER NOT NULL,
                orderIndex INTEGER NOT NULL
            );
            CREATE TABLE itemAttachments (
                itemID INTEGER PRIMARY KEY,
                parentItemID INTEGER,
                path TEXT
            );
            ",
        )
        .unwrap();

        FixtureDb { _dir: dir, path }
    }

    /// A writable connection, playing the role of the external Zotero
    /// process mutating the library.
    pub fn writer(&self) -> Connection {
        Connection::open(&self.path).unwrap()
    }
}

pub(crate) fn insert_item(conn: &Connection, item_id: i64, key: &str, type_name: &str) {
    conn.execute(
        "INSERT OR IGNORE INTO itemTypes (typeName) VALUES (?1)",
        params![type_name],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO items (itemID, itemTypeID, key)
         VALUES (?1, (SELECT itemTypeID FROM itemTypes WHERE typeName = ?2), ?3)",
        params![item_id, type_name, key],
    )
    .unwrap();
}

pub(crate) fn set_field(conn: &Connection, item_id: i64, field_name: &str, value: &str) {
    conn.execute(
        "INSERT OR IGNORE INTO fields (fieldName) VALUES (?1)",
        params![field_name],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO itemDataValues (value) VALUES (?1)",
        params![value],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO itemData (itemID, fieldID, valueID)
         VALUES (?1, (SELECT fieldID FROM fields WHERE fieldName = ?2), last_insert_rowid())",
        params![item_id, field_name],
    )
    .unwrap();
}

pub(crate) fn add_creator(
    conn: &Connection,
    item_id: i64,
    order_index: i64,
    last_name: &str,
    first_name: &str,
) {
    conn.execute(
        "INSERT INTO creators (firstName, lastName) VALUES (?1, ?2)",
        params![first_name, last_name],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO itemCreators (itemID, creatorID, orderIndex)
         VALUES (?1, last_insert_rowid(), ?2)",
        params![item_id, order_index],
    )
    .unwrap();
}

pub(crate) fn add_attachment(
    conn: &Connection,
    attachment_id: i64,
    parent_id: i64,
    key: &str,
    path: &str,
) {
    insert_item(conn, attachment_id, key, "attachment");
    conn.execute(
        "INSERT INTO itemAttachments (itemID, parentItemID, path) VALUES (?1, ?2, ?3)",
        params![attachment_id, parent_id, path],
    )
    .unwrap();
}

pub(crate) fn mark_deleted(conn: &Connection, item_id: i64) {
    conn.execute(
        "INSERT INTO deletedItems (itemID) VALUES (?1)",
        params![item_id],
    )
    .unwrap();
}
