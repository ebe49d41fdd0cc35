use crate::error::Result;
use crate::source;
use rusqlite::Connection;
use std::path::Path;

/// Detects out-of-band mutation of the source database.
///
/// Keeps its own read-only connection, separate from the bulk-read one, so
/// polling never contends with a record load. The observed value is
/// SQLite's `data_version` counter, which moves whenever another connection
/// commits a change to the file.
pub struct ChangeWatcher {
    conn: Connection,
    last_version: Option<i64>,
}

impl ChangeWatcher {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(ChangeWatcher {
            conn: source::open_readonly(db_path)?,
            last_version: None,
        })
    }

    /// Report whether the database changed since the previous poll.
    ///
    /// The first call only establishes the baseline and reports no change
    /// regardless of the counter's current value. Each later call reports a
    /// change at most once per observed counter movement. O(1); the caller
    /// runs the full reload on `true`.
    pub fn poll(&mut self) -> Result<bool> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))?;
        let changed = match self.last_version {
            None => false,
            Some(previous) => previous != version,
        };
        self.last_version = Some(version);
        Ok(changed)
    }
}
