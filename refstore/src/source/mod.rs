use crate::error::Result;
use crate::record::{Attachment, Author};
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// How long a read blocks on a momentarily exclusive external writer
/// before failing.
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open a read-only connection to the Zotero database.
///
/// `nolock=1` asks SQLite not to take any lock at all: the owning Zotero
/// process may be running, and a shared lock from us could block it.
pub(crate) fn open_readonly(path: &Path) -> Result<Connection> {
    let uri = format!("file:{}?mode=ro&nolock=1", path.display());
    let conn = Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// One populated attribute of one entity, decoded at the SQL boundary.
/// Entities are sparse: an absent field simply has no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttributeRow {
    pub entity_id: i64,
    pub entity_key: String,
    pub entity_type: String,
    pub field_name: String,
    pub value: String,
}

/// Read-only tabular access to the Zotero store, used for bulk record loads.
/// Change polling uses its own connection (see `watch`) so the two never
/// contend.
pub struct RowSource {
    conn: Connection,
}

impl RowSource {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(RowSource {
            conn: open_readonly(path)?,
        })
    }

    /// All populated attributes of live bibliographic items, in item order.
    ///
    /// Soft-deleted items and non-bibliographic item types (attachments,
    /// freeform notes, standalone documents) are excluded here, at the
    /// query level — rows for them never reach aggregation.
    pub fn attribute_rows(&self) -> Result<Vec<RawAttributeRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.itemID, i.key, it.typeName, f.fieldName, idv.value
             FROM items i
             JOIN itemTypes it ON it.itemTypeID = i.itemTypeID
             JOIN itemData id ON id.itemID = i.itemID
             JOIN fields f ON f.fieldID = id.fieldID
             JOIN itemDataValues idv ON idv.valueID = id.valueID
             WHERE i.itemID NOT IN (SELECT itemID FROM deletedItems)
               AND it.typeName NOT IN ('attachment', 'note', 'document')
             ORDER BY i.itemID",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RawAttributeRow {
                entity_id: row.get(0)?,
                entity_key: row.get(1)?,
                entity_type: row.get(2)?,
                field_name: row.get(3)?,
                value: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Authors for every live item, keyed by item id, preserving the
    /// source-provided order index. Order is author order and is
    /// semantically meaningful.
    pub fn authors_by_item(&self) -> Result<HashMap<i64, Vec<Author>>> {
        let mut stmt = self.conn.prepare(
            "SELECT ic.itemID, c.lastName, c.firstName
             FROM itemCreators ic
             JOIN creators c ON c.creatorID = ic.creatorID
             ORDER BY ic.itemID, ic.orderIndex",
        )?;
        let rows = stmt.query_map([], |row| {
            let item_id: i64 = row.get(0)?;
            // Institutional creators carry only a last name
            let last_name: Option<String> = row.get(1)?;
            let first_name: Option<String> = row.get(2)?;
            Ok((
                item_id,
                Author {
                    last_name: last_name.unwrap_or_default(),
                    first_name: first_name.unwrap_or_default(),
                },
            ))
        })?;

        let mut out: HashMap<i64, Vec<Author>> = HashMap::new();
        for row in rows {
            let (item_id, author) = row?;
            out.entry(item_id).or_default().push(author);
        }
        Ok(out)
    }

    /// File attachments grouped by their parent item id. Rows without a
    /// path (e.g. web snapshots pending download) are skipped.
    pub fn attachments_by_item(&self) -> Result<HashMap<i64, Vec<Attachment>>> {
        let mut stmt = self.conn.prepare(
            "SELECT ia.parentItemID, ia.path, i.key
             FROM itemAttachments ia
             JOIN items i ON i.itemID = ia.itemID
             WHERE ia.parentItemID IS NOT NULL
               AND ia.path IS NOT NULL
             ORDER BY ia.parentItemID",
        )?;
        let rows = stmt.query_map([], |row| {
            let parent_id: i64 = row.get(0)?;
            let path: String = row.get(1)?;
            let owner_key: String = row.get(2)?;
            let is_link = !path.starts_with("storage:");
            Ok((
                parent_id,
                Attachment {
                    path,
                    owner_key,
                    is_link,
                },
            ))
        })?;

        let mut out: HashMap<i64, Vec<Attachment>> = HashMap::new();
        for row in rows {
            let (parent_id, attachment) = row?;
            out.entry(parent_id).or_default().push(attachment);
        }
        Ok(out)
    }
}
