use crate::aggregate;
use crate::error::{RefstoreError, Result};
use crate::export::{self, CitationEntry};
use crate::record::{self, Attachment, Record};
use crate::search::{SearchIndex, SortOrder};
use crate::source::RowSource;
use crate::watch::ChangeWatcher;
use std::path::PathBuf;

/// Where the library lives: the Zotero SQLite file and the attachment
/// storage root next to it.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    pub database: PathBuf,
    pub storage_root: PathBuf,
}

/// The main entry point. Opens the source database read-only, rebuilds the
/// full record set on demand, and answers search, export, and attachment
/// queries against the current set.
pub struct Library {
    source: RowSource,
    watcher: ChangeWatcher,
    storage_root: PathBuf,
    search: SearchIndex,
}

impl Library {
    /// Open the library. Two read-only connections are created: one for
    /// bulk loads, one for change polling, so neither blocks the other.
    pub fn open(config: LibraryConfig) -> Result<Self> {
        Ok(Library {
            source: RowSource::open(&config.database)?,
            watcher: ChangeWatcher::open(&config.database)?,
            storage_root: config.storage_root,
            search: SearchIndex::new(Vec::new()),
        })
    }

    /// Rebuild the full record set from the source database, replacing
    /// whatever was loaded before. Records come back ordered by entity id.
    ///
    /// The three reads (attributes, authors, attachments) share no
    /// transaction snapshot; a concurrent external mutation mid-load can
    /// produce a slightly stale set, which the next poll-triggered reload
    /// repairs.
    pub fn load(&mut self) -> Result<Vec<Record>> {
        let rows = self.source.attribute_rows()?;
        let mut authors = self.source.authors_by_item()?;
        let mut attachments = self.source.attachments_by_item()?;

        let ignored = aggregate::default_ignored();
        let mut records = Vec::new();
        for (entity, fields) in aggregate::aggregate(rows, &ignored) {
            let id = entity.id;
            records.push(record::build_record(
                entity,
                &fields,
                authors.remove(&id).unwrap_or_default(),
                attachments.remove(&id).unwrap_or_default(),
            ));
        }

        log::debug!("loaded {} records", records.len());
        self.search.set_records(records.clone());
        Ok(records)
    }

    /// True when the source database changed since the last poll and the
    /// record set should be reloaded.
    pub fn poll(&mut self) -> Result<bool> {
        self.watcher.poll()
    }

    /// Filter the currently loaded records. See [`SearchIndex::filter`].
    pub fn filter(&mut self, query: &str) -> Vec<Record> {
        self.search.filter(query)
    }

    /// Advance the sort cycle. See [`SearchIndex::advance_sort`].
    pub fn advance_sort(&mut self) -> SortOrder {
        self.search.advance_sort()
    }

    /// Export one record as a citation entry. Fails per record with
    /// UnsupportedType; a batch caller reports that and keeps going.
    pub fn export(&self, record: &Record) -> Result<CitationEntry> {
        export::export(record)
    }

    /// Resolve an attachment to an absolute path and verify it exists.
    /// The caller hands the path to an external opener; nothing is opened
    /// here.
    pub fn resolve_attachment(&self, attachment: &Attachment) -> Result<PathBuf> {
        let path = attachment.absolute_path(&self.storage_root);
        if path.exists() {
            Ok(path)
        } else {
            Err(RefstoreError::AttachmentNotFound { path })
        }
    }
}
