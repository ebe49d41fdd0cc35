use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RefstoreError {
    /// An export was requested for an item type outside the citation table.
    /// Reported per record; batch callers keep going.
    #[error("no citation mapping for item type '{item_type}'")]
    UnsupportedType { item_type: String },

    /// The source database could not be opened or read (missing file,
    /// busy timeout exceeded). Fatal to the current load or poll.
    #[error("source database unavailable: {0}")]
    SourceUnavailable(#[from] rusqlite::Error),

    /// A resolved attachment path does not exist on disk.
    #[error("attachment not found: {}", .path.display())]
    AttachmentNotFound { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, RefstoreError>;
