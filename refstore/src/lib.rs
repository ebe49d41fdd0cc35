pub mod source;
pub mod aggregate;
pub mod resolve;
pub mod record;
pub mod export;
pub mod watch;
pub mod search;
pub mod library;
pub mod error;

#[cfg(test)]
pub(crate) mod fixture;

pub use error::{RefstoreError, Result};
pub use export::CitationEntry;
pub use library::{Library, LibraryConfig};
pub use record::{Attachment, Author, Record};
pub use search::{SearchIndex, SortOrder};
