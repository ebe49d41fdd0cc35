use crate::aggregate::{EntityKey, FieldMap};
use crate::resolve;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One author, in source order. Order is author order and survives end to
/// end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub last_name: String,
    pub first_name: String,
}

impl Author {
    /// Initials of the first-name tokens plus the last name, e.g.
    /// "J. R. Tolkien". Used for compact display and search matching.
    pub fn abbreviated(&self) -> String {
        let initials: Vec<String> = self
            .first_name
            .split_whitespace()
            .filter_map(|token| token.chars().next())
            .map(|initial| format!("{initial}."))
            .collect();
        if initials.is_empty() {
            self.last_name.clone()
        } else {
            format!("{} {}", initials.join(" "), self.last_name)
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// A file attached to a record. `path` is the raw database value; stored
/// files carry a literal `storage:` prefix, links hold a verbatim
/// filesystem or external reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub path: String,
    /// Key of the attachment's own entity; stored files live in a storage
    /// subdirectory of this name.
    pub owner_key: String,
    pub is_link: bool,
}

impl Attachment {
    /// Resolve to an absolute path: `<storage_root>/<owner_key>/<name>` for
    /// stored files (prefix stripped), the raw path verbatim for links.
    pub fn absolute_path(&self, storage_root: &Path) -> PathBuf {
        if self.is_link {
            PathBuf::from(&self.path)
        } else {
            let name = self.path.strip_prefix("storage:").unwrap_or(&self.path);
            storage_root.join(&self.owner_key).join(name)
        }
    }
}

/// A fully built bibliographic record. Immutable once constructed; a reload
/// replaces the whole set rather than patching individual records.
///
/// Optional fields are either present with non-empty content or absent —
/// never an empty string. `year` is 0 when unknown, never absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: i64,
    pub key: String,
    pub item_type: String,
    pub title: String,
    pub authors: Vec<Author>,
    pub year: i32,
    pub venue: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub doi: Option<String>,
    pub publisher: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl Record {
    /// Compact author line for table display: "Unknown", "Smith",
    /// "Smith and Jones", or "Smith et al."
    pub fn author_summary(&self) -> String {
        match self.authors.as_slice() {
            [] => "Unknown".to_string(),
            [only] => only.last_name.clone(),
            [first, second] => format!("{} and {}", first.last_name, second.last_name),
            [first, ..] => format!("{} et al.", first.last_name),
        }
    }
}

/// Compose an immutable Record from one entity's aggregated state.
///
/// Never fails: a missing title becomes "Untitled", year and venue come
/// from the resolver with their documented defaults, and item types outside
/// the citation table still build (export rejects them later).
pub fn build_record(
    entity: EntityKey,
    fields: &FieldMap,
    authors: Vec<Author>,
    attachments: Vec<Attachment>,
) -> Record {
    Record {
        id: entity.id,
        key: entity.key,
        item_type: entity.entity_type,
        title: optional(fields, "title").unwrap_or_else(|| "Untitled".to_string()),
        year: resolve::resolve_year(fields),
        venue: resolve::resolve_venue(fields),
        volume: optional(fields, "volume"),
        issue: optional(fields, "issue"),
        pages: optional(fields, "pages"),
        doi: optional(fields, "DOI"),
        publisher: optional(fields, "publisher"),
        abstract_text: optional(fields, "abstractNote"),
        authors,
        attachments,
    }
}

/// Present-and-non-empty or absent; an empty string in the source is
/// treated as not provided.
fn optional(fields: &FieldMap, name: &str) -> Option<String> {
    fields.get(name).filter(|value| !value.is_empty()).cloned()
}
