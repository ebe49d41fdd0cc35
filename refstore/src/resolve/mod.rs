//! Pure derivation of venue, year, and citation type from an aggregated
//! field map. Nothing here touches the database.

use crate::aggregate::FieldMap;
use crate::error::{RefstoreError, Result};

/// Venue cascade, highest priority first. `repository` comes last and
/// carries the arXiv special case.
const VENUE_CASCADE: &[&str] = &[
    "proceedingsTitle",
    "series",
    "publicationTitle",
    "bookTitle",
    "conferenceName",
    "journalAbbreviation",
    "repository",
];

/// The closed citation-type table. Item types outside it are an
/// UnsupportedType failure at export time, never a guessed default.
const ENTRY_TYPES: &[(&str, &str)] = &[
    ("conferencePaper", "inproceedings"),
    ("journalArticle", "article"),
    ("preprint", "article"),
    ("book", "book"),
    ("bookSection", "incollection"),
];

/// Publication year: the leading four characters of the `date` field.
/// Absence, a parse failure, or a negative value all resolve to 0
/// ("unknown"). Never fails.
pub fn resolve_year(fields: &FieldMap) -> i32 {
    let Some(date) = fields.get("date") else {
        return 0;
    };
    let prefix: String = date.chars().take(4).collect();
    match prefix.parse::<i32>() {
        Ok(year) if year >= 0 => year,
        _ => {
            log::warn!("unparseable date '{date}', defaulting year to 0");
            0
        }
    }
}

/// Publication venue: first non-empty field in the cascade, or the
/// synthesized arXiv form when the repository says so. All fields absent
/// or empty yields None, never an empty string.
pub fn resolve_venue(fields: &FieldMap) -> Option<String> {
    if fields.get("repository").map(String::as_str) == Some("arXiv") {
        return Some(arxiv_venue(fields));
    }
    VENUE_CASCADE
        .iter()
        .filter_map(|name| fields.get(*name))
        .find(|value| !value.is_empty())
        .cloned()
}

/// `"arXiv preprint <id>"`, with the id taken from the DOI, then the first
/// token of `extra`, then `archiveID`. With no id available the trailing
/// space is trimmed away.
fn arxiv_venue(fields: &FieldMap) -> String {
    let id = fields
        .get("DOI")
        .and_then(|doi| arxiv_id_from_doi(doi))
        .or_else(|| {
            fields
                .get("extra")
                .and_then(|extra| extra.split_whitespace().next())
                .map(str::to_string)
        })
        .or_else(|| fields.get("archiveID").cloned())
        .unwrap_or_default();
    format!("arXiv preprint {id}").trim_end().to_string()
}

/// "10.48550/arXiv.2301.00001" -> "2301:00001": the path segment after the
/// first slash, the `arXiv.` marker stripped, the first dot turned into the
/// scheme separator.
fn arxiv_id_from_doi(doi: &str) -> Option<String> {
    let (_, path) = doi.split_once('/')?;
    let id = path.strip_prefix("arXiv.").unwrap_or(path);
    if id.is_empty() {
        return None;
    }
    Some(id.replacen('.', ":", 1))
}

/// Citation entry type for a source item type, from the closed table.
pub fn resolve_entry_type(item_type: &str) -> Result<&'static str> {
    ENTRY_TYPES
        .iter()
        .find(|(from, _)| *from == item_type)
        .map(|(_, to)| *to)
        .ok_or_else(|| RefstoreError::UnsupportedType {
            item_type: item_type.to_string(),
        })
}
