use crate::error::Result;
use crate::record::Record;
use crate::resolve;

/// A citation entry ready for BibTeX serialization. Built on demand from a
/// Record, never persisted. Field order is emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationEntry {
    pub citation_key: String,
    pub entry_type: &'static str,
    pub fields: Vec<(String, String)>,
}

impl CitationEntry {
    fn push_field(&mut self, name: &str, value: String) {
        self.fields.push((name.to_string(), value));
    }

    /// Look up a field value by name.
    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Serialize as a BibTeX entry. Purely numeric values are emitted bare,
    /// everything else braced.
    pub fn to_bibtex(&self) -> String {
        let mut out = String::new();
        out.push('@');
        out.push_str(self.entry_type);
        out.push('{');
        out.push_str(&self.citation_key);
        out.push_str(",\n");
        for (name, value) in &self.fields {
            out.push_str("    ");
            out.push_str(name);
            out.push_str(" = ");
            if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
                out.push_str(value);
            } else {
                out.push('{');
                out.push_str(value);
                out.push('}');
            }
            out.push_str(",\n");
        }
        out.push('}');
        out
    }
}

/// Map a Record to a CitationEntry.
///
/// Fails with UnsupportedType for item types outside the citation table;
/// batch callers catch that per record and keep exporting the rest.
/// Citation keys are not disambiguated: two records by the same first
/// author in the same year collide.
pub fn export(record: &Record) -> Result<CitationEntry> {
    let entry_type = resolve::resolve_entry_type(&record.item_type)?;

    let mut entry = CitationEntry {
        citation_key: citation_key(record),
        entry_type,
        fields: Vec::new(),
    };

    entry.push_field("title", record.title.clone());
    if !record.authors.is_empty() {
        let joined = record
            .authors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" and ");
        entry.push_field("author", joined);
    }
    if record.year > 0 {
        entry.push_field("year", record.year.to_string());
    }
    if let Some(venue) = &record.venue {
        if let Some(field) = venue_field(&record.item_type) {
            entry.push_field(field, venue.clone());
        }
    }
    for (name, value) in [
        ("volume", &record.volume),
        ("pages", &record.pages),
        ("doi", &record.doi),
        ("publisher", &record.publisher),
    ] {
        if let Some(value) = value {
            entry.push_field(name, value.clone());
        }
    }

    Ok(entry)
}

/// Venue text lands under `journal` for journal articles and book
/// sections, `booktitle` for conference papers and preprints. Books place
/// no venue.
fn venue_field(item_type: &str) -> Option<&'static str> {
    match item_type {
        "journalArticle" | "bookSection" => Some("journal"),
        "conferencePaper" | "preprint" => Some("booktitle"),
        _ => None,
    }
}

/// Lowercase, space-stripped surname of the first author plus the year;
/// "anon" when there are no authors.
fn citation_key(record: &Record) -> String {
    match record.authors.first() {
        Some(author) => {
            let surname = author.last_name.replace(' ', "").to_lowercase();
            format!("{surname}{}", record.year)
        }
        None => "anon".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefstoreError;
    use crate::record::Author;
    use pretty_assertions::assert_eq;

    fn record(item_type: &str) -> Record {
        Record {
            id: 1,
            key: "KEY00001".to_string(),
            item_type: item_type.to_string(),
            title: "Attention Is All You Need".to_string(),
            authors: vec![Author {
                last_name: "Vaswani".to_string(),
                first_name: "Ashish".to_string(),
            }],
            year: 2017,
            venue: Some("NeurIPS".to_string()),
            volume: None,
            issue: None,
            pages: None,
            doi: None,
            publisher: None,
            abstract_text: None,
            attachments: vec![],
        }
    }

    #[test]
    fn test_conference_paper_venue_goes_to_booktitle() {
        let entry = export(&record("conferencePaper")).unwrap();
        assert_eq!(entry.entry_type, "inproceedings");
        assert_eq!(entry.get_field("booktitle"), Some("NeurIPS"));
        assert_eq!(entry.get_field("journal"), None);
    }

    #[test]
    fn test_journal_article_venue_goes_to_journal() {
        let entry = export(&record("journalArticle")).unwrap();
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.get_field("journal"), Some("NeurIPS"));
        assert_eq!(entry.get_field("booktitle"), None);
    }

    #[test]
    fn test_book_places_no_venue() {
        let entry = export(&record("book")).unwrap();
        assert_eq!(entry.get_field("journal"), None);
        assert_eq!(entry.get_field("booktitle"), None);
    }

    #[test]
    fn test_citation_key_from_first_author_and_year() {
        let entry = export(&record("journalArticle")).unwrap();
        assert_eq!(entry.citation_key, "vaswani2017");
    }

    #[test]
    fn test_citation_key_strips_spaces() {
        let mut r = record("journalArticle");
        r.authors[0].last_name = "Van Der Berg".to_string();
        let entry = export(&r).unwrap();
        assert_eq!(entry.citation_key, "vanderberg2017");
    }

    #[test]
    fn test_citation_key_anon_without_authors() {
        let mut r = record("journalArticle");
        r.authors.clear();
        let entry = export(&r).unwrap();
        assert_eq!(entry.citation_key, "anon");
        assert_eq!(entry.get_field("author"), None);
    }

    #[test]
    fn test_optional_fields_only_when_present() {
        let mut r = record("journalArticle");
        r.volume = Some("30".to_string());
        r.doi = Some("10.5555/3295222".to_string());
        let entry = export(&r).unwrap();
        assert_eq!(entry.get_field("volume"), Some("30"));
        assert_eq!(entry.get_field("doi"), Some("10.5555/3295222"));
        assert_eq!(entry.get_field("pages"), None);
        assert_eq!(entry.get_field("publisher"), None);
    }

    #[test]
    fn test_unsupported_type_fails_without_aborting_batch() {
        let letter = record("letter");
        let article = record("journalArticle");

        let mut entries = Vec::new();
        let mut failures = Vec::new();
        for r in [&letter, &article] {
            match export(r) {
                Ok(entry) => entries.push(entry),
                Err(e) => failures.push(e),
            }
        }

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, "article");
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            failures[0],
            RefstoreError::UnsupportedType { ref item_type } if item_type == "letter"
        ));
    }

    #[test]
    fn test_bibtex_serialization() {
        let mut r = record("journalArticle");
        r.pages = Some("5998-6008".to_string());
        let entry = export(&r).unwrap();
        let bibtex = entry.to_bibtex();

        assert_eq!(
            bibtex,
            "@article{vaswani2017,\n\
             \x20   title = {Attention Is All You Need},\n\
             \x20   author = {Vaswani, Ashish},\n\
             \x20   year = 2017,\n\
             \x20   journal = {NeurIPS},\n\
             \x20   pages = {5998-6008},\n\
             }"
        );
    }

    #[test]
    fn test_multiple_authors_joined_with_and() {
        let mut r = record("journalArticle");
        r.authors.push(Author {
            last_name: "Shazeer".to_string(),
            first_name: "Noam".to_string(),
        });
        let entry = export(&r).unwrap();
        assert_eq!(
            entry.get_field("author"),
            Some("Vaswani, Ashish and Shazeer, Noam")
        );
    }
}
