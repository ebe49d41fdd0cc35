use crate::record::Record;
use std::cmp::Ordering;

/// One ordering over the record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub label: &'static str,
    key: SortKey,
    descending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    Id,
    Year,
    Title,
}

/// The fixed sort cycle; `advance_sort` steps through it modulo its length.
const SORT_ORDERS: &[SortOrder] = &[
    SortOrder { label: "ID (↓)", key: SortKey::Id, descending: true },
    SortOrder { label: "ID (↑)", key: SortKey::Id, descending: false },
    SortOrder { label: "Year (↓)", key: SortKey::Year, descending: true },
    SortOrder { label: "Year (↑)", key: SortKey::Year, descending: false },
    SortOrder { label: "Title (↓)", key: SortKey::Title, descending: true },
    SortOrder { label: "Title (↑)", key: SortKey::Title, descending: false },
];

impl SortOrder {
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match self.key {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Year => a.year.cmp(&b.year),
            SortKey::Title => a.title.cmp(&b.title),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// In-memory filter and sort over the currently loaded record set.
///
/// Filtering is a full O(n) rescan per call; no incremental index is kept.
pub struct SearchIndex {
    records: Vec<Record>,
    query: String,
    /// Index into SORT_ORDERS; None means original load order.
    sort: Option<usize>,
}

impl SearchIndex {
    pub fn new(records: Vec<Record>) -> Self {
        SearchIndex {
            records,
            query: String::new(),
            sort: None,
        }
    }

    /// Replace the record set after a reload. The active sort order does
    /// not survive; the query string does.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.sort = None;
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Advance to the next sort order in the fixed cycle and return it.
    pub fn advance_sort(&mut self) -> SortOrder {
        let next = match self.sort {
            None => 0,
            Some(current) => (current + 1) % SORT_ORDERS.len(),
        };
        self.sort = Some(next);
        SORT_ORDERS[next]
    }

    pub fn sort_order(&self) -> Option<SortOrder> {
        self.sort.map(|index| SORT_ORDERS[index])
    }

    /// Records matching `query`, sorted by the active order when one is
    /// set. An empty query matches everything; with no active order,
    /// matches keep their original load order (the filter is stable, not a
    /// re-sort).
    pub fn filter(&mut self, query: &str) -> Vec<Record> {
        self.query = query.to_string();
        let mut matches: Vec<Record> = self
            .records
            .iter()
            .filter(|record| matches_query(record, query))
            .cloned()
            .collect();
        if let Some(order) = self.sort_order() {
            matches.sort_by(|a, b| order.compare(a, b));
        }
        matches
    }
}

/// Case-insensitive substring match against the title and every author's
/// last name, first name, and abbreviated form.
fn matches_query(record: &Record, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    if record.title.to_lowercase().contains(&needle) {
        return true;
    }
    record.authors.iter().any(|author| {
        author.last_name.to_lowercase().contains(&needle)
            || author.first_name.to_lowercase().contains(&needle)
            || author.abbreviated().to_lowercase().contains(&needle)
    })
}
