use crate::source::RawAttributeRow;
use std::collections::{BTreeMap, HashSet};

/// Grouping identity for one entity. Ordered by id, so the aggregation map
/// iterates in load order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EntityKey {
    pub id: i64,
    pub key: String,
    pub entity_type: String,
}

/// Raw field name to raw value for one entity. Intermediate only; discarded
/// once the Record is built.
pub type FieldMap = BTreeMap<String, String>;

/// Fields excluded from aggregation entirely: bookkeeping values with no
/// Record counterpart.
pub const DEFAULT_IGNORED_FIELDS: &[&str] =
    &["accessDate", "libraryCatalog", "language", "shortTitle"];

pub fn default_ignored() -> HashSet<&'static str> {
    DEFAULT_IGNORED_FIELDS.iter().copied().collect()
}

/// Fold sparse attribute rows into one field map per entity.
///
/// When the same entity+field appears more than once, the last row in
/// iteration order wins.
pub fn aggregate<I>(rows: I, ignored: &HashSet<&str>) -> BTreeMap<EntityKey, FieldMap>
where
    I: IntoIterator<Item = RawAttributeRow>,
{
    let mut entities: BTreeMap<EntityKey, FieldMap> = BTreeMap::new();

    for row in rows {
        if ignored.contains(row.field_name.as_str()) {
            continue;
        }
        let entity = EntityKey {
            id: row.entity_id,
            key: row.entity_key,
            entity_type: row.entity_type,
        };
        entities
            .entry(entity)
            .or_default()
            .insert(row.field_name, row.value);
    }

    entities
}
