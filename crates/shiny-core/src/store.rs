use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;

use crate::entity::{DbId, EntityKind, Fields};
use crate::error::{StoreError, StoreResult};

/// One stored row: column name to value.
pub type Row = Fields;

/// Single-row persistence operations.
///
/// The store offers no multi-row transactions; atomicity of an area import is
/// emulated on top of these operations by tearing everything down on failure.
pub trait Store {
    /// Insert a row into the table for `kind`. Returns the new row id.
    fn insert(&mut self, kind: EntityKind, row: Row) -> StoreResult<DbId>;

    /// Delete a row. Returns `false` if no such row existed.
    fn delete(&mut self, kind: EntityKind, dbid: DbId) -> StoreResult<bool>;

    /// Fetch every row of `kind` whose `column` equals `value`.
    fn select(&self, kind: EntityKind, column: &str, value: &Value) -> Vec<(DbId, Row)>;
}

/// A [`Store`] keeping every table in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: i64,
    tables: HashMap<EntityKind, BTreeMap<DbId, Row>>,
    rejected: HashSet<EntityKind>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every further insert into `kind` fail, as a constraint
    /// violation in a real database would.
    pub fn reject_inserts(&mut self, kind: EntityKind) {
        self.rejected.insert(kind);
    }

    /// Number of rows currently held for `kind`.
    pub fn row_count(&self, kind: EntityKind) -> usize {
        self.tables.get(&kind).map_or(0, BTreeMap::len)
    }

    /// Total number of rows across all tables.
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }
}

impl Store for MemoryStore {
    fn insert(&mut self, kind: EntityKind, row: Row) -> StoreResult<DbId> {
        if self.rejected.contains(&kind) {
            return Err(StoreError::Rejected {
                table: kind.table_name(),
                reason: "inserts disabled".to_string(),
            });
        }
        self.next_id += 1;
        let dbid = DbId(self.next_id);
        self.tables.entry(kind).or_default().insert(dbid, row);
        Ok(dbid)
    }

    fn delete(&mut self, kind: EntityKind, dbid: DbId) -> StoreResult<bool> {
        Ok(self
            .tables
            .get_mut(&kind)
            .is_some_and(|table| table.remove(&dbid).is_some()))
    }

    fn select(&self, kind: EntityKind, column: &str, value: &Value) -> Vec<(DbId, Row)> {
        self.tables
            .get(&kind)
            .map(|table| {
                table
                    .iter()
                    .filter(|(_, row)| row.get(column) == Some(value))
                    .map(|(dbid, row)| (*dbid, row.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(area: &str) -> Row {
        let mut row = Row::new();
        row.insert("area".into(), json!(area));
        row
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut store = MemoryStore::new();
        let a = store.insert(EntityKind::Room, row("haven")).unwrap();
        let b = store.insert(EntityKind::Room, row("haven")).unwrap();
        assert!(b > a);
        assert_eq!(store.row_count(EntityKind::Room), 2);
    }

    #[test]
    fn select_filters_by_column() {
        let mut store = MemoryStore::new();
        store.insert(EntityKind::Item, row("haven")).unwrap();
        store.insert(EntityKind::Item, row("dunmoor")).unwrap();

        let rows = store.select(EntityKind::Item, "area", &json!("haven"));
        assert_eq!(rows.len(), 1);
        assert!(store.select(EntityKind::Npc, "area", &json!("haven")).is_empty());
    }

    #[test]
    fn delete_reports_missing_rows() {
        let mut store = MemoryStore::new();
        let id = store.insert(EntityKind::Script, row("haven")).unwrap();
        assert!(store.delete(EntityKind::Script, id).unwrap());
        assert!(!store.delete(EntityKind::Script, id).unwrap());
        assert_eq!(store.total_rows(), 0);
    }

    #[test]
    fn rejected_kind_fails_insert() {
        let mut store = MemoryStore::new();
        store.reject_inserts(EntityKind::Exit);
        assert!(store.insert(EntityKind::Exit, row("haven")).is_err());
        assert!(store.insert(EntityKind::Room, row("haven")).is_ok());
    }
}
