//! In-memory store
//!
//! Tables live behind a `tokio::sync::RwLock`; queries take a read lock, inserts a write
//! lock. Cloning the store clones the handle, not the data.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::repository::{
    Group, GroupId, JoinRow, NewGroup, NewRecord, OrderDirection, Pagination, QueryPredicate,
    Record, RecordGroupStore, RecordId, RepositoryError, RepositoryOperation, RepositoryResult,
    SortKey,
};

/// Record and group tables held in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    groups: BTreeMap<GroupId, Group>,
    records: BTreeMap<RecordId, Record>,
    last_group_id: i64,
    last_record_id: i64,
}

impl Tables {
    /// Left join of every record with its group, in record id order
    fn join_rows(&self) -> impl Iterator<Item = JoinRow> + '_ {
        self.records.values().map(|record| {
            let group = self.groups.get(&record.group_id);
            JoinRow {
                record_id: record.id.0,
                record_name: record.name.clone(),
                record_age: i64::from(record.age),
                group_id: group.map(|g| g.id.0),
                group_name: group.map(|g| g.name.clone()),
            }
        })
    }

    fn matching(&self, predicate: &QueryPredicate, sort: Option<&SortKey>) -> Vec<JoinRow> {
        let mut rows: Vec<JoinRow> = self
            .join_rows()
            .filter(|row| predicate.matches(row))
            .collect();
        if let Some(sort) = sort {
            // Stable sort keeps the record id order among equal keys
            rows.sort_by(|a, b| compare_on(sort, a, b));
        }
        rows
    }
}

/// Order two rows on a sort key with SQL semantics: missing values sort first ascending
fn compare_on(sort: &SortKey, a: &JoinRow, b: &JoinRow) -> Ordering {
    let ordering = match (sort.field.read(a), sort.field.read(b)) {
        (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    match sort.direction {
        OrderDirection::Ascending => ordering,
        OrderDirection::Descending => ordering.reverse(),
    }
}

fn window_of(rows: Vec<JoinRow>, window: Pagination) -> Vec<JoinRow> {
    let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
    rows.into_iter().skip(offset).take(limit).collect()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn record_count(&self) -> usize {
        self.tables.read().await.records.len()
    }
}

impl RecordGroupStore for MemoryStore {
    async fn insert_group(&self, group: NewGroup) -> RepositoryResult<Group> {
        let mut tables = self.tables.write().await;
        tables.last_group_id += 1;
        let group = Group {
            id: GroupId(tables.last_group_id),
            name: group.name,
        };
        tables.groups.insert(group.id, group.clone());
        tracing::debug!(group_id = %group.id, "inserted group");
        Ok(group)
    }

    async fn insert_record(&self, record: NewRecord) -> RepositoryResult<Record> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&record.group_id) {
            return Err(RepositoryError::constraint_violation(
                RepositoryOperation::InsertRecord,
                "record references a group that does not exist",
            )
            .with_entity("Group", record.group_id.to_string()));
        }
        tables.last_record_id += 1;
        let record = Record {
            id: RecordId(tables.last_record_id),
            name: record.name,
            age: record.age,
            group_id: record.group_id,
        };
        tables.records.insert(record.id, record.clone());
        tracing::debug!(record_id = %record.id, group_id = %record.group_id, "inserted record");
        Ok(record)
    }

    async fn query_join(
        &self,
        predicate: &QueryPredicate,
        sort: Option<&SortKey>,
        window: Option<Pagination>,
    ) -> RepositoryResult<Vec<JoinRow>> {
        let rows = self.tables.read().await.matching(predicate, sort);
        Ok(match window {
            Some(window) => window_of(rows, window),
            None => rows,
        })
    }

    async fn count(&self, predicate: &QueryPredicate) -> RepositoryResult<u64> {
        let tables = self.tables.read().await;
        let total = tables.join_rows().filter(|row| predicate.matches(row)).count();
        Ok(total as u64)
    }

    async fn query_join_with_count(
        &self,
        predicate: &QueryPredicate,
        sort: Option<&SortKey>,
        window: Pagination,
    ) -> RepositoryResult<(Vec<JoinRow>, u64)> {
        let rows = self.tables.read().await.matching(predicate, sort);
        let total = rows.len() as u64;
        Ok((window_of(rows, window), total))
    }
}
