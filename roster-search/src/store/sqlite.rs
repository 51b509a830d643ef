//! SQLite store on a sqlx pool
//!
//! Every query renders the same `FROM ... LEFT JOIN ... WHERE` clause from the
//! [`QueryPredicate`], so a page, its count and the combined form always agree on the
//! matching rows. Values are bound, never interpolated.

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::error::{DatabaseError, DatabaseOperation};
use crate::repository::{
    FilterValue, Group, GroupId, JoinRow, NewGroup, NewRecord, Pagination, QueryPredicate, Record,
    RecordGroupStore, RecordId, RepositoryError, RepositoryOperation, RepositoryResult, SortKey,
};

const CREATE_GROUP_TABLE: &str = "CREATE TABLE IF NOT EXISTS record_group (
    group_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
)";

const CREATE_RECORD_TABLE: &str = "CREATE TABLE IF NOT EXISTS record (
    record_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    group_id INTEGER NOT NULL REFERENCES record_group (group_id)
)";

const JOIN_COLUMNS: &str = "r.record_id, r.name AS record_name, r.age AS record_age, \
     g.group_id AS group_id, g.name AS group_name";

const JOIN_FROM: &str = " FROM record r LEFT JOIN record_group g ON g.group_id = r.group_id";

/// Store backed by a SQLite database
///
/// Foreign keys are enforced by sqlx's default connect options, so inserting a record
/// for a missing group fails with `ConstraintViolation`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the group and record tables if they are missing
    ///
    /// Idempotent. This is table bootstrapping for local and test databases, not a
    /// migration system.
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        for (table, ddl) in [
            ("record_group", CREATE_GROUP_TABLE),
            ("record", CREATE_RECORD_TABLE),
        ] {
            sqlx::query(ddl).execute(&self.pool).await.map_err(|e| {
                let mut err = DatabaseError::from(e).add_context(table);
                err.operation = DatabaseOperation::Schema;
                err
            })?;
        }
        tracing::info!("Database schema ready");
        Ok(())
    }

    async fn fetch_rows(
        &self,
        mut query: QueryBuilder<'_, Sqlite>,
        operation: RepositoryOperation,
    ) -> RepositoryResult<Vec<SqliteRow>> {
        tracing::debug!(sql = query.sql(), %operation, "executing query");
        query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error(operation))
    }
}

/// Convert a sqlx failure into a repository error for `operation`
fn store_error(operation: RepositoryOperation) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |err| RepositoryError::from(err).with_operation(operation)
}

/// `SELECT <join columns>[, <extra>] FROM ... WHERE ...`
fn select_join(
    predicate: &QueryPredicate,
    extra_column: Option<&str>,
) -> QueryBuilder<'static, Sqlite> {
    let mut query = QueryBuilder::new("SELECT ");
    query.push(JOIN_COLUMNS);
    if let Some(extra) = extra_column {
        query.push(", ").push(extra);
    }
    query.push(JOIN_FROM);
    push_where(&mut query, predicate);
    query
}

fn push_where(query: &mut QueryBuilder<'static, Sqlite>, predicate: &QueryPredicate) {
    for (i, term) in predicate.terms().iter().enumerate() {
        query.push(if i == 0 { " WHERE " } else { " AND " });
        query.push(term.field.column());
        query.push(format_args!(" {} ", term.operator));
        match &term.value {
            FilterValue::String(s) => query.push_bind(s.clone()),
            FilterValue::Integer(n) => query.push_bind(*n),
        };
    }
}

fn push_order(query: &mut QueryBuilder<'static, Sqlite>, sort: Option<&SortKey>) {
    query.push(" ORDER BY ");
    if let Some(sort) = sort {
        query.push(format_args!(
            "{} {}, ",
            sort.field.column(),
            sort.direction.as_sql()
        ));
    }
    query.push("r.record_id ASC");
}

fn push_window(query: &mut QueryBuilder<'static, Sqlite>, window: Pagination) {
    query
        .push(" LIMIT ")
        .push_bind(i64::try_from(window.limit).unwrap_or(i64::MAX))
        .push(" OFFSET ")
        .push_bind(i64::try_from(window.offset).unwrap_or(i64::MAX));
}

fn decode_join_row(row: &SqliteRow) -> Result<JoinRow, sqlx::Error> {
    Ok(JoinRow {
        record_id: row.try_get("record_id")?,
        record_name: row.try_get("record_name")?,
        record_age: row.try_get("record_age")?,
        group_id: row.try_get("group_id")?,
        group_name: row.try_get("group_name")?,
    })
}

fn decode_rows(
    rows: &[SqliteRow],
    operation: RepositoryOperation,
) -> RepositoryResult<Vec<JoinRow>> {
    rows.iter()
        .map(|row| decode_join_row(row).map_err(store_error(operation)))
        .collect()
}

fn to_count(total: i64) -> u64 {
    u64::try_from(total).unwrap_or(0)
}

impl RecordGroupStore for SqliteStore {
    async fn insert_group(&self, group: NewGroup) -> RepositoryResult<Group> {
        let result = sqlx::query("INSERT INTO record_group (name) VALUES (?)")
            .bind(&group.name)
            .execute(&self.pool)
            .await
            .map_err(store_error(RepositoryOperation::InsertGroup))?;
        let id = GroupId(result.last_insert_rowid());
        tracing::debug!(group_id = %id, "inserted group");
        Ok(Group {
            id,
            name: group.name,
        })
    }

    async fn insert_record(&self, record: NewRecord) -> RepositoryResult<Record> {
        let result = sqlx::query("INSERT INTO record (name, age, group_id) VALUES (?, ?, ?)")
            .bind(&record.name)
            .bind(record.age)
            .bind(record.group_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                store_error(RepositoryOperation::InsertRecord)(e)
                    .with_entity("Group", record.group_id.to_string())
            })?;
        let id = RecordId(result.last_insert_rowid());
        tracing::debug!(record_id = %id, group_id = %record.group_id, "inserted record");
        Ok(Record {
            id,
            name: record.name,
            age: record.age,
            group_id: record.group_id,
        })
    }

    async fn query_join(
        &self,
        predicate: &QueryPredicate,
        sort: Option<&SortKey>,
        window: Option<Pagination>,
    ) -> RepositoryResult<Vec<JoinRow>> {
        let operation = if window.is_some() {
            RepositoryOperation::FetchPage
        } else {
            RepositoryOperation::FetchAll
        };

        let mut query = select_join(predicate, None);
        push_order(&mut query, sort);
        if let Some(window) = window {
            push_window(&mut query, window);
        }

        let rows = self.fetch_rows(query, operation).await?;
        decode_rows(&rows, operation)
    }

    async fn count(&self, predicate: &QueryPredicate) -> RepositoryResult<u64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*)");
        query.push(JOIN_FROM);
        push_where(&mut query, predicate);

        tracing::debug!(sql = query.sql(), "executing count");
        let total = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(store_error(RepositoryOperation::Count))?;
        Ok(to_count(total))
    }

    async fn query_join_with_count(
        &self,
        predicate: &QueryPredicate,
        sort: Option<&SortKey>,
        window: Pagination,
    ) -> RepositoryResult<(Vec<JoinRow>, u64)> {
        let operation = RepositoryOperation::FetchPageWithCount;

        // The window function sees every match before LIMIT/OFFSET apply
        let mut query = select_join(predicate, Some("COUNT(*) OVER () AS total"));
        push_order(&mut query, sort);
        push_window(&mut query, window);

        let rows = self.fetch_rows(query, operation).await?;
        let total = match rows.first() {
            Some(first) => first
                .try_get::<i64, _>("total")
                .map(to_count)
                .map_err(store_error(operation))?,
            // Nothing at offset zero means nothing matches at all
            None if window.offset == 0 => 0,
            // Past the end the window column has no row to ride on
            None => self
                .count(predicate)
                .await
                .map_err(|e| e.with_operation(operation))?,
        };

        Ok((decode_rows(&rows, operation)?, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Field, Predicate, RepositoryErrorKind};
    use crate::store::conformance;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> SqliteStore {
        // One connection: every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteStore::new(pool);
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_sqlite_store_conformance() {
        conformance::run(&memory_store().await).await;
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let store = memory_store().await;
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
    }

    #[test]
    fn test_where_clause_binds_values() {
        let predicate = QueryPredicate::match_all()
            .and(Predicate::eq(Field::GroupName, "teamB'; DROP TABLE record; --"))
            .and(Predicate::lte(Field::RecordAge, 30));
        let query = select_join(&predicate, None);
        assert!(query.sql().ends_with(" WHERE g.name = ? AND r.age <= ?"));
    }

    #[test]
    fn test_order_clause_breaks_ties_by_id() {
        let mut query = QueryBuilder::new("SELECT 1");
        push_order(&mut query, Some(&SortKey::desc(Field::RecordAge)));
        assert_eq!(query.sql(), "SELECT 1 ORDER BY r.age DESC, r.record_id ASC");
    }

    #[tokio::test]
    async fn test_combined_count_agrees_with_count_past_end() {
        let store = memory_store().await;
        crate::seed::demo(&store).await.unwrap();
        let even = QueryPredicate::match_all().and(Predicate::eq(Field::GroupName, "teamA"));

        let separate = store.count(&even).await.unwrap();
        assert_eq!(separate, 49);
        for offset in [0, 10, 48, 49, 500] {
            let (rows, total) = store
                .query_join_with_count(&even, None, Pagination::new(offset, 10))
                .await
                .unwrap();
            assert_eq!(total, separate, "offset {offset}");
            let expected = 49_u64.saturating_sub(offset).min(10) as usize;
            assert_eq!(rows.len(), expected, "offset {offset}");
        }
    }

    #[tokio::test]
    async fn test_wide_age_surfaces_as_mapping_error() {
        let store = memory_store().await;
        let group = store.insert_group(NewGroup::new("teamA")).await.unwrap();
        sqlx::query("INSERT INTO record (name, age, group_id) VALUES ('big', ?, ?)")
            .bind(i64::from(i32::MAX) + 1)
            .bind(group.id.0)
            .execute(store.pool())
            .await
            .unwrap();

        // The store hands the row back as-is; projection is what rejects it
        let rows = store
            .query_join(&QueryPredicate::match_all(), None, None)
            .await
            .unwrap();
        assert_eq!(rows[0].record_age, i64::from(i32::MAX) + 1);
        let err = crate::repository::RecordGroupView::try_from(rows[0].clone()).unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::MappingError);
    }

    #[tokio::test]
    async fn test_text_in_integer_column_is_mapping_error() {
        let store = memory_store().await;
        let group = store.insert_group(NewGroup::new("teamA")).await.unwrap();
        // Column affinity keeps non-numeric text as TEXT
        sqlx::query("INSERT INTO record (name, age, group_id) VALUES ('odd', 'unknown', ?)")
            .bind(group.id.0)
            .execute(store.pool())
            .await
            .unwrap();

        let err = store
            .query_join(&QueryPredicate::match_all(), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::MappingError);
        assert_eq!(err.operation, RepositoryOperation::FetchAll);
    }

    #[tokio::test]
    async fn test_closed_pool_is_storage_unavailable() {
        let store = memory_store().await;
        store.pool().close().await;

        let err = store
            .count(&QueryPredicate::match_all())
            .await
            .unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::StorageUnavailable);
        assert_eq!(err.operation, RepositoryOperation::Count);
        assert!(err.is_retriable());
    }
}
