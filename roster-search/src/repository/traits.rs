//! Store collaborator trait
//!
//! The search layer never talks to a database directly. It goes through
//! [`RecordGroupStore`], the minimal capability set it needs from persistence: insert,
//! query the record/group join, and count matches.
//!
//! Methods use RPITIT (Return Position Impl Trait In Traits), so implementations can
//! write plain `async fn`.
//!
//! # Example
//!
//! ```rust,ignore
//! use roster_search::repository::{RecordGroupStore, QueryPredicate, RepositoryResult};
//!
//! impl RecordGroupStore for MyStore {
//!     async fn count(&self, predicate: &QueryPredicate) -> RepositoryResult<u64> {
//!         // render `predicate` into the backend's query language
//!         todo!()
//!     }
//!     // ... other methods
//! }
//! ```

use std::future::Future;

use super::error::RepositoryError;
use super::filter::QueryPredicate;
use super::model::{Group, JoinRow, NewGroup, NewRecord, Record};
use super::pagination::{Pagination, SortKey};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Persistence capabilities the search layer depends on
///
/// Every query method takes the already-composed [`QueryPredicate`]; implementations must
/// apply it identically in `query_join`, `count` and `query_join_with_count` so that a page
/// and its total can never disagree about which rows match.
///
/// Rows are ordered by `sort` when given, then by record id ascending.
pub trait RecordGroupStore: Send + Sync {
    /// Persist a new group and return it with its generated id
    fn insert_group(&self, group: NewGroup)
        -> impl Future<Output = RepositoryResult<Group>> + Send;

    /// Persist a new record and return it with its generated id
    ///
    /// # Errors
    ///
    /// `ConstraintViolation` when `record.group_id` does not name an existing group.
    fn insert_record(
        &self,
        record: NewRecord,
    ) -> impl Future<Output = RepositoryResult<Record>> + Send;

    /// Fetch join rows matching `predicate`, optionally restricted to a window
    fn query_join(
        &self,
        predicate: &QueryPredicate,
        sort: Option<&SortKey>,
        window: Option<Pagination>,
    ) -> impl Future<Output = RepositoryResult<Vec<JoinRow>>> + Send;

    /// Count join rows matching `predicate`
    fn count(&self, predicate: &QueryPredicate)
        -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Fetch one window of matching rows together with the total match count
    ///
    /// Backends that can compute both in one round trip should do so.
    fn query_join_with_count(
        &self,
        predicate: &QueryPredicate,
        sort: Option<&SortKey>,
        window: Pagination,
    ) -> impl Future<Output = RepositoryResult<(Vec<JoinRow>, u64)>> + Send;
}
