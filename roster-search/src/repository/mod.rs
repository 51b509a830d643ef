//! Domain vocabulary for record/group search
//!
//! This module holds the types shared by the search layer and every store:
//!
//! - **Entities**: [`Record`], [`Group`] and their typed ids
//! - **Rows and views**: [`JoinRow`] as a store returns it, [`RecordGroupView`] as callers see it
//! - **Predicates**: [`Predicate`] and the conjunction [`QueryPredicate`]
//! - **Pagination**: [`PageRequest`], the validated [`Pagination`] window, and [`Page`]
//! - **Errors**: [`RepositoryError`] with [`RepositoryErrorKind`]
//! - **Collaborator**: the [`RecordGroupStore`] trait

mod error;
mod filter;
mod model;
mod pagination;
mod traits;

// Re-export all public types
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use filter::{Field, FilterOperator, FilterValue, Predicate, QueryPredicate};
pub use model::{
    Group, GroupId, JoinRow, NewGroup, NewRecord, Record, RecordGroupView, RecordId,
};
pub use pagination::{OrderDirection, Page, PageRequest, Pagination, SortKey};
pub use traits::{RecordGroupStore, RepositoryResult};
