//! Filtered query builder over the record/group join
//!
//! [`RecordSearch`] turns a [`FilterCondition`] into a [`QueryPredicate`] with
//! [`RecordSearch::compose`] and executes it against a [`RecordGroupStore`], either as a
//! full fetch or as a paged fetch with a total count.
//!
//! # Example
//!
//! ```rust
//! use roster_search::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> RepositoryResult<()> {
//! let search = RecordSearch::new(MemoryStore::new());
//! seed::fixture(search.store()).await?;
//!
//! let adults = search
//!     .fetch_all(&FilterCondition::new().with_age_greater_or_equal(20))
//!     .await?;
//! assert_eq!(adults.len(), 3);
//!
//! let page = search
//!     .fetch_page(
//!         &FilterCondition::new(),
//!         &PageRequest::new(1, 2),
//!         CountMode::SeparateCountQuery,
//!     )
//!     .await?;
//! assert_eq!(page.len(), 2);
//! assert_eq!(page.total, Some(4));
//! # Ok(())
//! # }
//! ```

mod condition;

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::repository::{
    JoinRow, Page, PageRequest, Pagination, QueryPredicate, RecordGroupStore, RecordGroupView,
    RepositoryOperation, RepositoryResult, SortKey,
};

pub use condition::FilterCondition;

/// How a paged fetch obtains its total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// One store round trip returns both the page and the total
    EagerCombinedCount,
    /// Page and count are separate store calls; the count is skipped when the page
    /// already determines the total (see [`known_total`])
    #[default]
    SeparateCountQuery,
    /// Fetch the page only and leave the total unset
    Omit,
}

/// Total implied by a page fetch alone, if the page proves it
///
/// A short page means no rows exist past it:
///
/// - at offset zero, the total is the number of rows returned
/// - at a later offset, a non-empty short page is the last one, so the total is
///   `offset + returned`
///
/// Anything else (a full page, or an empty page past the start) needs a count query.
///
/// ```rust
/// use roster_search::repository::Pagination;
/// use roster_search::search::known_total;
///
/// assert_eq!(known_total(&Pagination::new(0, 10), 3), Some(3));
/// assert_eq!(known_total(&Pagination::new(0, 10), 10), None);
/// assert_eq!(known_total(&Pagination::new(20, 10), 4), Some(24));
/// assert_eq!(known_total(&Pagination::new(20, 10), 0), None);
/// ```
#[must_use]
pub fn known_total(window: &Pagination, returned: usize) -> Option<u64> {
    let returned = returned as u64;
    if returned >= window.limit {
        return None;
    }
    if window.offset == 0 {
        Some(returned)
    } else if returned > 0 {
        Some(window.offset.saturating_add(returned))
    } else {
        None
    }
}

/// Dynamic search over records and their owning groups
///
/// Stateless apart from the store handle and configuration; share it behind an `Arc`
/// to serve concurrent callers.
#[derive(Debug, Clone)]
pub struct RecordSearch<S> {
    store: S,
    config: SearchConfig,
}

impl<S: RecordGroupStore> RecordSearch<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, SearchConfig::default())
    }

    pub fn with_config(store: S, config: SearchConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Conjunction of the predicates for every set field of `filter`
    ///
    /// Unset and blank fields contribute nothing; an unconstrained filter yields the
    /// match-all predicate. Never fails.
    pub fn compose(filter: &FilterCondition) -> QueryPredicate {
        filter.terms().into_iter().collect()
    }

    /// Every record matching `filter`, ordered by record id
    pub async fn fetch_all(
        &self,
        filter: &FilterCondition,
    ) -> RepositoryResult<Vec<RecordGroupView>> {
        self.fetch_matching(filter, None).await
    }

    /// Every record matching `filter`, ordered by `sort` then record id
    pub async fn fetch_all_sorted(
        &self,
        filter: &FilterCondition,
        sort: SortKey,
    ) -> RepositoryResult<Vec<RecordGroupView>> {
        self.fetch_matching(filter, Some(&sort)).await
    }

    /// Every record with exactly this name
    pub async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<RecordGroupView>> {
        self.fetch_all(&FilterCondition::new().with_name(name)).await
    }

    async fn fetch_matching(
        &self,
        filter: &FilterCondition,
        sort: Option<&SortKey>,
    ) -> RepositoryResult<Vec<RecordGroupView>> {
        let predicate = Self::compose(filter);
        tracing::debug!(predicate = %predicate, "fetching all matches");

        let rows = self.store.query_join(&predicate, sort, None).await?;
        project(rows, RepositoryOperation::FetchAll)
    }

    /// One page of records matching `filter`, with a total according to `count_mode`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a negative offset or non-positive limit, raised before the
    /// store is touched. Store and projection failures are passed through unchanged.
    pub async fn fetch_page(
        &self,
        filter: &FilterCondition,
        request: &PageRequest,
        count_mode: CountMode,
    ) -> RepositoryResult<Page<RecordGroupView>> {
        let window = request.validate()?;
        let sort = request.sort.as_ref();

        // Page and count share this one predicate value.
        let predicate = Self::compose(filter);
        tracing::debug!(
            predicate = %predicate,
            offset = window.offset,
            limit = window.limit,
            ?count_mode,
            "fetching page"
        );

        match count_mode {
            CountMode::EagerCombinedCount => {
                let (rows, total) = self
                    .store
                    .query_join_with_count(&predicate, sort, window)
                    .await?;
                let content = project(rows, RepositoryOperation::FetchPageWithCount)?;
                Ok(Page::new(content, window, Some(total)))
            }
            CountMode::SeparateCountQuery => {
                let rows = self.store.query_join(&predicate, sort, Some(window)).await?;
                let content = project(rows, RepositoryOperation::FetchPage)?;
                let total = match self.total_from_page(&window, content.len()) {
                    Some(total) => {
                        tracing::debug!(total, "count query skipped, page determines total");
                        total
                    }
                    None => self.store.count(&predicate).await?,
                };
                Ok(Page::new(content, window, Some(total)))
            }
            CountMode::Omit => {
                let rows = self.store.query_join(&predicate, sort, Some(window)).await?;
                let content = project(rows, RepositoryOperation::FetchPage)?;
                Ok(Page::new(content, window, None))
            }
        }
    }

    /// [`fetch_page`](Self::fetch_page) with the configured default count mode
    pub async fn search_page(
        &self,
        filter: &FilterCondition,
        request: &PageRequest,
    ) -> RepositoryResult<Page<RecordGroupView>> {
        self.fetch_page(filter, request, self.config.default_count_mode)
            .await
    }

    fn total_from_page(&self, window: &Pagination, returned: usize) -> Option<u64> {
        if self.config.skip_redundant_count {
            known_total(window, returned)
        } else {
            None
        }
    }
}

fn project(
    rows: Vec<JoinRow>,
    operation: RepositoryOperation,
) -> RepositoryResult<Vec<RecordGroupView>> {
    rows.into_iter()
        .map(|row| RecordGroupView::try_from(row).map_err(|e| e.with_operation(operation)))
        .collect()
}
