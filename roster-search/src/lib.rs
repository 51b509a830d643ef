//! # roster-search
//!
//! Dynamic filter-and-paginate search over records and the groups they belong to.
//!
//! ## Features
//!
//! - **Optional filters**: any subset of name, group name and an inclusive age range;
//!   unset or blank fields are ignored
//! - **Paging with totals**: one combined round trip, or a page query plus a count
//!   query that is skipped when the page already proves the total
//! - **Pluggable stores**: in-memory, SQLite via sqlx, and a call-counting wrapper
//! - **Ambient stack**: figment configuration, JSON tracing, structured errors
//!
//! ## Example
//!
//! ```rust,no_run
//! use roster_search::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let database = config
//!         .database
//!         .clone()
//!         .unwrap_or_else(|| DatabaseConfig::new("sqlite::memory:"));
//!     let store = roster_search::database::connect(&database).await?;
//!     seed::demo(&store).await?;
//!
//!     let search = RecordSearch::with_config(store, config.search.clone());
//!     let filter = FilterCondition::new()
//!         .with_group_name("teamA")
//!         .with_age_greater_or_equal(30);
//!     let page = search
//!         .search_page(&filter, &config.search.first_page())
//!         .await?;
//!
//!     info!(returned = page.len(), total = ?page.total, "first page");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod repository;
pub mod search;
pub mod seed;
pub mod store;

#[cfg(feature = "database")]
pub mod database;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, DatabaseConfig, SearchConfig, ServiceConfig};

    pub use crate::error::{Error, Result};

    #[cfg(feature = "database")]
    pub use crate::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation};

    pub use crate::observability::init_tracing;

    pub use crate::repository::{
        Field, Group, GroupId, NewGroup, NewRecord, OrderDirection, Page, PageRequest,
        Pagination, Predicate, QueryPredicate, Record, RecordGroupStore, RecordGroupView,
        RecordId, RepositoryError, RepositoryErrorKind, RepositoryOperation, RepositoryResult,
        SortKey,
    };

    pub use crate::search::{known_total, CountMode, FilterCondition, RecordSearch};

    pub use crate::seed::{self, SeedSummary};

    pub use crate::store::{InstrumentedStore, MemoryStore, StoreCallStats};

    #[cfg(feature = "database")]
    pub use crate::store::SqliteStore;

    pub use tracing::{debug, error, info, trace, warn, Level};

    pub use tokio;
}
