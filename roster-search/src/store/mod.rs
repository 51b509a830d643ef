//! Store implementations
//!
//! - [`MemoryStore`]: tables in process memory, for tests and demos
//! - [`SqliteStore`]: a sqlx SQLite pool (requires the `database` feature)
//! - [`InstrumentedStore`]: wraps any store and counts calls per method

mod instrumented;
mod memory;

#[cfg(feature = "database")]
mod sqlite;

#[cfg(test)]
pub(crate) mod conformance;

pub use instrumented::{InstrumentedStore, StoreCallStats};
pub use memory::MemoryStore;

#[cfg(feature = "database")]
pub use sqlite::SqliteStore;
