//! Call-counting store wrapper
//!
//! [`InstrumentedStore`] forwards every call to an inner store and counts it, which
//! makes store traffic observable: tests use it to prove a rejected request never
//! reached the store, or that a count query was skipped.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::repository::{
    Group, JoinRow, NewGroup, NewRecord, Pagination, QueryPredicate, Record, RecordGroupStore,
    RepositoryResult, SortKey,
};

/// Snapshot of how often each store method was called
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCallStats {
    pub insert_group: usize,
    pub insert_record: usize,
    pub query_join: usize,
    pub count: usize,
    pub query_join_with_count: usize,
}

impl StoreCallStats {
    /// Calls that read from the store
    pub fn queries(&self) -> usize {
        self.query_join + self.count + self.query_join_with_count
    }

    /// Every call, reads and inserts
    pub fn total(&self) -> usize {
        self.queries() + self.insert_group + self.insert_record
    }
}

#[derive(Debug, Default)]
struct Counters {
    insert_group: AtomicUsize,
    insert_record: AtomicUsize,
    query_join: AtomicUsize,
    count: AtomicUsize,
    query_join_with_count: AtomicUsize,
}

/// Store wrapper that counts calls per method
#[derive(Debug, Default)]
pub struct InstrumentedStore<S> {
    inner: S,
    counters: Counters,
}

impl<S> InstrumentedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counters: Counters::default(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn stats(&self) -> StoreCallStats {
        let c = &self.counters;
        StoreCallStats {
            insert_group: c.insert_group.load(Ordering::Relaxed),
            insert_record: c.insert_record.load(Ordering::Relaxed),
            query_join: c.query_join.load(Ordering::Relaxed),
            count: c.count.load(Ordering::Relaxed),
            query_join_with_count: c.query_join_with_count.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter, e.g. after seeding
    pub fn reset(&self) {
        let c = &self.counters;
        for counter in [
            &c.insert_group,
            &c.insert_record,
            &c.query_join,
            &c.count,
            &c.query_join_with_count,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

fn bump(counter: &AtomicUsize, method: &'static str) {
    let calls = counter.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::trace!(method, calls, "store call");
}

impl<S: RecordGroupStore> RecordGroupStore for InstrumentedStore<S> {
    async fn insert_group(&self, group: NewGroup) -> RepositoryResult<Group> {
        bump(&self.counters.insert_group, "insert_group");
        self.inner.insert_group(group).await
    }

    async fn insert_record(&self, record: NewRecord) -> RepositoryResult<Record> {
        bump(&self.counters.insert_record, "insert_record");
        self.inner.insert_record(record).await
    }

    async fn query_join(
        &self,
        predicate: &QueryPredicate,
        sort: Option<&SortKey>,
        window: Option<Pagination>,
    ) -> RepositoryResult<Vec<JoinRow>> {
        bump(&self.counters.query_join, "query_join");
        self.inner.query_join(predicate, sort, window).await
    }

    async fn count(&self, predicate: &QueryPredicate) -> RepositoryResult<u64> {
        bump(&self.counters.count, "count");
        self.inner.count(predicate).await
    }

    async fn query_join_with_count(
        &self,
        predicate: &QueryPredicate,
        sort: Option<&SortKey>,
        window: Pagination,
    ) -> RepositoryResult<(Vec<JoinRow>, u64)> {
        bump(&self.counters.query_join_with_count, "query_join_with_count");
        self.inner
            .query_join_with_count(predicate, sort, window)
            .await
    }
}
