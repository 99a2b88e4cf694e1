//! Query counting for tree resolution tests.
//!
//! [`CountingStore`] wraps any [`TreeStore`] and records every lookup it
//! forwards. [`assert_num_queries`] uses it to pin down how many store reads a
//! resolution performs: one per path segment, none for a rejected
//! configuration.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mptt_urls_test::assert_queries::{assert_num_queries, CountingStore};
//! use mptt_urls_test::fixtures::gallery;
//! use mptt_urls_tree::TreeStore;
//!
//! let g = gallery();
//! let store = CountingStore::new(g.store());
//!
//! assert_num_queries(&store, 2, || {
//!     store.roots(&g.category, "level1").unwrap();
//!     store.children(&g.category, &g.level1, "level2").unwrap();
//! });
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use mptt_urls_core::MpttResult;
use mptt_urls_tree::{ModelDescriptor, TreeNode, TreeStore};

/// Which lookup a query was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// A root lookup.
    Roots,
    /// A child lookup.
    Children,
    /// A primary-key fetch.
    Get,
}

/// One recorded lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    /// The lookup kind.
    pub kind: QueryKind,
    /// The table queried.
    pub table: String,
    /// The slug filter, or the primary key for [`QueryKind::Get`].
    pub key: String,
}

/// A [`TreeStore`] that counts the lookups it forwards.
pub struct CountingStore {
    inner: Arc<dyn TreeStore>,
    count: AtomicUsize,
    log: Mutex<Vec<QueryRecord>>,
}

impl CountingStore {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn TreeStore>) -> Self {
        Self {
            inner,
            count: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of lookups since creation or the last reset.
    pub fn query_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Returns the recorded lookups in order.
    pub fn queries(&self) -> Vec<QueryRecord> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resets the counter and the log.
    pub fn reset_query_count(&self) {
        self.count.store(0, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, kind: QueryKind, model: &ModelDescriptor, key: String) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(QueryRecord {
                kind,
                table: model.db_table.clone(),
                key,
            });
    }
}

impl TreeStore for CountingStore {
    fn roots(&self, model: &ModelDescriptor, slug: &str) -> MpttResult<Vec<TreeNode>> {
        self.record(QueryKind::Roots, model, slug.to_string());
        self.inner.roots(model, slug)
    }

    fn children(
        &self,
        model: &ModelDescriptor,
        parent: &TreeNode,
        slug: &str,
    ) -> MpttResult<Vec<TreeNode>> {
        self.record(QueryKind::Children, model, slug.to_string());
        self.inner.children(model, parent, slug)
    }

    fn get(&self, model: &ModelDescriptor, id: i64) -> MpttResult<Option<TreeNode>> {
        self.record(QueryKind::Get, model, id.to_string());
        self.inner.get(model, id)
    }
}

impl std::fmt::Debug for CountingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountingStore")
            .field("count", &self.query_count())
            .finish_non_exhaustive()
    }
}

/// Asserts that exactly `expected_count` lookups happen during `f`.
///
/// # Panics
///
/// Panics if the number of lookups does not match `expected_count`.
pub fn assert_num_queries<F>(store: &CountingStore, expected_count: usize, f: F)
where
    F: FnOnce(),
{
    store.reset_query_count();
    f();
    let actual = store.query_count();
    assert_eq!(
        actual, expected_count,
        "Expected {expected_count} queries, but {actual} were executed: {:?}",
        store.queries()
    );
}

/// Asserts that at most `max_count` lookups happen during `f`.
///
/// # Panics
///
/// Panics if more than `max_count` lookups happen.
pub fn assert_max_queries<F>(store: &CountingStore, max_count: usize, f: F)
where
    F: FnOnce(),
{
    store.reset_query_count();
    f();
    let actual = store.query_count();
    assert!(
        actual <= max_count,
        "Expected at most {max_count} queries, but {actual} were executed"
    );
}
