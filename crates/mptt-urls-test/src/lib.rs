//! # mptt-urls-test
//!
//! Testing utilities for mptt-urls. Provides a request factory for calling the
//! resolver directly, a test client for exercising a mounted router, tree
//! fixtures standing in for model factories, and a query-counting store.

pub mod assert_queries;
pub mod client;
pub mod fixtures;
pub mod request_factory;

pub use assert_queries::{assert_max_queries, assert_num_queries, CountingStore, QueryKind, QueryRecord};
pub use client::{TestClient, TestResponse};
pub use fixtures::{gallery, gallery_settings, Gallery, TreeFixture, CATEGORY, PHOTO};
pub use request_factory::RequestFactory;
