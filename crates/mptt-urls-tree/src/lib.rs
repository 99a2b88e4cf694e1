//! # mptt-urls-tree
//!
//! The persistence side of tree routing. Entities stored in a
//! parent-linked hierarchy are exposed as [`TreeNode`] values; a
//! [`TreeStore`] answers the two questions the resolver asks at every path
//! segment ("which root has this slug?" and "which child of this node has
//! this slug?").
//!
//! ## Modules
//!
//! - [`node`] - The [`TreeNode`] entity and its template representation
//! - [`model`] - [`ModelDescriptor`] and the string-keyed [`ModelRegistry`]
//! - [`store`] - The [`TreeStore`] trait and the ancestor walk
//! - [`memory`] - An in-memory store for tests and fixtures
//! - [`sqlite`] - A `rusqlite`-backed store (feature `sqlite`)
//! - [`path`] - Building canonical tree URLs from ancestor chains

pub mod memory;
pub mod model;
pub mod node;
pub mod path;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod store;

pub use memory::MemoryTreeStore;
pub use model::{ModelDescriptor, ModelRegistry};
pub use node::{TreeNode, TreeObject};
pub use path::{absolute_url, tree_path};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteTreeStore;
pub use store::{ancestors, TreeStore};
