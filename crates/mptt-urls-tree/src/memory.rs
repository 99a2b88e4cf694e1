//! An in-memory [`TreeStore`].
//!
//! Rows are kept per table in insertion order, behind an `RwLock`. Used by the
//! test fixtures and handy for small static trees.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{PoisonError, RwLock};

use mptt_urls_core::MpttResult;

use crate::model::ModelDescriptor;
use crate::node::TreeNode;
use crate::store::TreeStore;

/// A thread-safe in-memory tree store.
///
/// # Examples
///
/// ```
/// use mptt_urls_tree::{MemoryTreeStore, ModelDescriptor, TreeStore};
///
/// let store = MemoryTreeStore::new();
/// let category = ModelDescriptor::from_path("gallery.models.Category").unwrap();
/// let level1 = store.insert(&category, "level1", None);
/// store.insert(&category, "level2", Some(&level1));
///
/// let found = store.children(&category, &level1, "level2").unwrap();
/// assert_eq!(found.len(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryTreeStore {
    tables: RwLock<HashMap<String, Vec<TreeNode>>>,
    next_id: AtomicI64,
}

impl Default for MemoryTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTreeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Inserts a row with a fresh primary key and returns it.
    pub fn insert(
        &self,
        model: &ModelDescriptor,
        slug: &str,
        parent: Option<&TreeNode>,
    ) -> TreeNode {
        self.insert_with_fields(model, slug, parent, serde_json::Map::new())
    }

    /// Inserts a row carrying extra fields and returns it.
    pub fn insert_with_fields(
        &self,
        model: &ModelDescriptor,
        slug: &str,
        parent: Option<&TreeNode>,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> TreeNode {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let node = TreeNode {
            id,
            slug: slug.to_string(),
            parent_id: parent.map(|p| p.id),
            model: model.path.clone(),
            fields,
        };
        self.insert_node(node.clone(), model);
        node
    }

    /// Inserts a prebuilt row, keeping its primary key.
    pub fn insert_node(&self, node: TreeNode, model: &ModelDescriptor) {
        self.next_id.fetch_max(node.id + 1, Ordering::Relaxed);
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(model.db_table.clone())
            .or_default()
            .push(node);
    }

    /// Returns the number of rows stored for `model`.
    pub fn count(&self, model: &ModelDescriptor) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&model.db_table)
            .map_or(0, Vec::len)
    }

    fn filter(
        &self,
        model: &ModelDescriptor,
        predicate: impl Fn(&TreeNode) -> bool,
    ) -> Vec<TreeNode> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&model.db_table)
            .map(|rows| rows.iter().filter(|n| predicate(n)).cloned().collect())
            .unwrap_or_default()
    }
}

impl TreeStore for MemoryTreeStore {
    fn roots(&self, model: &ModelDescriptor, slug: &str) -> MpttResult<Vec<TreeNode>> {
        Ok(self.filter(model, |n| n.parent_id.is_none() && n.slug == slug))
    }

    fn children(
        &self,
        model: &ModelDescriptor,
        parent: &TreeNode,
        slug: &str,
    ) -> MpttResult<Vec<TreeNode>> {
        Ok(self.filter(model, |n| n.parent_id == Some(parent.id) && n.slug == slug))
    }

    fn get(&self, model: &ModelDescriptor, id: i64) -> MpttResult<Option<TreeNode>> {
        Ok(self.filter(model, |n| n.id == id).into_iter().next())
    }
}
