//! The tree-query capability.
//!
//! [`TreeStore`] is the only thing the resolver needs from persistence:
//! root lookup and child lookup, each filtered by an exact slug, plus a
//! primary-key fetch used to walk ancestors. Implementations are synchronous;
//! the resolver runs one query per path segment and never writes.

use std::collections::HashSet;
use std::sync::Arc;

use mptt_urls_core::{MpttError, MpttResult};

use crate::model::ModelDescriptor;
use crate::node::TreeNode;

/// Read access to parent-linked trees.
pub trait TreeStore: Send + Sync {
    /// Returns the root-level entities of `model` whose slug equals `slug`.
    fn roots(&self, model: &ModelDescriptor, slug: &str) -> MpttResult<Vec<TreeNode>>;

    /// Returns the entities of `model` whose parent is `parent` and whose slug
    /// equals `slug`.
    fn children(
        &self,
        model: &ModelDescriptor,
        parent: &TreeNode,
        slug: &str,
    ) -> MpttResult<Vec<TreeNode>>;

    /// Fetches one entity of `model` by primary key.
    fn get(&self, model: &ModelDescriptor, id: i64) -> MpttResult<Option<TreeNode>>;
}

impl<T: TreeStore + ?Sized> TreeStore for Arc<T> {
    fn roots(&self, model: &ModelDescriptor, slug: &str) -> MpttResult<Vec<TreeNode>> {
        (**self).roots(model, slug)
    }

    fn children(
        &self,
        model: &ModelDescriptor,
        parent: &TreeNode,
        slug: &str,
    ) -> MpttResult<Vec<TreeNode>> {
        (**self).children(model, parent, slug)
    }

    fn get(&self, model: &ModelDescriptor, id: i64) -> MpttResult<Option<TreeNode>> {
        (**self).get(model, id)
    }
}

impl<T: TreeStore + ?Sized> TreeStore for &T {
    fn roots(&self, model: &ModelDescriptor, slug: &str) -> MpttResult<Vec<TreeNode>> {
        (**self).roots(model, slug)
    }

    fn children(
        &self,
        model: &ModelDescriptor,
        parent: &TreeNode,
        slug: &str,
    ) -> MpttResult<Vec<TreeNode>> {
        (**self).children(model, parent, slug)
    }

    fn get(&self, model: &ModelDescriptor, id: i64) -> MpttResult<Option<TreeNode>> {
        (**self).get(model, id)
    }
}

/// Returns the ancestors of `entity`, outermost first.
///
/// Parents are loaded from `node_model` (a leaf's parent is a node). A
/// dangling parent id ends the walk; a parent cycle is reported as a
/// database error.
pub fn ancestors(
    store: &dyn TreeStore,
    node_model: &ModelDescriptor,
    entity: &TreeNode,
) -> MpttResult<Vec<TreeNode>> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut next = entity.parent_id;

    while let Some(id) = next {
        if !seen.insert(id) {
            return Err(MpttError::DatabaseError(format!(
                "parent cycle detected at {} id {id}",
                node_model.db_table
            )));
        }
        let Some(parent) = store.get(node_model, id)? else {
            tracing::warn!(table = %node_model.db_table, id, "dangling parent reference");
            break;
        };
        next = parent.parent_id;
        chain.push(parent);
    }

    chain.reverse();
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTreeStore;

    #[test]
    fn test_ancestors_outermost_first() {
        let store = MemoryTreeStore::new();
        let category = ModelDescriptor::from_path("test_app.gallery.models.Category").unwrap();
        let photo = ModelDescriptor::from_path("test_app.gallery.models.Photo").unwrap();

        let level1 = store.insert(&category, "level1", None);
        let level2 = store.insert(&category, "level2", Some(&level1));
        let photo1 = store.insert(&photo, "photo1", Some(&level2));

        let chain = ancestors(&store, &category, &photo1).unwrap();
        let slugs: Vec<&str> = chain.iter().map(|n| n.slug.as_str()).collect();
        assert_eq!(slugs, vec!["level1", "level2"]);

        assert!(ancestors(&store, &category, &level1).unwrap().is_empty());
    }

    #[test]
    fn test_ancestors_cycle() {
        let store = MemoryTreeStore::new();
        let category = ModelDescriptor::from_path("gallery.Category").unwrap();
        store.insert_node(TreeNode::new(1, "a", Some(2), &category.path), &category);
        store.insert_node(TreeNode::new(2, "b", Some(1), &category.path), &category);

        let start = TreeNode::new(3, "c", Some(1), &category.path);
        let err = ancestors(&store, &category, &start).unwrap_err();
        assert!(err.to_string().contains("parent cycle"));
    }

    #[test]
    fn test_ancestors_dangling_parent() {
        let store = MemoryTreeStore::new();
        let category = ModelDescriptor::from_path("gallery.Category").unwrap();
        let orphan = TreeNode::new(5, "orphan", Some(99), &category.path);
        assert!(ancestors(&store, &category, &orphan).unwrap().is_empty());
    }

    #[test]
    fn test_arc_store_delegates() {
        let store = Arc::new(MemoryTreeStore::new());
        let category = ModelDescriptor::from_path("gallery.Category").unwrap();
        let root = store.insert(&category, "root", None);

        let shared: Arc<dyn TreeStore> = store;
        assert_eq!(shared.roots(&category, "root").unwrap(), vec![root.clone()]);
        assert_eq!(shared.get(&category, root.id).unwrap(), Some(root));
    }
}
