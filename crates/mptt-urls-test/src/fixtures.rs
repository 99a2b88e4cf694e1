//! Tree fixtures.
//!
//! [`TreeFixture`] builds trees in a [`MemoryTreeStore`] the way a model
//! factory builds rows: give it a slug and a parent, get the saved entity
//! back. [`gallery`] builds the small category/photo tree most tests use:
//!
//! ```text
//! level1 (Category)
//! └── level2 (Category)
//!     └── photo1 (Photo)
//! ```

use std::sync::Arc;

use mptt_urls_core::settings::{LevelSettings, MpttUrlsSettings};
use mptt_urls_tree::{MemoryTreeStore, ModelDescriptor, ModelRegistry, TreeNode, TreeStore};

/// Model identifier of the gallery's node model.
pub const CATEGORY: &str = "test_app.gallery.models.Category";

/// Model identifier of the gallery's leaf model.
pub const PHOTO: &str = "test_app.gallery.models.Photo";

/// A model registry paired with an in-memory store.
#[derive(Debug, Default)]
pub struct TreeFixture {
    store: Arc<MemoryTreeStore>,
    models: ModelRegistry,
}

impl TreeFixture {
    /// Creates an empty fixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model by its dotted identifier.
    ///
    /// # Panics
    ///
    /// Panics if the identifier does not map to a valid table name.
    pub fn register(&mut self, path: &str) -> ModelDescriptor {
        self.models
            .register_path(path)
            .unwrap_or_else(|e| panic!("cannot register {path}: {e}"))
    }

    /// Saves a node under `parent`, or at the root when `None`.
    pub fn make_node(&self, model: &ModelDescriptor, slug: &str, parent: Option<&TreeNode>) -> TreeNode {
        self.store.insert(model, slug, parent)
    }

    /// Saves a leaf under `parent`.
    pub fn make_leaf(&self, model: &ModelDescriptor, slug: &str, parent: &TreeNode) -> TreeNode {
        self.store.insert(model, slug, Some(parent))
    }

    /// Saves a leaf carrying extra fields.
    pub fn make_leaf_with(
        &self,
        model: &ModelDescriptor,
        slug: &str,
        parent: &TreeNode,
        fields: serde_json::Value,
    ) -> TreeNode {
        let fields = match fields {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        self.store.insert_with_fields(model, slug, Some(parent), fields)
    }

    /// Saves a chain of nested nodes, outermost first, below `parent`.
    pub fn make_chain(&self, model: &ModelDescriptor, slugs: &[&str], parent: Option<&TreeNode>) -> Vec<TreeNode> {
        let mut chain: Vec<TreeNode> = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let node = self.make_node(model, slug, chain.last().or(parent));
            chain.push(node);
        }
        chain
    }

    /// Returns the store as a trait object.
    pub fn store(&self) -> Arc<dyn TreeStore> {
        self.store.clone()
    }

    /// Returns the concrete in-memory store.
    pub fn memory_store(&self) -> &Arc<MemoryTreeStore> {
        &self.store
    }

    /// Returns the model registry.
    pub const fn models(&self) -> &ModelRegistry {
        &self.models
    }
}

/// The gallery tree.
#[derive(Debug)]
pub struct Gallery {
    /// The fixture holding the store and registry.
    pub fixture: TreeFixture,
    /// The node model.
    pub category: ModelDescriptor,
    /// The leaf model.
    pub photo: ModelDescriptor,
    /// Root category.
    pub level1: TreeNode,
    /// Category below `level1`.
    pub level2: TreeNode,
    /// Photo below `level2`.
    pub photo1: TreeNode,
}

impl Gallery {
    /// Returns the store as a trait object.
    pub fn store(&self) -> Arc<dyn TreeStore> {
        self.fixture.store()
    }

    /// Returns the model registry.
    pub const fn models(&self) -> &ModelRegistry {
        self.fixture.models()
    }
}

/// Builds `level1 → level2 → photo1` with the gallery models registered.
pub fn gallery() -> Gallery {
    let mut fixture = TreeFixture::new();
    let category = fixture.register(CATEGORY);
    let photo = fixture.register(PHOTO);
    let level1 = fixture.make_node(&category, "level1", None);
    let level2 = fixture.make_node(&category, "level2", Some(&level1));
    let photo1 = fixture.make_leaf(&photo, "photo1", &level2);
    Gallery {
        fixture,
        category,
        photo,
        level1,
        level2,
        photo1,
    }
}

/// Routing settings for the gallery: both levels render a template.
pub fn gallery_settings() -> MpttUrlsSettings {
    MpttUrlsSettings::new()
        .with_node(LevelSettings::model(CATEGORY).with_template("gallery/category.html"))
        .with_leaf(LevelSettings::model(PHOTO).with_template("gallery/photo.html"))
}
