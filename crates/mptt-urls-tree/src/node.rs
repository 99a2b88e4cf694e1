//! Tree entities.
//!
//! A [`TreeNode`] is one persisted row of a tree model: a slug unique among
//! its siblings, an optional parent (null at a tree root), and any further
//! columns the model carries, kept as JSON so they can go straight into a
//! template context.

use serde::Serialize;

/// A persisted entity in a parent-linked hierarchy.
///
/// Node-role and leaf-role entities share this representation; which role an
/// entity plays depends on the model it was loaded from.
///
/// # Examples
///
/// ```
/// use mptt_urls_tree::TreeNode;
///
/// let photo = TreeNode::new(3, "photo1", Some(2), "test_app.gallery.models.Photo")
///     .with_field("title", "Sunset");
///
/// assert_eq!(photo.slug, "photo1");
/// assert_eq!(photo.parent_id, Some(2));
/// assert_eq!(photo.to_context()["title"], "Sunset");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    /// Primary key.
    pub id: i64,
    /// URL segment, unique among siblings.
    pub slug: String,
    /// Primary key of the parent node, `None` at a tree root.
    pub parent_id: Option<i64>,
    /// Identifier of the model this entity was loaded from.
    pub model: String,
    /// Remaining columns.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl TreeNode {
    /// Creates an entity with no extra fields.
    pub fn new(
        id: i64,
        slug: impl Into<String>,
        parent_id: Option<i64>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id,
            slug: slug.into(),
            parent_id,
            model: model.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Adds an extra field.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Returns an extra field.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// Returns `true` if this entity sits at a tree root.
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns the flat JSON object used as `object` in template contexts.
    ///
    /// Extra fields are merged next to `id`, `slug`, `parent_id` and `model`;
    /// those four keys win over an extra field of the same name.
    pub fn to_context(&self) -> serde_json::Value {
        let mut map = self.fields.clone();
        map.insert("id".to_string(), self.id.into());
        map.insert("slug".to_string(), self.slug.clone().into());
        map.insert(
            "parent_id".to_string(),
            self.parent_id.map_or(serde_json::Value::Null, Into::into),
        );
        map.insert("model".to_string(), self.model.clone().into());
        serde_json::Value::Object(map)
    }
}

/// What a resolved path points at: a stored entity, or the superroot.
///
/// The superroot is the virtual node above every tree root. It is what the
/// empty path resolves to when no root scope is given.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeObject {
    /// The virtual node above all roots.
    SuperRoot,
    /// A stored entity.
    Entity(TreeNode),
}

impl TreeObject {
    /// Returns the stored entity, or `None` for the superroot.
    pub const fn entity(&self) -> Option<&TreeNode> {
        match self {
            Self::SuperRoot => None,
            Self::Entity(node) => Some(node),
        }
    }

    /// Returns `true` for the superroot.
    pub const fn is_superroot(&self) -> bool {
        matches!(self, Self::SuperRoot)
    }

    /// Returns the template representation (see [`TreeNode::to_context`]).
    pub fn to_context(&self) -> serde_json::Value {
        match self {
            Self::SuperRoot => serde_json::json!({ "is_superroot": true }),
            Self::Entity(node) => node.to_context(),
        }
    }
}
