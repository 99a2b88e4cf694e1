//! Settings for mptt-urls.
//!
//! [`MpttUrlsSettings`] is the declarative `node` / `leaf` routing table as a
//! user writes it. It is deliberately loose (every value optional) so that
//! the validator in `mptt-urls-views` can report precisely what is missing.
//! [`Settings`] wraps it together with the ambient application settings.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A hierarchy level role.
///
/// A `Node` level continues resolution into its children; a `Leaf` level
/// terminates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// An intermediate tree level.
    Node,
    /// The terminal tree level.
    Leaf,
}

impl Role {
    /// Returns the settings key for this role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Leaf => "leaf",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The settings table for one level (`[mptt_urls.node]` or `[mptt_urls.leaf]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    /// Identifier of the model queried at this level (e.g. `gallery.models.Category`).
    pub model: Option<String>,
    /// Template rendered when this level terminates resolution.
    pub template: Option<String>,
    /// Registered view invoked when this level terminates resolution.
    pub view: Option<String>,
}

impl LevelSettings {
    /// Creates a level table naming only a model.
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Sets the template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Sets the view.
    #[must_use]
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Returns `true` if no value at all is set.
    pub const fn is_empty(&self) -> bool {
        self.model.is_none() && self.template.is_none() && self.view.is_none()
    }
}

/// The routing settings: one table per role.
///
/// # Examples
///
/// ```
/// use mptt_urls_core::settings::{LevelSettings, MpttUrlsSettings};
/// use mptt_urls_core::Role;
///
/// let settings = MpttUrlsSettings::new()
///     .with_node(LevelSettings::model("gallery.models.Category").with_template("category.html"))
///     .with_leaf(LevelSettings::model("gallery.models.Photo").with_template("photo.html"));
///
/// assert!(settings.level(Role::Node).is_some());
/// assert!(settings.level(Role::Leaf).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpttUrlsSettings {
    /// Settings for intermediate levels.
    pub node: Option<LevelSettings>,
    /// Settings for the terminal level.
    pub leaf: Option<LevelSettings>,
}

impl MpttUrlsSettings {
    /// Creates empty routing settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `node` table.
    #[must_use]
    pub fn with_node(mut self, node: LevelSettings) -> Self {
        self.node = Some(node);
        self
    }

    /// Sets the `leaf` table.
    #[must_use]
    pub fn with_leaf(mut self, leaf: LevelSettings) -> Self {
        self.leaf = Some(leaf);
        self
    }

    /// Returns the table for `role`, treating an empty table as absent.
    pub fn level(&self, role: Role) -> Option<&LevelSettings> {
        let level = match role {
            Role::Node => self.node.as_ref(),
            Role::Leaf => self.leaf.as_ref(),
        };
        level.filter(|l| !l.is_empty())
    }
}

/// Template engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSettings {
    /// Directories to search for template files.
    pub dirs: Vec<PathBuf>,
}

/// Tree store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path of the `SQLite` database file (or `:memory:`).
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db.sqlite3"),
        }
    }
}

/// The complete set of application settings.
///
/// # Examples
///
/// ```
/// use mptt_urls_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.url_prefix, "/");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The log level filter (e.g. "info", "`mptt_urls_views=debug`").
    pub log_level: String,
    /// URL prefix under which the tree is mounted.
    pub url_prefix: String,
    /// Template engine configuration.
    pub templates: TemplateSettings,
    /// Tree store configuration.
    pub database: DatabaseSettings,
    /// The `node` / `leaf` routing settings.
    pub mptt_urls: MpttUrlsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            url_prefix: "/".to_string(),
            templates: TemplateSettings::default(),
            database: DatabaseSettings::default(),
            mptt_urls: MpttUrlsSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.database.path, PathBuf::from("db.sqlite3"));
        assert!(s.templates.dirs.is_empty());
        assert!(s.mptt_urls.node.is_none());
        assert!(s.mptt_urls.leaf.is_none());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Node.to_string(), "node");
        assert_eq!(Role::Leaf.as_str(), "leaf");
    }

    #[test]
    fn test_empty_level_counts_as_absent() {
        let settings = MpttUrlsSettings::new().with_node(LevelSettings::default());
        assert!(settings.node.is_some());
        assert!(settings.level(Role::Node).is_none());
    }

    #[test]
    fn test_level_builder() {
        let level = LevelSettings::model("a.B").with_template("t").with_view("v");
        assert_eq!(level.model.as_deref(), Some("a.B"));
        assert_eq!(level.template.as_deref(), Some("t"));
        assert_eq!(level.view.as_deref(), Some("v"));
        assert!(!level.is_empty());
    }

    #[test]
    fn test_deserialize_partial_level() {
        let settings: MpttUrlsSettings =
            serde_json::from_str(r#"{"node": {"model": "gallery.models.Category"}}"#).unwrap();
        assert_eq!(
            settings.level(Role::Node).and_then(|l| l.model.as_deref()),
            Some("gallery.models.Category")
        );
        assert!(settings.leaf.is_none());
    }
}
