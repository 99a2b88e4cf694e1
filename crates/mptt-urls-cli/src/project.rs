//! The state every command runs against.
//!
//! A [`Project`] bundles the loaded [`Settings`] with the model and view
//! registries. Models named in the routing settings are registered
//! automatically under their conventional table names; views are callables and
//! must be supplied by the embedding application.

use std::path::Path;
use std::sync::Arc;

use mptt_urls_core::{ConfigError, MpttResult, Role, Settings};
use mptt_urls_tree::{ModelRegistry, SqliteTreeStore, TreeStore};
use mptt_urls_views::{MpttResolver, ResolutionConfig, ViewRegistry};

/// Settings plus registries.
#[derive(Debug)]
pub struct Project {
    settings: Settings,
    models: ModelRegistry,
    views: ViewRegistry,
}

impl Project {
    /// Creates a project, registering every model the settings name.
    ///
    /// Identifiers that do not map to a table name are skipped here and
    /// reported when the configuration is bound.
    pub fn new(settings: Settings, views: ViewRegistry) -> Self {
        let mut models = ModelRegistry::new();
        for role in [Role::Node, Role::Leaf] {
            let Some(model) = settings
                .mptt_urls
                .level(role)
                .and_then(|level| level.model.as_deref())
            else {
                continue;
            };
            if models.contains(model) {
                continue;
            }
            if let Err(err) = models.register_path(model) {
                tracing::warn!(role = %role, error = %err, "model not registered");
            }
        }
        Self::with_models(settings, models, views)
    }

    /// Creates a project with explicit registries.
    pub const fn with_models(settings: Settings, models: ModelRegistry, views: ViewRegistry) -> Self {
        Self {
            settings,
            models,
            views,
        }
    }

    /// Returns the settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the model registry.
    pub const fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Returns the view registry.
    pub const fn views(&self) -> &ViewRegistry {
        &self.views
    }

    /// Binds the routing settings.
    pub fn config(&self) -> Result<ResolutionConfig, ConfigError> {
        ResolutionConfig::from_settings(&self.settings.mptt_urls, &self.models, &self.views)
    }

    /// Opens the configured `SQLite` database, or `database` when given.
    ///
    /// The database is opened read-only and must already exist.
    pub fn open_store(&self, database: Option<&Path>) -> MpttResult<SqliteTreeStore> {
        let path = database.unwrap_or(self.settings.database.path.as_path());
        tracing::debug!(path = %path.display(), "opening tree database");
        SqliteTreeStore::open_read_only(path)
    }

    /// Builds a resolver over `store`.
    pub fn resolver(&self, store: Arc<dyn TreeStore>) -> MpttResult<MpttResolver> {
        MpttResolver::from_settings(&self.settings, &self.models, &self.views, store)
    }
}

#[cfg(test)]
mod tests {
    use mptt_urls_core::settings::{LevelSettings, MpttUrlsSettings};

    use super::*;

    fn settings(node: &str, leaf: &str) -> Settings {
        Settings {
            mptt_urls: MpttUrlsSettings::new()
                .with_node(LevelSettings::model(node).with_template("c.html"))
                .with_leaf(LevelSettings::model(leaf).with_template("p.html")),
            ..Settings::default()
        }
    }

    #[test]
    fn test_models_registered_from_settings() {
        let project = Project::new(
            settings("gallery.models.Category", "gallery.models.Photo"),
            ViewRegistry::new(),
        );
        assert_eq!(project.models().len(), 2);
        assert_eq!(
            project.models().get("gallery.models.Photo").unwrap().db_table,
            "gallery_photo"
        );
        assert!(project.config().is_ok());
    }

    #[test]
    fn test_shared_model_registered_once() {
        let project = Project::new(
            settings("docs.models.Page", "docs.models.Page"),
            ViewRegistry::new(),
        );
        assert_eq!(project.models().len(), 1);
    }

    #[test]
    fn test_invalid_model_reported_on_bind() {
        let project = Project::new(settings("not a model", "gallery.models.Photo"), ViewRegistry::new());
        assert_eq!(
            project.config().unwrap_err(),
            ConfigError::UnknownModel("not a model".to_string())
        );
    }

    #[test]
    fn test_open_store_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.sqlite3");
        SqliteTreeStore::open(&path).unwrap();
        let project = Project::new(Settings::default(), ViewRegistry::new());
        let store = project.open_store(Some(path.as_path())).unwrap();
        assert_eq!(store.path(), &path);
    }

    #[test]
    fn test_open_store_does_not_create_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.sqlite3");
        let project = Project::new(Settings::default(), ViewRegistry::new());
        let err = project.open_store(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, mptt_urls_core::MpttError::OperationalError(_)));
        assert!(!path.exists());
    }
}
