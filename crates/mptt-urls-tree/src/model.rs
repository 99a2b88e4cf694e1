//! Model descriptors and the string-keyed model registry.
//!
//! Routing settings name models by dotted identifier
//! (`test_app.gallery.models.Category`). The [`ModelRegistry`] is populated at
//! startup and turns those identifiers into [`ModelDescriptor`] handles; an
//! identifier nobody registered fails with [`ConfigError::UnknownModel`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use mptt_urls_core::ConfigError;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Returns `true` if `name` can be used unquoted as a SQL table or column name.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Metadata for one tree model: where its rows live.
///
/// The identifier and table name the resolver needs for one model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelDescriptor {
    /// The dotted identifier used in settings.
    pub path: String,
    /// The application label (e.g. `gallery`).
    pub app_label: String,
    /// The lowercase model name (e.g. `category`).
    pub model_name: String,
    /// The table holding this model's rows.
    pub db_table: String,
}

impl ModelDescriptor {
    /// Creates a descriptor with an explicit table name.
    pub fn new(path: impl Into<String>, db_table: impl Into<String>) -> Result<Self, ConfigError> {
        let path = path.into();
        let db_table = db_table.into();
        if !is_identifier(&db_table) {
            return Err(ConfigError::InvalidTableName(db_table));
        }
        let (app_label, model_name) = split_path(&path);
        Ok(Self {
            path,
            app_label,
            model_name,
            db_table,
        })
    }

    /// Creates a descriptor whose table follows the `<app_label>_<model_name>`
    /// convention.
    ///
    /// # Examples
    ///
    /// ```
    /// use mptt_urls_tree::ModelDescriptor;
    ///
    /// let model = ModelDescriptor::from_path("test_app.gallery.models.Category").unwrap();
    /// assert_eq!(model.app_label, "gallery");
    /// assert_eq!(model.db_table, "gallery_category");
    /// ```
    pub fn from_path(path: impl Into<String>) -> Result<Self, ConfigError> {
        let path = path.into();
        let (app_label, model_name) = split_path(&path);
        let db_table = if app_label.is_empty() {
            model_name
        } else {
            format!("{app_label}_{model_name}")
        };
        Self::new(path, db_table)
    }
}

/// Splits `a.b.app.models.Class` into (`app`, `class`).
fn split_path(path: &str) -> (String, String) {
    let parts: Vec<&str> = path.split('.').collect();
    let model_name = parts.last().copied().unwrap_or_default().to_lowercase();
    let app_label = match parts.iter().rposition(|p| *p == "models") {
        Some(idx) if idx > 0 => parts[idx - 1],
        _ if parts.len() >= 2 => parts[parts.len() - 2],
        _ => "",
    };
    (app_label.to_string(), model_name)
}

/// A registry mapping dotted identifiers to [`ModelDescriptor`]s.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model under its own path, replacing any previous entry.
    pub fn register(&mut self, model: ModelDescriptor) {
        self.models.insert(model.path.clone(), model);
    }

    /// Registers a model by dotted path with the conventional table name.
    pub fn register_path(&mut self, path: &str) -> Result<ModelDescriptor, ConfigError> {
        let model = ModelDescriptor::from_path(path)?;
        self.register(model.clone());
        Ok(model)
    }

    /// Looks up a model by identifier.
    pub fn get(&self, path: &str) -> Result<&ModelDescriptor, ConfigError> {
        self.models
            .get(path)
            .ok_or_else(|| ConfigError::UnknownModel(path.to_string()))
    }

    /// Returns `true` if `path` is registered.
    pub fn contains(&self, path: &str) -> bool {
        self.models.contains_key(path)
    }

    /// Returns the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if no models are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
