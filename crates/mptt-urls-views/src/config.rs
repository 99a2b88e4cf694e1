//! Routing configuration: validation and binding.
//!
//! Raw [`MpttUrlsSettings`] are checked once, at startup, and bound into an
//! immutable [`ResolutionConfig`] whose model and view identifiers have been
//! replaced by typed handles. Checks short-circuit in a fixed order so that a
//! structurally incomplete table is reported before any template/view problem:
//!
//! 1. the `node` table is present, then the `leaf` table
//! 2. each table names a `model`
//! 3. no table sets both `template` and `view` (node, then leaf)
//! 4. the leaf table sets one of `template` or `view`
//! 5. every model and view identifier is registered
//!
//! Whether the node table must also render depends on the requested path
//! (only a path ending at a node renders one), so that last check runs per
//! request through [`ResolutionConfig::render_spec`].

use std::fmt;

use mptt_urls_core::settings::{LevelSettings, MpttUrlsSettings};
use mptt_urls_core::{ConfigError, Role};
use mptt_urls_tree::{ModelDescriptor, ModelRegistry};

use crate::views::{ViewHandler, ViewRegistry};

/// How a level renders the object it terminates on.
#[derive(Clone)]
pub enum RenderSpec {
    /// Render the named template with the object in context.
    Template(String),
    /// Call a registered view.
    View {
        /// The registered name.
        name: String,
        /// The callable.
        handler: ViewHandler,
    },
}

impl fmt::Debug for RenderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(name) => f.debug_tuple("Template").field(name).finish(),
            Self::View { name, .. } => f.debug_struct("View").field("name", name).finish_non_exhaustive(),
        }
    }
}

/// One bound level: the model queried and how the level renders.
#[derive(Debug, Clone)]
pub struct LevelSpec {
    /// The model queried at this level.
    pub model: ModelDescriptor,
    /// The render strategy; `None` for a node that only passes through.
    pub render: Option<RenderSpec>,
}

/// A validated, immutable routing configuration.
///
/// One node spec applies to every intermediate depth; the leaf spec applies to
/// the final segment of a leaf path.
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    node: LevelSpec,
    leaf: LevelSpec,
}

impl ResolutionConfig {
    /// Validates `settings` and binds its identifiers.
    pub fn from_settings(
        settings: &MpttUrlsSettings,
        models: &ModelRegistry,
        views: &ViewRegistry,
    ) -> Result<Self, ConfigError> {
        let (node, leaf) = check_structure(settings)?;
        let node_model = bind_model(node, models)?;
        let leaf_model = bind_model(leaf, models)?;
        Ok(Self {
            node: LevelSpec {
                model: node_model,
                render: bind_render(node, views)?,
            },
            leaf: LevelSpec {
                model: leaf_model,
                render: bind_render(leaf, views)?,
            },
        })
    }

    /// Returns the node spec.
    pub const fn node(&self) -> &LevelSpec {
        &self.node
    }

    /// Returns the leaf spec.
    pub const fn leaf(&self) -> &LevelSpec {
        &self.leaf
    }

    /// Returns the level settings bound for `role`.
    pub const fn level(&self, role: Role) -> &LevelSpec {
        match role {
            Role::Node => &self.node,
            Role::Leaf => &self.leaf,
        }
    }

    /// Returns how a path terminating at `role` renders.
    ///
    /// Fails with [`ConfigError::MissingRenderSpec`] when the level is a
    /// pass-through node.
    pub fn render_spec(&self, role: Role) -> Result<&RenderSpec, ConfigError> {
        self.level(role)
            .render
            .as_ref()
            .ok_or(ConfigError::MissingRenderSpec { role })
    }
}

/// Validates raw settings for a path terminating at `terminal`.
///
/// Runs the same ordered checks as [`ResolutionConfig::from_settings`], minus
/// the registry lookups, plus the render requirement of the terminal level.
///
/// # Examples
///
/// ```
/// use mptt_urls_core::settings::{LevelSettings, MpttUrlsSettings};
/// use mptt_urls_core::Role;
/// use mptt_urls_views::config::validate;
///
/// let settings = MpttUrlsSettings::new()
///     .with_node(LevelSettings::model("gallery.models.Category"));
///
/// let err = validate(&settings, Role::Node).unwrap_err();
/// assert!(err.to_string().starts_with("'leaf' settings cannot"));
/// ```
pub fn validate(settings: &MpttUrlsSettings, terminal: Role) -> Result<(), ConfigError> {
    let (node, leaf) = check_structure(settings)?;
    let level = match terminal {
        Role::Node => node,
        Role::Leaf => leaf,
    };
    if level.template.is_none() && level.view.is_none() {
        return Err(ConfigError::MissingRenderSpec { role: terminal });
    }
    Ok(())
}

fn check_structure(
    settings: &MpttUrlsSettings,
) -> Result<(&LevelSettings, &LevelSettings), ConfigError> {
    let node = settings
        .level(Role::Node)
        .ok_or(ConfigError::MissingRoleConfig { role: Role::Node })?;
    let leaf = settings
        .level(Role::Leaf)
        .ok_or(ConfigError::MissingRoleConfig { role: Role::Leaf })?;

    for (role, level) in [(Role::Node, node), (Role::Leaf, leaf)] {
        if level.model.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingModel { role });
        }
    }

    for (role, level) in [(Role::Node, node), (Role::Leaf, leaf)] {
        if level.template.is_some() && level.view.is_some() {
            return Err(ConfigError::RedundantRenderSpec { role });
        }
    }

    if leaf.template.is_none() && leaf.view.is_none() {
        return Err(ConfigError::MissingRenderSpec { role: Role::Leaf });
    }

    Ok((node, leaf))
}

fn bind_model(level: &LevelSettings, models: &ModelRegistry) -> Result<ModelDescriptor, ConfigError> {
    models
        .get(level.model.as_deref().unwrap_or_default())
        .cloned()
}

fn bind_render(level: &LevelSettings, views: &ViewRegistry) -> Result<Option<RenderSpec>, ConfigError> {
    Ok(match (&level.template, &level.view) {
        (Some(template), _) => Some(RenderSpec::Template(template.clone())),
        (None, Some(view)) => Some(RenderSpec::View {
            name: view.clone(),
            handler: views.get(view)?,
        }),
        (None, None) => None,
    })
}

#[cfg(test)]
mod tests {
    use mptt_urls_http::HttpResponse;

    use super::*;

    const CATEGORY: &str = "test_app.gallery.models.Category";
    const PHOTO: &str = "test_app.gallery.models.Photo";

    fn registries() -> (ModelRegistry, ViewRegistry) {
        let mut models = ModelRegistry::new();
        models.register_path(CATEGORY).unwrap();
        models.register_path(PHOTO).unwrap();
        let mut views = ViewRegistry::new();
        views.register("a.view", |_, _| HttpResponse::ok("view"));
        (models, views)
    }

    fn bind(settings: &MpttUrlsSettings) -> Result<ResolutionConfig, ConfigError> {
        let (models, views) = registries();
        ResolutionConfig::from_settings(settings, &models, &views)
    }

    #[test]
    fn test_leaf_required() {
        let settings = MpttUrlsSettings::new().with_node(LevelSettings::model(CATEGORY));
        let err = bind(&settings).unwrap_err();
        assert_eq!(err, ConfigError::MissingRoleConfig { role: Role::Leaf });
        assert!(err.to_string().starts_with("'leaf' settings cannot"));
    }

    #[test]
    fn test_node_required() {
        let settings = MpttUrlsSettings::new().with_leaf(LevelSettings::model(PHOTO));
        let err = bind(&settings).unwrap_err();
        assert!(err.to_string().starts_with("'node' settings cannot"));
    }

    #[test]
    fn test_node_reported_before_leaf() {
        let err = bind(&MpttUrlsSettings::new()).unwrap_err();
        assert_eq!(err, ConfigError::MissingRoleConfig { role: Role::Node });
    }

    #[test]
    fn test_empty_table_is_missing() {
        let settings = MpttUrlsSettings::new()
            .with_node(LevelSettings::model(CATEGORY))
            .with_leaf(LevelSettings::default());
        assert_eq!(
            bind(&settings).unwrap_err(),
            ConfigError::MissingRoleConfig { role: Role::Leaf }
        );
    }

    #[test]
    fn test_structure_before_render_checks() {
        // The node table is redundant, but the missing leaf wins.
        let settings = MpttUrlsSettings::new().with_node(
            LevelSettings::model(CATEGORY)
                .with_template("a.template")
                .with_view("a.view"),
        );
        assert_eq!(
            bind(&settings).unwrap_err(),
            ConfigError::MissingRoleConfig { role: Role::Leaf }
        );
    }

    #[test]
    fn test_model_required() {
        let settings = MpttUrlsSettings::new()
            .with_node(LevelSettings::default().with_template("t"))
            .with_leaf(LevelSettings::model(PHOTO).with_template("t"));
        assert_eq!(
            bind(&settings).unwrap_err(),
            ConfigError::MissingModel { role: Role::Node }
        );
    }

    #[test]
    fn test_node_redundant() {
        let settings = MpttUrlsSettings::new()
            .with_node(
                LevelSettings::model(CATEGORY)
                    .with_template("a.template")
                    .with_view("a.view"),
            )
            .with_leaf(LevelSettings::model(PHOTO));
        let err = bind(&settings).unwrap_err();
        assert_eq!(err, ConfigError::RedundantRenderSpec { role: Role::Node });
        assert!(err
            .to_string()
            .contains("\"template\" and \"view\" values cannot be used simultaneously"));
    }

    #[test]
    fn test_leaf_redundant() {
        let settings = MpttUrlsSettings::new()
            .with_node(LevelSettings::model(CATEGORY))
            .with_leaf(
                LevelSettings::model(PHOTO)
                    .with_template("a.template")
                    .with_view("a.view"),
            );
        assert_eq!(
            bind(&settings).unwrap_err(),
            ConfigError::RedundantRenderSpec { role: Role::Leaf }
        );
    }

    #[test]
    fn test_leaf_render_required() {
        let settings = MpttUrlsSettings::new()
            .with_node(LevelSettings::model(CATEGORY))
            .with_leaf(LevelSettings::model(PHOTO));
        let err = bind(&settings).unwrap_err();
        assert_eq!(err, ConfigError::MissingRenderSpec { role: Role::Leaf });
        assert!(err.to_string().contains("\"template\" or \"view\""));
    }

    #[test]
    fn test_unknown_identifiers() {
        let settings = MpttUrlsSettings::new()
            .with_node(LevelSettings::model("nope.Model"))
            .with_leaf(LevelSettings::model(PHOTO).with_template("t"));
        assert_eq!(
            bind(&settings).unwrap_err(),
            ConfigError::UnknownModel("nope.Model".into())
        );

        let settings = MpttUrlsSettings::new()
            .with_node(LevelSettings::model(CATEGORY))
            .with_leaf(LevelSettings::model(PHOTO).with_view("missing.view"));
        assert_eq!(
            bind(&settings).unwrap_err(),
            ConfigError::UnknownView("missing.view".into())
        );
    }

    #[test]
    fn test_bound_config() {
        let settings = MpttUrlsSettings::new()
            .with_node(LevelSettings::model(CATEGORY))
            .with_leaf(LevelSettings::model(PHOTO).with_view("a.view"));
        let config = bind(&settings).unwrap();

        assert_eq!(config.node().model.db_table, "gallery_category");
        assert_eq!(config.level(Role::Leaf).model.path, PHOTO);
        assert!(matches!(
            config.render_spec(Role::Leaf),
            Ok(RenderSpec::View { name, .. }) if name == "a.view"
        ));
        assert_eq!(
            config.render_spec(Role::Node).unwrap_err(),
            ConfigError::MissingRenderSpec { role: Role::Node }
        );
    }

    #[test]
    fn test_validate_terminal_node() {
        let settings = MpttUrlsSettings::new()
            .with_node(LevelSettings::model(CATEGORY))
            .with_leaf(LevelSettings::model(PHOTO).with_template("photo.html"));
        assert!(validate(&settings, Role::Leaf).is_ok());
        assert_eq!(
            validate(&settings, Role::Node).unwrap_err(),
            ConfigError::MissingRenderSpec { role: Role::Node }
        );
    }

    #[test]
    fn test_render_spec_debug_hides_handler() {
        let (_, views) = registries();
        let spec = RenderSpec::View {
            name: "a.view".into(),
            handler: views.get("a.view").unwrap(),
        };
        assert!(format!("{spec:?}").contains("a.view"));
        assert_eq!(
            format!("{:?}", RenderSpec::Template("t.html".into())),
            "Template(\"t.html\")"
        );
    }
}
