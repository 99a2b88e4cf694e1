//! Path resolution and dispatch.
//!
//! A path is consumed left to right, one slug per tree depth. A path ending
//! with `/` (or the empty path) addresses a node; any other path addresses a
//! leaf, whose last segment is looked up with the leaf model. Every other
//! segment is looked up with the node model, whatever its depth.
//!
//! ```text
//! "level1/level2/"        node   node          -> render level2 with the node spec
//! "level1/level2/photo1"  node   node   leaf   -> render photo1 with the leaf spec
//! ""                      (initial scope)      -> render the superroot or root scope
//! ```
//!
//! An unmatched slug is a normal outcome and produces a 404 response. A
//! configuration problem is an error and is returned before the store is
//! touched.

use std::sync::Arc;

use mptt_urls_core::logging::resolve_span;
use mptt_urls_core::settings::Settings;
use mptt_urls_core::{MpttError, MpttResult, Role};
use mptt_urls_http::{HttpRequest, HttpResponse};
use mptt_urls_tree::{absolute_url, ancestors, tree_path, ModelRegistry, TreeNode, TreeObject, TreeStore};
use percent_encoding::percent_decode_str;

use crate::config::{RenderSpec, ResolutionConfig};
use crate::template::Engine;
use crate::views::ViewRegistry;

/// A request path split into slugs.
///
/// # Examples
///
/// ```
/// use mptt_urls_core::Role;
/// use mptt_urls_views::resolver::TreePath;
///
/// let path = TreePath::parse("/level1//level2/");
/// assert_eq!(path.segments(), ["level1", "level2"]);
/// assert_eq!(path.terminal(), Role::Node);
///
/// let path = TreePath::parse("level1/photo%201");
/// assert_eq!(path.segments(), ["level1", "photo 1"]);
/// assert_eq!(path.terminal(), Role::Leaf);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePath {
    segments: Vec<String>,
    terminal: Role,
}

impl TreePath {
    /// Splits `path` on `/`, dropping empty segments and percent-decoding
    /// the rest.
    pub fn parse(path: &str) -> Self {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();
        let terminal = if segments.is_empty() || path.ends_with('/') {
            Role::Node
        } else {
            Role::Leaf
        };
        Self { segments, terminal }
    }

    /// Returns the decoded slugs.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the role of the entity the path ends at.
    pub const fn terminal(&self) -> Role {
        self.terminal
    }

    /// Returns `true` for the empty path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A successfully resolved path.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The role the object was matched with.
    pub role: Role,
    /// The matched entity, or the superroot for the empty path.
    pub object: TreeObject,
    /// Nodes matched before the object, outermost first. The root scope is
    /// not included.
    pub ancestors: Vec<TreeNode>,
    /// The canonical form of the resolved path.
    pub tree_path: String,
}

/// The outcome of walking a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Every segment matched.
    Found(Resolved),
    /// The segment at `depth` (0-based) matched nothing.
    NotFound {
        /// The unmatched slug.
        slug: String,
        /// Its position in the path.
        depth: usize,
    },
}

/// Walks `path` through `store`.
///
/// The walk starts under `root_scope`, or above every tree root when `None`.
/// When a lookup returns several rows the first one is used.
pub fn resolve(
    path: &TreePath,
    config: &ResolutionConfig,
    store: &dyn TreeStore,
    root_scope: Option<&TreeNode>,
) -> MpttResult<Resolution> {
    let last = path.segments.len().saturating_sub(1);
    let mut scope = root_scope.cloned();
    let mut matched: Vec<TreeNode> = Vec::with_capacity(path.segments.len());

    for (depth, slug) in path.segments.iter().enumerate() {
        let role = if depth == last { path.terminal } else { Role::Node };
        let model = &config.level(role).model;
        let candidates = match &scope {
            None => store.roots(model, slug)?,
            Some(parent) => store.children(model, parent, slug)?,
        };

        let count = candidates.len();
        let Some(found) = candidates.into_iter().next() else {
            tracing::debug!(slug = %slug, depth, table = %model.db_table, "no match");
            return Ok(Resolution::NotFound {
                slug: slug.clone(),
                depth,
            });
        };
        if count > 1 {
            tracing::warn!(slug = %slug, depth, count, table = %model.db_table, "ambiguous slug, using the first match");
        }
        tracing::debug!(slug = %slug, depth, id = found.id, role = %role, "matched");

        matched.push(found.clone());
        scope = Some(found);
    }

    let role = path.terminal;
    let (object, ancestors) = match matched.pop() {
        Some(entity) => (TreeObject::Entity(entity), matched),
        None => (
            root_scope.map_or(TreeObject::SuperRoot, |root| TreeObject::Entity(root.clone())),
            Vec::new(),
        ),
    };
    let tree_path = if path.is_empty() {
        String::new()
    } else {
        tree_path(&ancestors, object.entity(), role == Role::Leaf)
    };

    Ok(Resolution::Found(Resolved {
        role,
        object,
        ancestors,
        tree_path,
    }))
}

/// Resolves `path` and renders the result.
///
/// Fails with a configuration error when the path ends at a node and the node
/// level has no `template` or `view`; that check runs before any store
/// access. The empty path is the exception: with a pass-through node level
/// there is nothing to render there, so it is a 404. An unmatched segment
/// yields a 404 response naming the slug.
pub fn process_url(
    request: &HttpRequest,
    path: &str,
    config: &ResolutionConfig,
    store: &dyn TreeStore,
    engine: &Engine,
    root_scope: Option<&TreeNode>,
) -> MpttResult<HttpResponse> {
    let span = resolve_span(path);
    let _guard = span.enter();

    let parsed = TreePath::parse(path);
    if parsed.is_empty() && config.node().render.is_none() {
        tracing::debug!("empty path under a pass-through node level");
        return Ok(HttpResponse::not_found("No entry matches the empty path"));
    }
    let render = config.render_spec(parsed.terminal())?;

    match resolve(&parsed, config, store, root_scope)? {
        Resolution::NotFound { slug, .. } => {
            Ok(HttpResponse::not_found(format!("No entry matches the slug '{slug}'")))
        }
        Resolution::Found(resolved) => dispatch(request, render, engine, &resolved),
    }
}

fn dispatch(
    request: &HttpRequest,
    render: &RenderSpec,
    engine: &Engine,
    resolved: &Resolved,
) -> MpttResult<HttpResponse> {
    match render {
        RenderSpec::View { name, handler } => {
            tracing::info!(view = %name, path = %resolved.tree_path, "dispatching to view");
            Ok(handler(request, &resolved.object))
        }
        RenderSpec::Template(name) => {
            tracing::info!(template = %name, path = %resolved.tree_path, "rendering template");
            let body = engine.render_to_string(name, &template_context(resolved))?;
            Ok(HttpResponse::ok(body))
        }
    }
}

fn template_context(resolved: &Resolved) -> tera::Context {
    let ancestors: Vec<serde_json::Value> = resolved.ancestors.iter().map(TreeNode::to_context).collect();
    let mut ctx = tera::Context::new();
    ctx.insert("object", &resolved.object.to_context());
    ctx.insert("ancestors", &ancestors);
    ctx.insert("path", &resolved.tree_path);
    ctx.insert("is_leaf", &(resolved.role == Role::Leaf));
    ctx.insert("is_superroot", &resolved.object.is_superroot());
    ctx
}

/// A resolver bundling a bound configuration with its collaborators.
///
/// Cheap to clone; every clone shares the same configuration, store and
/// engine.
#[derive(Clone)]
pub struct MpttResolver {
    config: Arc<ResolutionConfig>,
    store: Arc<dyn TreeStore>,
    engine: Arc<Engine>,
    prefix: String,
    root_scope: Option<TreeNode>,
}

impl MpttResolver {
    /// Creates a resolver mounted at `/`.
    pub fn new(config: ResolutionConfig, store: Arc<dyn TreeStore>, engine: Engine) -> Self {
        Self {
            config: Arc::new(config),
            store,
            engine: Arc::new(engine),
            prefix: "/".to_string(),
            root_scope: None,
        }
    }

    /// Builds a resolver from application settings.
    ///
    /// Binds `settings.mptt_urls`, loads templates from `settings.templates`
    /// and mounts at `settings.url_prefix`.
    pub fn from_settings(
        settings: &Settings,
        models: &ModelRegistry,
        views: &ViewRegistry,
        store: Arc<dyn TreeStore>,
    ) -> MpttResult<Self> {
        let config = ResolutionConfig::from_settings(&settings.mptt_urls, models, views)?;
        let engine = Engine::from_settings(&settings.templates)?;
        Ok(Self::new(config, store, engine).with_prefix(&settings.url_prefix))
    }

    /// Sets the mount prefix used by [`handle`](Self::handle) and
    /// [`url_for`](Self::url_for).
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim_matches('/');
        self.prefix = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        self
    }

    /// Restricts resolution to the subtree below `root`.
    #[must_use]
    pub fn with_root_scope(mut self, root: TreeNode) -> Self {
        self.root_scope = Some(root);
        self
    }

    /// Returns the mount prefix, always with leading and trailing `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the bound configuration.
    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Resolves `path` (relative to the mount prefix) and renders the result.
    pub fn process_url(
        &self,
        request: &HttpRequest,
        path: &str,
        root_scope: Option<&TreeNode>,
    ) -> MpttResult<HttpResponse> {
        process_url(
            request,
            path,
            &self.config,
            self.store.as_ref(),
            &self.engine,
            root_scope,
        )
    }

    /// Resolves the request's own path.
    ///
    /// A path outside the mount prefix is a 404.
    pub fn handle(&self, request: &HttpRequest) -> MpttResult<HttpResponse> {
        let Some(relative) = self.strip_prefix(request.path()) else {
            return Ok(HttpResponse::not_found(format!(
                "'{}' is outside '{}'",
                request.path(),
                self.prefix
            )));
        };
        self.process_url(request, relative, self.root_scope.as_ref())
    }

    fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        let base = self.prefix.trim_end_matches('/');
        let rest = path.strip_prefix(base)?;
        if rest.is_empty() {
            return Some("");
        }
        rest.strip_prefix('/')
    }

    /// Returns the absolute URL that resolves back to `entity`.
    ///
    /// Entities of the leaf model get a leaf URL, everything else a node URL.
    /// With a root scope set, `entity` must lie below it.
    pub fn url_for(&self, entity: &TreeNode) -> MpttResult<String> {
        let node_model = &self.config.node().model;
        let is_leaf = entity.model == self.config.leaf().model.path && entity.model != node_model.path;
        let mut chain = ancestors(self.store.as_ref(), node_model, entity)?;

        if let Some(root) = &self.root_scope {
            if root.id == entity.id && root.model == entity.model {
                return Ok(self.prefix.clone());
            }
            let Some(pos) = chain.iter().position(|node| node.id == root.id) else {
                return Err(MpttError::OperationalError(format!(
                    "'{}' is not below the root scope '{}'",
                    entity.slug, root.slug
                )));
            };
            chain.drain(..=pos);
        }

        Ok(absolute_url(
            &self.prefix,
            &tree_path(&chain, Some(entity), is_leaf),
        ))
    }
}

impl std::fmt::Debug for MpttResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpttResolver")
            .field("config", &self.config)
            .field("prefix", &self.prefix)
            .field("root_scope", &self.root_scope)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use mptt_urls_core::settings::{LevelSettings, MpttUrlsSettings};
    use mptt_urls_core::ConfigError;
    use mptt_urls_tree::MemoryTreeStore;

    use super::*;

    const CATEGORY: &str = "test_app.gallery.models.Category";
    const PHOTO: &str = "test_app.gallery.models.Photo";

    struct Gallery {
        store: Arc<MemoryTreeStore>,
        models: ModelRegistry,
        level1: TreeNode,
        level2: TreeNode,
        photo1: TreeNode,
    }

    fn gallery() -> Gallery {
        let mut models = ModelRegistry::new();
        let category = models.register_path(CATEGORY).unwrap();
        let photo = models.register_path(PHOTO).unwrap();
        let store = Arc::new(MemoryTreeStore::new());
        let level1 = store.insert(&category, "level1", None);
        let level2 = store.insert(&category, "level2", Some(&level1));
        let photo1 = store.insert(&photo, "photo1", Some(&level2));
        Gallery {
            store,
            models,
            level1,
            level2,
            photo1,
        }
    }

    fn engine() -> Engine {
        let mut engine = Engine::new();
        engine
            .add_string_template(
                "category.html",
                "{% if is_superroot %}superroot{% else %}category {{ object.slug }}{% endif %}",
            )
            .unwrap();
        engine
            .add_string_template(
                "photo.html",
                "{% for a in ancestors %}{{ a.slug }}>{% endfor %}{{ object.slug }} @ {{ path | safe }}",
            )
            .unwrap();
        engine
    }

    fn settings() -> MpttUrlsSettings {
        MpttUrlsSettings::new()
            .with_node(LevelSettings::model(CATEGORY).with_template("category.html"))
            .with_leaf(LevelSettings::model(PHOTO).with_template("photo.html"))
    }

    fn resolver(g: &Gallery, settings: &MpttUrlsSettings) -> MpttResolver {
        let config = ResolutionConfig::from_settings(settings, &g.models, &ViewRegistry::new()).unwrap();
        MpttResolver::new(config, g.store.clone(), engine())
    }

    fn get(resolver: &MpttResolver, path: &str) -> MpttResult<HttpResponse> {
        resolver.process_url(&HttpRequest::builder().build(), path, None)
    }

    #[test]
    fn test_parse_terminal() {
        assert_eq!(TreePath::parse("").terminal(), Role::Node);
        assert_eq!(TreePath::parse("/").terminal(), Role::Node);
        assert!(TreePath::parse("/").is_empty());
        assert_eq!(TreePath::parse("a").terminal(), Role::Leaf);
        assert_eq!(TreePath::parse("a/b/").segments(), ["a", "b"]);
    }

    #[test]
    fn test_resolve_leaf() {
        let g = gallery();
        let r = resolver(&g, &settings());
        let response = get(&r, "level1/level2/photo1").unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(
            response.text(),
            Some("level1>level2>photo1 @ level1/level2/photo1")
        );
    }

    #[test]
    fn test_resolve_node() {
        let g = gallery();
        let r = resolver(&g, &settings());
        assert_eq!(get(&r, "level1/level2/").unwrap().text(), Some("category level2"));
        assert_eq!(get(&r, "level1/").unwrap().text(), Some("category level1"));
    }

    #[test]
    fn test_resolution_values() {
        let g = gallery();
        let r = resolver(&g, &settings());
        let resolution = resolve(
            &TreePath::parse("level1/level2/photo1"),
            r.config(),
            g.store.as_ref(),
            None,
        )
        .unwrap();
        let Resolution::Found(resolved) = resolution else {
            panic!("expected a match");
        };
        assert_eq!(resolved.role, Role::Leaf);
        assert_eq!(resolved.object, TreeObject::Entity(g.photo1.clone()));
        assert_eq!(resolved.ancestors, vec![g.level1.clone(), g.level2.clone()]);
    }

    #[test]
    fn test_not_found_stops_walk() {
        let g = gallery();
        let r = resolver(&g, &settings());
        let resolution = resolve(
            &TreePath::parse("level1/missing/photo1"),
            r.config(),
            g.store.as_ref(),
            None,
        )
        .unwrap();
        assert_eq!(
            resolution,
            Resolution::NotFound {
                slug: "missing".into(),
                depth: 1
            }
        );

        let response = get(&r, "level1/level2/nope").unwrap();
        assert!(response.is_not_found());
        assert!(response.text().unwrap().contains("'nope'"));
    }

    #[test]
    fn test_leaf_slug_is_not_a_node() {
        let g = gallery();
        let r = resolver(&g, &settings());
        // photo1 is a leaf; addressing it as a node finds nothing.
        assert!(get(&r, "level1/level2/photo1/").unwrap().is_not_found());
        // level2 is a node; addressing it as a leaf finds nothing.
        assert!(get(&r, "level1/level2").unwrap().is_not_found());
    }

    #[test]
    fn test_superroot() {
        let g = gallery();
        let r = resolver(&g, &settings());
        assert_eq!(get(&r, "").unwrap().text(), Some("superroot"));
        assert_eq!(get(&r, "/").unwrap().text(), Some("superroot"));
    }

    #[test]
    fn test_root_scope() {
        let g = gallery();
        let r = resolver(&g, &settings());
        let request = HttpRequest::builder().build();

        let response = r.process_url(&request, "level2/photo1", Some(&g.level1)).unwrap();
        assert_eq!(response.text(), Some("level2>photo1 @ level2/photo1"));

        let response = r.process_url(&request, "", Some(&g.level1)).unwrap();
        assert_eq!(response.text(), Some("category level1"));

        // level1 is not a child of itself.
        let response = r.process_url(&request, "level1/", Some(&g.level1)).unwrap();
        assert!(response.is_not_found());
    }

    #[test]
    fn test_terminal_node_needs_render_spec() {
        let g = gallery();
        let settings = MpttUrlsSettings::new()
            .with_node(LevelSettings::model(CATEGORY))
            .with_leaf(LevelSettings::model(PHOTO).with_template("photo.html"));
        let r = resolver(&g, &settings);

        assert!(get(&r, "level1/level2/photo1").is_ok());
        let err = get(&r, "level1/level2/").unwrap_err();
        assert_eq!(
            err.as_config_error(),
            Some(&ConfigError::MissingRenderSpec { role: Role::Node })
        );
        // Raised even when the path does not exist.
        assert!(get(&r, "nowhere/").is_err());
        // The empty path has nothing to render.
        assert!(get(&r, "").unwrap().is_not_found());
        assert!(get(&r, "/").unwrap().is_not_found());
    }

    #[test]
    fn test_url_for_outside_root_scope() {
        let g = gallery();
        let r = resolver(&g, &settings())
            .with_prefix("/gallery/")
            .with_root_scope(g.level2.clone());
        assert_eq!(r.url_for(&g.level2).unwrap(), "/gallery/");
        assert_eq!(r.url_for(&g.photo1).unwrap(), "/gallery/photo1");
        assert!(matches!(r.url_for(&g.level1), Err(MpttError::OperationalError(_))));
    }

    #[test]
    fn test_missing_template_is_error() {
        let g = gallery();
        let settings = MpttUrlsSettings::new()
            .with_node(LevelSettings::model(CATEGORY))
            .with_leaf(LevelSettings::model(PHOTO).with_template("missing.html"));
        let r = resolver(&g, &settings);
        let err = get(&r, "level1/level2/photo1").unwrap_err();
        assert!(matches!(err, MpttError::TemplateDoesNotExist(_)));
    }

    #[test]
    fn test_handle_strips_prefix() {
        let g = gallery();
        let r = resolver(&g, &settings()).with_prefix("gallery");
        assert_eq!(r.prefix(), "/gallery/");

        let request = HttpRequest::builder().path("/gallery/level1/").build();
        assert_eq!(r.handle(&request).unwrap().text(), Some("category level1"));

        let request = HttpRequest::builder().path("/gallery").build();
        assert_eq!(r.handle(&request).unwrap().text(), Some("superroot"));

        let request = HttpRequest::builder().path("/galleryx/level1/").build();
        assert!(r.handle(&request).unwrap().is_not_found());
    }

    #[test]
    fn test_url_for_round_trip() {
        let g = gallery();
        let r = resolver(&g, &settings()).with_prefix("/gallery/");
        assert_eq!(r.url_for(&g.level2).unwrap(), "/gallery/level1/level2/");
        let url = r.url_for(&g.photo1).unwrap();
        assert_eq!(url, "/gallery/level1/level2/photo1");

        let request = HttpRequest::builder().path(&url).build();
        assert!(r.handle(&request).unwrap().text().unwrap().starts_with("level1>level2>photo1"));
    }

    #[test]
    fn test_url_for_with_root_scope() {
        let g = gallery();
        let r = resolver(&g, &settings()).with_root_scope(g.level1.clone());
        assert_eq!(r.url_for(&g.photo1).unwrap(), "/level2/photo1");
        assert_eq!(r.url_for(&g.level1).unwrap(), "/");

        let request = HttpRequest::builder().path("/").build();
        assert_eq!(r.handle(&request).unwrap().text(), Some("category level1"));

        let request = HttpRequest::builder().path("/level2/").build();
        assert_eq!(r.handle(&request).unwrap().text(), Some("category level2"));
    }
}
