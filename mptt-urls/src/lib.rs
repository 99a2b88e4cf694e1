//! # mptt-urls
//!
//! Hierarchical URL routing over tree-structured data.
//!
//! A path such as `level1/level2/photo1` is walked one segment at a time
//! through a `node` model; a trailing `/` means the path ends at a node,
//! otherwise the last segment is looked up in the `leaf` model. The matched
//! entity is rendered with a template or handed to a registered view.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `mptt-urls` to get everything, or depend on individual
//! crates for finer-grained control.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mptt_urls::prelude::*;
//!
//! let mut models = ModelRegistry::new();
//! let category = models.register_path("gallery.models.Category").unwrap();
//! let photo = models.register_path("gallery.models.Photo").unwrap();
//!
//! let store = MemoryTreeStore::new();
//! let level1 = store.insert(&category, "level1", None);
//! let level2 = store.insert(&category, "level2", Some(&level1));
//! let photo1 = store.insert(&photo, "photo1", Some(&level2));
//!
//! let mut views = ViewRegistry::new();
//! views.register("gallery.views.photo", |_request, object| {
//!     let slug = object.entity().map_or("", |node| node.slug.as_str());
//!     HttpResponse::ok(format!("photo {slug}"))
//! });
//!
//! let settings = MpttUrlsSettings::new()
//!     .with_node(LevelSettings::model("gallery.models.Category").with_template("category.html"))
//!     .with_leaf(LevelSettings::model("gallery.models.Photo").with_view("gallery.views.photo"));
//! let config = ResolutionConfig::from_settings(&settings, &models, &views).unwrap();
//!
//! let mut engine = Engine::new();
//! engine.add_string_template("category.html", "{{ object.slug }}").unwrap();
//!
//! let resolver = MpttResolver::new(config, Arc::new(store), engine).with_prefix("/gallery/");
//! let url = resolver.url_for(&photo1).unwrap();
//! assert_eq!(url, "/gallery/level1/level2/photo1");
//!
//! let request = HttpRequest::builder().path(&url).build();
//! assert_eq!(resolver.handle(&request).unwrap().text(), Some("photo photo1"));
//! ```

/// Error types, settings, settings loading, and logging.
pub use mptt_urls_core as core;

/// Request and response types.
pub use mptt_urls_http as http;

/// Tree entities, the model registry, and tree stores.
pub use mptt_urls_tree as tree;

/// Settings validation, path resolution, dispatch, and the Axum mount.
pub use mptt_urls_views as views;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use mptt_urls_cli as cli;

/// Testing utilities: test client, request factory, fixtures, query counting.
#[cfg(feature = "testing")]
pub use mptt_urls_test as test;

/// The types most applications need.
pub mod prelude {
    pub use mptt_urls_core::settings::{LevelSettings, MpttUrlsSettings, Role, Settings};
    pub use mptt_urls_core::{ConfigError, MpttError, MpttResult};
    pub use mptt_urls_http::{HttpRequest, HttpResponse};
    #[cfg(feature = "sqlite")]
    pub use mptt_urls_tree::SqliteTreeStore;
    pub use mptt_urls_tree::{
        MemoryTreeStore, ModelDescriptor, ModelRegistry, TreeNode, TreeObject, TreeStore,
    };
    pub use mptt_urls_views::{
        url_mptt, Engine, MpttResolver, RenderSpec, ResolutionConfig, ViewRegistry,
    };
}
