//! # mptt-urls-views
//!
//! Maps slash-separated URL paths onto tree-structured data. Given routing
//! settings that name a `node` model and a `leaf` model, the resolver walks a
//! path segment by segment through a [`TreeStore`](mptt_urls_tree::TreeStore),
//! then renders the matched entity with a template or hands it to a view.
//!
//! ## Modules
//!
//! - [`config`] - Validating routing settings and binding them to typed handles
//! - [`views`] - The string-keyed registry of view callables
//! - [`template`] - The Tera-backed template engine
//! - [`resolver`] - Path parsing, the tree walk, and dispatch
//! - [`server`] - Mounting a resolver on an Axum router
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mptt_urls_core::settings::{LevelSettings, MpttUrlsSettings};
//! use mptt_urls_http::HttpRequest;
//! use mptt_urls_tree::{MemoryTreeStore, ModelRegistry};
//! use mptt_urls_views::config::ResolutionConfig;
//! use mptt_urls_views::resolver::MpttResolver;
//! use mptt_urls_views::template::Engine;
//! use mptt_urls_views::views::ViewRegistry;
//!
//! let mut models = ModelRegistry::new();
//! let category = models.register_path("gallery.models.Category").unwrap();
//! let photo = models.register_path("gallery.models.Photo").unwrap();
//!
//! let store = MemoryTreeStore::new();
//! let level1 = store.insert(&category, "level1", None);
//! store.insert(&photo, "photo1", Some(&level1));
//!
//! let settings = MpttUrlsSettings::new()
//!     .with_node(LevelSettings::model("gallery.models.Category").with_template("category.html"))
//!     .with_leaf(LevelSettings::model("gallery.models.Photo").with_template("photo.html"));
//! let config = ResolutionConfig::from_settings(&settings, &models, &ViewRegistry::new()).unwrap();
//!
//! let mut engine = Engine::new();
//! engine.add_string_template("category.html", "category {{ object.slug }}").unwrap();
//! engine.add_string_template("photo.html", "photo {{ object.slug }}").unwrap();
//!
//! let resolver = MpttResolver::new(config, Arc::new(store), engine);
//! let request = HttpRequest::builder().build();
//! let response = resolver.process_url(&request, "level1/photo1", None).unwrap();
//! assert_eq!(response.text(), Some("photo photo1"));
//! ```

pub mod config;
pub mod resolver;
pub mod server;
pub mod template;
pub mod views;

pub use config::{validate, LevelSpec, RenderSpec, ResolutionConfig};
pub use resolver::{process_url, resolve, MpttResolver, Resolution, Resolved, TreePath};
pub use server::{run, url_mptt};
pub use template::Engine;
pub use views::{ViewHandler, ViewRegistry};
