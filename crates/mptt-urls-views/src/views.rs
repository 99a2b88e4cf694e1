//! View callables and their registry.
//!
//! Routing settings refer to views by name (`view = "gallery.views.photo"`).
//! Applications register the callables under those names at startup; binding
//! the settings turns each name into a [`ViewHandler`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use mptt_urls_core::ConfigError;
use mptt_urls_http::{HttpRequest, HttpResponse};
use mptt_urls_tree::TreeObject;

/// A view invoked with the request and the object the path resolved to.
pub type ViewHandler = Arc<dyn Fn(&HttpRequest, &TreeObject) -> HttpResponse + Send + Sync>;

/// A registry of named views.
///
/// # Examples
///
/// ```
/// use mptt_urls_http::HttpResponse;
/// use mptt_urls_views::views::ViewRegistry;
///
/// let mut views = ViewRegistry::new();
/// views.register("gallery.views.photo", |_request, object| {
///     HttpResponse::ok(format!("{:?}", object.entity().map(|e| &e.slug)))
/// });
/// assert!(views.get("gallery.views.photo").is_ok());
/// assert!(views.get("gallery.views.missing").is_err());
/// ```
#[derive(Clone, Default)]
pub struct ViewRegistry {
    views: HashMap<String, ViewHandler>,
}

impl ViewRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: &str, view: F)
    where
        F: Fn(&HttpRequest, &TreeObject) -> HttpResponse + Send + Sync + 'static,
    {
        self.views.insert(name.to_string(), Arc::new(view));
    }

    /// Looks up a view by name.
    pub fn get(&self, name: &str) -> Result<ViewHandler, ConfigError> {
        self.views
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownView(name.to_string()))
    }

    /// Returns a sorted list of registered view names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.views.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Returns `true` if no views are registered.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("views", &self.names())
            .finish()
    }
}
