//! Request factory for building [`HttpRequest`] objects in tests.
//!
//! [`RequestFactory`] builds requests directly, without a router, so the
//! resolver can be called as a plain function.
//!
//! ## Example
//!
//! ```
//! use mptt_urls_test::request_factory::RequestFactory;
//!
//! let factory = RequestFactory::new();
//! let request = factory.get("/level1/level2/?page=2");
//! assert_eq!(request.method(), &http::Method::GET);
//! assert_eq!(request.path(), "/level1/level2/");
//! assert_eq!(request.query_param("page").as_deref(), Some("2"));
//! ```

use std::collections::HashMap;

use http::Method;
use mptt_urls_http::HttpRequest;

/// A factory for building [`HttpRequest`] objects without routing.
#[derive(Debug, Clone)]
pub struct RequestFactory {
    default_headers: HashMap<String, String>,
    default_meta: HashMap<String, String>,
}

impl Default for RequestFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestFactory {
    /// Creates a new request factory with default settings.
    pub fn new() -> Self {
        Self {
            default_headers: HashMap::new(),
            default_meta: HashMap::new(),
        }
    }

    /// Adds a default header that will be included in all requests.
    #[must_use]
    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Adds a default META entry that will be included in all requests.
    #[must_use]
    pub fn with_default_meta(mut self, key: &str, value: &str) -> Self {
        self.default_meta
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Builds a GET request. A `?query` suffix becomes the query string.
    pub fn get(&self, path: &str) -> HttpRequest {
        self.build_request(Method::GET, path)
    }

    /// Builds a HEAD request.
    pub fn head(&self, path: &str) -> HttpRequest {
        self.build_request(Method::HEAD, path)
    }

    fn build_request(&self, method: Method, target: &str) -> HttpRequest {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let mut builder = HttpRequest::builder()
            .method(method)
            .path(&path)
            .query_string(query)
            .meta("SERVER_NAME", "testserver")
            .meta("HTTP_HOST", "testserver");

        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        for (key, value) in &self.default_meta {
            builder = builder.meta(key, value);
        }

        builder.build()
    }
}
