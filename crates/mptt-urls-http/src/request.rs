//! HTTP request type.
//!
//! [`HttpRequest`] is the request object passed to views registered with the
//! tree resolver. It carries the method, path, headers, query string and a
//! META map of server-level metadata.

use std::collections::HashMap;

use http::{HeaderMap, Method};
use percent_encoding::percent_decode_str;

/// An HTTP request as seen by the resolver and by views.
///
/// # Examples
///
/// ```
/// use mptt_urls_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::GET)
///     .path("/gallery/level1/")
///     .query_string("page=1")
///     .build();
///
/// assert_eq!(request.path(), "/gallery/level1/");
/// assert_eq!(request.query_param("page").as_deref(), Some("1"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    headers: HeaderMap,
    meta: HashMap<String, String>,
    scheme: String,
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`].
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Creates an `HttpRequest` from the parts of an Axum/hyper request.
    pub fn from_axum(parts: &http::request::Parts) -> Self {
        let path = parts.uri.path().to_string();
        let query_string = parts.uri.query().unwrap_or("").to_string();
        let headers = parts.headers.clone();

        let mut meta = HashMap::new();
        for (name, value) in &headers {
            let meta_key = format!("HTTP_{}", name.as_str().to_uppercase().replace('-', "_"));
            if let Ok(v) = value.to_str() {
                meta.insert(meta_key, v.to_string());
            }
        }
        if let Some(host) = headers.get(http::header::HOST).and_then(|v| v.to_str().ok()) {
            meta.insert("SERVER_NAME".to_string(), host.to_string());
        }
        meta.insert("REQUEST_METHOD".to_string(), parts.method.to_string());
        meta.insert("PATH_INFO".to_string(), path.clone());
        meta.insert("QUERY_STRING".to_string(), query_string.clone());

        let scheme = if headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "https")
        {
            "https"
        } else {
            "http"
        };

        Self {
            method: parts.method.clone(),
            path,
            query_string,
            headers,
            meta,
            scheme: scheme.to_string(),
        }
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the first value of a query parameter, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_string
            .split('&')
            .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
            .find(|(key, _)| decode(key) == name)
            .map(|(_, value)| decode(value))
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the META dictionary.
    pub const fn meta(&self) -> &HashMap<String, String> {
        &self.meta
    }

    /// Returns a mutable reference to the META dictionary.
    pub fn meta_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.meta
    }

    /// Returns the URL scheme (`"http"` or `"https"`).
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the host from META, falling back to `localhost`.
    pub fn get_host(&self) -> &str {
        self.meta
            .get("HTTP_HOST")
            .or_else(|| self.meta.get("SERVER_NAME"))
            .map_or("localhost", String::as_str)
    }

    /// Returns the full path including the query string.
    pub fn get_full_path(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }

    /// Builds an absolute URI for `location` (a path) on this request's host.
    pub fn build_absolute_uri(&self, location: &str) -> String {
        let path = if location.starts_with('/') {
            location.to_string()
        } else {
            format!("/{location}")
        };
        format!("{}://{}{path}", self.scheme, self.get_host())
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Builder for constructing [`HttpRequest`] instances without a server.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    headers: HeaderMap,
    meta: HashMap<String, String>,
    scheme: String,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            headers: HeaderMap::new(),
            meta: HashMap::new(),
            scheme: "http".to_string(),
        }
    }
}

impl HttpRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string (without leading `?`).
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Adds a META entry.
    #[must_use]
    pub fn meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key.to_string(), value.to_string());
        self
    }

    /// Sets the URL scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    /// Builds the request.
    pub fn build(self) -> HttpRequest {
        let mut meta = self.meta;
        meta.entry("REQUEST_METHOD".to_string())
            .or_insert_with(|| self.method.to_string());
        meta.entry("PATH_INFO".to_string())
            .or_insert_with(|| self.path.clone());

        HttpRequest {
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            headers: self.headers,
            meta,
            scheme: self.scheme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = HttpRequest::builder().build();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.query_string().is_empty());
        assert_eq!(request.scheme(), "http");
        assert_eq!(request.meta().get("REQUEST_METHOD").unwrap(), "GET");
    }

    #[test]
    fn test_query_param_decoding() {
        let request = HttpRequest::builder()
            .query_string("q=red+fox&slug=caf%C3%A9&flag")
            .build();
        assert_eq!(request.query_param("q").as_deref(), Some("red fox"));
        assert_eq!(request.query_param("slug").as_deref(), Some("café"));
        assert_eq!(request.query_param("flag").as_deref(), Some(""));
        assert!(request.query_param("missing").is_none());
    }

    #[test]
    fn test_get_full_path() {
        let request = HttpRequest::builder().path("/a/b/").build();
        assert_eq!(request.get_full_path(), "/a/b/");

        let request = HttpRequest::builder().path("/a/").query_string("x=1").build();
        assert_eq!(request.get_full_path(), "/a/?x=1");
    }

    #[test]
    fn test_build_absolute_uri() {
        let request = HttpRequest::builder()
            .meta("HTTP_HOST", "example.com")
            .scheme("https")
            .build();
        assert_eq!(
            request.build_absolute_uri("gallery/level1/"),
            "https://example.com/gallery/level1/"
        );
        assert_eq!(request.build_absolute_uri("/x"), "https://example.com/x");
    }

    #[test]
    fn test_get_host_default() {
        let request = HttpRequest::builder().build();
        assert_eq!(request.get_host(), "localhost");
    }

    #[test]
    fn test_header_builder() {
        let request = HttpRequest::builder().header("x-custom", "1").build();
        assert_eq!(request.headers().get("x-custom").unwrap(), "1");
    }

    #[test]
    fn test_from_axum() {
        let (parts, ()) = http::Request::builder()
            .method(Method::GET)
            .uri("/gallery/level1/photo1?size=large")
            .header("host", "example.com")
            .header("x-forwarded-proto", "https")
            .body(())
            .unwrap()
            .into_parts();

        let request = HttpRequest::from_axum(&parts);
        assert_eq!(request.path(), "/gallery/level1/photo1");
        assert_eq!(request.query_param("size").as_deref(), Some("large"));
        assert_eq!(request.get_host(), "example.com");
        assert_eq!(request.scheme(), "https");
        assert_eq!(request.meta().get("PATH_INFO").unwrap(), "/gallery/level1/photo1");
    }
}
