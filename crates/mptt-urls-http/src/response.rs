//! HTTP response types.
//!
//! [`HttpResponse`] is what the tree resolver returns: a rendered page, the
//! result of a registered view, or a 404 when a path segment has no matching
//! entity.

use axum::response::IntoResponse;
use http::{HeaderMap, HeaderValue, StatusCode};

/// The body content of an HTTP response.
#[derive(Clone)]
pub enum ResponseContent {
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    Text(String),
}

impl std::fmt::Debug for ResponseContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Text(t) => f
                .debug_tuple("Text")
                .field(&t.chars().take(100).collect::<String>())
                .finish(),
        }
    }
}

/// An HTTP response produced by a template render or a view.
///
/// # Examples
///
/// ```
/// use mptt_urls_http::HttpResponse;
///
/// let response = HttpResponse::ok("<h1>level1</h1>");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.text(), Some("<h1>level1</h1>"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    content: ResponseContent,
    charset: String,
    content_type: String,
}

impl HttpResponse {
    /// Creates a new `HttpResponse` with the given status code and text body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: ResponseContent::Text(body.into()),
            charset: "utf-8".to_string(),
            content_type: "text/html".to_string(),
        }
    }

    /// Creates a new `HttpResponse` with the given status code and byte body.
    pub fn with_bytes(status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: ResponseContent::Bytes(body),
            charset: "utf-8".to_string(),
            content_type: "application/octet-stream".to_string(),
        }
    }

    /// Creates a 200 OK response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    /// Creates a 500 Internal Server Error response.
    pub fn server_error(body: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns `true` for a 404 response.
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns a reference to the headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Adds a header to the response.
    #[must_use]
    pub fn set_header(mut self, name: http::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns the content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Sets the content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Returns the response body.
    pub const fn content(&self) -> &ResponseContent {
        &self.content
    }

    /// Returns the body as text, if it is a text body.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ResponseContent::Text(t) => Some(t),
            ResponseContent::Bytes(_) => None,
        }
    }

    /// Returns the body as bytes.
    pub fn content_bytes(&self) -> Vec<u8> {
        match &self.content {
            ResponseContent::Bytes(b) => b.clone(),
            ResponseContent::Text(t) => t.as_bytes().to_vec(),
        }
    }

    /// Returns the full content type header value including charset.
    fn full_content_type(&self) -> String {
        if self.content_type.starts_with("text/") || self.content_type.contains("json") {
            format!("{}; charset={}", self.content_type, self.charset)
        } else {
            self.content_type.clone()
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        let content_type = self.full_content_type();
        let body = match self.content {
            ResponseContent::Text(text) => axum::body::Body::from(text),
            ResponseContent::Bytes(bytes) => axum::body::Body::from(bytes),
        };

        let mut response = axum::response::Response::new(body);
        *response.status_mut() = self.status;
        if let Ok(ct) = HeaderValue::from_str(&content_type) {
            response.headers_mut().insert(http::header::CONTENT_TYPE, ct);
        }
        for (key, value) in &self.headers {
            response.headers_mut().insert(key, value.clone());
        }
        response
    }
}

/// Shorthand for building 404 responses.
pub struct HttpResponseNotFound;

impl HttpResponseNotFound {
    /// Creates a 404 response with the given body.
    pub fn new(body: impl Into<String>) -> HttpResponse {
        HttpResponse::not_found(body)
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[test]
    fn test_ok_response() {
        let response = HttpResponse::ok("hello");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), "text/html");
        assert_eq!(response.content_bytes(), b"hello".to_vec());
    }

    #[test]
    fn test_not_found_response() {
        let response = HttpResponseNotFound::new("no such slug");
        assert!(response.is_not_found());
        assert_eq!(response.text(), Some("no such slug"));
    }

    #[test]
    fn test_bytes_response_has_no_text() {
        let response = HttpResponse::with_bytes(StatusCode::OK, vec![1, 2, 3]);
        assert!(response.text().is_none());
        assert_eq!(response.content_type(), "application/octet-stream");
    }

    #[test]
    fn test_set_status_and_header() {
        let mut response = HttpResponse::ok("x")
            .set_header(http::header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        response.set_status(StatusCode::ACCEPTED);
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers().get("cache-control").unwrap(), "no-cache");
    }

    #[tokio::test]
    async fn test_into_axum_response() {
        let mut response = HttpResponse::not_found("missing")
            .set_header(http::header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        response.set_content_type("text/plain");

        let axum_response = response.into_response();
        assert_eq!(axum_response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            axum_response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(axum_response.headers().get("cache-control").unwrap(), "no-cache");

        let body = axum_response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"missing");
    }
}
