//! HTTP test client.
//!
//! [`TestClient`] sends simulated requests through an Axum router, such as
//! the one built by `url_mptt`, and returns a [`TestResponse`] for inspection.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axum::routing::get;
//! use axum::Router;
//! use mptt_urls_test::client::TestClient;
//!
//! async fn example() {
//!     let app = Router::new().route("/level1/", get(|| async { "level1" }));
//!     let client = TestClient::new(app);
//!
//!     let response = client.get("/level1/").await;
//!     assert_eq!(response.status_code(), 200);
//!     assert_eq!(response.text(), "level1");
//! }
//! ```

use axum::Router;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use mptt_urls_core::MpttError;
use tower::ServiceExt;

/// A test client for an Axum application.
#[derive(Debug, Clone)]
pub struct TestClient {
    app: Router,
}

impl TestClient {
    /// Creates a new test client wrapping the given router.
    pub const fn new(app: Router) -> Self {
        Self { app }
    }

    /// Sends a GET request to the given path.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path).await
    }

    /// Sends a HEAD request to the given path.
    pub async fn head(&self, path: &str) -> TestResponse {
        self.request(Method::HEAD, path).await
    }

    /// Sends a bodiless request.
    pub async fn request(&self, method: Method, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header(http::header::HOST, "testserver")
            .body(axum::body::Body::empty())
            .expect("request builder should not fail");

        let response = self
            .app
            .clone()
            .oneshot(req)
            .await
            .expect("router should not error");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .map_or_else(|_| Bytes::new(), http_body_util::Collected::to_bytes);

        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }
}

/// The response from a test request.
#[derive(Debug, Clone)]
pub struct TestResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body as raw bytes.
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Returns the response body as a UTF-8 string.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Deserializes the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, MpttError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Returns the numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns the value of a header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns `true` if the response body contains the given text.
    pub fn contains(&self, text: &str) -> bool {
        self.text().contains(text)
    }
}
