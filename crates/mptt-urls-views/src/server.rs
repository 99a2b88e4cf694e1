//! Mounting a resolver on an Axum router.
//!
//! [`url_mptt`] answers every path below a prefix by handing the request to an
//! [`MpttResolver`]. The tree walk issues blocking store queries, so each
//! resolution runs on the blocking thread pool.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mptt_urls_views::resolver::MpttResolver;
//! use mptt_urls_views::server::{run, url_mptt};
//!
//! # async fn example(resolver: MpttResolver) -> Result<(), Box<dyn std::error::Error>> {
//! let router = url_mptt("/gallery/", Arc::new(resolver));
//! run(router, "127.0.0.1:8000").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use http::StatusCode;
use mptt_urls_core::{MpttError, MpttResult};
use mptt_urls_http::{HttpRequest, HttpResponse};

use crate::resolver::MpttResolver;

/// Builds a router serving the tree below `prefix`.
///
/// The resolver is re-mounted at `prefix`, so its [`url_for`] output matches
/// the routes. Configuration and store errors are logged and answered with
/// a 500.
///
/// [`url_for`]: MpttResolver::url_for
pub fn url_mptt(prefix: &str, resolver: Arc<MpttResolver>) -> axum::Router {
    let resolver = Arc::new(resolver.as_ref().clone().with_prefix(prefix));
    let base = resolver.prefix().trim_end_matches('/').to_string();

    let handler = move |req: Request<Body>| {
        let resolver = resolver.clone();
        async move {
            let (parts, _body) = req.into_parts();
            let request = HttpRequest::from_axum(&parts);
            let outcome = tokio::task::spawn_blocking(move || resolver.handle(&request)).await;

            match outcome {
                Ok(Ok(response)) => response.into_response(),
                Ok(Err(err)) => error_response(&err),
                Err(join_error) => {
                    tracing::error!(error = %join_error, "resolution task failed");
                    HttpResponse::server_error("Server Error (500)").into_response()
                }
            }
        }
    };

    let router = axum::Router::new()
        .route(&format!("{base}/"), any(handler.clone()))
        .route(&format!("{base}/{{*path}}"), any(handler.clone()));
    if base.is_empty() {
        router
    } else {
        router.route(&base, any(handler))
    }
}

fn error_response(err: &MpttError) -> Response {
    tracing::error!(error = %err, status = err.status_code(), "resolution failed");
    let mut response = HttpResponse::server_error("Server Error (500)");
    response.set_status(StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));
    response.into_response()
}

/// Serves `router` on `addr` until the process is stopped.
pub async fn run(router: axum::Router, addr: &str) -> MpttResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        MpttError::OperationalError(format!("Failed to bind to {addr}: {e}"))
    })?;
    tracing::info!("Serving tree URLs at http://{addr}/");
    axum::serve(listener, router)
        .await
        .map_err(|e| MpttError::OperationalError(format!("Server error: {e}")))
}
