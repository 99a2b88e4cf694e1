//! # mptt-urls-http
//!
//! Request and response types handed to views and returned by the tree
//! resolver. [`HttpRequest`] can be built directly (tests, CLI) or from an
//! Axum request; [`HttpResponse`] converts into an Axum response.

pub mod request;
pub mod response;

pub use request::{HttpRequest, HttpRequestBuilder};
pub use response::{HttpResponse, HttpResponseNotFound, ResponseContent};
