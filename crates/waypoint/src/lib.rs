//! Declarative route definition and matching with OpenAPI introspection.
//!
//! waypoint turns route declarations — typed path patterns, guards and
//! handlers — into an immutable per-method trie that classifies every
//! request four ways: matched, parse failure, validation failure, or not
//! a route of this table at all. The same declarations double as an
//! OpenAPI 3.1 document.
//!
//! # Quick Start
//!
//! ```
//! use waypoint::prelude::*;
//!
//! let router = Router::builder()
//!     .route(
//!         Route::get(Pattern::parse("/items/{id}").unwrap())
//!             .summary("Fetch one item")
//!             .bind1(|id: String| async move {
//!                 Response::ok().body_text(format!("item {id}"))
//!             })
//!             .unwrap(),
//!     )
//!     .build();
//!
//! let parts = RequestParts::new(Method::Get, "/items/7");
//! assert!(router.handle(&parts).is_some());
//!
//! let document = router.openapi("My API", "1.0.0");
//! assert!(document.paths.contains_key("/items/{id}"));
//! ```
//!
//! # Crate Structure
//!
//! - [`waypoint_types`] — the HTTP method vocabulary
//! - [`waypoint_core`] — request/response primitives, query parsing,
//!   segment decoding, failure reporting, logging
//! - [`waypoint_router`] — patterns, routes, guards, the matching trie
//!   and dispatch
//! - [`waypoint_openapi`] — OpenAPI 3.1 document generation

#![forbid(unsafe_code)]

pub use waypoint_core as core;
pub use waypoint_openapi as openapi;
pub use waypoint_router as router;
pub use waypoint_types as types;

pub use waypoint_core::{
    FailureReport, FromSegment, Headers, InvalidMethod, Method, ParamLocation, QueryString,
    RequestParts, Response, ResponseBody, SegmentError, StatusCode,
};
pub use waypoint_openapi::{OpenApi, OpenApiBuilder};
pub use waypoint_router::{
    AllowedMethods, BoxFuture, CapturedValues, ExistsQuery, Guard, GuardError, HeaderCapture,
    HeaderRule, MatchOutcome, MatchedRoute, OptionalQuery, Pattern, PatternError, QueryCapture,
    QueryRule, RequireHeader, Route, RouteBuilder, RouteDefError, RouteMeta, Router,
    RouterBuilder, failure_response, not_found_response,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        FromSegment, Guard, Headers, MatchOutcome, Method, OpenApi, OpenApiBuilder, OptionalQuery,
        Pattern, QueryCapture, QueryRule, QueryString, RequestParts, RequireHeader, Response,
        Route, Router, StatusCode,
    };
    pub use crate::OpenApiExt;
    pub use serde::{Deserialize, Serialize};
}

/// Extension trait for generating OpenAPI documents from routers.
pub trait OpenApiExt {
    /// Generate an OpenAPI 3.1 document covering every declared route.
    ///
    /// # Example
    ///
    /// ```
    /// use waypoint::prelude::*;
    ///
    /// let router = Router::builder()
    ///     .route(
    ///         Route::get(Pattern::parse("/health").unwrap())
    ///             .bind0(|| async { Response::ok() })
    ///             .unwrap(),
    ///     )
    ///     .build();
    ///
    /// let document = router.openapi("My API", "1.0.0");
    /// assert_eq!(document.info.title, "My API");
    /// ```
    fn openapi(&self, title: &str, version: &str) -> OpenApi;

    /// Generate a document with custom configuration applied to the
    /// builder after the routes are added.
    fn openapi_with<F>(&self, title: &str, version: &str, configure: F) -> OpenApi
    where
        F: FnOnce(OpenApiBuilder) -> OpenApiBuilder;
}

impl OpenApiExt for Router {
    fn openapi(&self, title: &str, version: &str) -> OpenApi {
        self.openapi_with(title, version, |builder| builder)
    }

    fn openapi_with<F>(&self, title: &str, version: &str, configure: F) -> OpenApi
    where
        F: FnOnce(OpenApiBuilder) -> OpenApiBuilder,
    {
        let builder = OpenApiBuilder::new(title, version).routes(self.routes());
        configure(builder).build()
    }
}
