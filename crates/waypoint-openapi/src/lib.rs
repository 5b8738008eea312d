//! OpenAPI 3.1 document generation from route tables.
//!
//! This crate turns the metadata a [`waypoint_router::Router`] keeps about
//! its declared routes into an OpenAPI 3.1 document:
//!
//! - [`OpenApi`] and friends — the serializable document types
//! - [`OpenApiBuilder`] — accumulates document metadata and routes
//!
//! # Example
//!
//! ```
//! use waypoint_openapi::OpenApiBuilder;
//! use waypoint_router::{Pattern, Route, Router};
//! use waypoint_core::Response;
//!
//! let router = Router::builder()
//!     .route(
//!         Route::get(Pattern::parse("/users/{id}").unwrap())
//!             .summary("Fetch one user")
//!             .bind1(|_id: String| async { Response::ok() })
//!             .unwrap(),
//!     )
//!     .build();
//!
//! let document = OpenApiBuilder::new("My API", "1.0.0")
//!     .routes(router.routes())
//!     .build();
//! assert!(document.paths.contains_key("/users/{id}"));
//! ```

#![forbid(unsafe_code)]

mod builder;
mod document;

pub use builder::OpenApiBuilder;
pub use document::{
    Info, OpenApi, Operation, Parameter, ParameterLocation, ParameterSchema, PathItem, SchemaType,
    Server, Tag,
};
