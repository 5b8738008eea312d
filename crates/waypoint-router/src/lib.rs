//! Route compilation tree and matching engine.
//!
//! This crate turns declarative route definitions into an immutable
//! per-method trie and walks that trie to select at most one handler per
//! request:
//!
//! - [`Pattern`] — typed path patterns (literals, typed captures,
//!   wildcards, trailing-slash markers)
//! - [`Route`] — one declaration: method + pattern + guards + metadata +
//!   handler, with handler arity checked when the route is bound
//! - [`RouterBuilder`] / [`Router`] — append-only construction producing an
//!   immutable snapshot that is matched lock-free
//! - [`MatchOutcome`] — the four-way result of a lookup: matched, parse
//!   failure, validation failure, or no route at all
//!
//! # Matching precedence
//!
//! Within a node, literal children shadow typed captures, which shadow the
//! wildcard; captures are tried in declaration order, first successful
//! decode wins. Once a request structurally matches some pattern, a decode
//! or guard failure surfaces as a client error, never as "no route".
//!
//! # Example
//!
//! ```
//! use waypoint_core::{Headers, Method, QueryString};
//! use waypoint_router::{MatchOutcome, Pattern, Route, Router};
//!
//! let router = Router::builder()
//!     .route(
//!         Route::get(Pattern::parse("/hello/{name}").unwrap())
//!             .bind1(|name: String| async move {
//!                 waypoint_core::Response::ok().body_text(name)
//!             })
//!             .unwrap(),
//!     )
//!     .build();
//!
//! let outcome = router.lookup(
//!     Method::Get,
//!     "/hello/world",
//!     &QueryString::default(),
//!     &Headers::new(),
//! );
//! assert!(matches!(outcome, MatchOutcome::Matched(_)));
//! ```

#![forbid(unsafe_code)]

mod chain;
mod dispatch;
mod guard;
mod r#match;
mod pattern;
mod route;
mod router;
mod tree;

pub use chain::CapturedValues;
pub use dispatch::{failure_response, not_found_response};
pub use guard::{
    ExistsQuery, Guard, GuardError, HeaderCapture, HeaderRule, OptionalQuery, QueryCapture,
    QueryRule, RequireHeader,
};
pub use r#match::{MatchOutcome, MatchedRoute};
pub use pattern::{Capture, Pattern, PatternError, PatternSegment};
pub use route::{BoxFuture, ChainError, ParamSpec, Route, RouteBuilder, RouteDefError, RouteMeta};
pub use router::{AllowedMethods, Router, RouterBuilder};
