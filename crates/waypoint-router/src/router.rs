//! Router construction and the server-integration surface.
//!
//! [`RouterBuilder`] is the single-writer construction phase: routes are
//! appended (directly or by including other builders) and nothing can be
//! matched yet. [`Router::build`] produces the immutable snapshot; from
//! then on matching is purely functional over the tree and any number of
//! requests may be looked up concurrently without locking.

use std::collections::HashMap;
use std::future::ready;

use waypoint_core::{Headers, QueryString, RequestParts, Response, StatusCode, path_segments};
use waypoint_types::Method;

use crate::chain::CapturedValues;
use crate::dispatch::failure_response;
use crate::r#match::{FailureLog, MatchOutcome, MatchedRoute, walk};
use crate::pattern::PatternError;
use crate::route::{BoxFuture, Route, RouteMeta};
use crate::tree::{Leaf, Node};

/// Append-only collection of route declarations.
#[derive(Default)]
#[must_use]
pub struct RouterBuilder {
    routes: Vec<Route>,
}

impl std::fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}

impl RouterBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one declared route. Registration order is significant: among
    /// leaves at the same node whose guards all pass, first registered
    /// wins.
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Append every route of another builder, preserving order.
    pub fn include(mut self, other: RouterBuilder) -> Self {
        self.routes.extend(other.routes);
        self
    }

    /// Append another builder's routes under a literal path prefix.
    ///
    /// The prefix is parsed as a pattern and may only contain literal
    /// segments — a capture in the prefix would silently change every
    /// included handler's arity.
    pub fn include_with_prefix(
        mut self,
        prefix: &str,
        other: RouterBuilder,
    ) -> Result<Self, PatternError> {
        let prefix = crate::pattern::Pattern::parse(prefix)?;
        for mut route in other.routes {
            route.pattern = route.pattern.prefixed(&prefix)?;
            route.meta.path = route.pattern.render();
            self.routes.push(route);
        }
        Ok(self)
    }

    /// Prepend a tag to every route added so far.
    pub fn tag_all(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        for route in &mut self.routes {
            route.meta.tags.insert(0, tag.clone());
        }
        self
    }

    /// Compile the declarations into an immutable routing snapshot.
    pub fn build(self) -> Router {
        let mut roots: HashMap<Method, Node> = HashMap::new();
        let mut metas = Vec::with_capacity(self.routes.len());
        for (index, route) in self.routes.into_iter().enumerate() {
            let leaf = Leaf {
                guards: route.guards,
                invoke: route.invoke,
                route: index,
            };
            roots
                .entry(route.meta.method)
                .or_default()
                .insert(route.pattern.segments(), leaf);
            metas.push(route.meta);
        }
        Router { roots, metas }
    }
}

/// The compiled, immutable routing table.
pub struct Router {
    roots: HashMap<Method, Node>,
    metas: Vec<RouteMeta>,
}

impl Router {
    /// Start building a router.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Match a request against the table.
    ///
    /// Purely functional: no state is shared between concurrent lookups;
    /// each walk allocates its own typed value chain.
    #[must_use]
    pub fn lookup<'r>(
        &'r self,
        method: Method,
        path: &str,
        query: &QueryString<'_>,
        headers: &Headers,
    ) -> MatchOutcome<'r> {
        let Some(root) = self.roots.get(&method) else {
            return MatchOutcome::NoRoute;
        };
        let segments = path_segments(path);
        let mut values = CapturedValues::new();
        let mut log = FailureLog::default();
        match walk(root, &segments, query, headers, &mut values, &mut log) {
            Some((invoke, index)) => MatchOutcome::Matched(MatchedRoute {
                invoke,
                values,
                meta: &self.metas[index],
            }),
            None => log.into_outcome(),
        }
    }

    /// Match pre-assembled request parts.
    #[must_use]
    pub fn matches<'r>(&'r self, parts: &RequestParts) -> MatchOutcome<'r> {
        self.lookup(parts.method(), parts.path(), &parts.query(), parts.headers())
    }

    /// Whether some route structurally covers `method` + `path`.
    ///
    /// Guard and decode failures still count as "defined": such requests
    /// belong to this router and will produce a client error, not a 404.
    #[must_use]
    pub fn is_route_defined(&self, method: Method, path: &str) -> bool {
        !matches!(
            self.lookup(method, path, &QueryString::default(), &Headers::new()),
            MatchOutcome::NoRoute
        )
    }

    /// The methods that structurally cover `path`, for Allow headers.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> AllowedMethods {
        AllowedMethods::new(
            Method::ALL
                .into_iter()
                .filter(|method| self.is_route_defined(*method, path))
                .collect(),
        )
    }

    /// Handle a request end to end.
    ///
    /// `None` means "not my route": no structural match exists and the
    /// embedder decides the not-found response. Every other outcome —
    /// including client errors the router synthesizes itself — yields a
    /// response future.
    #[must_use]
    pub fn handle(&self, parts: &RequestParts) -> Option<BoxFuture<Response>> {
        match self.matches(parts) {
            MatchOutcome::Matched(matched) => Some(matched.dispatch()),
            MatchOutcome::Parse(report) => Some(Box::pin(ready(failure_response(
                StatusCode::BAD_REQUEST,
                "parse_error",
                &report,
            )))),
            MatchOutcome::Validation(report) => Some(Box::pin(ready(failure_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                &report,
            )))),
            MatchOutcome::NoRoute => None,
        }
    }

    /// The declared routes, in registration (and matching-precedence)
    /// order. This is the view documentation generators consume.
    #[must_use]
    pub fn routes(&self) -> &[RouteMeta] {
        &self.metas
    }

    /// Number of declared routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metas.len()
    }

    /// True when no routes are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.metas.len())
            .field("methods", &self.roots.len())
            .finish_non_exhaustive()
    }
}

/// Allowed methods for a path, normalized for an HTTP Allow header.
#[derive(Debug, Clone)]
pub struct AllowedMethods {
    methods: Vec<Method>,
}

impl AllowedMethods {
    /// Create a normalized allow list.
    ///
    /// - Adds `HEAD` if `GET` is present.
    /// - Sorts and de-duplicates for stable output.
    #[must_use]
    pub fn new(mut methods: Vec<Method>) -> Self {
        if methods.contains(&Method::Get) && !methods.contains(&Method::Head) {
            methods.push(Method::Head);
        }
        methods.sort_unstable();
        methods.dedup();
        Self { methods }
    }

    /// Access the normalized methods.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Check whether a method is allowed.
    #[must_use]
    pub fn contains(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    /// Format as an HTTP Allow header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        let mut out = String::new();
        for (idx, method) in self.methods.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            out.push_str(method.as_str());
        }
        out
    }

    /// True when no method covers the path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::route::Route;

    fn ok_route(method: Method, path: &str) -> Route {
        Route::new(method, Pattern::parse(path).unwrap())
            .bind0(|| async { Response::ok() })
            .unwrap()
    }

    #[test]
    fn allowed_methods_imply_head_for_get() {
        let allowed = AllowedMethods::new(vec![Method::Post, Method::Get]);
        assert_eq!(
            allowed.methods(),
            &[Method::Get, Method::Head, Method::Post]
        );
        assert_eq!(allowed.header_value(), "GET, HEAD, POST");
        assert!(allowed.contains(Method::Head));
    }

    #[test]
    fn router_reports_allowed_methods_per_path() {
        let router = Router::builder()
            .route(ok_route(Method::Get, "/items"))
            .route(ok_route(Method::Post, "/items"))
            .route(ok_route(Method::Delete, "/other"))
            .build();
        let allowed = router.allowed_methods("/items");
        assert_eq!(
            allowed.methods(),
            &[Method::Get, Method::Head, Method::Post]
        );
        assert!(router.allowed_methods("/missing").is_empty());
    }

    #[test]
    fn builder_include_preserves_order() {
        let first = Router::builder().route(ok_route(Method::Get, "/a"));
        let second = Router::builder().route(ok_route(Method::Get, "/b"));
        let router = first.include(second).build();
        let paths: Vec<_> = router.routes().iter().map(|meta| meta.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b"]);
    }

    #[test]
    fn include_with_prefix_rewrites_paths() {
        let users = Router::builder()
            .route(ok_route(Method::Get, "/users"))
            .route(ok_route(Method::Get, "/users/{id}"));
        let router = Router::builder()
            .include_with_prefix("/api/v1", users)
            .unwrap()
            .build();
        let paths: Vec<_> = router.routes().iter().map(|meta| meta.path.as_str()).collect();
        assert_eq!(paths, vec!["/api/v1/users", "/api/v1/users/{id}"]);
        assert!(router.is_route_defined(Method::Get, "/api/v1/users/7"));
        assert!(!router.is_route_defined(Method::Get, "/users"));
    }

    #[test]
    fn include_with_prefix_rejects_captures() {
        let inner = Router::builder().route(ok_route(Method::Get, "/users"));
        let err = Router::builder()
            .include_with_prefix("/api/{version}", inner)
            .unwrap_err();
        assert_eq!(err, PatternError::PrefixNotLiteral);
    }

    #[test]
    fn tag_all_prepends() {
        let router = Router::builder()
            .route(
                Route::get(Pattern::parse("/a").unwrap())
                    .tag("inner")
                    .bind0(|| async { Response::ok() })
                    .unwrap(),
            )
            .tag_all("outer")
            .build();
        assert_eq!(router.routes()[0].tags, vec!["outer", "inner"]);
    }

    #[test]
    fn empty_router_matches_nothing() {
        let router = Router::builder().build();
        assert!(router.is_empty());
        assert!(!router.is_route_defined(Method::Get, "/"));
        assert!(matches!(
            router.lookup(
                Method::Get,
                "/",
                &QueryString::default(),
                &Headers::new()
            ),
            MatchOutcome::NoRoute
        ));
    }
}
