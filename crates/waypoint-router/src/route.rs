//! Route declarations.
//!
//! A [`Route`] is one fully-specified endpoint: method, pattern, guards,
//! documentation metadata, and a handler. Binding a handler is where the
//! arity invariant is enforced: the number and types of values the pattern
//! and guards will contribute to the typed value chain must equal the
//! handler's parameters — a mismatch is a declaration-time
//! [`RouteDefError`], never a request-time surprise.

use std::any::{Any, TypeId};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use waypoint_core::{ParamLocation, Response};
use waypoint_types::Method;

use crate::chain::CapturedValues;
use crate::guard::Guard;
use crate::pattern::{Pattern, PatternSegment};

/// Boxed future returned by handlers and by dispatch.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// The stored handler: consumes the typed value chain, unpacks it into the
/// original closure's parameters and returns the response future.
pub(crate) type BoxInvoke =
    Arc<dyn Fn(CapturedValues) -> Result<BoxFuture<Response>, ChainError> + Send + Sync>;

/// Chain unpacking fault.
///
/// Unreachable once a route passed its bind-time checks; surfaced (and
/// logged) as an internal failure rather than a panic if it ever happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainError {
    /// Chain position that failed to unpack.
    pub position: usize,
    /// The type the handler expected there.
    pub expected: &'static str,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value chain position {} does not hold a {}",
            self.position, self.expected
        )
    }
}

impl std::error::Error for ChainError {}

/// Declaration-time route definition error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDefError {
    /// The pattern and guards contribute a different number of values than
    /// the handler takes.
    ArityMismatch {
        /// Values the declaration contributes.
        declared: usize,
        /// Parameters the handler takes.
        bound: usize,
    },
    /// A chain position's declared type differs from the handler's
    /// parameter type.
    TypeMismatch {
        /// Zero-based chain position.
        position: usize,
        /// Type the pattern/guard contributes.
        declared: &'static str,
        /// Type the handler expects.
        bound: &'static str,
    },
}

impl fmt::Display for RouteDefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteDefError::ArityMismatch { declared, bound } => write!(
                f,
                "route declares {declared} typed value(s) but the handler takes {bound}"
            ),
            RouteDefError::TypeMismatch {
                position,
                declared,
                bound,
            } => write!(
                f,
                "typed value {position} is declared as {declared} but the handler expects {bound}"
            ),
        }
    }
}

impl std::error::Error for RouteDefError {}

/// One documented request parameter of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Path, query or header.
    pub location: ParamLocation,
    /// Schema type hint (`"string"`, `"integer"`, ...).
    pub type_hint: &'static str,
    /// Whether the request must supply it.
    pub required: bool,
}

/// Introspectable description of a declared route.
///
/// This is what the documentation generator reads; it is kept in
/// declaration order, the same order the matcher tries leaves in.
#[derive(Debug, Clone)]
pub struct RouteMeta {
    /// HTTP method.
    pub method: Method,
    /// Canonical rendered pattern, e.g. `/users/{id}`.
    pub path: String,
    /// Short summary for documentation.
    pub summary: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Grouping tags.
    pub tags: Vec<String>,
    /// Named security requirements.
    pub security: Vec<String>,
    /// Whether the route is deprecated.
    pub deprecated: bool,
    /// Path captures and guard parameters, in declaration order.
    pub parameters: Vec<ParamSpec>,
}

/// A fully-declared route ready for registration.
pub struct Route {
    pub(crate) pattern: Pattern,
    pub(crate) guards: Vec<Arc<dyn Guard>>,
    pub(crate) invoke: BoxInvoke,
    pub(crate) arity: usize,
    pub(crate) meta: RouteMeta,
}

impl Route {
    /// Start declaring a route for an arbitrary method.
    #[must_use]
    pub fn new(method: Method, pattern: Pattern) -> RouteBuilder {
        RouteBuilder {
            method,
            pattern,
            guards: Vec::new(),
            summary: None,
            description: None,
            tags: Vec::new(),
            security: Vec::new(),
            deprecated: false,
        }
    }

    /// Start declaring a GET route.
    #[must_use]
    pub fn get(pattern: Pattern) -> RouteBuilder {
        Self::new(Method::Get, pattern)
    }

    /// Start declaring a POST route.
    #[must_use]
    pub fn post(pattern: Pattern) -> RouteBuilder {
        Self::new(Method::Post, pattern)
    }

    /// Start declaring a PUT route.
    #[must_use]
    pub fn put(pattern: Pattern) -> RouteBuilder {
        Self::new(Method::Put, pattern)
    }

    /// Start declaring a DELETE route.
    #[must_use]
    pub fn delete(pattern: Pattern) -> RouteBuilder {
        Self::new(Method::Delete, pattern)
    }

    /// Start declaring a PATCH route.
    #[must_use]
    pub fn patch(pattern: Pattern) -> RouteBuilder {
        Self::new(Method::Patch, pattern)
    }

    /// The declared metadata.
    #[must_use]
    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }

    /// Number of typed values the handler receives.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.meta.method)
            .field("path", &self.meta.path)
            .field("arity", &self.arity)
            .field("guards", &self.guards.len())
            .finish_non_exhaustive()
    }
}

/// Builder accumulating guards and metadata before the handler is bound.
#[must_use]
pub struct RouteBuilder {
    method: Method,
    pattern: Pattern,
    guards: Vec<Arc<dyn Guard>>,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    security: Vec<String>,
    deprecated: bool,
}

impl RouteBuilder {
    /// Attach a guard; guards are evaluated in attachment order.
    pub fn guard(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Set the documentation summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the documentation description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add one grouping tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add a named security requirement.
    pub fn security(mut self, scheme: impl Into<String>) -> Self {
        self.security.push(scheme.into());
        self
    }

    /// Mark the route deprecated in documentation.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// The chain slots this declaration will fill at request time: path
    /// captures and the wildcard in pattern order, then extracting guards
    /// in attachment order.
    fn value_slots(&self) -> Vec<(TypeId, &'static str)> {
        let mut slots = Vec::new();
        for segment in self.pattern.segments() {
            match segment {
                PatternSegment::Capture(capture) => {
                    slots.push((capture.type_id(), capture.rust_type()));
                }
                PatternSegment::Wildcard(_) => {
                    slots.push((TypeId::of::<String>(), std::any::type_name::<String>()));
                }
                PatternSegment::Literal(_) => {}
            }
        }
        for guard in &self.guards {
            if let Some(value_type) = guard.value_type() {
                slots.push(value_type);
            }
        }
        slots
    }

    fn check_slot<T: 'static>(
        slots: &[(TypeId, &'static str)],
        position: usize,
    ) -> Result<(), RouteDefError> {
        let (type_id, declared) = slots[position];
        if type_id == TypeId::of::<T>() {
            Ok(())
        } else {
            Err(RouteDefError::TypeMismatch {
                position,
                declared,
                bound: std::any::type_name::<T>(),
            })
        }
    }

    fn check_arity(slots: &[(TypeId, &'static str)], bound: usize) -> Result<(), RouteDefError> {
        if slots.len() == bound {
            Ok(())
        } else {
            Err(RouteDefError::ArityMismatch {
                declared: slots.len(),
                bound,
            })
        }
    }

    fn into_route(self, invoke: BoxInvoke, arity: usize) -> Route {
        let mut parameters = Vec::new();
        for segment in self.pattern.segments() {
            match segment {
                PatternSegment::Capture(capture) => parameters.push(ParamSpec {
                    name: capture.name().to_string(),
                    location: ParamLocation::Path,
                    type_hint: capture.type_hint(),
                    required: true,
                }),
                PatternSegment::Wildcard(name) => parameters.push(ParamSpec {
                    name: name.clone(),
                    location: ParamLocation::Path,
                    type_hint: "string",
                    required: true,
                }),
                PatternSegment::Literal(_) => {}
            }
        }
        for guard in &self.guards {
            if let Some(spec) = guard.spec() {
                parameters.push(spec);
            }
        }
        let meta = RouteMeta {
            method: self.method,
            path: self.pattern.render(),
            summary: self.summary,
            description: self.description,
            tags: self.tags,
            security: self.security,
            deprecated: self.deprecated,
            parameters,
        };
        Route {
            pattern: self.pattern,
            guards: self.guards,
            invoke,
            arity,
            meta,
        }
    }

    /// Bind a nullary handler.
    pub fn bind0<F, Fut>(self, handler: F) -> Result<Route, RouteDefError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let slots = self.value_slots();
        Self::check_arity(&slots, 0)?;
        let invoke: BoxInvoke =
            Arc::new(move |_values| Ok(Box::pin(handler()) as BoxFuture<Response>));
        Ok(self.into_route(invoke, 0))
    }

    /// Bind a one-parameter handler.
    pub fn bind1<T1, F, Fut>(self, handler: F) -> Result<Route, RouteDefError>
    where
        T1: Send + 'static,
        F: Fn(T1) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let slots = self.value_slots();
        Self::check_arity(&slots, 1)?;
        Self::check_slot::<T1>(&slots, 0)?;
        let invoke: BoxInvoke = Arc::new(move |values: CapturedValues| {
            let mut iter = values.into_values().into_iter();
            let first = take_value::<T1>(&mut iter, 0)?;
            Ok(Box::pin(handler(first)) as BoxFuture<Response>)
        });
        Ok(self.into_route(invoke, 1))
    }

    /// Bind a two-parameter handler.
    pub fn bind2<T1, T2, F, Fut>(self, handler: F) -> Result<Route, RouteDefError>
    where
        T1: Send + 'static,
        T2: Send + 'static,
        F: Fn(T1, T2) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let slots = self.value_slots();
        Self::check_arity(&slots, 2)?;
        Self::check_slot::<T1>(&slots, 0)?;
        Self::check_slot::<T2>(&slots, 1)?;
        let invoke: BoxInvoke = Arc::new(move |values: CapturedValues| {
            let mut iter = values.into_values().into_iter();
            let first = take_value::<T1>(&mut iter, 0)?;
            let second = take_value::<T2>(&mut iter, 1)?;
            Ok(Box::pin(handler(first, second)) as BoxFuture<Response>)
        });
        Ok(self.into_route(invoke, 2))
    }

    /// Bind a three-parameter handler.
    pub fn bind3<T1, T2, T3, F, Fut>(self, handler: F) -> Result<Route, RouteDefError>
    where
        T1: Send + 'static,
        T2: Send + 'static,
        T3: Send + 'static,
        F: Fn(T1, T2, T3) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let slots = self.value_slots();
        Self::check_arity(&slots, 3)?;
        Self::check_slot::<T1>(&slots, 0)?;
        Self::check_slot::<T2>(&slots, 1)?;
        Self::check_slot::<T3>(&slots, 2)?;
        let invoke: BoxInvoke = Arc::new(move |values: CapturedValues| {
            let mut iter = values.into_values().into_iter();
            let first = take_value::<T1>(&mut iter, 0)?;
            let second = take_value::<T2>(&mut iter, 1)?;
            let third = take_value::<T3>(&mut iter, 2)?;
            Ok(Box::pin(handler(first, second, third)) as BoxFuture<Response>)
        });
        Ok(self.into_route(invoke, 3))
    }

    /// Bind a four-parameter handler.
    pub fn bind4<T1, T2, T3, T4, F, Fut>(self, handler: F) -> Result<Route, RouteDefError>
    where
        T1: Send + 'static,
        T2: Send + 'static,
        T3: Send + 'static,
        T4: Send + 'static,
        F: Fn(T1, T2, T3, T4) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let slots = self.value_slots();
        Self::check_arity(&slots, 4)?;
        Self::check_slot::<T1>(&slots, 0)?;
        Self::check_slot::<T2>(&slots, 1)?;
        Self::check_slot::<T3>(&slots, 2)?;
        Self::check_slot::<T4>(&slots, 3)?;
        let invoke: BoxInvoke = Arc::new(move |values: CapturedValues| {
            let mut iter = values.into_values().into_iter();
            let first = take_value::<T1>(&mut iter, 0)?;
            let second = take_value::<T2>(&mut iter, 1)?;
            let third = take_value::<T3>(&mut iter, 2)?;
            let fourth = take_value::<T4>(&mut iter, 3)?;
            Ok(Box::pin(handler(first, second, third, fourth)) as BoxFuture<Response>)
        });
        Ok(self.into_route(invoke, 4))
    }
}

fn take_value<T: 'static>(
    iter: &mut std::vec::IntoIter<Box<dyn Any + Send>>,
    position: usize,
) -> Result<T, ChainError> {
    let boxed = iter.next().ok_or(ChainError {
        position,
        expected: std::any::type_name::<T>(),
    })?;
    boxed.downcast::<T>().map(|value| *value).map_err(|_| ChainError {
        position,
        expected: std::any::type_name::<T>(),
    })
}
