//! The request slice the matcher looks at.
//!
//! Transport concerns (bodies, connection state, streaming) live outside
//! this engine; matching only ever reads method, path, query and headers.

use std::collections::HashMap;

use crate::query::QueryString;
use waypoint_types::Method;

/// HTTP headers collection.
///
/// Names are stored lowercased; lookups are case-insensitive. A name may
/// carry multiple values, preserved in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Headers {
    inner: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Create empty headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the first value for a name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Get all values for a name.
    pub fn get_all(&self, name: &str) -> impl Iterator<Item = &str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Check whether a header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    /// Append a header value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .entry(name.into().to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Returns the number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// The parts of an incoming request the routing engine consumes.
#[derive(Debug, Clone)]
pub struct RequestParts {
    method: Method,
    path: String,
    query: String,
    headers: Headers,
}

impl RequestParts {
    /// Create request parts from a method and a request target.
    ///
    /// The target is split at the first `?` into path and query string.
    ///
    /// # Example
    ///
    /// ```
    /// use waypoint_core::{Method, RequestParts};
    ///
    /// let parts = RequestParts::new(Method::Get, "/items/7?limit=10");
    /// assert_eq!(parts.path(), "/items/7");
    /// assert_eq!(parts.query().get("limit"), Some("10"));
    /// ```
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match memchr::memchr(b'?', target.as_bytes()) {
            Some(pos) => (&target[..pos], &target[pos + 1..]),
            None => (target, ""),
        };
        Self {
            method,
            path: path.to_string(),
            query: query.to_string(),
            headers: Headers::new(),
        }
    }

    /// Attach a header, builder-style.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// The request path, percent-encoded as received.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A borrowed view over the query string.
    #[must_use]
    pub fn query(&self) -> QueryString<'_> {
        QueryString::parse(&self.query)
    }

    /// The headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// The path split into match segments.
    #[must_use]
    pub fn path_segments(&self) -> Vec<&str> {
        path_segments(&self.path)
    }
}

/// Split a path into the segments the matcher walks.
///
/// The leading slash is consumed; every further slash delimits a segment,
/// and a trailing slash yields a final empty segment. There is no
/// normalization: `/foo` and `/foo/` are different inputs on purpose.
///
/// # Example
///
/// ```
/// use waypoint_core::path_segments;
///
/// assert_eq!(path_segments("/"), Vec::<&str>::new());
/// assert_eq!(path_segments("/foo"), vec!["foo"]);
/// assert_eq!(path_segments("/foo/"), vec!["foo", ""]);
/// assert_eq!(path_segments("/foo/bar"), vec!["foo", "bar"]);
/// ```
#[must_use]
pub fn path_segments(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}
