//! Typed path patterns.
//!
//! A pattern is an ordered sequence of segment matchers:
//!
//! - a **literal** matches one segment exactly (the empty literal models a
//!   trailing slash, so `/foo/` and `/foo` are distinct patterns),
//! - a **typed capture** decodes one segment into a value via
//!   [`FromSegment`],
//! - a **wildcard** absorbs every remaining segment as a single string and
//!   must therefore come last.
//!
//! Patterns can be assembled programmatically for non-string captures, or
//! parsed from a path string where `{name}` is a string capture and
//! `*name` a wildcard.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use waypoint_core::{FromSegment, SegmentError};

/// Decode function stored per capture: one segment in, a boxed typed value
/// out. Shared between the pattern and the compiled tree.
pub(crate) type SegmentDecoder =
    Arc<dyn Fn(&str) -> Result<Box<dyn Any + Send>, SegmentError> + Send + Sync>;

/// A typed capture: a name plus the decode function for its type.
#[derive(Clone)]
pub struct Capture {
    name: String,
    type_id: TypeId,
    rust_type: &'static str,
    type_hint: &'static str,
    decoder: SegmentDecoder,
}

impl Capture {
    /// Create a capture decoding into `T`.
    #[must_use]
    pub fn of<T>(name: impl Into<String>) -> Self
    where
        T: FromSegment + Send + 'static,
    {
        Self {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            rust_type: std::any::type_name::<T>(),
            type_hint: T::type_hint(),
            decoder: Arc::new(|segment| {
                T::from_segment(segment).map(|value| Box::new(value) as Box<dyn Any + Send>)
            }),
        }
    }

    /// The capture name, e.g. `id` in `{id}`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the decoded type; captures with equal ids share a tree
    /// child.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust name of the decoded type, for declaration-time diagnostics.
    #[must_use]
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }

    /// Schema type hint for documentation.
    #[must_use]
    pub fn type_hint(&self) -> &'static str {
        self.type_hint
    }

    pub(crate) fn decoder(&self) -> SegmentDecoder {
        Arc::clone(&self.decoder)
    }
}

impl PartialEq for Capture {
    fn eq(&self, other: &Self) -> bool {
        // The decoder is fully determined by the captured type, so comparing
        // the type id covers it.
        self.name == other.name && self.type_id == other.type_id
    }
}

impl Eq for Capture {}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capture")
            .field("name", &self.name)
            .field("type", &self.rust_type)
            .finish_non_exhaustive()
    }
}

/// One element of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Exact-match segment; the empty string is the trailing-slash marker.
    Literal(String),
    /// Typed capture.
    Capture(Capture),
    /// Catch-all; absorbs the rest of the path as one string value.
    Wildcard(String),
}

/// Error from pattern parsing or composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Pattern strings must start with `/`.
    MissingLeadingSlash,
    /// `{}` with no name inside.
    EmptyCaptureName,
    /// A segment with unbalanced or stray braces.
    MalformedCapture(String),
    /// `*` with no name after it.
    EmptyWildcardName,
    /// A wildcard was followed by further segments.
    WildcardNotLast,
    /// An include prefix may only contain literal segments.
    PrefixNotLiteral,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::MissingLeadingSlash => write!(f, "pattern must start with `/`"),
            PatternError::EmptyCaptureName => write!(f, "capture has no name"),
            PatternError::MalformedCapture(segment) => {
                write!(f, "malformed capture segment `{segment}`")
            }
            PatternError::EmptyWildcardName => write!(f, "wildcard has no name"),
            PatternError::WildcardNotLast => {
                write!(f, "wildcard must be the last pattern segment")
            }
            PatternError::PrefixNotLiteral => {
                write!(f, "include prefix may only contain literal segments")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// An ordered sequence of segment matchers describing one route path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<PatternSegment>,
}

impl Pattern {
    /// The empty pattern, matching exactly `/`.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Append a literal segment.
    ///
    /// # Panics
    ///
    /// Panics if a wildcard was already appended or the literal contains a
    /// slash; both are programming errors in a route table.
    #[must_use]
    pub fn literal(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        assert!(
            !segment.contains('/'),
            "literal segment must not contain `/`"
        );
        self.assert_open();
        self.segments.push(PatternSegment::Literal(segment));
        self
    }

    /// Append a typed capture decoding into `T`.
    ///
    /// # Panics
    ///
    /// Panics if a wildcard was already appended.
    #[must_use]
    pub fn capture<T>(mut self, name: impl Into<String>) -> Self
    where
        T: FromSegment + Send + 'static,
    {
        self.assert_open();
        self.segments
            .push(PatternSegment::Capture(Capture::of::<T>(name)));
        self
    }

    /// Append a catch-all for the rest of the path. Must come last.
    ///
    /// # Panics
    ///
    /// Panics if a wildcard was already appended.
    #[must_use]
    pub fn wildcard(mut self, name: impl Into<String>) -> Self {
        self.assert_open();
        self.segments.push(PatternSegment::Wildcard(name.into()));
        self
    }

    /// Mark the pattern as ending in a slash (`/foo/` rather than `/foo`).
    ///
    /// # Panics
    ///
    /// Panics if a wildcard was already appended.
    #[must_use]
    pub fn trailing_slash(mut self) -> Self {
        self.assert_open();
        self.segments.push(PatternSegment::Literal(String::new()));
        self
    }

    fn assert_open(&self) {
        assert!(
            !matches!(self.segments.last(), Some(PatternSegment::Wildcard(_))),
            "no segments may follow a wildcard"
        );
    }

    /// Parse a pattern from a path string.
    ///
    /// `{name}` is a string capture, `*name` a wildcard, a trailing `/` the
    /// trailing-slash marker. Typed captures beyond `String` are appended
    /// via [`Pattern::capture`].
    ///
    /// # Example
    ///
    /// ```
    /// use waypoint_router::Pattern;
    ///
    /// let pattern = Pattern::parse("/users/{id}/posts").unwrap();
    /// assert_eq!(pattern.render(), "/users/{id}/posts");
    /// assert!(Pattern::parse("no-slash").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self, PatternError> {
        if !path.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash);
        }
        let mut pattern = Pattern::root();
        let raw = waypoint_core::path_segments(path);
        for segment in &raw {
            if matches!(pattern.segments.last(), Some(PatternSegment::Wildcard(_))) {
                return Err(PatternError::WildcardNotLast);
            }
            if let Some(inner) = segment.strip_prefix('{') {
                let Some(name) = inner.strip_suffix('}') else {
                    return Err(PatternError::MalformedCapture((*segment).to_string()));
                };
                if name.is_empty() {
                    return Err(PatternError::EmptyCaptureName);
                }
                pattern
                    .segments
                    .push(PatternSegment::Capture(Capture::of::<String>(name)));
            } else if let Some(name) = segment.strip_prefix('*') {
                if name.is_empty() {
                    return Err(PatternError::EmptyWildcardName);
                }
                pattern
                    .segments
                    .push(PatternSegment::Wildcard(name.to_string()));
            } else if segment.contains(['{', '}']) {
                return Err(PatternError::MalformedCapture((*segment).to_string()));
            } else {
                // Includes the final empty segment of a trailing slash;
                // mid-path empty segments are kept verbatim too.
                pattern
                    .segments
                    .push(PatternSegment::Literal((*segment).to_string()));
            }
        }
        Ok(pattern)
    }

    /// Prepend a literal-only prefix pattern, normalizing away the prefix's
    /// own trailing-slash marker.
    pub(crate) fn prefixed(self, prefix: &Pattern) -> Result<Self, PatternError> {
        let mut segments = Vec::with_capacity(prefix.segments.len() + self.segments.len());
        for (index, segment) in prefix.segments.iter().enumerate() {
            match segment {
                PatternSegment::Literal(lit) => {
                    // The prefix's trailing slash collapses into the join.
                    if lit.is_empty() && index + 1 == prefix.segments.len() {
                        continue;
                    }
                    segments.push(PatternSegment::Literal(lit.clone()));
                }
                PatternSegment::Capture(_) | PatternSegment::Wildcard(_) => {
                    return Err(PatternError::PrefixNotLiteral);
                }
            }
        }
        segments.extend(self.segments);
        Ok(Self { segments })
    }

    /// The segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    /// The typed captures, in order (the wildcard is not included).
    pub fn captures(&self) -> impl Iterator<Item = &Capture> {
        self.segments.iter().filter_map(|segment| match segment {
            PatternSegment::Capture(capture) => Some(capture),
            _ => None,
        })
    }

    /// Render the canonical path string, e.g. `/users/{id}/`.
    #[must_use]
    pub fn render(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                PatternSegment::Literal(lit) => out.push_str(lit),
                PatternSegment::Capture(capture) => {
                    out.push('{');
                    out.push_str(capture.name());
                    out.push('}');
                }
                PatternSegment::Wildcard(name) => {
                    out.push('*');
                    out.push_str(name);
                }
            }
        }
        out
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
