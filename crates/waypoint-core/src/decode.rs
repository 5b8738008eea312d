//! The decode contract for typed captures.
//!
//! A typed path capture (and the typed query/header guards built on top of
//! it) turns one request segment into a value via [`FromSegment`]. Decoders
//! must be deterministic and total over all strings: they may reject, but
//! they must never panic.

use std::fmt;

/// Error produced when a segment fails to decode into the expected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentError {
    expected: &'static str,
    segment: String,
}

impl SegmentError {
    /// A segment that is not a valid rendition of the expected type.
    #[must_use]
    pub fn invalid(expected: &'static str, segment: &str) -> Self {
        Self {
            expected,
            segment: segment.to_string(),
        }
    }

    /// The OpenAPI-style name of the expected type (`"integer"`, ...).
    #[must_use]
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    /// The rejected segment text.
    #[must_use]
    pub fn segment(&self) -> &str {
        &self.segment
    }
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid {}", self.segment, self.expected)
    }
}

impl std::error::Error for SegmentError {}

/// Types that can be decoded from a single path/query/header segment.
///
/// # Example
///
/// ```
/// use waypoint_core::FromSegment;
///
/// assert_eq!(i64::from_segment("42"), Ok(42));
/// assert!(i64::from_segment("forty-two").is_err());
/// ```
pub trait FromSegment: Sized {
    /// Decode one segment. Deterministic; must not panic.
    fn from_segment(segment: &str) -> Result<Self, SegmentError>;

    /// Schema type hint for documentation (`"string"`, `"integer"`, ...).
    #[must_use]
    fn type_hint() -> &'static str {
        "string"
    }
}

impl FromSegment for String {
    fn from_segment(segment: &str) -> Result<Self, SegmentError> {
        Ok(segment.to_string())
    }
}

macro_rules! impl_from_segment_int {
    ($($ty:ty),*) => {
        $(
            impl FromSegment for $ty {
                fn from_segment(segment: &str) -> Result<Self, SegmentError> {
                    segment
                        .parse()
                        .map_err(|_| SegmentError::invalid("integer", segment))
                }

                fn type_hint() -> &'static str {
                    "integer"
                }
            }
        )*
    };
}

impl_from_segment_int!(i32, i64, u32, u64, usize);

impl FromSegment for f64 {
    fn from_segment(segment: &str) -> Result<Self, SegmentError> {
        segment
            .parse()
            .map_err(|_| SegmentError::invalid("number", segment))
    }

    fn type_hint() -> &'static str {
        "number"
    }
}

impl FromSegment for bool {
    fn from_segment(segment: &str) -> Result<Self, SegmentError> {
        match segment {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(SegmentError::invalid("boolean", other)),
        }
    }

    fn type_hint() -> &'static str {
        "boolean"
    }
}
