//! Query string access.
//!
//! Borrowed, lazily-parsed view over a raw query string:
//! - Key-value pair extraction
//! - Multi-value parameters (same key appearing multiple times)
//! - Percent-decoding with `+`-as-space
//! - Edge cases (empty values, missing values, stray ampersands)
//!
//! # Example
//!
//! ```
//! use waypoint_core::QueryString;
//!
//! let qs = QueryString::parse("a=1&b=2&a=3");
//! assert_eq!(qs.get("a"), Some("1"));
//! let all: Vec<_> = qs.get_all("a").collect();
//! assert_eq!(all, vec!["1", "3"]);
//! ```

use std::borrow::Cow;

/// A parsed query string with efficient access to parameters.
///
/// The input is stored and scanned on each access; guards look at a handful
/// of keys per request, so there is no materialized map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryString<'a> {
    raw: &'a str,
}

impl<'a> QueryString<'a> {
    /// Parse a query string (without the leading `?`).
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        Self { raw }
    }

    /// Returns true if the query string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the raw query string.
    #[must_use]
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Get the first value for a key, raw (still percent-encoded).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Get all values for a key, raw.
    pub fn get_all(&self, key: &str) -> impl Iterator<Item = &'a str> {
        self.pairs().filter(move |(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Get the first value for a key, percent-decoded.
    ///
    /// Borrowed when no decoding was needed, owned otherwise.
    #[must_use]
    pub fn get_decoded(&self, key: &str) -> Option<Cow<'a, str>> {
        self.get(key).map(percent_decode)
    }

    /// Check if a key exists, with or without a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs().any(|(k, _)| k == key)
    }

    /// Iterate over all key-value pairs.
    ///
    /// Keys without values (like `?flag`) have empty string values.
    pub fn pairs(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.raw.split('&').filter(|s| !s.is_empty()).map(|pair| {
            if let Some(eq_pos) = pair.find('=') {
                (&pair[..eq_pos], &pair[eq_pos + 1..])
            } else {
                (pair, "")
            }
        })
    }

    /// Count the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs().count()
    }
}

impl Default for QueryString<'_> {
    fn default() -> Self {
        Self { raw: "" }
    }
}

/// Percent-decode a string.
///
/// Returns `Cow::Borrowed` when no decoding was needed (the common case),
/// `Cow::Owned` otherwise. Handles `%XX` sequences, UTF-8 multi-byte
/// sequences and plus-as-space. Invalid sequences are left as-is.
#[must_use]
pub fn percent_decode(s: &str) -> Cow<'_, str> {
    // Fast path: nothing to decode.
    if memchr::memchr2(b'%', b'+', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }

    let mut result = Vec::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    result.push(hi << 4 | lo);
                    i += 3;
                } else {
                    // Invalid hex, keep as-is
                    result.push(b'%');
                    i += 1;
                }
            }
            b'+' => {
                result.push(b' ');
                i += 1;
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }

    Cow::Owned(String::from_utf8_lossy(&result).into_owned())
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_string() {
        let qs = QueryString::parse("");
        assert!(qs.is_empty());
        assert_eq!(qs.len(), 0);
        assert_eq!(qs.get("any"), None);
    }

    #[test]
    fn duplicate_keys() {
        let qs = QueryString::parse("a=1&b=2&a=3");
        assert_eq!(qs.get("a"), Some("1"));
        let all_a: Vec<_> = qs.get_all("a").collect();
        assert_eq!(all_a, vec!["1", "3"]);
    }

    #[test]
    fn key_without_value() {
        let qs = QueryString::parse("flag&name=alice");
        assert!(qs.contains("flag"));
        assert_eq!(qs.get("flag"), Some(""));
        assert_eq!(qs.get("name"), Some("alice"));
    }

    #[test]
    fn stray_ampersands_are_ignored() {
        let qs = QueryString::parse("&a=1&b=2&");
        assert_eq!(qs.len(), 2);
        assert_eq!(qs.get("a"), Some("1"));
        assert_eq!(qs.get("b"), Some("2"));
    }

    #[test]
    fn percent_and_plus_decoding() {
        let qs = QueryString::parse("msg=hello%20world&alt=hello+world");
        assert_eq!(qs.get("msg"), Some("hello%20world"));
        assert_eq!(qs.get_decoded("msg").as_deref(), Some("hello world"));
        assert_eq!(qs.get_decoded("alt").as_deref(), Some("hello world"));
    }

    #[test]
    fn utf8_encoded() {
        let qs = QueryString::parse("word=caf%C3%A9");
        assert_eq!(qs.get_decoded("word").as_deref(), Some("café"));
    }

    #[test]
    fn percent_decode_borrows_when_clean() {
        assert!(matches!(percent_decode("hello"), Cow::Borrowed(_)));
    }

    #[test]
    fn percent_decode_invalid_hex_kept() {
        assert_eq!(&*percent_decode("%ZZ"), "%ZZ");
        assert_eq!(&*percent_decode("%2"), "%2");
    }

    #[test]
    fn hex_digit_values() {
        assert_eq!(hex_digit(b'0'), Some(0));
        assert_eq!(hex_digit(b'f'), Some(15));
        assert_eq!(hex_digit(b'A'), Some(10));
        assert_eq!(hex_digit(b'g'), None);
    }
}
