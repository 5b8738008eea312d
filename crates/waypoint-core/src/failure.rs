//! The failure taxonomy shared by the matcher and the guard library.
//!
//! Match failures are values, never exceptions: the matcher records them
//! while backtracking and only surfaces one once no branch can succeed.
//! Two classes exist:
//!
//! - **parse**: the input exists but does not decode into the expected
//!   type, or a required parameter is absent — the request is malformed.
//! - **validation**: the input decodes fine but a business precondition
//!   rejected it.
//!
//! A total absence of structural match is not a failure value at all; the
//! matcher reports it separately so the caller can fall through.

use std::fmt;

use serde::Serialize;

/// Where a parameter lives in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// A path segment.
    Path,
    /// A query parameter.
    Query,
    /// A request header.
    Header,
}

impl ParamLocation {
    /// Lowercase name, as used in OpenAPI `in` fields and error bodies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one failed parameter: which one, where, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    /// Where the offending input lives.
    pub location: ParamLocation,
    /// The parameter or segment name.
    pub name: String,
    /// Human-readable reason.
    pub message: String,
}

impl FailureReport {
    /// Build a report.
    #[must_use]
    pub fn new(
        location: ParamLocation,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Report for a missing required parameter.
    #[must_use]
    pub fn missing(location: ParamLocation, name: impl Into<String>) -> Self {
        let name = name.into();
        let message = format!("missing required {location} parameter `{name}`");
        Self {
            location,
            name,
            message,
        }
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} parameter `{}`: {}",
            self.location, self.name, self.message
        )
    }
}

impl std::error::Error for FailureReport {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_location_and_parameter() {
        let report = FailureReport::new(ParamLocation::Path, "id", "`abc` is not a valid integer");
        assert_eq!(
            report.to_string(),
            "path parameter `id`: `abc` is not a valid integer"
        );
    }

    #[test]
    fn missing_report_message() {
        let report = FailureReport::missing(ParamLocation::Query, "limit");
        assert_eq!(
            report.message,
            "missing required query parameter `limit`"
        );
    }

    #[test]
    fn serializes_to_json_detail() {
        let report = FailureReport::missing(ParamLocation::Header, "x-api-key");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["location"], "header");
        assert_eq!(json["name"], "x-api-key");
    }
}
