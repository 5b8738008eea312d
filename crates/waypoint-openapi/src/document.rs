//! OpenAPI 3.1 document types.
//!
//! Only the portion of the specification a route table can describe is
//! modeled: document metadata, paths, operations and their parameters.
//! Everything serializes with `skip_serializing_if` so the emitted JSON
//! stays minimal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A complete OpenAPI 3.1 document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApi {
    /// Specification version; always `3.1.0`.
    pub openapi: String,
    /// Document metadata.
    pub info: Info,
    /// Server list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Declared tags, in first-use order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Path items keyed by documented path.
    ///
    /// A `BTreeMap` keeps serialization deterministic across runs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, PathItem>,
}

/// Document metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version string.
    pub version: String,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One server entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A declared tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations available on one path, keyed by lowercase method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// HEAD operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// OPTIONS operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// TRACE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Mutable slot for the given lowercase method name; `None` for
    /// unknown methods.
    pub fn slot_mut(&mut self, method: &str) -> Option<&mut Option<Operation>> {
        match method {
            "get" => Some(&mut self.get),
            "post" => Some(&mut self.post),
            "put" => Some(&mut self.put),
            "delete" => Some(&mut self.delete),
            "patch" => Some(&mut self.patch),
            "head" => Some(&mut self.head),
            "options" => Some(&mut self.options),
            "trace" => Some(&mut self.trace),
            _ => None,
        }
    }
}

/// One operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique id, derived from method and path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Grouping tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Declared parameters, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Whether the operation is deprecated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    /// Security requirements, each `{scheme: []}`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<BTreeMap<String, Vec<String>>>,
}

/// One operation parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Where the parameter lives.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the request must supply it.
    pub required: bool,
    /// Parameter schema.
    pub schema: ParameterSchema,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
}

/// Primitive schema of a parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// JSON Schema type.
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
}

impl ParameterSchema {
    /// Map a schema type hint (`"string"`, `"integer"`, `"number"`,
    /// `"boolean"`) to a schema; anything unrecognized is a string.
    #[must_use]
    pub fn from_hint(hint: &str) -> Self {
        let schema_type = match hint {
            "integer" => SchemaType::Integer,
            "number" => SchemaType::Number,
            "boolean" => SchemaType::Boolean,
            _ => SchemaType::String,
        };
        Self { schema_type }
    }
}

/// JSON Schema primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// String type.
    String,
    /// Number type (float).
    Number,
    /// Integer type.
    Integer,
    /// Boolean type.
    Boolean,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_operation_serializes_to_empty_object() {
        let json = serde_json::to_string(&Operation::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn parameter_uses_in_for_location() {
        let parameter = Parameter {
            name: "id".to_string(),
            location: ParameterLocation::Path,
            required: true,
            schema: ParameterSchema::from_hint("integer"),
        };
        let json = serde_json::to_value(&parameter).unwrap();
        assert_eq!(json["in"], "path");
        assert_eq!(json["schema"]["type"], "integer");
    }

    #[test]
    fn unknown_hints_fall_back_to_string() {
        assert_eq!(
            ParameterSchema::from_hint("uuid").schema_type,
            SchemaType::String
        );
    }

    #[test]
    fn path_item_slots_cover_all_methods() {
        let mut item = PathItem::default();
        for method in ["get", "post", "put", "delete", "patch", "head", "options", "trace"] {
            assert!(item.slot_mut(method).is_some(), "missing slot for {method}");
        }
        assert!(item.slot_mut("connect").is_none());
    }
}
