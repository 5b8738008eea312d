//! Building a document from declared routes.

use std::collections::BTreeMap;

use waypoint_core::{Method, ParamLocation};
use waypoint_router::RouteMeta;

use crate::document::{
    Info, OpenApi, Operation, Parameter, ParameterLocation, ParameterSchema, PathItem, Server,
    Tag,
};

/// Accumulates document metadata and route declarations, then emits the
/// [`OpenApi`] document.
#[must_use]
pub struct OpenApiBuilder {
    info: Info,
    servers: Vec<Server>,
    tags: Vec<Tag>,
    paths: BTreeMap<String, PathItem>,
    tag_order: Vec<String>,
}

impl OpenApiBuilder {
    /// Start a document with the mandatory title and version.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Info {
                title: title.into(),
                version: version.into(),
                description: None,
            },
            servers: Vec::new(),
            tags: Vec::new(),
            paths: BTreeMap::new(),
            tag_order: Vec::new(),
        }
    }

    /// Set the document description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    /// Add a server entry.
    pub fn server(mut self, url: impl Into<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description: None,
        });
        self
    }

    /// Describe a tag. Tags used by routes but never described still
    /// appear in the document without a description.
    pub fn tag(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        if !self.tag_order.contains(&name) {
            self.tag_order.push(name.clone());
        }
        self.tags.push(Tag {
            name,
            description: Some(description.into()),
        });
        self
    }

    /// Add one declared route as an operation.
    ///
    /// Later declarations for the same method and path silently lose:
    /// the matcher would never reach them either.
    pub fn route(mut self, meta: &RouteMeta) -> Self {
        let path = documented_path(&meta.path);
        let item = self.paths.entry(path.clone()).or_default();
        let Some(slot) = item.slot_mut(meta.method.as_lower_str()) else {
            return self;
        };
        if slot.is_some() {
            return self;
        }
        for tag in &meta.tags {
            if !self.tag_order.contains(tag) {
                self.tag_order.push(tag.clone());
            }
        }
        *slot = Some(operation(meta, &path));
        self
    }

    /// Add every route in the slice, in order.
    pub fn routes(mut self, metas: &[RouteMeta]) -> Self {
        for meta in metas {
            self = self.route(meta);
        }
        self
    }

    /// Emit the document.
    pub fn build(self) -> OpenApi {
        let mut tags = Vec::with_capacity(self.tag_order.len());
        for name in self.tag_order {
            let described = self.tags.iter().find(|tag| tag.name == name);
            tags.push(described.cloned().unwrap_or(Tag {
                name,
                description: None,
            }));
        }
        OpenApi {
            openapi: "3.1.0".to_string(),
            info: self.info,
            servers: self.servers,
            tags,
            paths: self.paths,
        }
    }
}

/// Wildcard segments are documented as captures: `/files/*rest` becomes
/// `/files/{rest}`.
fn documented_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    for segment in path.split('/') {
        if let Some(name) = segment.strip_prefix('*') {
            out.push('{');
            out.push_str(name);
            out.push('}');
        } else {
            out.push_str(segment);
        }
        out.push('/');
    }
    out.pop();
    out
}

fn operation(meta: &RouteMeta, path: &str) -> Operation {
    let parameters = meta
        .parameters
        .iter()
        .map(|spec| Parameter {
            name: spec.name.clone(),
            location: match spec.location {
                ParamLocation::Path => ParameterLocation::Path,
                ParamLocation::Query => ParameterLocation::Query,
                ParamLocation::Header => ParameterLocation::Header,
            },
            required: spec.required,
            schema: ParameterSchema::from_hint(spec.type_hint),
        })
        .collect();
    let security = meta
        .security
        .iter()
        .map(|scheme| {
            let mut requirement = BTreeMap::new();
            requirement.insert(scheme.clone(), Vec::new());
            requirement
        })
        .collect();
    Operation {
        operation_id: Some(operation_id(meta.method, path)),
        summary: meta.summary.clone(),
        description: meta.description.clone(),
        tags: meta.tags.clone(),
        parameters,
        deprecated: meta.deprecated,
        security,
    }
}

/// Derive a unique operation id from method and documented path, e.g.
/// `GET /users/{id}` becomes `get_users_id`.
fn operation_id(method: Method, path: &str) -> String {
    let method_lower = method.as_lower_str();
    let path_part = path
        .trim_start_matches('/')
        .trim_end_matches('/')
        .replace('/', "_")
        .replace(['{', '}'], "");
    if path_part.is_empty() {
        method_lower.to_string()
    } else {
        format!("{method_lower}_{path_part}")
    }
}
