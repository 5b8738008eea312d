//! Guards: query/header validators evaluated after structural path
//! matching succeeds.
//!
//! A guard looks at the full request's query parameters and headers and
//! either passes (optionally contributing one decoded value to the typed
//! value chain) or fails with a classified reason:
//!
//! - [`GuardError::Parse`] — the expected input is absent or does not
//!   decode; the request is malformed.
//! - [`GuardError::Validation`] — the input decodes but a business rule
//!   rejected it.
//!
//! Guards must be pure over their inputs; the matcher may evaluate them
//! for leaves that ultimately lose to an earlier registration.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use waypoint_core::{FailureReport, FromSegment, Headers, ParamLocation, QueryString};

use crate::route::ParamSpec;

/// A classified guard failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// Input missing or undecodable.
    Parse(FailureReport),
    /// Input well-formed but rejected.
    Validation(FailureReport),
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::Parse(report) => write!(f, "parse failure: {report}"),
            GuardError::Validation(report) => write!(f, "validation failure: {report}"),
        }
    }
}

impl std::error::Error for GuardError {}

/// A query/header validator attached to a route.
pub trait Guard: Send + Sync {
    /// Evaluate against the request. `Ok(Some(value))` appends one value to
    /// the typed value chain; `Ok(None)` passes without contributing.
    fn evaluate(
        &self,
        query: &QueryString<'_>,
        headers: &Headers,
    ) -> Result<Option<Box<dyn Any + Send>>, GuardError>;

    /// The parameter this guard documents, if any.
    fn spec(&self) -> Option<ParamSpec> {
        None
    }

    /// Identity and name of the contributed value's type, if the guard
    /// extracts one. Used for handler arity checking at declaration time.
    fn value_type(&self) -> Option<(TypeId, &'static str)> {
        None
    }
}

fn decode_failure(location: ParamLocation, name: &str, err: &waypoint_core::SegmentError) -> GuardError {
    GuardError::Parse(FailureReport::new(location, name, err.to_string()))
}

/// Required query parameter, decoded into `T` and pushed onto the chain.
pub struct QueryCapture<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromSegment + Send + 'static> QueryCapture<T> {
    /// Require query parameter `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }
}

impl<T: FromSegment + Send + 'static> Guard for QueryCapture<T> {
    fn evaluate(
        &self,
        query: &QueryString<'_>,
        _headers: &Headers,
    ) -> Result<Option<Box<dyn Any + Send>>, GuardError> {
        let raw = query.get_decoded(&self.name).ok_or_else(|| {
            GuardError::Parse(FailureReport::missing(ParamLocation::Query, &self.name))
        })?;
        let value = T::from_segment(&raw)
            .map_err(|err| decode_failure(ParamLocation::Query, &self.name, &err))?;
        Ok(Some(Box::new(value)))
    }

    fn spec(&self) -> Option<ParamSpec> {
        Some(ParamSpec {
            name: self.name.clone(),
            location: ParamLocation::Query,
            type_hint: T::type_hint(),
            required: true,
        })
    }

    fn value_type(&self) -> Option<(TypeId, &'static str)> {
        Some((TypeId::of::<T>(), std::any::type_name::<T>()))
    }
}

/// Optional query parameter; pushes `Option<T>` onto the chain.
///
/// Absence passes with `None`; a present but undecodable value is still a
/// parse failure.
pub struct OptionalQuery<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromSegment + Send + 'static> OptionalQuery<T> {
    /// Accept optional query parameter `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }
}

impl<T: FromSegment + Send + 'static> Guard for OptionalQuery<T> {
    fn evaluate(
        &self,
        query: &QueryString<'_>,
        _headers: &Headers,
    ) -> Result<Option<Box<dyn Any + Send>>, GuardError> {
        match query.get_decoded(&self.name) {
            None => Ok(Some(Box::new(None::<T>))),
            Some(raw) => {
                let value = T::from_segment(&raw)
                    .map_err(|err| decode_failure(ParamLocation::Query, &self.name, &err))?;
                Ok(Some(Box::new(Some(value))))
            }
        }
    }

    fn spec(&self) -> Option<ParamSpec> {
        Some(ParamSpec {
            name: self.name.clone(),
            location: ParamLocation::Query,
            type_hint: T::type_hint(),
            required: false,
        })
    }

    fn value_type(&self) -> Option<(TypeId, &'static str)> {
        Some((
            TypeId::of::<Option<T>>(),
            std::any::type_name::<Option<T>>(),
        ))
    }
}

/// Required query parameter with a semantic check; pushes `T`.
///
/// A missing or undecodable value is a parse failure; a decoded value the
/// predicate rejects is a validation failure.
pub struct QueryRule<T> {
    name: String,
    check: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    message: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromSegment + Send + 'static> QueryRule<T> {
    /// Require query parameter `name` to decode and satisfy `check`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        check: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
            message: message.into(),
            _marker: PhantomData,
        }
    }
}

impl<T: FromSegment + Send + 'static> Guard for QueryRule<T> {
    fn evaluate(
        &self,
        query: &QueryString<'_>,
        _headers: &Headers,
    ) -> Result<Option<Box<dyn Any + Send>>, GuardError> {
        let raw = query.get_decoded(&self.name).ok_or_else(|| {
            GuardError::Parse(FailureReport::missing(ParamLocation::Query, &self.name))
        })?;
        let value = T::from_segment(&raw)
            .map_err(|err| decode_failure(ParamLocation::Query, &self.name, &err))?;
        if !(self.check)(&value) {
            return Err(GuardError::Validation(FailureReport::new(
                ParamLocation::Query,
                &self.name,
                self.message.clone(),
            )));
        }
        Ok(Some(Box::new(value)))
    }

    fn spec(&self) -> Option<ParamSpec> {
        Some(ParamSpec {
            name: self.name.clone(),
            location: ParamLocation::Query,
            type_hint: T::type_hint(),
            required: true,
        })
    }

    fn value_type(&self) -> Option<(TypeId, &'static str)> {
        Some((TypeId::of::<T>(), std::any::type_name::<T>()))
    }
}

/// Query parameter that must merely be present; contributes no value.
pub struct ExistsQuery {
    name: String,
}

impl ExistsQuery {
    /// Require query parameter `name` to be present.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Guard for ExistsQuery {
    fn evaluate(
        &self,
        query: &QueryString<'_>,
        _headers: &Headers,
    ) -> Result<Option<Box<dyn Any + Send>>, GuardError> {
        if query.contains(&self.name) {
            Ok(None)
        } else {
            Err(GuardError::Parse(FailureReport::missing(
                ParamLocation::Query,
                &self.name,
            )))
        }
    }

    fn spec(&self) -> Option<ParamSpec> {
        Some(ParamSpec {
            name: self.name.clone(),
            location: ParamLocation::Query,
            type_hint: "string",
            required: true,
        })
    }
}

/// Required header, decoded into `T` and pushed onto the chain.
pub struct HeaderCapture<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromSegment + Send + 'static> HeaderCapture<T> {
    /// Require header `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }
}

impl<T: FromSegment + Send + 'static> Guard for HeaderCapture<T> {
    fn evaluate(
        &self,
        _query: &QueryString<'_>,
        headers: &Headers,
    ) -> Result<Option<Box<dyn Any + Send>>, GuardError> {
        let raw = headers.get(&self.name).ok_or_else(|| {
            GuardError::Parse(FailureReport::missing(ParamLocation::Header, &self.name))
        })?;
        let value = T::from_segment(raw)
            .map_err(|err| decode_failure(ParamLocation::Header, &self.name, &err))?;
        Ok(Some(Box::new(value)))
    }

    fn spec(&self) -> Option<ParamSpec> {
        Some(ParamSpec {
            name: self.name.clone(),
            location: ParamLocation::Header,
            type_hint: T::type_hint(),
            required: true,
        })
    }

    fn value_type(&self) -> Option<(TypeId, &'static str)> {
        Some((TypeId::of::<T>(), std::any::type_name::<T>()))
    }
}

/// Header that must merely be present; contributes no value.
pub struct RequireHeader {
    name: String,
}

impl RequireHeader {
    /// Require header `name` to be present.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Guard for RequireHeader {
    fn evaluate(
        &self,
        _query: &QueryString<'_>,
        headers: &Headers,
    ) -> Result<Option<Box<dyn Any + Send>>, GuardError> {
        if headers.contains(&self.name) {
            Ok(None)
        } else {
            Err(GuardError::Parse(FailureReport::missing(
                ParamLocation::Header,
                &self.name,
            )))
        }
    }

    fn spec(&self) -> Option<ParamSpec> {
        Some(ParamSpec {
            name: self.name.clone(),
            location: ParamLocation::Header,
            type_hint: "string",
            required: true,
        })
    }
}

/// Required header with a semantic check; contributes no value.
pub struct HeaderRule<T> {
    name: String,
    check: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    message: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromSegment + Send + 'static> HeaderRule<T> {
    /// Require header `name` to decode and satisfy `check`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        check: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
            message: message.into(),
            _marker: PhantomData,
        }
    }
}

impl<T: FromSegment + Send + 'static> Guard for HeaderRule<T> {
    fn evaluate(
        &self,
        _query: &QueryString<'_>,
        headers: &Headers,
    ) -> Result<Option<Box<dyn Any + Send>>, GuardError> {
        let raw = headers.get(&self.name).ok_or_else(|| {
            GuardError::Parse(FailureReport::missing(ParamLocation::Header, &self.name))
        })?;
        let value = T::from_segment(raw)
            .map_err(|err| decode_failure(ParamLocation::Header, &self.name, &err))?;
        if (self.check)(&value) {
            Ok(None)
        } else {
            Err(GuardError::Validation(FailureReport::new(
                ParamLocation::Header,
                &self.name,
                self.message.clone(),
            )))
        }
    }

    fn spec(&self) -> Option<ParamSpec> {
        Some(ParamSpec {
            name: self.name.clone(),
            location: ParamLocation::Header,
            type_hint: T::type_hint(),
            required: true,
        })
    }
}
