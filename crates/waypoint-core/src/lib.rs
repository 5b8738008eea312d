//! Core types for the waypoint routing engine.
//!
//! This crate provides the fundamental building blocks:
//! - [`RequestParts`], [`Headers`] and [`QueryString`] — the slice of a
//!   request the matcher looks at
//! - [`Response`], [`StatusCode`] and [`ResponseBody`] — the minimal
//!   response model handlers produce
//! - [`FromSegment`] — the decode contract for typed path captures
//! - [`FailureReport`] and [`ParamLocation`] — the failure taxonomy shared
//!   by the matcher and the guard library
//!
//! # Design Principles
//!
//! - Zero-copy where possible (query access borrows the raw string)
//! - No runtime reflection beyond `Any` at the dispatch seam
//! - Matching stays purely functional; nothing in this crate blocks

#![forbid(unsafe_code)]

mod decode;
mod failure;
pub mod logging;
mod query;
mod request;
mod response;

pub use decode::{FromSegment, SegmentError};
pub use failure::{FailureReport, ParamLocation};
pub use query::{QueryString, percent_decode};
pub use request::{Headers, RequestParts, path_segments};
pub use response::{Response, ResponseBody, StatusCode};

// Re-export the shared method type for convenience
pub use waypoint_types::{InvalidMethod, Method};
