//! The matching walk and its outcome.
//!
//! Matching is a depth-first walk with ordered backtracking over the
//! compiled tree. Failures encountered along the way are recorded, not
//! raised: a decode that fails on one branch must not abort the walk,
//! because a sibling literal or a later capture may still succeed. Only
//! when no branch produces a structural match does the first recorded
//! failure surface — parse before validation — and only when nothing was
//! recorded at all is the result "no route".

use std::sync::Arc;

use waypoint_core::{FailureReport, Headers, ParamLocation, QueryString};

use crate::chain::CapturedValues;
use crate::guard::GuardError;
use crate::route::{BoxInvoke, RouteMeta};
use crate::tree::Node;

/// The four-way result of a match attempt.
#[derive(Debug)]
pub enum MatchOutcome<'r> {
    /// Exactly one leaf won; dispatch it.
    Matched(MatchedRoute<'r>),
    /// A structurally matching branch exists but some input failed to
    /// decode or was absent. Client error, not absence.
    Parse(FailureReport),
    /// A structurally matching branch exists but a business precondition
    /// rejected well-formed input. Client error, not absence.
    Validation(FailureReport),
    /// No branch structurally matches; the caller owns the not-found
    /// behavior.
    NoRoute,
}

impl MatchOutcome<'_> {
    /// True for the `Matched` variant.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }
}

/// A winning leaf together with its typed value chain.
pub struct MatchedRoute<'r> {
    pub(crate) invoke: BoxInvoke,
    pub(crate) values: CapturedValues,
    pub(crate) meta: &'r RouteMeta,
}

impl<'r> MatchedRoute<'r> {
    /// Metadata of the matched declaration.
    #[must_use]
    pub fn meta(&self) -> &'r RouteMeta {
        self.meta
    }

    /// The accumulated typed value chain.
    #[must_use]
    pub fn values(&self) -> &CapturedValues {
        &self.values
    }
}

impl std::fmt::Debug for MatchedRoute<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchedRoute")
            .field("method", &self.meta.method)
            .field("path", &self.meta.path)
            .field("values", &self.values.len())
            .finish_non_exhaustive()
    }
}

/// Records tentative failures during the walk.
///
/// Only the first failure of each class is kept; branch order already
/// reflects precedence, so the first recorded parse failure is the one a
/// client should see.
#[derive(Debug, Default)]
pub(crate) struct FailureLog {
    parse: Option<FailureReport>,
    validation: Option<FailureReport>,
}

impl FailureLog {
    pub(crate) fn record_parse(&mut self, report: FailureReport) {
        self.parse.get_or_insert(report);
    }

    pub(crate) fn record(&mut self, error: GuardError) {
        match error {
            GuardError::Parse(report) => self.parse.get_or_insert(report),
            GuardError::Validation(report) => self.validation.get_or_insert(report),
        };
    }

    /// Collapse into the non-matched outcome: parse failures outrank
    /// validation failures, and an empty log means no structural match.
    pub(crate) fn into_outcome<'r>(self) -> MatchOutcome<'r> {
        if let Some(report) = self.parse {
            MatchOutcome::Parse(report)
        } else if let Some(report) = self.validation {
            MatchOutcome::Validation(report)
        } else {
            MatchOutcome::NoRoute
        }
    }
}

/// Walk the tree below `node` against the remaining `segments`.
///
/// Returns the winning leaf's handler and declaration index, with `values`
/// holding its complete typed value chain. On `None`, `values` is restored
/// to its entry length and any failures sit in `log`.
pub(crate) fn walk(
    node: &Node,
    segments: &[&str],
    query: &QueryString<'_>,
    headers: &Headers,
    values: &mut CapturedValues,
    log: &mut FailureLog,
) -> Option<(BoxInvoke, usize)> {
    let Some((segment, rest)) = segments.split_first() else {
        return try_leaves(node, query, headers, values, log);
    };

    // Literal children first: an exact match is the most specific.
    if let Some(child) = node.literals.get(*segment) {
        if let Some(hit) = walk(child, rest, query, headers, values, log) {
            return Some(hit);
        }
    }

    // Typed captures in declaration order; first successful decode wins,
    // but a deeper mismatch backtracks into the next candidate.
    for capture in &node.captures {
        match (capture.decoder)(segment) {
            Ok(value) => {
                let mark = values.len();
                values.push(value);
                if let Some(hit) = walk(&capture.node, rest, query, headers, values, log) {
                    return Some(hit);
                }
                values.truncate(mark);
            }
            Err(err) => {
                log.record_parse(FailureReport::new(
                    ParamLocation::Path,
                    &capture.name,
                    err.to_string(),
                ));
            }
        }
    }

    // The wildcard is last: absorb everything that remains as one value.
    if let Some(wildcard) = &node.wildcard {
        let mark = values.len();
        values.push(Box::new(segments.join("/")));
        if let Some(hit) = walk(wildcard, &[], query, headers, values, log) {
            return Some(hit);
        }
        values.truncate(mark);
    }

    None
}

/// Input exhausted at `node`: try its leaves in registration order.
fn try_leaves(
    node: &Node,
    query: &QueryString<'_>,
    headers: &Headers,
    values: &mut CapturedValues,
    log: &mut FailureLog,
) -> Option<(BoxInvoke, usize)> {
    'leaves: for leaf in &node.leaves {
        let mark = values.len();
        for guard in &leaf.guards {
            match guard.evaluate(query, headers) {
                Ok(Some(value)) => values.push(value),
                Ok(None) => {}
                Err(error) => {
                    log.record(error);
                    values.truncate(mark);
                    continue 'leaves;
                }
            }
        }
        return Some((Arc::clone(&leaf.invoke), leaf.route));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::ParamLocation;

    #[test]
    fn failure_log_prefers_parse_over_validation() {
        let mut log = FailureLog::default();
        log.record(GuardError::Validation(FailureReport::new(
            ParamLocation::Query,
            "limit",
            "too large",
        )));
        log.record(GuardError::Parse(FailureReport::missing(
            ParamLocation::Query,
            "page",
        )));
        match log.into_outcome() {
            MatchOutcome::Parse(report) => assert_eq!(report.name, "page"),
            other => panic!("expected parse outcome, got {other:?}"),
        }
    }

    #[test]
    fn failure_log_keeps_first_of_each_class() {
        let mut log = FailureLog::default();
        log.record_parse(FailureReport::missing(ParamLocation::Path, "first"));
        log.record_parse(FailureReport::missing(ParamLocation::Path, "second"));
        match log.into_outcome() {
            MatchOutcome::Parse(report) => assert_eq!(report.name, "first"),
            other => panic!("expected parse outcome, got {other:?}"),
        }
    }

    #[test]
    fn empty_log_is_no_route() {
        assert!(matches!(
            FailureLog::default().into_outcome(),
            MatchOutcome::NoRoute
        ));
    }
}
