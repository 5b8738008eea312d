//! Handler dispatch and the fault boundary.
//!
//! Dispatch unpacks the typed value chain into the bound handler and hands
//! back its response future. This is the single place where an unexpected
//! fault (a panicking handler, or a chain that fails to unpack) is turned
//! into a value: a logged, generic internal-error response. Nothing here
//! ever panics into the request-serving loop, and the matcher itself
//! never uses this mechanism.

use std::future::{Future, ready};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::task::{Context, Poll};

use waypoint_core::{FailureReport, Response, StatusCode, logging};

use crate::r#match::MatchedRoute;
use crate::route::BoxFuture;

const TARGET: &str = "waypoint::dispatch";

impl MatchedRoute<'_> {
    /// Invoke the matched handler with its typed value chain.
    ///
    /// The returned future resolves to the handler's response, or to a
    /// generic 500 if the handler faults at any point.
    #[must_use]
    pub fn dispatch(self) -> BoxFuture<Response> {
        let path = self.meta.path.clone();
        let invoke = self.invoke;
        match catch_unwind(AssertUnwindSafe(|| (invoke)(self.values))) {
            Ok(Ok(future)) => Box::pin(CatchFault { inner: future, path }),
            Ok(Err(chain_error)) => {
                logging::error(
                    TARGET,
                    format!("handler for {path} could not unpack its values: {chain_error}"),
                );
                Box::pin(ready(internal_error()))
            }
            Err(payload) => {
                logging::error(
                    TARGET,
                    format!(
                        "handler for {path} panicked: {}",
                        panic_message(payload.as_ref())
                    ),
                );
                Box::pin(ready(internal_error()))
            }
        }
    }
}

/// Wraps a handler future so a panic mid-poll becomes a 500 instead of
/// unwinding into the caller.
struct CatchFault {
    inner: BoxFuture<Response>,
    path: String,
}

impl Future for CatchFault {
    type Output = Response;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Response> {
        let this = self.get_mut();
        match catch_unwind(AssertUnwindSafe(|| this.inner.as_mut().poll(cx))) {
            Ok(poll) => poll,
            Err(payload) => {
                logging::error(
                    TARGET,
                    format!(
                        "handler for {} panicked while polling: {}",
                        this.path,
                        panic_message(payload.as_ref())
                    ),
                );
                Poll::Ready(internal_error())
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// The generic internal-error response; deliberately carries no fault
/// detail.
#[must_use]
pub(crate) fn internal_error() -> Response {
    Response::with_status(StatusCode::INTERNAL_SERVER_ERROR).body_json(&serde_json::json!({
        "detail": "Internal Server Error"
    }))
}

/// Synthesize the client-error response for a recorded failure.
///
/// Parse failures are 400s, validation failures 422s; both carry a
/// FastAPI-style `detail` array naming the offending parameter.
#[must_use]
pub fn failure_response(status: StatusCode, kind: &str, report: &FailureReport) -> Response {
    Response::with_status(status).body_json(&serde_json::json!({
        "detail": [{
            "loc": [report.location.as_str(), report.name],
            "msg": report.message,
            "type": kind,
        }]
    }))
}

/// A plain 404 for embedders that want one; the engine itself reports
/// absence with `None` and leaves the body to the outer framework.
#[must_use]
pub fn not_found_response() -> Response {
    Response::with_status(StatusCode::NOT_FOUND).body_json(&serde_json::json!({
        "detail": "Not Found"
    }))
}
