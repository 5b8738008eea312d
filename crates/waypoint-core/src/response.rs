//! The minimal response model handlers produce.
//!
//! The engine never writes a wire format; it hands a [`Response`] back to
//! whatever server framework embeds it. Only the pieces the engine itself
//! synthesizes (client-error and internal-error bodies) are modeled.

use serde::Serialize;

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 204 No Content
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    /// 400 Bad Request
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// 404 Not Found
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    /// 405 Method Not Allowed
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    /// 422 Unprocessable Entity
    pub const UNPROCESSABLE_ENTITY: StatusCode = StatusCode(422);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Build from a raw code.
    #[must_use]
    pub fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// The numeric code.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// True for 4xx codes.
    #[must_use]
    pub fn is_client_error(self) -> bool {
        (400..500).contains(&self.0)
    }

    /// True for 5xx codes.
    #[must_use]
    pub fn is_server_error(self) -> bool {
        (500..600).contains(&self.0)
    }

    /// The canonical reason phrase for the codes this engine emits.
    #[must_use]
    pub fn canonical_reason(self) -> &'static str {
        match self.0 {
            200 => "OK",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            422 => "Unprocessable Entity",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// No body.
    Empty,
    /// Buffered bytes.
    Bytes(Vec<u8>),
}

impl ResponseBody {
    /// Consume the body into bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Bytes(bytes) => bytes,
        }
    }

    /// True when there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
            || matches!(self, ResponseBody::Bytes(b) if b.is_empty())
    }
}

/// HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: ResponseBody,
}

impl Response {
    /// A 200 response with no body.
    #[must_use]
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// An empty response with the given status.
    #[must_use]
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: ResponseBody::Empty,
        }
    }

    /// Append a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a plain-text body.
    #[must_use]
    pub fn body_text(mut self, text: impl Into<String>) -> Self {
        self.body = ResponseBody::Bytes(text.into().into_bytes());
        self.headers
            .push(("content-type".to_string(), "text/plain".to_string()));
        self
    }

    /// Set a JSON body from a serializable value.
    #[must_use]
    pub fn body_json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = ResponseBody::Bytes(bytes);
                self.headers
                    .push(("content-type".to_string(), "application/json".to_string()));
            }
            Err(_) => {
                // Serialization of engine-owned bodies is infallible in
                // practice; degrade to a bodyless 500 rather than panic.
                self.status = StatusCode::INTERNAL_SERVER_ERROR;
                self.body = ResponseBody::Empty;
            }
        }
        self
    }

    /// The status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The headers, in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The body.
    #[must_use]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Decompose into status, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Vec<(String, String)>, ResponseBody) {
        (self.status, self.headers, self.body)
    }
}
