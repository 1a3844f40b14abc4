//! The declarative response value.
//!
//! A [`Response`] describes what should be sent: status, headers, a deferred
//! body and an optional attached error. Nothing touches the transport until
//! [`render`](crate::render) consumes it.

use crate::body::BoxBodyWriter;
use crate::error::BoxError;
use crate::headers::Headers;
use crate::responder::Responder;
use http::StatusCode;
use std::fmt;

/// Immutable snapshot of a response.
///
/// * `status` - `None` is the unset value; it renders as `200 OK`.
/// * `headers` - case-insensitive multimap.
/// * `body` - deferred writer, drained once at render time; `None` is an empty body.
/// * `error` - advisory error for logging middleware, it changes nothing on the wire.
///
/// Responders consume a `Response` and return a new one. The body writer is
/// write-once, so a `Response` can't be cloned.
#[derive(Default)]
pub struct Response {
    pub(crate) status: Option<StatusCode>,
    pub(crate) headers: Headers,
    pub(crate) body: Option<BoxBodyWriter>,
    pub(crate) error: Option<BoxError>,
}

impl Response {
    /// A response with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: StatusCode) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    /// The seed every [`respond`](crate::respond) call folds from: `200 OK`, nothing else.
    pub(crate) fn seed() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&BoxBodyWriter> {
        self.body.as_ref()
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn error(&self) -> Option<&BoxError> {
        self.error.as_ref()
    }

    pub fn into_parts(self) -> (Option<StatusCode>, Headers, Option<BoxBodyWriter>, Option<BoxError>) {
        (self.status, self.headers, self.body, self.error)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| "BodyWriter"))
            .field("error", &self.error)
            .finish()
    }
}

/// A `Response` used as a responder overlays itself onto its input.
///
/// A set status replaces the input's, headers are merged after the input's,
/// and a present body or error replaces the input's. This is how a recorded
/// response is embedded into a larger composition.
impl Responder for Response {
    fn apply(self, response: Response) -> Response {
        Response {
            status: self.status.or(response.status),
            headers: Headers::merge([&response.headers, &self.headers]),
            body: self.body.or(response.body),
            error: self.error.or(response.error),
        }
    }
}
