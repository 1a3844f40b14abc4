//! Capturing a transport-level handler back into a [`Response`].
//!
//! [`Recorder`] is a [`ResponseWriter`] that keeps everything in memory: the
//! status (if one was written), the headers and every body byte, in the order
//! they arrived. [`record`] runs a [`WriteHandler`] against a fresh recorder and
//! lifts the result into a [`Response`], so an imperative handler can be used
//! inside a responder chain.
//!
//! The captured body is buffered, not deferred.

use crate::body::BoxBodyWriter;
use crate::handler::WriteHandler;
use crate::headers::Headers;
use crate::render::ResponseWriter;
use crate::response::Response;
use bytes::BytesMut;
use http::{HeaderMap, Request, StatusCode};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;
use tracing::warn;

/// In-memory [`ResponseWriter`] with three recorded fields.
///
/// Headers freeze once a status is written, like on a real connection: later
/// changes through [`headers_mut`](ResponseWriter::headers_mut) land in a
/// scratch map that is never recorded.
#[derive(Debug, Default)]
pub struct Recorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
    late_headers: HeaderMap,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The written status; `None` when the handler never wrote one
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Packages the recording as a [`Response`] with no error attached.
    ///
    /// An unwritten status stays unset, and an empty buffer becomes an absent body.
    pub fn into_response(self) -> Response {
        let body = (!self.body.is_empty()).then(|| self.body.freeze());
        Response {
            status: self.status,
            headers: Headers::from(self.headers),
            body: body.map(|bytes| Box::new(bytes) as BoxBodyWriter),
            error: None,
        }
    }
}

impl ResponseWriter for Recorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        if self.status.is_some() {
            self.late_headers.clear();
            return &mut self.late_headers;
        }
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if let Some(current) = self.status {
            warn!(current = ?current, ignored = ?status, "superfluous status write");
            return;
        }
        self.status = Some(status);
    }
}

impl AsyncWrite for Recorder {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.get_mut().body.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Runs `handler` against a fresh [`Recorder`] and returns what it wrote.
///
/// A handler failure is logged; whatever was recorded up to that point is
/// still returned, without an attached error.
pub async fn record<H, B>(handler: &H, req: Request<B>) -> Response
where
    H: WriteHandler<B> + ?Sized,
{
    let mut recorder = Recorder::new();
    if let Err(e) = handler.serve(req, &mut recorder).await {
        warn!(cause = %e, "recorded handler returned an error");
    }
    recorder.into_response()
}
