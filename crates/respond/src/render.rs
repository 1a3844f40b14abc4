//! The transport adapter.
//!
//! [`render`] is the single place where a [`Response`] turns into side effects
//! on a connection. It writes, in order:
//!
//! 1. every header pair, one by one, so multi-valued keys stay multi-valued
//! 2. the status; an unset status becomes `200 OK` here and nowhere else
//! 3. the body, drained straight into the writer
//!
//! Status and headers are committed before the body is drained, so a failing
//! body can't change the status any more. The adapter then appends a generic
//! error line to the stream and hands the failure back to the caller.

use crate::error::RenderError;
use crate::response::Response;
use http::{HeaderMap, StatusCode};
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

/// Appended to the stream when the body fails half way
const DRAIN_FAILURE_BODY: &[u8] = b"Internal Server Error\n";

/// The write side of a live HTTP response.
///
/// Headers are collected in [`headers_mut`](ResponseWriter::headers_mut) until
/// the status is written. The first [`write_status`](ResponseWriter::write_status)
/// commits status and headers; later calls are ignored. Body bytes go through
/// [`AsyncWrite`].
pub trait ResponseWriter: AsyncWrite + Send + Unpin {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn write_status(&mut self, status: StatusCode);
}

/// Renders `response` onto `writer` and returns the number of body bytes written.
///
/// # Errors
///
/// Returns [`RenderError::Drain`] when the body writer fails, whether or not
/// the generic error line could still be appended, or [`RenderError::Io`] when
/// flushing a fully drained response fails.
pub async fn render<W>(response: Response, writer: &mut W) -> Result<u64, RenderError>
where
    W: ResponseWriter + ?Sized,
{
    let (status, headers, body, attached) = response.into_parts();
    if let Some(e) = &attached {
        debug!(cause = %e, "response carries an attached error");
    }

    let target = writer.headers_mut();
    for (name, value) in &headers {
        target.append(name, value.clone());
    }

    writer.write_status(status.unwrap_or(StatusCode::OK));

    let Some(body) = body else {
        writer.flush().await?;
        return Ok(0);
    };

    let mut sink = &mut *writer;
    match body.drain(&mut sink).await {
        Ok(n) => {
            writer.flush().await?;
            Ok(n)
        }
        Err(e) => {
            error!(cause = %e, "drain response body error, status already sent");
            if let Err(append) = append_failure_line(writer).await {
                warn!(cause = %append, "failed to append error line after drain failure");
            }
            Err(e.into())
        }
    }
}

async fn append_failure_line<W>(writer: &mut W) -> io::Result<()>
where
    W: ResponseWriter + ?Sized,
{
    writer.write_all(DRAIN_FAILURE_BODY).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::{header, try_header};
    use crate::recorder::Recorder;
    use crate::respond;
    use crate::responder::{body_file, body_json, body_string, error, status};
    use http::header::{HeaderValue, CONTENT_TYPE, SET_COOKIE};
    use serde::Serialize;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[tokio::test]
    async fn test_unset_status_renders_200() {
        let mut recorder = Recorder::new();
        render(Response::new(), &mut recorder).await.unwrap();

        assert_eq!(recorder.status(), Some(StatusCode::OK));
        assert!(recorder.headers().is_empty());
        assert!(recorder.body().is_empty());
    }

    #[tokio::test]
    async fn test_renders_status_headers_and_body() {
        let response = respond!(
            status(StatusCode::CREATED),
            header(SET_COOKIE, HeaderValue::from_static("a=1")),
            header(SET_COOKIE, HeaderValue::from_static("b=2")),
            try_header("X-Trace", "t").unwrap(),
            body_string("made it"),
        );

        let mut recorder = Recorder::new();
        let n = render(response, &mut recorder).await.unwrap();

        assert_eq!(n, 7);
        assert_eq!(recorder.status(), Some(StatusCode::CREATED));
        let cookies: Vec<_> = recorder.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
        assert_eq!(recorder.headers().get("x-trace").unwrap(), "t");
        assert_eq!(recorder.body(), b"made it".as_slice());
    }

    #[tokio::test]
    async fn test_json_renders_single_content_type() {
        let response = respond(body_json(Point { x: 1, y: -2 }));

        let mut recorder = Recorder::new();
        render(response, &mut recorder).await.unwrap();

        let content_types: Vec<_> = recorder.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(content_types, vec!["application/json"]);
        assert_eq!(recorder.body(), serde_json::to_vec(&Point { x: 1, y: -2 }).unwrap().as_slice());
    }

    #[tokio::test]
    async fn test_attached_error_does_not_change_output() {
        let response = respond((error(io::Error::other("just for logs")), body_string("ok")));

        let mut recorder = Recorder::new();
        render(response, &mut recorder).await.unwrap();

        assert_eq!(recorder.status(), Some(StatusCode::OK));
        assert_eq!(recorder.body(), b"ok".as_slice());
    }

    #[tokio::test]
    async fn test_drain_failure_keeps_status_and_appends_error() {
        let response = respond((status(StatusCode::ACCEPTED), body_file("missing-file")));

        let mut recorder = Recorder::new();
        let err = render(response, &mut recorder).await.unwrap_err();

        assert!(matches!(err, RenderError::Drain { .. }));
        assert_eq!(recorder.status(), Some(StatusCode::ACCEPTED));
        assert_eq!(recorder.body(), DRAIN_FAILURE_BODY);
    }

    /// A writer whose peer has gone away: every body write fails
    #[derive(Default)]
    struct ClosedPeer {
        headers: HeaderMap,
        status: Option<StatusCode>,
    }

    impl ResponseWriter for ClosedPeer {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            &mut self.headers
        }

        fn write_status(&mut self, status: StatusCode) {
            self.status.get_or_insert(status);
        }
    }

    impl AsyncWrite for ClosedPeer {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_broken_sink_still_reports_drain_error() {
        let response = respond((status(StatusCode::OK), body_string("x")));

        let mut writer = ClosedPeer::default();
        let err = render(response, &mut writer).await.unwrap_err();

        match err {
            RenderError::Drain { source } => assert_eq!(source.io_kind(), Some(io::ErrorKind::BrokenPipe)),
            other => panic!("expected a drain error, got {other:?}"),
        }
        assert_eq!(writer.status, Some(StatusCode::OK));
    }
}
