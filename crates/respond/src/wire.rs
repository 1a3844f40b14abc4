//! A [`ResponseWriter`] over a raw byte stream.
//!
//! [`WireWriter`] buffers headers until the status is written, then encodes an
//! HTTP/1.1 head (`status line`, `name: value` lines, blank line) in front of
//! the first body bytes. Body bytes pass through unframed: there is no
//! `Content-Length` and no chunking, so the peer reads the body until the
//! stream is shut down.

use crate::render::ResponseWriter;
use bytes::{Buf, BufMut, BytesMut};
use http::{HeaderMap, StatusCode};
use pin_project_lite::pin_project;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::AsyncWrite;
use tracing::warn;

/// Initial buffer size allocated for the response head
const INIT_HEAD_SIZE: usize = 4 * 1024;

pin_project! {
    #[derive(Debug)]
    pub struct WireWriter<W> {
        #[pin]
        io: W,
        headers: HeaderMap,
        pending: BytesMut,
        committed: bool,
    }
}

impl<W> WireWriter<W> {
    pub fn new(io: W) -> Self {
        Self { io, headers: HeaderMap::new(), pending: BytesMut::new(), committed: false }
    }

    /// Whether the status line has been produced
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Returns the underlying stream.
    ///
    /// Head bytes that were encoded but not yet written are dropped; flush first.
    pub fn into_inner(self) -> W {
        self.io
    }
}

fn encode_head(dst: &mut BytesMut, status: StatusCode, headers: &HeaderMap) {
    dst.reserve(INIT_HEAD_SIZE);

    dst.put_slice(b"HTTP/1.1 ");
    dst.put_slice(status.as_str().as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(status.canonical_reason().unwrap_or("").as_bytes());
    dst.put_slice(b"\r\n");

    for (name, value) in headers {
        dst.put_slice(name.as_ref());
        dst.put_slice(b": ");
        dst.put_slice(value.as_ref());
        dst.put_slice(b"\r\n");
    }
    dst.put_slice(b"\r\n");
}

impl<W: AsyncWrite> WireWriter<W> {
    fn commit_default(self: Pin<&mut Self>) {
        let this = self.project();
        if !*this.committed {
            encode_head(this.pending, StatusCode::OK, this.headers);
            *this.committed = true;
        }
    }

    fn poll_drain_pending(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut this = self.project();
        while !this.pending.is_empty() {
            let n = ready!(this.io.as_mut().poll_write(cx, this.pending.chunk()))?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            this.pending.advance(n);
        }
        Poll::Ready(Ok(()))
    }
}

impl<W> ResponseWriter for WireWriter<W>
where
    W: AsyncWrite + Send + Unpin,
{
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.committed {
            warn!(ignored = ?status, "superfluous status write");
            return;
        }
        encode_head(&mut self.pending, status, &self.headers);
        self.committed = true;
    }
}

impl<W: AsyncWrite> AsyncWrite for WireWriter<W> {
    fn poll_write(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.as_mut().commit_default();
        ready!(self.as_mut().poll_drain_pending(cx))?;
        self.project().io.poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        ready!(self.as_mut().poll_drain_pending(cx))?;
        self.project().io.poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        ready!(self.as_mut().poll_drain_pending(cx))?;
        self.project().io.poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;
    use crate::respond;
    use crate::headers::header;
    use crate::responder::{body_file, body_plain, status};
    use http::header::{HeaderValue, SET_COOKIE};
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_head_then_body() {
        let mut writer = WireWriter::new(Vec::new());
        writer.headers_mut().insert("x-a", HeaderValue::from_static("1"));
        writer.write_status(StatusCode::NOT_FOUND);
        assert!(writer.is_committed());

        writer.write_all(b"gone").await.unwrap();
        writer.flush().await.unwrap();

        assert_eq!(writer.into_inner(), b"HTTP/1.1 404 Not Found\r\nx-a: 1\r\n\r\ngone");
    }

    #[tokio::test]
    async fn test_body_write_commits_200() {
        let mut writer = WireWriter::new(Vec::new());
        writer.write_all(b"hi").await.unwrap();
        assert!(writer.is_committed());

        writer.write_status(StatusCode::CREATED);
        writer.flush().await.unwrap();

        assert_eq!(writer.into_inner(), b"HTTP/1.1 200 OK\r\n\r\nhi");
    }

    #[tokio::test]
    async fn test_flush_without_body_writes_head() {
        let mut writer = WireWriter::new(Vec::new());
        writer.write_status(StatusCode::NO_CONTENT);
        writer.flush().await.unwrap();

        assert_eq!(writer.into_inner(), b"HTTP/1.1 204 No Content\r\n\r\n");
    }

    #[tokio::test]
    async fn test_render_onto_wire() {
        let response = respond!(
            status(StatusCode::CREATED),
            header(SET_COOKIE, HeaderValue::from_static("a=1")),
            header(SET_COOKIE, HeaderValue::from_static("b=2")),
            body_plain("made"),
        );

        let mut writer = WireWriter::new(Vec::new());
        render(response, &mut writer).await.unwrap();

        let expected = "HTTP/1.1 201 Created\r\n\
            set-cookie: a=1\r\n\
            set-cookie: b=2\r\n\
            content-type: text/plain\r\n\
            \r\n\
            made";
        assert_eq!(String::from_utf8(writer.into_inner()).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_render_drain_failure_on_wire() {
        let response = respond((status(StatusCode::OK), body_file("missing-file")));

        let mut writer = WireWriter::new(Vec::new());
        assert!(render(response, &mut writer).await.is_err());

        assert_eq!(writer.into_inner(), b"HTTP/1.1 200 OK\r\n\r\nInternal Server Error\n");
    }

    #[tokio::test]
    async fn test_unknown_reason_phrase() {
        let mut writer = WireWriter::new(Vec::new());
        writer.write_status(StatusCode::from_u16(599).unwrap());
        writer.flush().await.unwrap();

        assert_eq!(writer.into_inner(), b"HTTP/1.1 599 \r\n\r\n");
    }
}
