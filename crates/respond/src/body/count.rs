use pin_project_lite::pin_project;
use std::io;
use std::io::IoSlice;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::AsyncWrite;

pin_project! {
    /// An [`AsyncWrite`] decorator that counts the bytes its inner writer accepted.
    ///
    /// Every call is forwarded unchanged; only successful writes are counted.
    #[derive(Debug)]
    pub struct CountWriter<W> {
        #[pin]
        inner: W,
        count: u64,
    }
}

impl<W> CountWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    /// Bytes written so far
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite> AsyncWrite for CountWriter<W> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.project();
        let n = ready!(this.inner.poll_write(cx, buf))?;
        *this.count += n as u64;
        Poll::Ready(Ok(n))
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        let n = ready!(this.inner.poll_write_vectored(cx, bufs))?;
        *this.count += n as u64;
        Poll::Ready(Ok(n))
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_counts_written_bytes() {
        let mut writer = CountWriter::new(Vec::new());
        writer.write_all(b"hello ").await.unwrap();
        writer.write_all(b"world").await.unwrap();
        writer.flush().await.unwrap();

        assert_eq!(writer.count(), 11);
        assert_eq!(writer.into_inner(), b"hello world");
    }

    #[tokio::test]
    async fn test_wraps_borrowed_sink() {
        let mut sink = Vec::new();
        {
            let mut writer = CountWriter::new(&mut sink);
            writer.write_all(b"abc").await.unwrap();
            assert_eq!(writer.count(), 3);
        }
        assert_eq!(sink, b"abc");
    }
}
