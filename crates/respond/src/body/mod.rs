//! Deferred response bodies.
//!
//! A [`BodyWriter`] is a capability: "given a sink, write the body into it and
//! report how many bytes went out". Nothing happens when a body is attached to
//! a [`Response`](crate::Response); the writer runs once, when
//! [`render`](crate::render) drains it into the connection. Opening files,
//! serializing values and executing templates therefore fail at drain time,
//! never while responders are composed.
//!
//! Implementations:
//!
//! - [`Bytes`]: an in-memory buffer (also used for strings)
//! - [`ReaderBody`]: an already-open byte stream, read once and forwarded
//! - [`FileBody`]: a named file, opened at drain time
//! - [`JsonBody`], [`XmlBody`], [`FormBody`], [`TemplateBody`]: encoder-backed writers

mod count;
mod encode;

pub use count::CountWriter;
pub use encode::{FormBody, JsonBody, TemplateBody, XmlBody};

use crate::error::DrainError;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Writes a response body into a sink, once.
///
/// Taking `self: Box<Self>` makes the single use explicit: after `drain` the
/// writer is gone.
#[async_trait]
pub trait BodyWriter: Send {
    async fn drain(self: Box<Self>, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<u64, DrainError>;
}

pub type BoxBodyWriter = Box<dyn BodyWriter>;

#[async_trait]
impl BodyWriter for Bytes {
    async fn drain(self: Box<Self>, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<u64, DrainError> {
        let bytes = *self;
        sink.write_all(&bytes).await?;
        Ok(bytes.len() as u64)
    }
}

/// Forwards an already-open stream
#[derive(Debug)]
pub struct ReaderBody<R> {
    reader: R,
}

impl<R> ReaderBody<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl<R> BodyWriter for ReaderBody<R>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    async fn drain(mut self: Box<Self>, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<u64, DrainError> {
        Ok(tokio::io::copy(&mut self.reader, sink).await?)
    }
}

/// A file opened only when the body is drained.
///
/// A missing file or a permission problem shows up as [`DrainError::Io`].
#[derive(Debug, Clone)]
pub struct FileBody {
    path: PathBuf,
}

impl FileBody {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BodyWriter for FileBody {
    async fn drain(self: Box<Self>, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<u64, DrainError> {
        debug!(path = %self.path.display(), "open body file");
        let mut file = File::open(&self.path).await?;
        Ok(tokio::io::copy(&mut file, sink).await?)
    }
}

#[cfg(test)]
pub(crate) async fn drain_to_vec(body: BoxBodyWriter) -> Result<Vec<u8>, DrainError> {
    let mut sink = Vec::new();
    body.drain(&mut sink).await?;
    Ok(sink)
}
