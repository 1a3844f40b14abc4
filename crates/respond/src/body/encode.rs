//! Encoder-backed body writers.
//!
//! Each writer keeps the value it will encode and serializes it only when it
//! is drained. Serialization errors become [`DrainError`]s.

use crate::body::{BodyWriter, CountWriter};
use crate::error::DrainError;
use async_trait::async_trait;
use minijinja::Environment;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

async fn write_counted(sink: &mut (dyn AsyncWrite + Send + Unpin), bytes: &[u8]) -> Result<u64, DrainError> {
    let mut writer = CountWriter::new(sink);
    writer.write_all(bytes).await?;
    Ok(writer.count())
}

/// Encodes a value with `serde_json`.
///
/// The body is exactly the encoded value, with no trailing newline.
#[derive(Debug)]
pub struct JsonBody<T> {
    value: T,
}

impl<T> JsonBody<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

#[async_trait]
impl<T> BodyWriter for JsonBody<T>
where
    T: Serialize + Send + 'static,
{
    async fn drain(self: Box<Self>, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<u64, DrainError> {
        let bytes = serde_json::to_vec(&self.value)?;
        write_counted(sink, &bytes).await
    }
}

/// Encodes a value with the `quick-xml` serde serializer.
///
/// The root element is named after the serialized type.
#[derive(Debug)]
pub struct XmlBody<T> {
    value: T,
}

impl<T> XmlBody<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

#[async_trait]
impl<T> BodyWriter for XmlBody<T>
where
    T: Serialize + Send + 'static,
{
    async fn drain(self: Box<Self>, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<u64, DrainError> {
        let xml = quick_xml::se::to_string(&self.value)?;
        write_counted(sink, xml.as_bytes()).await
    }
}

/// `application/x-www-form-urlencoded` pairs; a repeated key keeps its order
#[derive(Debug, Clone, Default)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

#[async_trait]
impl BodyWriter for FormBody {
    async fn drain(self: Box<Self>, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<u64, DrainError> {
        let encoded = serde_urlencoded::to_string(&self.pairs)?;
        write_counted(sink, encoded.as_bytes()).await
    }
}

/// Renders a named `minijinja` template with a serializable context.
///
/// Template lookup and execution both happen at drain time. Templates whose
/// name ends in `.html` get minijinja's HTML auto-escaping.
pub struct TemplateBody<T> {
    env: Arc<Environment<'static>>,
    name: String,
    context: T,
}

impl<T> TemplateBody<T> {
    pub fn new(env: Arc<Environment<'static>>, name: impl Into<String>, context: T) -> Self {
        Self { env, name: name.into(), context }
    }
}

#[async_trait]
impl<T> BodyWriter for TemplateBody<T>
where
    T: Serialize + Send + 'static,
{
    async fn drain(self: Box<Self>, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<u64, DrainError> {
        let html = {
            let template = self.env.get_template(&self.name)?;
            template.render(&self.context)?
        };
        write_counted(sink, html.as_bytes()).await
    }
}

impl<T> fmt::Debug for TemplateBody<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateBody").field("name", &self.name).finish_non_exhaustive()
    }
}
