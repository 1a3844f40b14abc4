//! Structured body encoders.
//!
//! Every encoder that owns a media type is a two-step pipeline: a
//! `Content-Type` header, then the body. The header step merges like any other
//! header, so an earlier `Content-Type` in the same chain is kept and the wire
//! carries both values. Put the encoder where you want its header, and don't
//! set another content type around it.
//!
//! The body step only stores a [`BodyWriter`](crate::body::BodyWriter); the
//! actual encoding (and any error it produces) happens at render time.

use crate::body::{FileBody, FormBody, JsonBody, ReaderBody, TemplateBody, XmlBody};
use crate::headers::{header, Headers};
use crate::responder::{body, SetBody};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderValue;
use minijinja::Environment;
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncRead;

const TEXT_PLAIN: &str = "text/plain";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const APPLICATION_JSON: &str = "application/json";
const APPLICATION_XML: &str = "application/xml";
const TEXT_HTML: &str = "text/html";

#[inline]
fn content_type(value: &'static str) -> Headers {
    header(CONTENT_TYPE, HeaderValue::from_static(value))
}

/// Raw bytes, no content type
pub fn body_bytes<B: Into<Bytes>>(bytes: B) -> SetBody {
    body(bytes.into())
}

/// A string's UTF-8 bytes, no content type
pub fn body_string<S: Into<String>>(string: S) -> SetBody {
    let string: String = string.into();
    body_bytes(string)
}

/// The error's message text, no content type
pub fn body_error<E: Display + ?Sized>(err: &E) -> SetBody {
    body_string(err.to_string())
}

/// `text/plain` with the given string
pub fn body_plain<S: Into<String>>(string: S) -> (Headers, SetBody) {
    (content_type(TEXT_PLAIN), body_string(string))
}

/// Bytes of an already-open stream, read once at render time
pub fn body_reader<R>(reader: R) -> SetBody
where
    R: AsyncRead + Send + Unpin + 'static,
{
    body(ReaderBody::new(reader))
}

/// Contents of the named file.
///
/// The file is opened at render time; a missing file doesn't stop composition.
pub fn body_file<P: Into<PathBuf>>(path: P) -> SetBody {
    body(FileBody::new(path))
}

/// `application/x-www-form-urlencoded` encoding of a key to values mapping.
///
/// Keys are sorted, so a `HashMap` encodes the same way on every call; the
/// values of one key keep their order.
///
/// ```
/// use std::collections::BTreeMap;
/// use micro_respond::{body_query, respond};
///
/// let values = BTreeMap::from([("a", vec!["1", "2"])]);
/// let response = respond(body_query(values));
/// assert_eq!(response.headers().get(http::header::CONTENT_TYPE).unwrap(), "application/x-www-form-urlencoded");
/// ```
pub fn body_query<I, K, V, S>(values: I) -> (Headers, SetBody)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut pairs = Vec::new();
    for (key, values) in values {
        let key = key.into();
        for value in values {
            pairs.push((key.clone(), value.into()));
        }
    }
    pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
    (content_type(FORM_URLENCODED), body(FormBody::new(pairs)))
}

/// `application/json` encoding of `value`
pub fn body_json<T>(value: T) -> (Headers, SetBody)
where
    T: Serialize + Send + 'static,
{
    (content_type(APPLICATION_JSON), body(JsonBody::new(value)))
}

/// `application/xml` encoding of `value`
pub fn body_xml<T>(value: T) -> (Headers, SetBody)
where
    T: Serialize + Send + 'static,
{
    (content_type(APPLICATION_XML), body(XmlBody::new(value)))
}

/// `text/html` produced by the template `name` of `env`, rendered with `context`
pub fn body_html_template<N, T>(env: Arc<Environment<'static>>, name: N, context: T) -> (Headers, SetBody)
where
    N: Into<String>,
    T: Serialize + Send + 'static,
{
    (content_type(TEXT_HTML), body(TemplateBody::new(env, name, context)))
}
