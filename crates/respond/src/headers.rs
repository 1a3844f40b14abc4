//! Header container used by [`Response`](crate::Response).
//!
//! [`Headers`] wraps an [`http::HeaderMap`], so keys are case-insensitive and a
//! key carries an ordered list of values. Only two operations build new
//! containers: [`Clone::clone`] and [`Headers::merge`]. Neither touches its
//! inputs.
//!
//! Applying a [`Headers`] value as a [`Responder`] merges it onto the
//! response's headers. Merging appends, it never replaces: setting
//! `Content-Type` twice across a chain puts two values on the wire.

use crate::responder::Responder;
use crate::response::Response;
use http::header::{AsHeaderName, GetAll, Iter, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: HeaderMap,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a new container holding every value of every container, in order.
    ///
    /// Values of a key already present are appended after the existing ones,
    /// duplicates included.
    pub fn merge<'a, I>(containers: I) -> Self
    where
        I: IntoIterator<Item = &'a Headers>,
    {
        let mut inner = HeaderMap::new();
        for headers in containers {
            for (name, value) in &headers.inner {
                inner.append(name, value.clone());
            }
        }
        Self { inner }
    }

    /// Returns the first value of `key`
    #[inline]
    pub fn get<K: AsHeaderName>(&self, key: K) -> Option<&HeaderValue> {
        self.inner.get(key)
    }

    /// Returns every value of `key`, in insertion order
    #[inline]
    pub fn get_all<K: AsHeaderName>(&self, key: K) -> GetAll<'_, HeaderValue> {
        self.inner.get_all(key)
    }

    /// Number of values, counting every value of a multi-valued key
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates every `(name, value)` pair; a key with several values yields several pairs
    #[inline]
    pub fn iter(&self) -> Iter<'_, HeaderValue> {
        self.inner.iter()
    }

    /// The first `Content-Type` value parsed as a media type
    pub fn content_type(&self) -> Option<mime::Mime> {
        self.inner.get(CONTENT_TYPE)?.to_str().ok()?.parse().ok()
    }

    pub fn into_map(self) -> HeaderMap {
        self.inner
    }
}

impl From<HeaderMap> for Headers {
    fn from(inner: HeaderMap) -> Self {
        Self { inner }
    }
}

impl FromIterator<(HeaderName, HeaderValue)> for Headers {
    fn from_iter<T: IntoIterator<Item = (HeaderName, HeaderValue)>>(iter: T) -> Self {
        let mut inner = HeaderMap::new();
        for (name, value) in iter {
            inner.append(name, value);
        }
        Self { inner }
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a HeaderName, &'a HeaderValue);
    type IntoIter = Iter<'a, HeaderValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl Responder for Headers {
    fn apply(self, response: Response) -> Response {
        Response { headers: Headers::merge([&response.headers, &self]), ..response }
    }
}

/// A single-key, single-value container.
///
/// ```
/// use http::header::CONTENT_TYPE;
/// use http::HeaderValue;
/// use micro_respond::{header, respond};
///
/// let response = respond(header(CONTENT_TYPE, HeaderValue::from_static("text/csv")));
/// assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/csv");
/// ```
pub fn header(name: HeaderName, value: HeaderValue) -> Headers {
    let mut inner = HeaderMap::with_capacity(1);
    inner.insert(name, value);
    Headers { inner }
}

/// Like [`header`], for names and values only known at runtime.
///
/// # Errors
///
/// Returns an error when `name` is not a valid header name or `value` holds
/// bytes not allowed in a header value.
pub fn try_header(name: &str, value: &str) -> Result<Headers, http::Error> {
    let name = HeaderName::try_from(name)?;
    let value = HeaderValue::try_from(value)?;
    Ok(header(name, value))
}
