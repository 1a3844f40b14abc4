//! Composable response transformations.
//!
//! This module provides the [`Responder`] trait: one step that takes a
//! [`Response`] and returns a new one. Steps compose in order:
//!
//! - a wrapped function ([`ResponderFn`], built with [`responder_fn`]),
//! - a header container ([`Headers`](crate::Headers)), merged onto the response,
//! - an ordered list: tuples of up to 12 responders, or a [`Pipeline`] of any length.
//!
//! Lists are responders themselves, so they nest and can be handed around as
//! named bundles. [`respond`] folds a responder over the seed response
//! (`200 OK`, no headers, no body, no error).
//!
//! Later steps overwrite `status` and replace `body` and `error` wholesale;
//! header steps merge. Each built-in step copies every field it does not own.

mod encode;

pub use encode::{
    body_bytes, body_error, body_file, body_html_template, body_json, body_plain, body_query, body_reader,
    body_string, body_xml,
};

use crate::body::{BodyWriter, BoxBodyWriter};
use crate::error::BoxError;
use crate::response::Response;
use http::StatusCode;
use std::fmt;

/// A single transformation step over a [`Response`].
pub trait Responder: Send {
    fn apply(self, response: Response) -> Response;
}

/// Folds `responder` over the seed response (`200 OK`, nothing else).
///
/// ```
/// use http::StatusCode;
/// use micro_respond::{body_plain, respond, status};
///
/// let response = respond((status(StatusCode::CREATED), body_plain("created")));
/// assert_eq!(response.status(), Some(StatusCode::CREATED));
/// assert_eq!(response.headers().get(http::header::CONTENT_TYPE).unwrap(), "text/plain");
/// ```
pub fn respond<R: Responder>(responder: R) -> Response {
    responder.apply(Response::seed())
}

/// `respond!(a, b, c)` is `respond((a, b, c))`.
#[macro_export]
macro_rules! respond {
    () => {
        $crate::respond(())
    };
    ($($responder:expr),+ $(,)?) => {
        $crate::respond(($($responder,)+))
    };
}

/// a plain `FnOnce(Response) -> Response` used as a [`Responder`]
#[derive(Clone, Copy)]
pub struct ResponderFn<F> {
    f: F,
}

pub fn responder_fn<F>(f: F) -> ResponderFn<F>
where
    F: FnOnce(Response) -> Response + Send,
{
    ResponderFn { f }
}

impl<F> Responder for ResponderFn<F>
where
    F: FnOnce(Response) -> Response + Send,
{
    #[inline]
    fn apply(self, response: Response) -> Response {
        (self.f)(response)
    }
}

impl<F> fmt::Debug for ResponderFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponderFn")
    }
}

/// Sets the status, keeping headers, body and error.
pub fn status(status: StatusCode) -> ResponderFn<impl FnOnce(Response) -> Response + Send> {
    responder_fn(move |response| Response { status: Some(status), ..response })
}

/// Attaches an advisory error, keeping status, headers and body.
///
/// The error is only read by whoever inspects the response (typically logging);
/// use [`body_error`] to send its text to the client.
pub fn error<E>(err: E) -> SetError
where
    E: Into<BoxError>,
{
    SetError { error: err.into() }
}

/// Sets the deferred body, replacing any previous one and keeping status, headers and error.
pub fn body<W>(writer: W) -> SetBody
where
    W: BodyWriter + 'static,
{
    SetBody { writer: Box::new(writer) }
}

/// Responder built by [`error`]
#[derive(Debug)]
pub struct SetError {
    error: BoxError,
}

impl Responder for SetError {
    fn apply(self, response: Response) -> Response {
        Response { error: Some(self.error), ..response }
    }
}

/// Responder built by [`body`] and the `body_*` encoders
pub struct SetBody {
    writer: BoxBodyWriter,
}

impl Responder for SetBody {
    fn apply(self, response: Response) -> Response {
        Response { body: Some(self.writer), ..response }
    }
}

impl fmt::Debug for SetBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SetBody")
    }
}

/// `None` leaves the response as it is.
impl<R: Responder> Responder for Option<R> {
    fn apply(self, response: Response) -> Response {
        match self {
            Some(responder) => responder.apply(response),
            None => response,
        }
    }
}

impl<R: Responder> Responder for Box<R> {
    fn apply(self, response: Response) -> Response {
        (*self).apply(response)
    }
}

trait DynResponder: Send {
    fn apply_boxed(self: Box<Self>, response: Response) -> Response;
}

impl<R: Responder> DynResponder for R {
    fn apply_boxed(self: Box<Self>, response: Response) -> Response {
        (*self).apply(response)
    }
}

/// Type-erased [`Responder`], the element type of a [`Pipeline`].
pub struct BoxResponder {
    inner: Box<dyn DynResponder>,
}

impl BoxResponder {
    pub fn new<R: Responder + 'static>(responder: R) -> Self {
        Self { inner: Box::new(responder) }
    }
}

impl Responder for BoxResponder {
    #[inline]
    fn apply(self, response: Response) -> Response {
        self.inner.apply_boxed(response)
    }
}

impl fmt::Debug for BoxResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxResponder")
    }
}

/// An ordered list of responders, applied first to last.
#[derive(Debug, Default)]
pub struct Pipeline {
    inner: Vec<BoxResponder>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { inner: vec![] }
    }

    pub fn add_last<R: Responder + 'static>(mut self, responder: R) -> Self {
        self.inner.push(BoxResponder::new(responder));
        self
    }

    pub fn add_first<R: Responder + 'static>(mut self, responder: R) -> Self {
        self.inner.insert(0, BoxResponder::new(responder));
        self
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Responder for Pipeline {
    fn apply(self, response: Response) -> Response {
        self.inner.into_iter().fold(response, |response, responder| responder.apply(response))
    }
}

impl FromIterator<BoxResponder> for Pipeline {
    fn from_iter<T: IntoIterator<Item = BoxResponder>>(iter: T) -> Self {
        Self { inner: iter.into_iter().collect() }
    }
}

/// impl [`Responder`] for tuples, from 0 to 12 elements
///
/// for example, it will impl (A, B) like this:
///```ignore
/// impl<A, B> Responder for (A, B)
///    where
///        A: Responder,
///        B: Responder,
/// {
///    #[inline]
///    #[allow(non_snake_case)]
///    fn apply(self, response: Response) -> Response {
///        let (A, B) = self;
///        let response = A.apply(response);
///        let response = B.apply(response);
///        response
///    }
/// }
///```
macro_rules! impl_responder_for_tuple ({ $($param:ident)* } => {
    impl<$($param,)*> Responder for ($($param,)*)
    where
        $($param: Responder,)*
    {
        #[inline]
        #[allow(non_snake_case, reason = "tuple elements are bound to their type parameter names")]
        fn apply(self, response: Response) -> Response {
            let ($($param,)*) = self;
            $(let response = $param.apply(response);)*
            response
        }
    }
});

impl_responder_for_tuple! {}
impl_responder_for_tuple! { A }
impl_responder_for_tuple! { A B }
impl_responder_for_tuple! { A B C }
impl_responder_for_tuple! { A B C D }
impl_responder_for_tuple! { A B C D E }
impl_responder_for_tuple! { A B C D E F }
impl_responder_for_tuple! { A B C D E F G }
impl_responder_for_tuple! { A B C D E F G H }
impl_responder_for_tuple! { A B C D E F G H I }
impl_responder_for_tuple! { A B C D E F G H I J }
impl_responder_for_tuple! { A B C D E F G H I J K }
impl_responder_for_tuple! { A B C D E F G H I J K L }
