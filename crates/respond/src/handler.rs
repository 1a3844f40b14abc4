//! Handler contracts.
//!
//! Two kinds of handlers meet here:
//!
//! - [`Handler`]: declarative, `Request -> Response`. It never touches the
//!   transport and always produces a response.
//! - [`WriteHandler`]: transport-level, writes status, headers and body to a
//!   [`ResponseWriter`] itself.
//!
//! [`Adapter`] turns the first into the second by calling the handler and
//! [`render`]ing its response. [`record`](crate::record) goes the other way.

use crate::error::BoxError;
use crate::render::{render, ResponseWriter};
use crate::response::Response;
use async_trait::async_trait;
use http::Request;
use std::fmt;
use std::future::Future;

#[async_trait]
pub trait Handler<B>: Send + Sync {
    async fn call(&self, req: Request<B>) -> Response;
}

#[async_trait]
pub trait WriteHandler<B>: Send + Sync {
    async fn serve(&self, req: Request<B>, writer: &mut dyn ResponseWriter) -> Result<(), BoxError>;
}

/// an async `Fn(Request<B>) -> Response` used as a [`Handler`]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerFn")
    }
}

#[async_trait]
impl<B, F, Fut> Handler<B> for HandlerFn<F>
where
    B: Send + 'static,
    F: Fn(Request<B>) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send,
{
    async fn call(&self, req: Request<B>) -> Response {
        (self.f)(req).await
    }
}

pub fn handler_fn<F, B, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request<B>) -> Fut,
    Fut: Future<Output = Response>,
{
    HandlerFn { f }
}

/// Serves a [`Handler`] as a [`WriteHandler`]: call, then [`render`].
#[derive(Debug)]
pub struct Adapter<H> {
    handler: H,
}

impl<H> Adapter<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

#[async_trait]
impl<B, H> WriteHandler<B> for Adapter<H>
where
    B: Send + 'static,
    H: Handler<B>,
{
    async fn serve(&self, req: Request<B>, writer: &mut dyn ResponseWriter) -> Result<(), BoxError> {
        let response = self.handler.call(req).await;
        render(response, writer).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::Recorder;
    use crate::respond;
    use crate::responder::{body_file, body_string, status};
    use http::{Method, StatusCode};

    fn assert_is_handler<H: Handler<B>, B>(_handler: &H) {
        // no op
    }

    fn assert_is_write_handler<H: WriteHandler<B>, B>(_handler: &H) {
        // no op
    }

    async fn echo_method(req: Request<()>) -> Response {
        respond(body_string(req.method().as_str()))
    }

    #[test]
    fn assert_fn_is_handler() {
        let handler = handler_fn(echo_method);
        assert_is_handler::<_, ()>(&handler);

        let adapter = Adapter::new(handler);
        assert_is_write_handler::<_, ()>(&adapter);
    }

    #[tokio::test]
    async fn test_handler_fn_call() {
        let handler = handler_fn(echo_method);
        let req = Request::builder().method(Method::PUT).body(()).unwrap();

        let response = handler.call(req).await;
        assert_eq!(response.status(), Some(StatusCode::OK));
        assert!(response.has_body());
    }

    #[tokio::test]
    async fn test_adapter_renders_response() {
        let adapter = Adapter::new(handler_fn(echo_method));
        let req = Request::builder().method(Method::DELETE).body(()).unwrap();

        let mut recorder = Recorder::new();
        adapter.serve(req, &mut recorder).await.unwrap();

        assert_eq!(recorder.status(), Some(StatusCode::OK));
        assert_eq!(recorder.body(), b"DELETE".as_slice());
    }

    #[tokio::test]
    async fn test_adapter_reports_drain_failure() {
        let adapter = Adapter::new(handler_fn(|_req: Request<()>| async {
            respond((status(StatusCode::OK), body_file("missing-file")))
        }));

        let mut recorder = Recorder::new();
        let result = adapter.serve(Request::new(()), &mut recorder).await;

        assert!(result.is_err());
        assert_eq!(recorder.status(), Some(StatusCode::OK));
    }
}
