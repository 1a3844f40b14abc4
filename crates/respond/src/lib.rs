//! Declarative, composable HTTP responses for async handlers
//!
//! A handler in this crate doesn't write to a connection. It returns a
//! [`Response`]: a status, headers, an optional deferred body and an optional
//! attached error. Responses are built by folding small [`Responder`] steps over
//! an empty seed, and turned into bytes on a connection exactly once, by
//! [`render`].
//!
//! # Features
//!
//! - Composition with tuples, [`Pipeline`]s and the [`respond!`] macro
//! - Header merging that keeps every value, multi-valued keys included
//! - Deferred bodies: files, readers, JSON, XML, forms and templates are encoded
//!   only when rendered
//! - [`Adapter`] to serve a declarative [`Handler`] on any [`ResponseWriter`]
//! - [`record`] to lift an imperative [`WriteHandler`] back into a [`Response`]
//!
//! # Example
//!
//! ```
//! use http::StatusCode;
//! use micro_respond::{body_plain, render, respond, status, try_header, Recorder};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let response = respond!(
//!     status(StatusCode::CREATED),
//!     try_header("trace-id", "asdf")?,
//!     body_plain("created"),
//! );
//!
//! let mut recorder = Recorder::new();
//! render(response, &mut recorder).await?;
//!
//! assert_eq!(recorder.status(), Some(StatusCode::CREATED));
//! assert_eq!(recorder.headers().get("trace-id").unwrap(), "asdf");
//! assert_eq!(recorder.body(), b"created");
//! # Ok(())
//! # }
//! ```
//!
//! Nothing fails during composition. A body that can't be produced (a missing
//! file, a value the encoder rejects) fails in [`render`], after the status has
//! been committed.

mod error;
mod handler;
mod headers;
mod recorder;
mod render;
mod response;
mod wire;

pub mod body;
pub mod responder;

pub use body::BodyWriter;
pub use body::BoxBodyWriter;
pub use error::BoxError;
pub use error::DrainError;
pub use error::RenderError;
pub use handler::handler_fn;
pub use handler::Adapter;
pub use handler::Handler;
pub use handler::HandlerFn;
pub use handler::WriteHandler;
pub use headers::header;
pub use headers::try_header;
pub use headers::Headers;
pub use recorder::record;
pub use recorder::Recorder;
pub use render::render;
pub use render::ResponseWriter;
pub use responder::{body, error, respond, responder_fn, status};
pub use responder::{
    body_bytes, body_error, body_file, body_html_template, body_json, body_plain, body_query, body_reader, body_string,
    body_xml,
};
pub use responder::{BoxResponder, Pipeline, Responder, ResponderFn, SetBody, SetError};
pub use response::Response;
pub use wire::WireWriter;
