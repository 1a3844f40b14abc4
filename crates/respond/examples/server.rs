//! A tiny HTTP/1.1 server built on declarative responses.
//!
//! ```text
//! curl -v http://127.0.0.1:8080/jsonify
//! curl -v 'http://127.0.0.1:8080/queryify?a=1&a=2&b=x'
//! ```
//!
//! Every connection serves a single request and is closed afterwards.

use async_trait::async_trait;
use bytes::BytesMut;
use http::header::{HeaderName, HeaderValue, CONNECTION};
use http::{Request, StatusCode};
use httparse::Status;
use micro_respond::{
    body_error, body_file, body_plain, body_query, handler_fn, header, respond, status, Adapter, BoxError,
    Response, ResponseWriter, WireWriter, WriteHandler,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const MAX_HEAD_SIZE: usize = 8 * 1024;
const MAX_HEADERS: usize = 64;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(port = 8080, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return Err(e.into());
        }
    };

    let handler = Arc::new(Logger::new(Adapter::new(handler_fn(route))));
    loop {
        let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            if let Err(e) = serve_connection(tcp_stream, handler.as_ref()).await {
                error!(cause = %e, "connection process error");
            }
        });
    }
}

async fn route(req: Request<()>) -> Response {
    match req.uri().path() {
        "/jsonify" => respond!(
            header(HeaderName::from_static("trace-id"), HeaderValue::from_static("asdf")),
            body_file("Cargo.toml"),
        ),
        "/queryify" => queryify(req.uri().query().unwrap_or_default()),
        _ => respond!(status(StatusCode::NOT_FOUND), body_plain("404 not found")),
    }
}

/// Echoes the query string back, re-encoded and with keys sorted
fn queryify(query: &str) -> Response {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
        Ok(pairs) => pairs,
        Err(e) => return respond!(status(StatusCode::BAD_REQUEST), body_error(&e)),
    };

    let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        values.entry(key).or_default().push(value);
    }
    respond(body_query(values))
}

/// Logs every request with its outcome
struct Logger<H> {
    inner: H,
}

impl<H> Logger<H> {
    fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H: WriteHandler<()>> WriteHandler<()> for Logger<H> {
    async fn serve(&self, req: Request<()>, writer: &mut dyn ResponseWriter) -> Result<(), BoxError> {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let start = Instant::now();

        let result = self.inner.serve(req, writer).await;
        match &result {
            Ok(()) => info!(%method, %path, elapsed = ?start.elapsed(), "request served"),
            Err(e) => warn!(%method, %path, cause = %e, "request failed"),
        }
        result
    }
}

async fn serve_connection<H>(mut stream: TcpStream, handler: &H) -> Result<(), BoxError>
where
    H: WriteHandler<()>,
{
    let Some(req) = read_head(&mut stream).await? else {
        return Ok(());
    };

    let mut writer = WireWriter::new(stream);
    writer.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));

    let result = handler.serve(req, &mut writer).await;
    writer.shutdown().await?;
    result
}

/// Reads one request head; `None` when the peer closed before sending anything
async fn read_head(stream: &mut TcpStream) -> Result<Option<Request<()>>, BoxError> {
    let mut buf = BytesMut::with_capacity(1024);
    loop {
        if stream.read_buf(&mut buf).await? == 0 {
            return if buf.is_empty() { Ok(None) } else { Err("connection closed mid head".into()) };
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut parsed = httparse::Request::new(&mut headers);
        match parsed.parse(&buf)? {
            Status::Complete(_) => return build_request(&parsed).map(Some),
            Status::Partial if buf.len() >= MAX_HEAD_SIZE => return Err("request head too large".into()),
            Status::Partial => {}
        }
    }
}

fn build_request(parsed: &httparse::Request<'_, '_>) -> Result<Request<()>, BoxError> {
    let mut builder = Request::builder().method(parsed.method.unwrap_or("GET")).uri(parsed.path.unwrap_or("/"));
    for h in parsed.headers.iter() {
        builder = builder.header(h.name, h.value);
    }
    Ok(builder.body(())?)
}
