//! A small HTTP/1 endpoint that serves a raw report tree at `GET /api/data`.

use crate::model::RawNode;
use crate::Result;
use anyhow::Context;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, trace, warn};

/// The path at which the report is served.
pub const DATA_PATH: &str = "/api/data";

/// Serves one raw tree, serialized once when the server is bound.
pub struct DataServer {
    listener: TcpListener,
    body: Arc<String>,
}

impl DataServer {
    /// Binds `addr`. Port 0 picks a free port; see `local_addr`.
    pub async fn bind(addr: SocketAddr, raw: &RawNode) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Unable to listen on {addr}"))?;
        let body = serde_json::to_string(raw).context("Unable to serialize the report")?;
        Ok(Self {
            listener,
            body: Arc::new(body),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Unable to read the listening address")
    }

    /// Accepts connections until an accept fails. Each connection is served on its own task.
    pub async fn run(self) -> Result<()> {
        info!(
            "Serving the report at http://{}{DATA_PATH}",
            self.local_addr()?
        );
        loop {
            let (stream, peer) = self
                .listener
                .accept()
                .await
                .context("Failed to accept a connection")?;
            trace!("Connection from {peer}");
            let io = TokioIo::new(stream);
            let body = Arc::clone(&self.body);
            tokio::spawn(async move {
                let service = service_fn(move |request: Request<Incoming>| {
                    let body = Arc::clone(&body);
                    async move {
                        Ok::<_, Infallible>(route(request.method(), request.uri().path(), &body))
                    }
                });
                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    warn!("Error while serving {peer}: {e}");
                }
            });
        }
    }
}

/// Maps a request to a response. `body` is the JSON of the raw tree.
pub fn route(method: &Method, path: &str, body: &str) -> Response<String> {
    debug!("{method} {path}");
    if path != DATA_PATH {
        return respond(StatusCode::NOT_FOUND, "text/plain", "Not Found");
    }
    if *method != Method::GET {
        return respond(
            StatusCode::METHOD_NOT_ALLOWED,
            "text/plain",
            "Method Not Allowed",
        );
    }
    respond(StatusCode::OK, "application/json", body)
}

fn respond(status: StatusCode, content_type: &'static str, body: &str) -> Response<String> {
    let mut response = Response::new(body.to_string());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
