use crate::config::ServerConfig;
use crate::error::FrameworkError;
use crate::http::{collect_body, HttpResponse, Request};
use crate::routing::Router;
use bytes::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct Server {
    router: Arc<Router>,
    host: String,
    port: u16,
    max_body_size: usize,
}

impl Server {
    pub fn new(router: impl Into<Arc<Router>>) -> Self {
        Self::from_config(router, &ServerConfig::default())
    }

    pub fn from_config(router: impl Into<Arc<Router>>, config: &ServerConfig) -> Self {
        Self {
            router: router.into(),
            host: config.host.clone(),
            port: config.port,
            max_body_size: config.max_body_size,
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn addr(&self) -> Result<SocketAddr, FrameworkError> {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            max_body_size: self.max_body_size,
        }
        .addr()
    }

    /// Bind the listener and serve in a background task
    pub async fn bind(self) -> Result<RunningServer, FrameworkError> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| FrameworkError::internal(format!("cannot bind {}: {}", addr, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| FrameworkError::internal(e.to_string()))?;

        let (shutdown, signal) = watch::channel(false);
        let handle = tokio::spawn(accept_loop(
            listener,
            self.router,
            self.max_body_size,
            signal,
        ));

        tracing::info!(addr = %local_addr, "server listening");
        Ok(RunningServer {
            addr: local_addr,
            shutdown,
            handle,
        })
    }
}

/// A server accepting connections in the background
pub struct RunningServer {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RunningServer {
    /// The bound address (the real port when configured with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting, let open connections finish, and wait for the accept loop
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "accept loop panicked");
        }
        tracing::info!(addr = %self.addr, "server stopped");
    }
}

async fn accept_loop(
    listener: TcpListener,
    router: Arc<Router>,
    max_body_size: usize,
    mut signal: watch::Receiver<bool>,
) {
    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    continue;
                }
            },
            _ = signal.changed() => break,
        };

        let io = TokioIo::new(stream);
        let router = router.clone();
        let mut signal = signal.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                let router = router.clone();
                async move { Ok::<_, Infallible>(handle_request(router, max_body_size, req).await) }
            });

            let conn = http1::Builder::new().serve_connection(io, service);
            tokio::pin!(conn);

            let result = tokio::select! {
                result = conn.as_mut() => result,
                _ = signal.changed() => {
                    conn.as_mut().graceful_shutdown();
                    conn.as_mut().await
                }
            };
            if let Err(err) = result {
                tracing::debug!(error = %err, "connection closed with error");
            }
        });
    }
}

async fn handle_request(
    router: Arc<Router>,
    max_body_size: usize,
    req: hyper::Request<hyper::body::Incoming>,
) -> hyper::Response<Full<Bytes>> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    let response = match collect_body(body, max_body_size).await {
        Ok(bytes) => dispatch(&router, Request::new(parts, bytes)).await,
        Err(e) => HttpResponse::from(e),
    };

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status_code(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response.into_hyper()
}

/// Route a request and run its handler
///
/// Unknown routes get a JSON 404.
pub async fn dispatch(router: &Router, request: Request) -> HttpResponse {
    match router.match_route(request.method(), request.path()) {
        Some((handler, params)) => {
            let response = (handler.as_ref())(request.with_params(params)).await;
            // Both Ok and Err carry an HttpResponse
            response.unwrap_or_else(|e| e)
        }
        None => HttpResponse::json(serde_json::json!({ "error": "Not Found" })).status(404),
    }
}
