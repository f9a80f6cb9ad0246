//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use log::{error, info, warn};

use crate::dispatch::Dispatcher;
use crate::http::{parse_request, HttpRequest, HttpResponse, StatusCode};
use crate::routing::{Error as RoutingError, Router};
use crate::server::config::ServerConfig;
use crate::server::error::Error;

/// Serves a frozen [`Router`] and a [`Dispatcher`] over TCP.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The routes, frozen before the server starts.
    pub router: Arc<Router>,
    /// Runs matched routes.
    pub dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig, router: Router, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            router: Arc::new(router),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Log the registered endpoints.
    fn display_server_info(&self) {
        info!("Registered endpoints:");
        for route in self.router.routes().iter() {
            info!("  {method} {path} -> {action}", method = route.method(), path = route.path(), action = route.action());
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on {scheme}://{addr}", scheme = self.config.scheme, addr = self.config.addr);
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>) {
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });
    }

    /// Start the server and serve until Ctrl+C.
    pub async fn start(&self) -> Result<(), Error> {
        self.display_server_info();
        let listener = self.setup_listener().await?;

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        Self::setup_ctrl_c_handler(shutdown_tx);

        self.serve(listener, shutdown_rx).await
    }

    /// Accept connections on `listener` until a shutdown message arrives.
    pub async fn serve(&self, listener: TcpListener, mut shutdown_rx: mpsc::Receiver<()>) -> Result<(), Error> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            self.handle_new_connection(socket, addr, semaphore.clone(), &mut tasks).await;
                        }
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        Self::perform_shutdown(&mut tasks).await;
        Ok(())
    }

    /// Handle a new connection.
    async fn handle_new_connection(
        &self,
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: Arc<Semaphore>,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::new(StatusCode::ServiceUnavailable)
                    .with_content_type("text/plain")
                    .with_body_string("Server is at capacity, please try again later");
                let _ = socket.write_all(&response.to_bytes()).await;
                return;
            }
        };

        let router = self.router.clone();
        let dispatcher = self.dispatcher.clone();
        let read_buffer_size = self.config.read_buffer_size;
        let scheme = self.config.scheme.clone();

        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the semaphore slot
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, &router, &dispatcher, read_buffer_size, &scheme).await {
                error!("Error handling connection from {addr}: {e}");
            }
        });
    }

    /// Handle connection errors. Returns true when the accept loop should stop.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        // For other errors, wait a bit before retrying
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let _ = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        }).await;

        info!("Server shutdown complete");
    }

    /// Resolve and dispatch one request.
    ///
    /// A missing route becomes `MethodNotAllowed` when other methods would accept the request.
    pub fn respond(router: &Router, dispatcher: &Dispatcher, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let matched = match router.resolve(request) {
            Ok(matched) => matched,
            Err(RoutingError::RouteNotFound { method, path }) => {
                let allowed = router.allowed_methods(request)?;
                if allowed.is_empty() {
                    return Err(RoutingError::RouteNotFound { method, path }.into());
                }
                return Err(Error::MethodNotAllowed { method, path, allowed });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(dispatcher.dispatch_match(&matched, request)?)
    }

    /// Map a failed request to the response sent to the client.
    fn error_response(error: &Error) -> HttpResponse {
        let response = match error {
            Error::ParseError(e) => HttpResponse::new(StatusCode::BadRequest)
                .with_body_string(format!("Error parsing request: {e}")),
            Error::RoutingError(RoutingError::RouteNotFound { path, .. }) => {
                HttpResponse::new(StatusCode::NotFound).with_body_string(format!("Not found: {path}"))
            }
            Error::MethodNotAllowed { allowed, .. } => {
                let allowed = allowed.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(", ");
                HttpResponse::new(StatusCode::MethodNotAllowed)
                    .with_header("Allow", allowed.clone())
                    .with_body_string(format!("{error}. Allowed methods: {allowed}"))
            }
            _ => HttpResponse::new(StatusCode::InternalServerError)
                .with_body_string(format!("Internal server error: {error}")),
        };
        response.with_content_type("text/plain")
    }

    /// Handle a single connection.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        router: &Router,
        dispatcher: &Dispatcher,
        read_buffer_size: usize,
        scheme: &str,
    ) -> Result<(), Error> {
        let mut buf = vec![0; read_buffer_size];

        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(()); // Connection closed
        }

        let result = parse_request(&buf[..n], scheme)
            .map_err(Error::from)
            .and_then(|request| Self::respond(router, dispatcher, &request));

        match result {
            Ok(response) => {
                socket.write_all(&response.to_bytes()).await?;
                Ok(())
            }
            Err(e) => {
                socket.write_all(&Self::error_response(&e).to_bytes()).await?;
                Err(e)
            }
        }
    }
}
