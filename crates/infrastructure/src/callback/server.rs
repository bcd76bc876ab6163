//! One-shot localhost listener for the authorization-code redirect.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use forcepull_application::auth::{CallbackPage, CallbackParams};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;
use url::Url;

const MAX_REQUEST_HEAD: usize = 8192;

/// How long one connection may take to send its request head.
const HEAD_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors raised by the callback listener.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The redirect URL has no host to bind.
    #[error("redirect URL cannot be served locally: {0}")]
    InvalidRedirect(String),

    /// The listening socket could not be opened.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// No completed callback arrived in time.
    #[error("no authorization callback within {0:?}")]
    Timeout(Duration),

    /// Socket error while accepting.
    #[error("callback listener I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Listens on the redirect URL's host and port for the provider redirect.
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
    timeout: Duration,
}

impl CallbackListener {
    /// Binds the host and port of `redirect_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no host or the port is taken.
    pub async fn bind(redirect_url: &Url, timeout: Duration) -> Result<Self, CallbackError> {
        let host = redirect_url
            .host_str()
            .ok_or_else(|| CallbackError::InvalidRedirect(redirect_url.to_string()))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let port = redirect_url
            .port_or_known_default()
            .ok_or_else(|| CallbackError::InvalidRedirect(redirect_url.to_string()))?;

        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|source| CallbackError::Bind {
                addr: format!("{host}:{port}"),
                source,
            })?;

        Ok(Self {
            listener,
            path: redirect_url.path().to_string(),
            timeout,
        })
    }

    /// The bound address.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, CallbackError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves requests until one on the redirect path finishes the login.
    ///
    /// Requests for other paths get a 404 and the listener keeps waiting.
    /// A callback without a code is answered and also keeps it waiting.
    /// A connection that sends no request head in time is dropped; the
    /// overall timeout still bounds the whole wait.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` if nothing finishes the login in time.
    pub async fn serve_once<H, Fut>(&self, mut handler: H) -> Result<CallbackPage, CallbackError>
    where
        H: FnMut(CallbackParams) -> Fut,
        Fut: Future<Output = CallbackPage>,
    {
        let deadline = Instant::now() + self.timeout;
        tracing::info!(path = %self.path, timeout = ?self.timeout, "waiting for authorization callback");

        loop {
            let (mut socket, peer) = tokio::time::timeout_at(deadline, self.listener.accept())
                .await
                .map_err(|_| CallbackError::Timeout(self.timeout))??;

            let read_deadline = deadline.min(Instant::now() + HEAD_READ_TIMEOUT);
            let head = match tokio::time::timeout_at(read_deadline, read_request_head(&mut socket))
                .await
            {
                Ok(Some(head)) => head,
                Ok(None) => continue,
                Err(_) => {
                    tracing::debug!(%peer, "dropping connection that sent no request");
                    continue;
                }
            };
            let Some((method, target)) = parse_request_line(&head) else {
                respond(&mut socket, 400, "").await;
                continue;
            };
            let (path, query) = target.split_once('?').unwrap_or((target, ""));

            if path != self.path {
                tracing::debug!(%peer, %path, "ignoring request outside the callback path");
                respond(&mut socket, 404, "").await;
                continue;
            }
            if method != "GET" {
                respond(&mut socket, 405, "").await;
                continue;
            }

            let page = handler(CallbackParams::from_query(query)).await;
            respond(&mut socket, page.status(), &page.html()).await;
            if page.is_finished() {
                return Ok(page);
            }
        }
    }
}

async fn read_request_head(socket: &mut TcpStream) -> Option<String> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() >= MAX_REQUEST_HEAD {
            break;
        }
    }
    if buffer.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(&buffer).into_owned())
}

fn parse_request_line(head: &str) -> Option<(&str, &str)> {
    let mut parts = head.lines().next()?.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    Some((method, target))
}

async fn respond(socket: &mut TcpStream, status: u16, body: &str) {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Bad Gateway",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    if let Err(e) = socket.write_all(response.as_bytes()).await {
        tracing::debug!(error = %e, "failed to answer callback request");
    }
    let _ = socket.shutdown().await;
}
