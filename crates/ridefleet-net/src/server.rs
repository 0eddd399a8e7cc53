//! Minimal hand-rolled HTTP/1.1 server, generalized from a GET-only
//! observability sidecar to GET/POST/DELETE with JSON bodies, running over
//! `tokio::net::TcpListener` instead of a single-threaded `mio` loop so the
//! coordinator and participants can serve many concurrent requests, each
//! doing independent blocking I/O of their own, without head-of-line
//! blocking each other.

use crate::message::{reason_phrase, HttpRequest, HttpResponse, Method};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

const MAX_HEADER_BYTES: usize = 8 * 1024;
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Implemented by whatever wants to answer requests accepted by
/// [`HttpServer`]. Each accepted connection is handled on its own task.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn handle(&self, request: HttpRequest) -> HttpResponse;
}

/// A bound HTTP/1.1 listener that dispatches every request to a
/// [`RequestHandler`] and serves it on its own task. Connections are never
/// kept alive (`Connection: close` on every response).
pub struct HttpServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl HttpServer {
    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        tracing::info!("HTTP server listening on {addr}");
        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Runs the accept loop forever, spawning one task per connection.
    pub async fn serve(self, handler: Arc<dyn RequestHandler>) -> std::io::Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, handler).await {
                    debug!("connection from {peer} ended: {e}");
                }
            });
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    handler: Arc<dyn RequestHandler>,
) -> std::io::Result<()> {
    let request = match read_request(&mut stream).await? {
        Some(req) => req,
        None => return Ok(()),
    };

    let response = handler.handle(request).await;
    let bytes = encode_response(&response);
    stream.write_all(&bytes).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Reads one HTTP/1.1 request off `stream`. Returns `Ok(None)` if the peer
/// closed the connection before sending a full request line.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<HttpRequest>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        if buf.len() > MAX_HEADER_BYTES {
            warn!("request headers exceeded {MAX_HEADER_BYTES} bytes, rejecting");
            return Ok(None);
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let header_text = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = header_text.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = match parts.next().and_then(Method::parse) {
        Some(m) => m,
        None => return Ok(None),
    };
    let path = parts.next().unwrap_or("/").to_string();

    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    content_length = content_length.min(MAX_BODY_BYTES);

    let body_start = header_end + 4;
    let mut body = buf[body_start..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(Some(HttpRequest { method, path, body }))
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn encode_response(response: &HttpResponse) -> Vec<u8> {
    let mut out = Vec::with_capacity(response.body.len() + 128);
    out.extend_from_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            response.status,
            reason_phrase(response.status)
        )
        .as_bytes(),
    );
    out.extend_from_slice(format!("Content-Type: {}\r\n", response.content_type).as_bytes());
    out.extend_from_slice(format!("Content-Length: {}\r\n", response.body.len()).as_bytes());
    out.extend_from_slice(b"Connection: close\r\n\r\n");
    out.extend_from_slice(&response.body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_known_verbs() {
        assert_eq!(Method::parse("GET"), Some(Method::Get));
        assert_eq!(Method::parse("POST"), Some(Method::Post));
        assert_eq!(Method::parse("PATCH"), None);
    }

    #[test]
    fn header_end_detection() {
        assert_eq!(find_header_end(b"GET / HTTP/1.1\r\n\r\n"), Some(14));
        assert_eq!(find_header_end(b"GET / HTTP/1.1\r\n"), None);
    }

    #[test]
    fn encode_response_includes_headers() {
        let resp = HttpResponse::text(200, "hi");
        let bytes = encode_response(&resp);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 2\r\n"));
        assert!(text.ends_with("hi"));
    }
}
