use crate::message::Method;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed HTTP response: {0}")]
    InvalidResponse(String),
}

/// A plain HTTP/1.1 response: status code and raw body.
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends one request and reads the full response, bounded by `timeout`.
/// Every call opens and closes its own connection (no keep-alive), matching
/// the server side's `Connection: close` behavior.
pub async fn send(
    addr: SocketAddr,
    method: Method,
    path: &str,
    body: Option<&[u8]>,
    timeout: Duration,
) -> Result<RawResponse, NetError> {
    tokio::time::timeout(timeout, send_inner(addr, method, path, body))
        .await
        .map_err(|_| NetError::Timeout(timeout))?
}

async fn send_inner(
    addr: SocketAddr,
    method: Method,
    path: &str,
    body: Option<&[u8]>,
) -> Result<RawResponse, NetError> {
    let mut stream = TcpStream::connect(addr).await?;

    let body = body.unwrap_or(&[]);
    let mut request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        method.as_str(),
        path,
        addr,
        body.len(),
    )
    .into_bytes();
    request.extend_from_slice(body);
    stream.write_all(&request).await?;
    stream.shutdown().await.ok();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;

    parse_response(&raw)
}

fn parse_response(raw: &[u8]) -> Result<RawResponse, NetError> {
    let header_end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .ok_or_else(|| NetError::InvalidResponse("missing header terminator".into()))?;

    let header_text = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let mut lines = header_text.split("\r\n");
    let status_line = lines
        .next()
        .ok_or_else(|| NetError::InvalidResponse("empty response".into()))?;

    let status: u16 = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| NetError::InvalidResponse(format!("bad status line: {status_line}")))?;

    let body = raw[header_end + 4..].to_vec();
    Ok(RawResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ok_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi";
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"hi");
    }

    #[test]
    fn rejects_missing_terminator() {
        let raw = b"HTTP/1.1 200 OK\r\n";
        assert!(parse_response(raw).is_err());
    }
}
