//! Minimal HTTP/1.1 framing: read a start-line + headers + body off a
//! socket, and write the same framing back out.
//!
//! The original leans on `boost::beast::http::async_read`/`async_write`
//! for this; the pack carries no raw socket-level HTTP parser crate
//! (only higher-level client stacks like `reqwest`), so this is a direct
//! translation of beast's framing rules — start line, headers up to a
//! blank line, then `Content-Length` or chunked transfer-encoding for the
//! body — into hand-rolled `tokio::io` calls, matching the original's
//! behavior rather than its syntax.

use crate::models::error::LbError;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// One HTTP/1.1 message: a request or a response, framing-wise identical.
#[derive(Debug, Clone)]
pub struct HttpMessage {
    pub start_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn content_length(&self) -> Option<usize> {
        self.header("content-length").and_then(|v| v.trim().parse().ok())
    }

    fn is_chunked(&self) -> bool {
        self.header("transfer-encoding")
            .map(|v| v.to_ascii_lowercase().contains("chunked"))
            .unwrap_or(false)
    }
}

/// Reads one full HTTP/1.1 message (start line, headers, body) from
/// `reader`. `Err(LbError::Io(UnexpectedEof))` on a clean close before any
/// bytes arrive is the normal "client hung up" path for the next-request
/// read in the session loop.
pub async fn read_message<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<HttpMessage, LbError> {
    let start_line = read_line(reader).await?;
    if start_line.is_empty() {
        return Err(LbError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed before a request line arrived",
        )));
    }

    let mut headers = Vec::new();
    loop {
        let line = read_line(reader).await?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| LbError::Connect(format!("malformed header line: {line}")))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let mut message = HttpMessage {
        start_line,
        headers,
        body: Vec::new(),
    };

    if message.is_chunked() {
        message.body = read_chunked_body(reader).await?;
    } else if let Some(len) = message.content_length() {
        let mut body = vec![0u8; len];
        tokio::io::AsyncReadExt::read_exact(reader, &mut body).await?;
        message.body = body;
    }

    Ok(message)
}

async fn read_line<R: AsyncRead + Unpin>(reader: &mut BufReader<R>) -> Result<String, LbError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(String::new());
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

async fn read_chunked_body<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<Vec<u8>, LbError> {
    let mut body = Vec::new();
    loop {
        let size_line = read_line(reader).await?;
        let size_str = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_str, 16)
            .map_err(|_| LbError::Connect(format!("malformed chunk size: {size_line}")))?;
        if size == 0 {
            // Trailing CRLF after the terminal zero-length chunk, and any
            // (ignored) trailer headers up to the final blank line.
            loop {
                let trailer = read_line(reader).await?;
                if trailer.is_empty() {
                    break;
                }
            }
            break;
        }
        let mut chunk = vec![0u8; size];
        tokio::io::AsyncReadExt::read_exact(reader, &mut chunk).await?;
        body.extend_from_slice(&chunk);
        let _crlf = read_line(reader).await?;
    }
    Ok(body)
}

/// Writes `message` back out in standard HTTP/1.1 framing.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &HttpMessage,
) -> Result<(), LbError> {
    let mut buf = Vec::with_capacity(message.body.len() + 256);
    buf.extend_from_slice(message.start_line.as_bytes());
    buf.extend_from_slice(b"\r\n");
    for (name, value) in &message.headers {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(&message.body);
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}
