//! The parsed message head (request or response) plus its headers, and
//! the framing predicates derived from them.

use crate::head::{RequestHead, ResponseHead};
use crate::headers::Headers;

/// Either side of an HTTP/1.x message's first line.
#[derive(Debug, Clone)]
pub enum Head {
    Request(RequestHead),
    Response(ResponseHead),
}

impl Head {
    pub fn as_request(&self) -> Option<&RequestHead> {
        match self {
            Self::Request(h) => Some(h),
            Self::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&ResponseHead> {
        match self {
            Self::Response(h) => Some(h),
            Self::Request(_) => None,
        }
    }
}

/// A parsed head plus its header block. `content_size`/`is_chunked`/
/// `body_exists` are the framing predicates the acceptor consults to
/// decide how (or whether) to read a body.
#[derive(Debug, Clone)]
pub struct Message {
    pub head: Head,
    pub headers: Headers,
}

impl Message {
    pub fn new(head: Head, headers: Headers) -> Self {
        Self { head, headers }
    }

    /// `Some(n)` iff a `Content-Length` header is present and parses as
    /// a non-negative integer; `None` otherwise (never an error).
    pub fn content_size(&self, buf: &[u8]) -> Option<u64> {
        let value = self.headers.find(buf, b"content-length")?;
        std::str::from_utf8(value.bytes(buf))
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
    }

    /// `true` iff `Transfer-Encoding` lists the `chunked` token.
    pub fn is_chunked(&self, buf: &[u8]) -> bool {
        let Some(value) = self.headers.find(buf, b"transfer-encoding") else {
            return false;
        };
        let value = String::from_utf8_lossy(value.bytes(buf));
        value
            .split(',')
            .any(|token| token.trim().eq_ignore_ascii_case("chunked"))
    }

    /// `true` iff the message framing implies a body is present.
    pub fn body_exists(&self, buf: &[u8]) -> bool {
        self.content_size(buf).is_some() || self.is_chunked(buf)
    }
}
