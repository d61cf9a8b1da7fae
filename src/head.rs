//! Request-line / status-line parsing.
//!
//! The head parser is stateless across calls: each invocation re-scans
//! the head buffer from the start looking for the first `CRLF`. The
//! head buffer is bounded by `max_head_size`, so this is cheap in
//! practice and keeps the parser free of partial-line bookkeeping.

use crate::buffer::View;
use crate::error::ParseError;
use crate::grammar::{find_crlf, is_tchar};

/// A parsed request-line: method, request-target, and HTTP version.
#[derive(Debug, Clone, Default)]
pub struct RequestHead {
    pub method: View,
    pub url: View,
    pub http_major: u16,
    pub http_minor: u16,
}

/// A parsed status-line: HTTP version, status code, and reason phrase.
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    pub http_major: u16,
    pub http_minor: u16,
    pub code: u16,
    pub reason: View,
}

/// Result of attempting to parse the head of the buffer so far.
pub enum HeadOutcome {
    /// Not enough bytes yet to locate the end of the request/status line.
    Wait,
    /// A request-line was parsed; `end` is the offset one past its `LF`.
    Request(RequestHead, usize),
    /// A status-line was parsed; `end` is the offset one past its `LF`.
    Response(ResponseHead, usize),
    /// The leading bytes are neither a valid request-line nor status-line.
    Error(ParseError),
}

const HTTP_PREFIX: &[u8] = b"HTTP/";

/// Attempt to parse a request-line or status-line from the start of `buf`.
pub fn parse_head(buf: &[u8]) -> HeadOutcome {
    let Some(crlf) = find_crlf(buf) else {
        return HeadOutcome::Wait;
    };
    let line = &buf[..crlf];
    let end = crlf + 2;

    if line.starts_with(HTTP_PREFIX) {
        match parse_status_line(line) {
            Ok((http_major, http_minor, code, reason_start, reason_len)) => {
                HeadOutcome::Response(
                    ResponseHead {
                        http_major,
                        http_minor,
                        code,
                        reason: View::new(reason_start, reason_len),
                    },
                    end,
                )
            }
            Err(e) => HeadOutcome::Error(e),
        }
    } else {
        match parse_request_line(line) {
            Ok((method_start, method_len, url_start, url_len, http_major, http_minor)) => {
                HeadOutcome::Request(
                    RequestHead {
                        method: View::new(method_start, method_len),
                        url: View::new(url_start, url_len),
                        http_major,
                        http_minor,
                    },
                    end,
                )
            }
            Err(e) => HeadOutcome::Error(e),
        }
    }
}

type RequestLineParts = (usize, usize, usize, usize, u16, u16);

fn parse_request_line(line: &[u8]) -> Result<RequestLineParts, ParseError> {
    let method_end = line
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| ParseError::MalformedHead("missing request-target".into()))?;
    if method_end == 0 || !line[..method_end].iter().all(|&b| is_tchar(b)) {
        return Err(ParseError::MalformedHead("invalid method token".into()));
    }

    let rest = &line[method_end + 1..];
    let target_end = rest
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| ParseError::MalformedHead("missing HTTP version".into()))?;
    if target_end == 0 {
        return Err(ParseError::MalformedHead("empty request-target".into()));
    }
    let url_start = method_end + 1;

    let version = &rest[target_end + 1..];
    let (http_major, http_minor) = parse_version(version)?;

    Ok((0, method_end, url_start, target_end, http_major, http_minor))
}

fn parse_version(version: &[u8]) -> Result<(u16, u16), ParseError> {
    if version.len() != 8
        || !version.starts_with(HTTP_PREFIX)
        || !version[5].is_ascii_digit()
        || version[6] != b'.'
        || !version[7].is_ascii_digit()
    {
        return Err(ParseError::MalformedHead(
            "invalid HTTP version".to_string(),
        ));
    }
    let major = u16::from(version[5] - b'0');
    let minor = u16::from(version[7] - b'0');
    Ok((major, minor))
}

type StatusLineParts = (u16, u16, u16, usize, usize);

fn parse_status_line(line: &[u8]) -> Result<StatusLineParts, ParseError> {
    if line.len() < 12
        || !line[5].is_ascii_digit()
        || line[6] != b'.'
        || !line[7].is_ascii_digit()
        || line[8] != b' '
    {
        return Err(ParseError::MalformedHead(
            "invalid HTTP version".to_string(),
        ));
    }
    let major = u16::from(line[5] - b'0');
    let minor = u16::from(line[7] - b'0');

    let code_bytes = &line[9..12];
    if !code_bytes.iter().all(u8::is_ascii_digit) {
        return Err(ParseError::MalformedHead("invalid status code".into()));
    }
    let code = code_bytes
        .iter()
        .fold(0u16, |acc, &b| acc * 10 + u16::from(b - b'0'));

    let (reason_start, reason_len) = if line.len() == 12 {
        (12, 0)
    } else {
        if line[12] != b' ' {
            return Err(ParseError::MalformedHead(
                "missing space before reason phrase".into(),
            ));
        }
        (13, line.len() - 13)
    };

    Ok((major, minor, code, reason_start, reason_len))
}
