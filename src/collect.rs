//! One-shot convenience layer built on the streaming core: a bundled
//! [`Traits`] implementation that snapshots callback-delivered views
//! into an owned [`HttpMessage`], for callers who don't want to
//! implement `Traits` themselves.

use crate::acceptor::{Acceptor, AcceptorConfig, BodyContext, HeadContext, State, Traits};
use crate::buffer::Data;
use crate::error::ParseError;
use crate::headers::Headers;
use crate::message::{Head, Message};
use crate::types::{Header, HttpMessage, HttpMethod, HttpRequest, HttpResponse, HttpVersion};

#[derive(Default)]
struct Collector {
    result: Option<HttpMessage>,
    body_acc: Vec<u8>,
    chunked: bool,
}

impl Traits for Collector {
    fn create_data_container(&mut self) -> Data {
        Vec::new()
    }

    fn create_headers_container(&mut self) -> Headers {
        Headers::new()
    }

    fn on_head(&mut self, ctx: HeadContext<'_>) {
        self.chunked = ctx.message.is_chunked(ctx.head_buf);
    }

    fn on_request(&mut self, ctx: BodyContext<'_>) {
        let bytes = ctx.body.bytes(ctx.body_buf);
        if self.chunked {
            self.body_acc.extend_from_slice(bytes);
        } else {
            self.body_acc = bytes.to_vec();
        }
        self.result = Some(build_message(ctx.message, ctx.head_buf, self.body_acc.clone()));
    }
}

fn build_message(message: &Message, head_buf: &[u8], body: Vec<u8>) -> HttpMessage {
    let headers: Vec<Header> = message
        .headers
        .iter()
        .map(|h| Header {
            name: String::from_utf8_lossy(h.name.bytes(head_buf)).into_owned(),
            value: String::from_utf8_lossy(h.value.bytes(head_buf)).into_owned(),
        })
        .collect();
    let body = message.body_exists(head_buf).then_some(body);

    match &message.head {
        Head::Request(head) => HttpMessage::Request(HttpRequest {
            method: HttpMethod::from_bytes(head.method.bytes(head_buf)),
            uri: String::from_utf8_lossy(head.url.bytes(head_buf)).into_owned(),
            version: HttpVersion::from_parts(head.http_major, head.http_minor),
            headers,
            body,
        }),
        Head::Response(head) => HttpMessage::Response(HttpResponse {
            version: HttpVersion::from_parts(head.http_major, head.http_minor),
            status_code: head.code,
            reason: String::from_utf8_lossy(head.reason.bytes(head_buf)).into_owned(),
            headers,
            body,
        }),
    }
}

/// Parse a complete HTTP request or response from a byte slice in one
/// call, using default size limits.
///
/// # Errors
///
/// Returns [`ParseError::Incomplete`] if `data` does not contain a full
/// message, or the core's own error if `data` is malformed.
pub fn parse_message(data: &[u8]) -> Result<HttpMessage, ParseError> {
    parse_message_with_config(data, AcceptorConfig::default())
}

/// Like [`parse_message`], with caller-supplied size limits.
pub fn parse_message_with_config(
    data: &[u8],
    config: AcceptorConfig,
) -> Result<HttpMessage, ParseError> {
    let mut acceptor = Acceptor::new(Collector::default(), config);
    acceptor.feed(data)?;
    if acceptor.state() != State::Finish {
        return Err(ParseError::Incomplete);
    }
    acceptor
        .traits_mut()
        .result
        .take()
        .ok_or(ParseError::Incomplete)
}

/// Parse a complete HTTP request, rejecting a well-formed response.
pub fn parse_request(data: &[u8]) -> Result<HttpRequest, ParseError> {
    parse_request_with_config(data, AcceptorConfig::default())
}

/// Like [`parse_request`], with caller-supplied size limits.
pub fn parse_request_with_config(
    data: &[u8],
    config: AcceptorConfig,
) -> Result<HttpRequest, ParseError> {
    match parse_message_with_config(data, config)? {
        HttpMessage::Request(request) => Ok(request),
        HttpMessage::Response(_) => Err(ParseError::MalformedHead(
            "expected a request, found a response".into(),
        )),
    }
}

/// Parse a complete HTTP response, rejecting a well-formed request.
pub fn parse_response(data: &[u8]) -> Result<HttpResponse, ParseError> {
    parse_response_with_config(data, AcceptorConfig::default())
}

/// Like [`parse_response`], with caller-supplied size limits.
pub fn parse_response_with_config(
    data: &[u8],
    config: AcceptorConfig,
) -> Result<HttpResponse, ParseError> {
    match parse_message_with_config(data, config)? {
        HttpMessage::Response(response) => Ok(response),
        HttpMessage::Request(_) => Err(ParseError::MalformedHead(
            "expected a response, found a request".into(),
        )),
    }
}
