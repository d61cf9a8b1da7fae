//! The streaming state machine that composes the head, headers, and
//! chunked-body parsers into a single push-driven acceptor.

use crate::buffer::{Data, View};
use crate::chunked::ChunkedBodyParser;
use crate::error::ParseError;
use crate::head::{parse_head, HeadOutcome};
use crate::headers::{Headers, HeadersParser};
use crate::message::{Head, Message};

/// Size ceilings enforced by the acceptor.
#[derive(Debug, Clone)]
pub struct AcceptorConfig {
    /// Combined byte ceiling for the request/status line plus headers.
    pub max_head_size: usize,
    /// Byte ceiling for body-buffer occupancy at any instant.
    pub max_body_size: usize,
    /// Ceiling on the number of distinct header fields.
    pub max_headers_count: usize,
}

impl Default for AcceptorConfig {
    fn default() -> Self {
        Self {
            max_head_size: 1024,
            max_body_size: 4096,
            max_headers_count: 128,
        }
    }
}

/// Acceptor lifecycle state. Transitions are monotonic within one
/// message; `Body` is skipped entirely when the message has no body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Wait,
    Head,
    Headers,
    Body,
    Finish,
}

/// Bundle passed to [`Traits::on_head`]: the parsed head and header
/// block, plus the buffer its views resolve against.
pub struct HeadContext<'a> {
    pub message: &'a Message,
    pub head_buf: &'a [u8],
}

/// Bundle passed to [`Traits::on_request`]: the message, both buffers,
/// and the body fragment (or diagnostic view) for this event.
pub struct BodyContext<'a> {
    pub message: &'a Message,
    pub head_buf: &'a [u8],
    pub body_buf: &'a [u8],
    pub body: View,
}

/// The external-collaborator interface: container factories plus event
/// callbacks. Container factories have no default — the acceptor cannot
/// proceed without them; the callbacks default to no-ops so a caller
/// only interested in, say, heads can skip implementing `on_request`.
pub trait Traits {
    fn create_data_container(&mut self) -> Data;
    fn create_headers_container(&mut self) -> Headers;

    fn on_head(&mut self, _ctx: HeadContext<'_>) {}
    fn on_request(&mut self, _ctx: BodyContext<'_>) {}
}

/// A streaming HTTP/1.x request/response acceptor.
///
/// Bytes are pushed in via [`Acceptor::feed`]; the acceptor parses as
/// far as the currently available bytes allow and invokes callbacks on
/// its `Traits` at each well-defined transition. A single instance
/// parses exactly one message; call [`Acceptor::reset`] to reuse it for
/// the next one.
pub struct Acceptor<T: Traits> {
    traits: T,
    config: AcceptorConfig,
    state: State,
    data: Data,
    body_data: Data,
    headers_parser: HeadersParser,
    chunk_parser: Option<ChunkedBodyParser>,
    message: Option<Message>,
    body_view: View,
}

impl<T: Traits> Acceptor<T> {
    pub fn new(mut traits: T, config: AcceptorConfig) -> Self {
        let data = traits.create_data_container();
        let body_data = traits.create_data_container();
        let headers_parser = HeadersParser::new(config.max_headers_count);
        Self {
            traits,
            config,
            state: State::Wait,
            data,
            body_data,
            headers_parser,
            chunk_parser: None,
            message: None,
            body_view: View::empty(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn traits(&self) -> &T {
        &self.traits
    }

    pub fn traits_mut(&mut self) -> &mut T {
        &mut self.traits
    }

    /// Reset to `Wait` with fresh buffers, ready to parse a new message.
    pub fn reset(&mut self) {
        self.data = self.traits.create_data_container();
        self.body_data = self.traits.create_data_container();
        self.headers_parser = HeadersParser::new(self.config.max_headers_count);
        self.chunk_parser = None;
        self.message = None;
        self.body_view = View::empty();
        self.state = State::Wait;
    }

    /// Feed the next chunk of bytes from the transport.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        if bytes.is_empty() {
            return Ok(());
        }
        if self.state == State::Finish {
            return Err(ParseError::UnexpectedState);
        }
        if !self.data.is_empty() {
            self.require_limits(bytes.len())?;
        }
        if self.state == State::Body {
            self.body_data.extend_from_slice(bytes);
        } else {
            self.data.extend_from_slice(bytes);
        }

        if self.state == State::Wait {
            self.parse_head()?;
        }
        if self.state == State::Head {
            self.parse_headers()?;
        }
        if self.state == State::Headers {
            self.headers_ready();
        }
        if self.state == State::Body {
            self.parse_body()?;
        }
        Ok(())
    }

    fn require_limits(&self, incoming: usize) -> Result<(), ParseError> {
        if self.state == State::Body {
            if self.config.max_body_size < self.body_data.len() + incoming {
                return Err(ParseError::CapacityExceeded("max_body_size"));
            }
        } else if self.config.max_head_size < self.data.len() + incoming {
            return Err(ParseError::CapacityExceeded("max_head_size"));
        }
        Ok(())
    }

    fn parse_head(&mut self) -> Result<(), ParseError> {
        match parse_head(&self.data) {
            HeadOutcome::Wait => Ok(()),
            HeadOutcome::Error(e) => Err(e),
            HeadOutcome::Request(head, end) => {
                self.message = Some(Message::new(Head::Request(head), Headers::new()));
                self.headers_parser.skip_first_bytes(end);
                self.state = State::Head;
                Ok(())
            }
            HeadOutcome::Response(head, end) => {
                self.message = Some(Message::new(Head::Response(head), Headers::new()));
                self.headers_parser.skip_first_bytes(end);
                self.state = State::Head;
                Ok(())
            }
        }
    }

    fn parse_headers(&mut self) -> Result<(), ParseError> {
        let Self {
            headers_parser,
            data,
            message,
            ..
        } = self;
        let message = message.as_mut().expect("head parsed before headers");
        headers_parser.feed(data.as_slice(), &mut message.headers)?;
        if headers_parser.is_finished() {
            self.state = State::Headers;
        }
        Ok(())
    }

    fn headers_ready(&mut self) {
        let finish_pos = self.headers_parser.finish_position();
        let tail = self.data[finish_pos..].to_vec();
        self.body_data.extend_from_slice(&tail);
        self.body_view.advance_to_end(&self.body_data);

        let Self {
            traits,
            message,
            data,
            body_data,
            body_view,
            chunk_parser,
            state,
            ..
        } = self;
        let msg_ref = message.as_ref().expect("headers require a parsed head");
        let body_exists = msg_ref.body_exists(data.as_slice());

        if body_exists {
            if msg_ref.is_chunked(data.as_slice()) {
                *chunk_parser = Some(ChunkedBodyParser::new());
            }
            traits.on_head(HeadContext {
                message: msg_ref,
                head_buf: data.as_slice(),
            });
            *state = State::Body;
        } else {
            traits.on_request(BodyContext {
                message: msg_ref,
                head_buf: data.as_slice(),
                body_buf: body_data.as_slice(),
                body: *body_view,
            });
            *state = State::Finish;
        }
    }

    fn parse_body(&mut self) -> Result<(), ParseError> {
        self.body_view.advance_to_end(&self.body_data);

        let content_size = {
            let message = self.message.as_ref().expect("body requires a parsed head");
            message.content_size(&self.data)
        };
        if let Some(size) = content_size {
            let size = size as usize;
            if self.body_view.len() >= size {
                self.body_view.resize(size);
                let Self {
                    traits,
                    message,
                    data,
                    body_data,
                    body_view,
                    state,
                    ..
                } = self;
                traits.on_request(BodyContext {
                    message: message.as_ref().unwrap(),
                    head_buf: data.as_slice(),
                    body_buf: body_data.as_slice(),
                    body: *body_view,
                });
                *state = State::Finish;
            }
            return Ok(());
        }

        let is_chunked = {
            let message = self.message.as_ref().expect("body requires a parsed head");
            message.is_chunked(&self.data)
        };
        if is_chunked {
            self.drive_chunked()?;
        }
        Ok(())
    }

    fn drive_chunked(&mut self) -> Result<(), ParseError> {
        let mut parser = self.chunk_parser.take().unwrap_or_default();
        let mut saw_error = false;

        while parser.feed(&self.body_data) {
            let Self {
                traits,
                message,
                data,
                body_data,
                ..
            } = self;
            let message = message.as_ref().unwrap();
            if parser.ready() {
                traits.on_request(BodyContext {
                    message,
                    head_buf: data.as_slice(),
                    body_buf: body_data.as_slice(),
                    body: parser.result(),
                });
            } else if parser.error() {
                // The chunk parser has no usable body fragment to report; resolve
                // the diagnostic view against the head buffer (which it indexes
                // into) rather than the body buffer, which may be shorter.
                traits.on_request(BodyContext {
                    message,
                    head_buf: data.as_slice(),
                    body_buf: data.as_slice(),
                    body: View::new(0, data.len()),
                });
                saw_error = true;
            }
        }

        let end_pos = parser.end_pos();
        let finished = parser.finish();
        parser.rebase(end_pos);
        self.chunk_parser = Some(parser);
        self.compact_body(end_pos);

        if finished {
            self.state = State::Finish;
        }
        if saw_error {
            return Err(ParseError::MalformedChunk(
                "invalid chunk size or framing".into(),
            ));
        }
        Ok(())
    }

    fn compact_body(&mut self, consumed: usize) {
        let remainder = self.body_data[consumed..].to_vec();
        self.body_data = self.traits.create_data_container();
        self.body_data.extend_from_slice(&remainder);
        self.body_view.reset(&self.body_data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        heads: usize,
        body_chunks: Vec<Vec<u8>>,
    }

    impl Traits for Recorder {
        fn create_data_container(&mut self) -> Data {
            Vec::new()
        }
        fn create_headers_container(&mut self) -> Headers {
            Headers::new()
        }
        fn on_head(&mut self, _ctx: HeadContext<'_>) {
            self.heads += 1;
        }
        fn on_request(&mut self, ctx: BodyContext<'_>) {
            self.body_chunks.push(ctx.body.bytes(ctx.body_buf).to_vec());
        }
    }

    #[test]
    fn bodiless_get() {
        let mut acceptor = Acceptor::new(Recorder::default(), AcceptorConfig::default());
        acceptor
            .feed(b"GET /p HTTP/1.1\r\nHost: x\r\n\r\n")
            .unwrap();
        assert_eq!(acceptor.state(), State::Finish);
        assert_eq!(acceptor.traits().body_chunks, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn content_length_body_in_one_feed() {
        let mut acceptor = Acceptor::new(Recorder::default(), AcceptorConfig::default());
        acceptor
            .feed(b"POST /u HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello")
            .unwrap();
        assert_eq!(acceptor.state(), State::Finish);
        assert_eq!(acceptor.traits().heads, 1);
        assert_eq!(acceptor.traits().body_chunks, vec![b"hello".to_vec()]);
    }

    #[test]
    fn chunked_body_across_two_feeds() {
        let mut acceptor = Acceptor::new(Recorder::default(), AcceptorConfig::default());
        acceptor
            .feed(b"POST /c HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n")
            .unwrap();
        assert_eq!(acceptor.state(), State::Body);
        acceptor.feed(b"0\r\n\r\n").unwrap();
        assert_eq!(acceptor.state(), State::Finish);
        assert_eq!(acceptor.traits().body_chunks, vec![b"hello".to_vec()]);
    }

    #[test]
    fn split_at_every_byte_matches_one_shot() {
        let full = b"GET /p HTTP/1.1\r\nHost: x\r\n\r\n";
        let mut acceptor = Acceptor::new(Recorder::default(), AcceptorConfig::default());
        for &b in full {
            acceptor.feed(&[b]).unwrap();
        }
        assert_eq!(acceptor.state(), State::Finish);
        assert_eq!(acceptor.traits().body_chunks, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn oversize_head_raises_capacity_exceeded() {
        let config = AcceptorConfig {
            max_head_size: 32,
            ..AcceptorConfig::default()
        };
        let mut acceptor = Acceptor::new(Recorder::default(), config);
        // The very first feed is exempt from the size check (the head buffer
        // is still empty), matching the source acceptor's `if(!data.empty())`
        // gate; feed a small first chunk so the second feed is checked.
        acceptor.feed(b"GET ").unwrap();
        let long_path = "x".repeat(64);
        let rest = format!("/{long_path} HTTP/1.1\r\n\r\n");
        let err = acceptor.feed(rest.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::CapacityExceeded(_)));
    }

    #[test]
    fn malformed_chunk_size_raises_error_after_callback() {
        let mut acceptor = Acceptor::new(Recorder::default(), AcceptorConfig::default());
        acceptor
            .feed(b"POST /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n")
            .unwrap();
        let result = acceptor.feed(b"ZZ\r\n");
        assert!(matches!(result, Err(ParseError::MalformedChunk(_))));
    }

    #[test]
    fn response_parsing() {
        let mut acceptor = Acceptor::new(Recorder::default(), AcceptorConfig::default());
        acceptor
            .feed(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi")
            .unwrap();
        assert_eq!(acceptor.state(), State::Finish);
        assert_eq!(acceptor.traits().body_chunks, vec![b"hi".to_vec()]);
    }

    #[test]
    fn feed_empty_is_noop() {
        let mut acceptor = Acceptor::new(Recorder::default(), AcceptorConfig::default());
        acceptor.feed(b"GET / HTTP/1.1\r\n").unwrap();
        acceptor.feed(b"").unwrap();
        assert_eq!(acceptor.state(), State::Wait);
    }
}
