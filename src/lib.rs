//! # wireframe
//!
//! A **strict, streaming HTTP/1.x message acceptor** implemented as a
//! push-driven state machine, designed for embedding in both
//! synchronous and asynchronous servers and clients.
//!
//! The core never performs I/O: callers push bytes in via
//! [`Acceptor::feed`](acceptor::Acceptor::feed) as they arrive from the
//! transport, and the acceptor reports parsed heads and body fragments
//! through the [`Traits`](acceptor::Traits) callback interface,
//! tolerating arbitrary fragmentation of the input.
//!
//! ## Quick start — one-shot parsing
//!
//! ```rust
//! use wireframe::parse_request;
//!
//! let raw = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let request = parse_request(raw).expect("valid request");
//! assert_eq!(request.method.as_str(), "GET");
//! assert_eq!(request.uri, "/hello");
//! ```
//!
//! ## Quick start — incremental parsing
//!
//! ```rust
//! use wireframe::{Acceptor, AcceptorConfig, BodyContext, Data, Headers, HeadContext, Traits};
//!
//! #[derive(Default)]
//! struct PrintingTraits;
//!
//! impl Traits for PrintingTraits {
//!     fn create_data_container(&mut self) -> Data { Vec::new() }
//!     fn create_headers_container(&mut self) -> Headers { Headers::new() }
//!     fn on_head(&mut self, _ctx: HeadContext<'_>) {}
//!     fn on_request(&mut self, _ctx: BodyContext<'_>) {}
//! }
//!
//! let mut acceptor = Acceptor::new(PrintingTraits, AcceptorConfig::default());
//! acceptor.feed(b"GET / HTTP/1.1\r\n").unwrap();
//! acceptor.feed(b"Host: example.com\r\n\r\n").unwrap();
//! ```

mod acceptor;
mod buffer;
mod chunked;
mod collect;
mod error;
mod grammar;
mod head;
mod headers;
mod message;
mod output;
mod types;

pub use acceptor::{Acceptor, AcceptorConfig, BodyContext, HeadContext, State, Traits};
pub use buffer::{Data, View};
pub use collect::{
    parse_message, parse_message_with_config, parse_request, parse_request_with_config,
    parse_response, parse_response_with_config,
};
pub use error::ParseError;
pub use head::{RequestHead, ResponseHead};
pub use headers::{HeaderEntry, Headers};
pub use message::{Head, Message};
pub use output::{format_debug, format_headers_only, format_json};
pub use types::{Header, HttpMessage, HttpMethod, HttpRequest, HttpResponse, HttpVersion};
