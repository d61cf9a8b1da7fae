//! Chunked transfer-encoding body parsing (RFC 9112 §7.1).
//!
//! Operates on absolute offsets into the body buffer (the body view
//! always spans from offset 0, so positions here double as indices the
//! acceptor can hand straight to [`ChunkedBodyParser::end_pos`] for
//! buffer compaction).

use crate::buffer::View;
use crate::grammar::parse_hex_size;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    Size,
    Ext,
    SizeLf,
    Data,
    DataCr,
    DataLf,
    TrailerLineStart,
    TrailerSkip,
    TrailerLf,
    Done,
    Error,
}

/// Incremental parser for a chunked request/response body.
pub struct ChunkedBodyParser {
    pos: usize,
    state: ChunkState,
    /// Start offset of the token currently being scanned (chunk-size
    /// digits, extension text, or a trailer line), while that token is
    /// still incomplete. `pos` may run ahead of this during a scan, but
    /// nothing before `token_start` may be compacted away: a split feed
    /// boundary mid-token must be able to resume from it.
    token_start: Option<usize>,
    chunk_size: u64,
    data_start: usize,
    ready_view: Option<View>,
}

impl ChunkedBodyParser {
    pub fn new() -> Self {
        Self {
            pos: 0,
            state: ChunkState::Size,
            token_start: None,
            chunk_size: 0,
            data_start: 0,
            ready_view: None,
        }
    }

    /// Advance the state machine as far as `buf`'s available bytes
    /// allow. Returns `true` if a reportable event occurred (a chunk
    /// became ready, an error was hit, or the terminating chunk
    /// finished); `false` if more bytes are needed to make progress.
    pub fn feed(&mut self, buf: &[u8]) -> bool {
        self.ready_view = None;
        loop {
            match self.state {
                ChunkState::Error | ChunkState::Done => return false,
                ChunkState::Size => {
                    let start = *self.token_start.get_or_insert(self.pos);
                    while self.pos < buf.len() && buf[self.pos].is_ascii_hexdigit() {
                        self.pos += 1;
                    }
                    if self.pos >= buf.len() {
                        return false;
                    }
                    self.token_start = None;
                    match parse_hex_size(&buf[start..self.pos]) {
                        Some(size) => {
                            self.chunk_size = size;
                            self.state = ChunkState::Ext;
                        }
                        None => {
                            self.state = ChunkState::Error;
                            return true;
                        }
                    }
                }
                ChunkState::Ext => {
                    self.token_start.get_or_insert(self.pos);
                    while self.pos < buf.len() && buf[self.pos] != b'\r' {
                        if buf[self.pos] == b'\n' {
                            self.state = ChunkState::Error;
                            return true;
                        }
                        self.pos += 1;
                    }
                    if self.pos >= buf.len() {
                        return false;
                    }
                    self.token_start = None;
                    self.pos += 1;
                    self.state = ChunkState::SizeLf;
                }
                ChunkState::SizeLf => {
                    if self.pos >= buf.len() {
                        return false;
                    }
                    if buf[self.pos] != b'\n' {
                        self.state = ChunkState::Error;
                        return true;
                    }
                    self.pos += 1;
                    if self.chunk_size == 0 {
                        self.state = ChunkState::TrailerLineStart;
                    } else {
                        self.data_start = self.pos;
                        self.state = ChunkState::Data;
                    }
                }
                ChunkState::Data => {
                    let needed = self.data_start + self.chunk_size as usize;
                    if buf.len() < needed {
                        return false;
                    }
                    self.ready_view = Some(View::new(self.data_start, self.chunk_size as usize));
                    self.pos = needed;
                    self.state = ChunkState::DataCr;
                    return true;
                }
                ChunkState::DataCr => {
                    if self.pos >= buf.len() {
                        return false;
                    }
                    if buf[self.pos] != b'\r' {
                        self.state = ChunkState::Error;
                        return true;
                    }
                    self.pos += 1;
                    self.state = ChunkState::DataLf;
                }
                ChunkState::DataLf => {
                    if self.pos >= buf.len() {
                        return false;
                    }
                    if buf[self.pos] != b'\n' {
                        self.state = ChunkState::Error;
                        return true;
                    }
                    self.pos += 1;
                    self.state = ChunkState::Size;
                }
                ChunkState::TrailerLineStart => {
                    if self.pos + 2 <= buf.len() && &buf[self.pos..self.pos + 2] == b"\r\n" {
                        self.pos += 2;
                        self.state = ChunkState::Done;
                        return true;
                    }
                    if self.pos >= buf.len() {
                        return false;
                    }
                    self.state = ChunkState::TrailerSkip;
                }
                ChunkState::TrailerSkip => {
                    self.token_start.get_or_insert(self.pos);
                    while self.pos < buf.len() && buf[self.pos] != b'\r' {
                        self.pos += 1;
                    }
                    if self.pos >= buf.len() {
                        return false;
                    }
                    self.token_start = None;
                    self.pos += 1;
                    self.state = ChunkState::TrailerLf;
                }
                ChunkState::TrailerLf => {
                    if self.pos >= buf.len() {
                        return false;
                    }
                    if buf[self.pos] != b'\n' {
                        self.state = ChunkState::Error;
                        return true;
                    }
                    self.pos += 1;
                    self.state = ChunkState::TrailerLineStart;
                }
            }
        }
    }

    /// A completed chunk's data, available immediately after a `feed`
    /// call that returned `true` with [`ChunkedBodyParser::ready`] set.
    pub fn ready(&self) -> bool {
        self.ready_view.is_some()
    }

    pub fn result(&self) -> View {
        self.ready_view.expect("result() called without a ready chunk")
    }

    pub fn error(&self) -> bool {
        self.state == ChunkState::Error
    }

    pub fn finish(&self) -> bool {
        self.state == ChunkState::Done
    }

    /// Offset of the first unconsumed byte; used to compact the body
    /// buffer after each completed chunk. While a chunk-size, extension,
    /// or trailer-line token is only partially scanned, this is the
    /// token's start rather than the scan cursor, so a compaction can
    /// never drop bytes a resumed scan still needs.
    pub fn end_pos(&self) -> usize {
        self.token_start.unwrap_or(self.pos)
    }

    /// Shift all stored offsets back by `removed` bytes after the
    /// caller has dropped that many bytes from the front of the body
    /// buffer. `removed` must not exceed `end_pos()`.
    pub fn rebase(&mut self, removed: usize) {
        self.pos -= removed;
        self.data_start = self.data_start.saturating_sub(removed);
        if let Some(start) = self.token_start.as_mut() {
            *start -= removed;
        }
    }
}

impl Default for ChunkedBodyParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_chunk_and_terminator() {
        let buf = b"5\r\nhello\r\n0\r\n\r\n";
        let mut parser = ChunkedBodyParser::new();
        let mut collected = Vec::new();
        while parser.feed(buf) {
            if parser.ready() {
                collected.extend_from_slice(parser.result().bytes(buf));
            } else if parser.error() {
                panic!("unexpected chunk error");
            }
        }
        assert!(parser.finish());
        assert_eq!(collected, b"hello");
    }

    #[test]
    fn parses_multiple_chunks_fed_byte_by_byte() {
        let full = b"3\r\nabc\r\n2\r\nde\r\n0\r\n\r\n";
        let mut parser = ChunkedBodyParser::new();
        let mut collected = Vec::new();
        for n in 1..=full.len() {
            let slice = &full[..n];
            while parser.feed(slice) {
                if parser.ready() {
                    collected.extend_from_slice(parser.result().bytes(slice));
                }
            }
        }
        assert!(parser.finish());
        assert_eq!(collected, b"abcde");
    }

    #[test]
    fn rejects_non_hex_size() {
        let buf = b"ZZ\r\n";
        let mut parser = ChunkedBodyParser::new();
        while parser.feed(buf) {
            if parser.error() {
                return;
            }
        }
        panic!("expected chunk size error");
    }

    #[test]
    fn discards_trailers() {
        let buf = b"2\r\nhi\r\n0\r\nX-Trailer: ignored\r\n\r\n";
        let mut parser = ChunkedBodyParser::new();
        let mut collected = Vec::new();
        while parser.feed(buf) {
            if parser.ready() {
                collected.extend_from_slice(parser.result().bytes(buf));
            }
        }
        assert!(parser.finish());
        assert_eq!(collected, b"hi");
    }

    /// Mirrors the acceptor's per-call compaction: after `feed` stalls,
    /// drop everything before `end_pos()` and rebase. A split that lands
    /// mid chunk-size digit must not lose the digits already scanned.
    fn compact(parser: &mut ChunkedBodyParser, buf: &mut Vec<u8>) {
        let end = parser.end_pos();
        buf.drain(..end);
        parser.rebase(end);
    }

    #[test]
    fn split_mid_chunk_size_digit_survives_compaction() {
        // The next chunk-size is two hex digits ("10" = 16); the feed
        // boundary falls right after the first digit, before the
        // parser can know whether more digits follow.
        let mut buf = b"5\r\nhello\r\n1".to_vec();
        let mut parser = ChunkedBodyParser::new();
        let mut collected = Vec::new();

        while parser.feed(&buf) {
            if parser.ready() {
                collected.extend_from_slice(parser.result().bytes(&buf));
            }
        }
        compact(&mut parser, &mut buf);

        buf.extend_from_slice(b"0\r\n0123456789ABCDEF\r\n0\r\n\r\n");
        while parser.feed(&buf) {
            if parser.ready() {
                collected.extend_from_slice(parser.result().bytes(&buf));
            }
        }
        compact(&mut parser, &mut buf);

        assert!(parser.finish());
        assert_eq!(collected, b"hello0123456789ABCDEF".to_vec());
    }

    #[test]
    fn split_mid_extension_survives_compaction() {
        let mut buf = b"3;fo".to_vec();
        let mut parser = ChunkedBodyParser::new();
        let mut collected = Vec::new();

        while parser.feed(&buf) {
            if parser.ready() {
                collected.extend_from_slice(parser.result().bytes(&buf));
            }
        }
        compact(&mut parser, &mut buf);

        buf.extend_from_slice(b"o\r\nbar\r\n0\r\n\r\n");
        while parser.feed(&buf) {
            if parser.ready() {
                collected.extend_from_slice(parser.result().bytes(&buf));
            }
        }
        compact(&mut parser, &mut buf);

        assert!(parser.finish());
        assert_eq!(collected, b"bar");
    }
}
