//! KV/1.0 Line Parser
//!
//! Parsing happens in two steps:
//!
//! 1. **Framing**: [`LineDecoder::next_line`] splits one `\n`-terminated line
//!    off the front of the connection buffer. Incomplete data stays buffered,
//!    and the decoder remembers how far it has already searched so each byte
//!    is scanned for `\n` only once, however many reads a line spans.
//! 2. **Decoding**: [`parse_request`] tokenizes the line on Unicode
//!    whitespace, checks the version token and command arity, and yields a
//!    [`Request`].
//!
//! Tokens are sliced out of the frozen line with `Bytes::slice_ref`, so keys
//! and values share the line's allocation instead of being copied.
//!
//! ## Validation Order
//!
//! ```text
//! fewer than 2 tokens      -> 400 BAD_REQUEST
//! token 0 != "KV/1.0"      -> 426 UPGRADE_REQUIRED
//! unknown command          -> 400 BAD_REQUEST
//! wrong arity              -> 400 BAD_REQUEST
//! ```

use crate::protocol::types::{Request, Response, LF};
use crate::PROTOCOL_VERSION;
use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Reasons a line is rejected. Each maps to exactly one response line.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Malformed line, unknown command, or wrong number of arguments
    #[error("bad request")]
    BadRequest,

    /// The version token is not the one this server speaks
    #[error("unsupported protocol version")]
    UpgradeRequired,
}

impl From<ProtocolError> for Response {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::BadRequest => Response::BadRequest,
            ProtocolError::UpgradeRequired => Response::UpgradeRequired,
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ProtocolError>;

/// Strips every trailing `\r` and `\n` byte.
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b'\r' && b != LF)
        .map_or(0, |pos| pos + 1);
    &line[..end]
}

/// Incremental `\n` framer for one connection buffer.
///
/// Tracks how many buffered bytes are already known to contain no `\n`, so
/// a line that arrives over many reads costs time linear in its length.
/// A decoder must only ever be used with one buffer.
#[derive(Debug, Default, Clone)]
pub struct LineDecoder {
    /// Bytes at the front of the buffer already searched without a match
    scanned: usize,
}

impl LineDecoder {
    /// Creates a decoder for an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffered bytes already searched for a line terminator.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Splits the next complete line off the front of `buf`.
    ///
    /// # Returns
    ///
    /// - `Some(line)` - A complete line with its line ending removed (may be empty)
    /// - `None` - No `\n` in the buffer yet; `buf` is left untouched
    pub fn next_line(&mut self, buf: &mut BytesMut) -> Option<Bytes> {
        let start = self.scanned.min(buf.len());
        let Some(offset) = buf[start..].iter().position(|&b| b == LF) else {
            self.scanned = buf.len();
            return None;
        };

        self.scanned = 0;
        let mut line = buf.split_to(start + offset + 1).freeze();
        let len = trim_line_end(&line).len();
        line.truncate(len);
        Some(line)
    }
}

/// Splits `line` into fields separated by runs of Unicode whitespace.
///
/// Bytes that are not valid UTF-8 never separate fields; they stay part of
/// whichever field they sit in.
fn fields(line: &[u8]) -> Vec<&[u8]> {
    let mut fields = Vec::new();
    let mut start = None;
    let mut pos = 0;

    for chunk in line.utf8_chunks() {
        for (i, c) in chunk.valid().char_indices() {
            if c.is_whitespace() {
                if let Some(s) = start.take() {
                    fields.push(&line[s..pos + i]);
                }
            } else if start.is_none() {
                start = Some(pos + i);
            }
        }
        pos += chunk.valid().len();

        if !chunk.invalid().is_empty() {
            start.get_or_insert(pos);
            pos += chunk.invalid().len();
        }
    }

    if let Some(s) = start {
        fields.push(&line[s..]);
    }
    fields
}

/// Decodes one non-empty line into a [`Request`].
///
/// The command name is matched case-insensitively. Arity is exact: extra
/// arguments are as much an error as missing ones.
pub fn parse_request(line: &Bytes) -> ParseResult<Request> {
    let tokens = fields(line);

    if tokens.len() < 2 {
        return Err(ProtocolError::BadRequest);
    }

    if tokens[0] != PROTOCOL_VERSION.as_bytes() {
        return Err(ProtocolError::UpgradeRequired);
    }

    let command = tokens[1].to_ascii_uppercase();
    let args = &tokens[2..];

    match (command.as_slice(), args) {
        (b"PUT", [key, value]) => Ok(Request::Put {
            key: line.slice_ref(key),
            value: line.slice_ref(value),
        }),
        (b"GET", [key]) => Ok(Request::Get {
            key: line.slice_ref(key),
        }),
        (b"DEL", [key]) => Ok(Request::Del {
            key: line.slice_ref(key),
        }),
        (b"STATS", []) => Ok(Request::Stats),
        (b"QUIT", []) => Ok(Request::Quit),
        _ => Err(ProtocolError::BadRequest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ParseResult<Request> {
        parse_request(&Bytes::copy_from_slice(line.as_bytes()))
    }

    #[test]
    fn test_next_line_complete() {
        let mut decoder = LineDecoder::new();
        let mut buf = BytesMut::from(&b"KV/1.0 GET a\nKV/1.0 STATS\n"[..]);

        assert_eq!(decoder.next_line(&mut buf), Some(Bytes::from("KV/1.0 GET a")));
        assert_eq!(decoder.next_line(&mut buf), Some(Bytes::from("KV/1.0 STATS")));
        assert_eq!(decoder.next_line(&mut buf), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_next_line_incomplete() {
        let mut decoder = LineDecoder::new();
        let mut buf = BytesMut::from(&b"KV/1.0 GE"[..]);
        assert_eq!(decoder.next_line(&mut buf), None);
        assert_eq!(&buf[..], b"KV/1.0 GE");
        assert_eq!(decoder.scanned(), 9);

        buf.extend_from_slice(b"T a\r\n");
        assert_eq!(decoder.next_line(&mut buf), Some(Bytes::from("KV/1.0 GET a")));
        assert_eq!(decoder.scanned(), 0);
    }

    #[test]
    fn test_next_line_blank() {
        let mut decoder = LineDecoder::new();
        let mut buf = BytesMut::from(&b"\r\n\n"[..]);
        assert_eq!(decoder.next_line(&mut buf), Some(Bytes::new()));
        assert_eq!(decoder.next_line(&mut buf), Some(Bytes::new()));
        assert_eq!(decoder.next_line(&mut buf), None);
    }

    #[test]
    fn test_long_line_in_small_chunks() {
        const LINE_LEN: usize = 4 * 1024 * 1024;
        const CHUNK: usize = 4096;

        let mut decoder = LineDecoder::new();
        let mut buf = BytesMut::new();
        let chunk = vec![b'x'; CHUNK];

        while buf.len() < LINE_LEN {
            buf.extend_from_slice(&chunk);
            assert_eq!(decoder.next_line(&mut buf), None);
            // Only the bytes appended since the last call get searched
            assert_eq!(decoder.scanned(), buf.len());
        }

        buf.extend_from_slice(b"\r\nKV/1.0 STATS\n");
        let line = decoder.next_line(&mut buf).unwrap();
        assert_eq!(line.len(), LINE_LEN);
        assert!(line.iter().all(|&b| b == b'x'));
        assert_eq!(decoder.scanned(), 0);

        assert_eq!(decoder.next_line(&mut buf), Some(Bytes::from("KV/1.0 STATS")));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_scanned_offset_clamped_to_buffer() {
        let mut decoder = LineDecoder::new();
        let mut buf = BytesMut::from(&b"partial"[..]);
        assert_eq!(decoder.next_line(&mut buf), None);

        buf.clear();
        buf.extend_from_slice(b"a\n");
        assert_eq!(decoder.next_line(&mut buf), Some(Bytes::from("a")));
    }

    #[test]
    fn test_trim_line_end() {
        assert_eq!(trim_line_end(b"abc\r\n"), b"abc");
        assert_eq!(trim_line_end(b"abc\r\r\n"), b"abc");
        assert_eq!(trim_line_end(b"\r\n"), b"");
        assert_eq!(trim_line_end(b"abc"), b"abc");
    }

    #[test]
    fn test_parse_put() {
        assert_eq!(
            parse("KV/1.0 PUT name kvss"),
            Ok(Request::Put {
                key: Bytes::from("name"),
                value: Bytes::from("kvss"),
            })
        );
    }

    #[test]
    fn test_parse_get_del() {
        assert_eq!(
            parse("KV/1.0 GET name"),
            Ok(Request::Get {
                key: Bytes::from("name")
            })
        );
        assert_eq!(
            parse("KV/1.0 DEL name"),
            Ok(Request::Del {
                key: Bytes::from("name")
            })
        );
    }

    #[test]
    fn test_parse_stats_quit() {
        assert_eq!(parse("KV/1.0 STATS"), Ok(Request::Stats));
        assert_eq!(parse("KV/1.0 QUIT"), Ok(Request::Quit));
    }

    #[test]
    fn test_command_case_insensitive() {
        assert_eq!(parse("KV/1.0 stats"), Ok(Request::Stats));
        assert_eq!(
            parse("KV/1.0 pUt k v"),
            Ok(Request::Put {
                key: Bytes::from("k"),
                value: Bytes::from("v"),
            })
        );
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        assert_eq!(
            parse("KV/1.0 GET Name"),
            Ok(Request::Get {
                key: Bytes::from("Name")
            })
        );
    }

    #[test]
    fn test_extra_whitespace() {
        assert_eq!(
            parse("  KV/1.0\tGET   name  "),
            Ok(Request::Get {
                key: Bytes::from("name")
            })
        );
    }

    #[test]
    fn test_unicode_whitespace_separates_tokens() {
        // Vertical tab
        assert_eq!(
            parse("KV/1.0\x0bGET x"),
            Ok(Request::Get {
                key: Bytes::from("x")
            })
        );
        // No-break space and NEL
        assert_eq!(
            parse("KV/1.0 PUT a\u{00A0}b"),
            Ok(Request::Put {
                key: Bytes::from("a"),
                value: Bytes::from("b"),
            })
        );
        assert_eq!(
            parse("KV/1.0\u{0085}DEL\u{2003}k"),
            Ok(Request::Del {
                key: Bytes::from("k")
            })
        );
    }

    #[test]
    fn test_invalid_utf8_is_not_whitespace() {
        // 0xA0 alone is not a no-break space, it is a stray continuation byte
        let line = Bytes::from_static(b"KV/1.0 PUT k\xa0v \xff\xfe");
        assert_eq!(
            parse_request(&line),
            Ok(Request::Put {
                key: Bytes::from_static(b"k\xa0v"),
                value: Bytes::from_static(b"\xff\xfe"),
            })
        );
    }

    #[test]
    fn test_fields() {
        assert_eq!(fields(b""), Vec::<&[u8]>::new());
        assert_eq!(fields(b" \t "), Vec::<&[u8]>::new());
        assert_eq!(fields(b"a\xffb c"), vec![&b"a\xffb"[..], &b"c"[..]]);
        assert_eq!(
            fields("\u{00A0}x\u{3000}y\u{00A0}".as_bytes()),
            vec![&b"x"[..], &b"y"[..]]
        );
    }

    #[test]
    fn test_too_few_tokens() {
        assert_eq!(parse("KV/1.0"), Err(ProtocolError::BadRequest));
        assert_eq!(parse("   "), Err(ProtocolError::BadRequest));
    }

    #[test]
    fn test_version_mismatch() {
        assert_eq!(parse("KV/0.9 GET x"), Err(ProtocolError::UpgradeRequired));
        assert_eq!(parse("kv/1.0 GET x"), Err(ProtocolError::UpgradeRequired));
        // Version is checked before the command
        assert_eq!(parse("KV/2.0 NOPE"), Err(ProtocolError::UpgradeRequired));
    }

    #[test]
    fn test_wrong_arity() {
        assert_eq!(parse("KV/1.0 PUT onlykey"), Err(ProtocolError::BadRequest));
        assert_eq!(parse("KV/1.0 PUT k v extra"), Err(ProtocolError::BadRequest));
        assert_eq!(parse("KV/1.0 GET"), Err(ProtocolError::BadRequest));
        assert_eq!(parse("KV/1.0 GET a b"), Err(ProtocolError::BadRequest));
        assert_eq!(parse("KV/1.0 DEL"), Err(ProtocolError::BadRequest));
        assert_eq!(parse("KV/1.0 STATS now"), Err(ProtocolError::BadRequest));
        assert_eq!(parse("KV/1.0 QUIT now"), Err(ProtocolError::BadRequest));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(parse("KV/1.0 PING"), Err(ProtocolError::BadRequest));
    }

    #[test]
    fn test_error_responses() {
        assert_eq!(Response::from(ProtocolError::BadRequest), Response::BadRequest);
        assert_eq!(
            Response::from(ProtocolError::UpgradeRequired),
            Response::UpgradeRequired
        );
    }
}
