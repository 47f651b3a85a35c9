//! KV/1.0 Protocol Implementation
//!
//! A line-oriented text protocol: every request is one line starting with the
//! version token, every response is one status line.
//!
//! ## Modules
//!
//! - `types`: `Request` and `Response`, and response serialization
//! - `parser`: line framing and request validation
//!
//! ## Example
//!
//! ```
//! use kvss::protocol::{parse_request, LineDecoder, Request, Response};
//! use bytes::{Bytes, BytesMut};
//!
//! let mut buf = BytesMut::from(&b"KV/1.0 GET name\n"[..]);
//! let line = LineDecoder::new().next_line(&mut buf).unwrap();
//! let request = parse_request(&line).unwrap();
//! assert_eq!(request, Request::Get { key: Bytes::from("name") });
//!
//! let reply = Response::Value(Bytes::from("kvss"));
//! assert_eq!(reply.serialize(), b"200 OK kvss\n");
//! ```

pub mod parser;
pub mod types;

pub use parser::{parse_request, trim_line_end, LineDecoder, ParseResult, ProtocolError};
pub use types::{request_line, Request, Response};
