//! KV/1.0 Request and Response Types
//!
//! The protocol is line-oriented. A request is one line of whitespace
//! separated tokens, a response is one status line.
//!
//! ## Request Format
//!
//! ```text
//! KV/1.0 <COMMAND> [arg1] [arg2]\n
//! ```
//!
//! ## Response Lines
//!
//! ```text
//! 201 CREATED              PUT of a new key
//! 200 OK                   PUT over an existing key
//! 200 OK <value>           GET hit
//! 204 NO_CONTENT           DEL hit
//! 404 NOT_FOUND            GET/DEL miss
//! 400 BAD_REQUEST          malformed line, wrong arity, unknown command
//! 426 UPGRADE_REQUIRED     version token mismatch
//! 200 OK <json>            STATS
//! 200 OK bye               QUIT
//! ```

use crate::PROTOCOL_VERSION;
use bytes::Bytes;
use std::fmt;

/// The line terminator used in both directions.
pub const LF: u8 = b'\n';

/// Builds the wire line a client sends for a command typed without the
/// version token, e.g. `PUT name kvss` becomes `KV/1.0 PUT name kvss\n`.
///
/// Returns `None` for input that is blank after trimming.
pub fn request_line(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    Some(format!("{} {}\n", PROTOCOL_VERSION, input))
}

/// A fully validated client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `PUT <key> <value>`
    Put { key: Bytes, value: Bytes },
    /// `GET <key>`
    Get { key: Bytes },
    /// `DEL <key>`
    Del { key: Bytes },
    /// `STATS`
    Stats,
    /// `QUIT`
    Quit,
}

impl Request {
    /// Upper-case command name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Put { .. } => "PUT",
            Request::Get { .. } => "GET",
            Request::Del { .. } => "DEL",
            Request::Stats => "STATS",
            Request::Quit => "QUIT",
        }
    }

    /// Returns true if the connection must close after replying.
    pub fn is_quit(&self) -> bool {
        matches!(self, Request::Quit)
    }
}

/// A single server reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `201 CREATED`
    Created,
    /// `200 OK`
    Ok,
    /// `200 OK <value>`
    Value(Bytes),
    /// `204 NO_CONTENT`
    NoContent,
    /// `404 NOT_FOUND`
    NotFound,
    /// `400 BAD_REQUEST`
    BadRequest,
    /// `426 UPGRADE_REQUIRED`
    UpgradeRequired,
    /// `200 OK <json>`, carrying the already-encoded JSON object
    Stats(String),
    /// `200 OK bye`
    Bye,
}

impl Response {
    /// Numeric status code of the reply.
    pub fn status(&self) -> u16 {
        match self {
            Response::Created => 201,
            Response::Ok | Response::Value(_) | Response::Stats(_) | Response::Bye => 200,
            Response::NoContent => 204,
            Response::NotFound => 404,
            Response::BadRequest => 400,
            Response::UpgradeRequired => 426,
        }
    }

    /// Serializes the response to its wire form, including the trailing `\n`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the response into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Response::Created => buf.extend_from_slice(b"201 CREATED"),
            Response::Ok => buf.extend_from_slice(b"200 OK"),
            Response::Value(value) => {
                buf.extend_from_slice(b"200 OK ");
                buf.extend_from_slice(value);
            }
            Response::NoContent => buf.extend_from_slice(b"204 NO_CONTENT"),
            Response::NotFound => buf.extend_from_slice(b"404 NOT_FOUND"),
            Response::BadRequest => buf.extend_from_slice(b"400 BAD_REQUEST"),
            Response::UpgradeRequired => buf.extend_from_slice(b"426 UPGRADE_REQUIRED"),
            Response::Stats(json) => {
                buf.extend_from_slice(b"200 OK ");
                buf.extend_from_slice(json.as_bytes());
            }
            Response::Bye => buf.extend_from_slice(b"200 OK bye"),
        }
        buf.push(LF);
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.serialize();
        // Drop the terminator; values are shown lossily if not UTF-8
        write!(f, "{}", String::from_utf8_lossy(&line[..line.len() - 1]))
    }
}
