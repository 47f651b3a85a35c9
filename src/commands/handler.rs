//! Command Executor
//!
//! Runs a validated [`Request`] against the store and records the outcome in
//! the statistics registry.
//!
//! ## Counting Rules
//!
//! | Command | Counter     | Counted when          |
//! |---------|-------------|-----------------------|
//! | PUT     | `put_count` | always                |
//! | GET     | `get_count` | only on a hit         |
//! | DEL     | `del_count` | only on a hit         |
//!
//! Misses are a normal outcome (`404 NOT_FOUND`), not an error.

use crate::protocol::{Request, Response};
use crate::stats::StatisticsRegistry;
use crate::storage::KeyValueStore;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while executing a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The statistics snapshot could not be encoded
    #[error("failed to encode statistics: {0}")]
    StatsEncoding(#[from] serde_json::Error),
}

/// Executes requests against the shared store and statistics.
///
/// Cheap to clone; every connection gets its own copy.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    store: Arc<KeyValueStore>,
    stats: Arc<StatisticsRegistry>,
}

impl CommandHandler {
    /// Creates a new command handler over the given store and statistics.
    pub fn new(store: Arc<KeyValueStore>, stats: Arc<StatisticsRegistry>) -> Self {
        Self { store, stats }
    }

    /// Returns the store this handler operates on.
    pub fn store(&self) -> &Arc<KeyValueStore> {
        &self.store
    }

    /// Returns the statistics registry this handler reports to.
    pub fn stats(&self) -> &Arc<StatisticsRegistry> {
        &self.stats
    }

    /// Executes a request and returns the response line to send.
    pub fn execute(&self, request: Request) -> Result<Response, CommandError> {
        let response = match request {
            Request::Put { key, value } => self.cmd_put(key, value),
            Request::Get { key } => self.cmd_get(&key),
            Request::Del { key } => self.cmd_del(&key),
            Request::Stats => self.cmd_stats()?,
            Request::Quit => Response::Bye,
        };
        Ok(response)
    }

    /// PUT key value
    fn cmd_put(&self, key: Bytes, value: Bytes) -> Response {
        let created = self.store.put(key, value);
        self.stats.put_succeeded();

        if created {
            Response::Created
        } else {
            Response::Ok
        }
    }

    /// GET key
    fn cmd_get(&self, key: &[u8]) -> Response {
        match self.store.get(key) {
            Some(value) => {
                self.stats.get_hit();
                Response::Value(value)
            }
            None => Response::NotFound,
        }
    }

    /// DEL key
    fn cmd_del(&self, key: &[u8]) -> Response {
        if self.store.del(key) {
            self.stats.del_hit();
            Response::NoContent
        } else {
            Response::NotFound
        }
    }

    /// STATS
    fn cmd_stats(&self) -> Result<Response, CommandError> {
        let snapshot = self.stats.snapshot(self.store.size());
        let json = serde_json::to_string(&snapshot)?;
        Ok(Response::Stats(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_handler() -> CommandHandler {
        CommandHandler::new(
            Arc::new(KeyValueStore::new()),
            Arc::new(StatisticsRegistry::new()),
        )
    }

    fn put(k: &str, v: &str) -> Request {
        Request::Put {
            key: Bytes::copy_from_slice(k.as_bytes()),
            value: Bytes::copy_from_slice(v.as_bytes()),
        }
    }

    fn get(k: &str) -> Request {
        Request::Get {
            key: Bytes::copy_from_slice(k.as_bytes()),
        }
    }

    fn del(k: &str) -> Request {
        Request::Del {
            key: Bytes::copy_from_slice(k.as_bytes()),
        }
    }

    fn stats_json(handler: &CommandHandler) -> serde_json::Value {
        match handler.execute(Request::Stats).unwrap() {
            Response::Stats(json) => serde_json::from_str(&json).unwrap(),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_put_created_then_ok() {
        let handler = create_handler();

        assert_eq!(handler.execute(put("k", "v1")).unwrap(), Response::Created);
        assert_eq!(handler.execute(put("k", "v2")).unwrap(), Response::Ok);
        assert_eq!(
            handler.execute(get("k")).unwrap(),
            Response::Value(Bytes::from("v2"))
        );
    }

    #[test]
    fn test_get_miss() {
        let handler = create_handler();
        assert_eq!(handler.execute(get("nope")).unwrap(), Response::NotFound);
        assert_eq!(handler.stats().snapshot(0).get_count, 0);
    }

    #[test]
    fn test_del_hit_then_miss() {
        let handler = create_handler();
        handler.execute(put("k", "v")).unwrap();

        assert_eq!(handler.execute(del("k")).unwrap(), Response::NoContent);
        assert_eq!(handler.store().size(), 0);

        assert_eq!(handler.execute(del("k")).unwrap(), Response::NotFound);
        assert_eq!(handler.store().size(), 0);
    }

    #[test]
    fn test_quit() {
        let handler = create_handler();
        assert_eq!(handler.execute(Request::Quit).unwrap(), Response::Bye);
    }

    #[test]
    fn test_stats_counts_hits_only() {
        let handler = create_handler();

        handler.execute(put("a", "1")).unwrap();
        handler.execute(put("b", "2")).unwrap();
        handler.execute(put("a", "3")).unwrap();
        handler.execute(get("a")).unwrap();
        handler.execute(get("missing")).unwrap();
        handler.execute(del("b")).unwrap();
        handler.execute(del("b")).unwrap();

        let json = stats_json(&handler);
        assert_eq!(json["version"], "KV/1.0");
        assert_eq!(json["put_count"], 3);
        assert_eq!(json["get_count"], 1);
        assert_eq!(json["del_count"], 1);
        assert_eq!(json["keys"], 1);
    }

    #[test]
    fn test_stats_is_single_line() {
        let handler = create_handler();
        let line = handler.execute(Request::Stats).unwrap().serialize();

        assert!(line.starts_with(b"200 OK {"));
        assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
        assert_eq!(line.last(), Some(&b'\n'));
    }
}
