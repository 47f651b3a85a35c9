//! Server Statistics
//!
//! Process-wide counters: connections (total and currently active), requests
//! received, and successful PUT/GET/DEL operations. All counters live in one
//! block behind a single `Mutex`, separate from the store's lock, so data-path
//! operations never contend with statistics updates for the same lock.
//!
//! Counters are never reset. Everything except `active_conns` only grows.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::PROTOCOL_VERSION;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    total_conns: u64,
    active_conns: u64,
    req_count: u64,
    put_count: u64,
    get_count: u64,
    del_count: u64,
}

/// Point-in-time view of the statistics, as returned by `STATS`.
///
/// Serializes to a flat JSON object:
///
/// ```text
/// {"version":"KV/1.0","uptime_sec":12,"total_conns":3,"active_conns":1,
///  "req_count":40,"put_count":10,"get_count":8,"del_count":2,"keys":8}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub version: &'static str,
    pub uptime_sec: u64,
    pub total_conns: u64,
    pub active_conns: u64,
    pub req_count: u64,
    pub put_count: u64,
    pub get_count: u64,
    pub del_count: u64,
    pub keys: usize,
}

/// Shared statistics registry.
#[derive(Debug)]
pub struct StatisticsRegistry {
    started_at: Instant,
    counters: Mutex<Counters>,
}

impl Default for StatisticsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsRegistry {
    /// Creates a registry; uptime is measured from this call.
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            counters: Mutex::new(Counters::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn connection_opened(&self) {
        let mut c = self.lock();
        c.total_conns += 1;
        c.active_conns += 1;
    }

    pub fn connection_closed(&self) {
        let mut c = self.lock();
        c.active_conns = c.active_conns.saturating_sub(1);
    }

    pub fn request_received(&self) {
        self.lock().req_count += 1;
    }

    pub fn put_succeeded(&self) {
        self.lock().put_count += 1;
    }

    pub fn get_hit(&self) {
        self.lock().get_count += 1;
    }

    pub fn del_hit(&self) {
        self.lock().del_count += 1;
    }

    /// Time elapsed since the registry was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Reads every counter under one lock acquisition.
    ///
    /// `keys` is the store size, sampled by the caller.
    pub fn snapshot(&self, keys: usize) -> StatsSnapshot {
        let c = *self.lock();
        StatsSnapshot {
            version: PROTOCOL_VERSION,
            uptime_sec: self.uptime().as_secs(),
            total_conns: c.total_conns,
            active_conns: c.active_conns,
            req_count: c.req_count,
            put_count: c.put_count,
            get_count: c.get_count,
            del_count: c.del_count,
            keys,
        }
    }
}

/// Decrements the active connection count when dropped.
///
/// Created by the listener right after `connection_opened`, and moved into the
/// connection task, so the count goes back down however the task ends.
#[derive(Debug)]
pub struct ConnectionGuard {
    stats: Arc<StatisticsRegistry>,
}

impl ConnectionGuard {
    /// Records a new connection and returns the guard that will close it.
    pub fn open(stats: Arc<StatisticsRegistry>) -> Self {
        stats.connection_opened();
        Self { stats }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.stats.connection_closed();
    }
}
