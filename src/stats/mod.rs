//! Statistics Module
//!
//! Connection and request counters reported by the `STATS` command.
//!
//! ## Example
//!
//! ```
//! use kvss::stats::{ConnectionGuard, StatisticsRegistry};
//! use std::sync::Arc;
//!
//! let stats = Arc::new(StatisticsRegistry::new());
//!
//! let guard = ConnectionGuard::open(Arc::clone(&stats));
//! stats.request_received();
//! stats.put_succeeded();
//! drop(guard);
//!
//! let snapshot = stats.snapshot(1);
//! assert_eq!(snapshot.total_conns, 1);
//! assert_eq!(snapshot.active_conns, 0);
//! assert_eq!(snapshot.put_count, 1);
//! ```

pub mod registry;

pub use registry::{ConnectionGuard, StatisticsRegistry, StatsSnapshot};
