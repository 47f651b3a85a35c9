//! Command Execution Module
//!
//! Binds parsed requests to the storage and statistics layers.
//!
//! ## Architecture
//!
//! ```text
//! Client line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Line Parser    │  (protocol module)
//! └────────┬────────┘
//!          │ Request
//!          ▼
//! ┌─────────────────┐      ┌────────────────────┐
//! │ CommandHandler  │─────>│ StatisticsRegistry │
//! └────────┬────────┘      └────────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ KeyValueStore   │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `PUT key value`
//! - `GET key`
//! - `DEL key`
//! - `STATS`
//! - `QUIT`

pub mod handler;

pub use handler::{CommandError, CommandHandler};
