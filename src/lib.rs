//! Mini LRU - A bounded in-process key-value cache
//!
//! Least-recently-used eviction when capacity is reached, plus optional
//! time-to-live expiration renewed on every get.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, Clock, ManualClock, SharedCache, SystemClock, TokioClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::spawn_expiration_task;
