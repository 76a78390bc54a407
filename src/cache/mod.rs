//! Cache Module
//!
//! Provides a bounded in-memory cache with LRU eviction and renewable TTL
//! expiration, built on a hash-indexed circular linked list.

mod clock;
mod entry;
mod index;
mod stats;
mod store;
mod timer;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use entry::{Entry, EntryId};
pub use index::{Iter, OrderedIndex};
pub use stats::CacheStats;
pub use store::{Cache, SharedCache};
pub use timer::{Timer, TimerQueue};
