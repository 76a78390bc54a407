//! Cache Store Module
//!
//! Cache controller combining the ordered index with capacity eviction,
//! recency promotion and timer-driven TTL expiration.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::cache::{CacheStats, Clock, Entry, OrderedIndex, SystemClock, TimerQueue};
use crate::config::{self, CacheConfig};
use crate::error::Result;

/// Cache shared between callers and the expiration task.
pub type SharedCache<K, V, C = SystemClock> = Arc<RwLock<Cache<K, V, C>>>;

// == Payload ==
/// Value plus expiry bookkeeping stored in each index entry.
#[derive(Debug, Clone)]
struct Payload<V> {
    value: V,
    /// Absolute expiry, None when the cache has no ttl
    expires_at: Option<Instant>,
    /// Identifies the entry's single live timer across promotions
    token: u64,
}

impl<V> Payload<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }
}

// == Cache ==
/// Bounded key-value cache with LRU eviction and optional renewable ttl.
///
/// - `set` on a new key inserts it as newest, evicting the oldest entry when full
/// - `set` on an existing key replaces the value in place, recency unchanged
/// - `get` promotes the entry to newest and renews its ttl
///
/// Expiration runs through single-shot timers: call
/// [`run_pending_timers`](Cache::run_pending_timers) directly, or hand a
/// [`SharedCache`] to [`spawn_expiration_task`](crate::tasks::spawn_expiration_task).
#[derive(Debug)]
pub struct Cache<K, V, C = SystemClock> {
    /// Entries in recency order
    index: OrderedIndex<K, Payload<V>>,
    /// Pending expiration checks
    timers: TimerQueue<K>,
    /// Activity counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Time-to-live renewed on get, None = never expire
    ttl: Option<Duration>,
    clock: C,
    next_token: u64,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new cache with the system clock.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, must be positive
    /// * `ttl` - Optional time-to-live, must be non-zero when present
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Result<Self> {
        Self::with_clock(capacity, ttl, SystemClock)
    }

    /// Creates a cache from a [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::new(config.capacity, config.ttl())
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Hash + Eq + Clone,
    C: Clock,
{
    /// Creates a new cache reading time from `clock`.
    pub fn with_clock(capacity: usize, ttl: Option<Duration>, clock: C) -> Result<Self> {
        config::validate(capacity, ttl)?;

        Ok(Self {
            index: OrderedIndex::with_capacity(capacity),
            timers: TimerQueue::new(),
            stats: CacheStats::new(),
            capacity,
            ttl,
            clock,
            next_token: 0,
        })
    }

    /// Wraps the cache for sharing with the expiration task.
    pub fn into_shared(self) -> SharedCache<K, V, C> {
        Arc::new(RwLock::new(self))
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// Due expiration checks run first, so an entry whose ttl elapsed is
    /// gone before the lookup and the key is inserted afresh.
    ///
    /// An existing live key only has its value replaced: its recency position
    /// and expiry are left alone. A new key is inserted as newest after
    /// evicting the oldest entry if the cache is full.
    pub fn set(&mut self, key: K, value: V) {
        self.run_pending_timers();

        if let Some(entry) = self.index.get_mut(&key) {
            entry.value.value = value;
            self.stats.record_update();
            return;
        }

        if self.index.len() >= self.capacity {
            self.evict_oldest();
        }

        let now = self.clock.now();
        let token = self.next_token;
        self.next_token += 1;

        let expires_at = self.ttl.map(|ttl| now + ttl);
        if let Some(due) = expires_at {
            self.timers.schedule(due, key.clone(), token);
        }

        self.insert_newest(
            key,
            Payload {
                value,
                expires_at,
                token,
            },
        );
        self.stats.record_insert();
    }

    // == Get ==
    /// Retrieves a value, promoting the entry to newest and renewing its ttl.
    ///
    /// An entry whose ttl already elapsed is removed and reported as a miss
    /// even if its timer has not fired yet.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some((key, mut payload)) = self.index.remove(key) else {
            self.stats.record_miss();
            return None;
        };

        let now = self.clock.now();
        if payload.is_expired(now) {
            self.stats.record_expiration();
            self.stats.record_miss();
            debug!(size = self.index.len(), "Expired entry on access");
            return None;
        }

        // The pending timer keeps the token and reschedules itself on firing
        if let Some(ttl) = self.ttl {
            payload.expires_at = Some(now + ttl);
        }
        self.stats.record_hit();

        let entry = self.insert_newest(key, payload);
        Some(&entry.value.value)
    }

    // == Peek ==
    /// Reads a live value without promoting it or touching the counters.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.index.get(key)?;
        if entry.value.is_expired(self.clock.now()) {
            return None;
        }
        Some(&entry.value.value)
    }

    /// Checks if a key is present, expired-but-unswept entries included.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    // == Remove ==
    /// Removes an entry by key. Returns whether it was present.
    ///
    /// Any pending timer for the entry is left to fire as a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.index.remove(key).is_some() {
            self.stats.record_delete();
            true
        } else {
            false
        }
    }

    // == Stats ==
    /// Returns a snapshot of the counters with the live entry count.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_size(self.index.len());
        stats
    }

    // == Timers ==
    /// Runs every expiration check that is due.
    ///
    /// A check whose entry is gone (evicted, removed, or replaced by a new
    /// insert of the same key) does nothing. A check whose entry was renewed
    /// by a get is rescheduled for the remaining time. Otherwise the entry is
    /// removed. Returns the number of entries expired.
    pub fn run_pending_timers(&mut self) -> usize {
        let now = self.clock.now();
        let mut expired = 0;

        while let Some(timer) = self.timers.pop_due(now) {
            let Some(entry) = self.index.get(&timer.key) else {
                trace!("Expiration timer fired for a removed entry");
                continue;
            };
            if entry.value.token != timer.token {
                trace!("Expiration timer fired for a replaced entry");
                continue;
            }
            let Some(expires_at) = entry.value.expires_at else {
                continue;
            };

            if expires_at > now {
                self.timers.schedule(expires_at, timer.key, timer.token);
                continue;
            }

            self.index.remove(&timer.key);
            self.stats.record_expiration();
            expired += 1;
        }

        if expired > 0 {
            debug!(expired, size = self.index.len(), "Expired entries");
        }
        expired
    }

    /// Deadline of the earliest pending expiration check.
    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Number of pending expiration checks, stale ones included.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Current time as seen by the cache's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    // == Accessors ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Configured time-to-live, None if entries never expire.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    // == Internals ==
    fn evict_oldest(&mut self) {
        let Some(oldest) = self.index.oldest().map(|entry| entry.key.clone()) else {
            return;
        };
        self.index.remove(&oldest);
        self.stats.record_eviction();
        debug!(capacity = self.capacity, "Evicted least recently used entry");
    }

    fn insert_newest(&mut self, key: K, payload: Payload<V>) -> &mut Entry<K, Payload<V>> {
        // Callers only add keys they just checked for or removed
        match self.index.add(key, payload) {
            Ok(entry) => entry,
            Err(err) => unreachable!("cache re-added a live key: {err}"),
        }
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Hash + Eq + Clone,
    V: Clone,
    C: Clock,
{
    /// Like [`get`](Cache::get), returning an owned copy of the value.
    pub fn get_cloned<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).cloned()
    }
}
