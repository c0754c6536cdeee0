//! A single cached value with a time-to-live.

use std::time::Duration;

use tokio::time::Instant;

/// Holds at most one value, considered fresh for `ttl` after it was stored.
///
/// Time comes from [`tokio::time::Instant`], so tests can drive expiry with a
/// paused clock.
#[derive(Debug)]
pub struct TtlCache<T> {
  entry: Option<Entry<T>>,
  ttl:   Duration,
}

#[derive(Debug)]
struct Entry<T> {
  value:      T,
  fetched_at: Instant,
}

impl<T> TtlCache<T> {
  pub fn new(ttl: Duration) -> Self { Self { entry: None, ttl } }

  /// The cached value, if one is stored and has not expired.
  pub fn get(&self) -> Option<&T> {
    self
      .entry
      .as_ref()
      .filter(|e| e.fetched_at.elapsed() < self.ttl)
      .map(|e| &e.value)
  }

  /// Store `value`, stamped with the current time.
  pub fn put(&mut self, value: T) {
    self.entry = Some(Entry {
      value,
      fetched_at: Instant::now(),
    });
  }

  /// Forget the cached value so the next [`get`](Self::get) misses.
  pub fn invalidate(&mut self) { self.entry = None; }
}
