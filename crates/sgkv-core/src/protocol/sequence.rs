//! Thread-safe counter for request correlation ids.
//!
//! # What is a request id? (for beginners)
//!
//! Every request carries a caller-chosen integer, and the server echoes it
//! back unchanged in the response.  Correlation ids let a client:
//!
//! - **Match responses to requests** – when several requests are in flight
//!   on one connection, the echoed id says which request a response
//!   answers.
//! - **Reject stale replies** – a response carrying an id the client is no
//!   longer waiting on can be discarded instead of satisfying the wrong
//!   caller.
//!
//! # Thread safety
//!
//! The counter uses `AtomicU64` internally.  An atomic operation reads,
//! modifies, and writes the value as a single indivisible step, so two
//! threads can both call `next()` simultaneously without producing the
//! same id twice.  Compared to a `Mutex<u64>`, the atomic never blocks and
//! is faster for this one-instruction pattern.

use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe, monotonically increasing source of request ids.
///
/// Ids start at 1 and increment by 1 with each call to [`next`]. Id 0 is
/// never issued by a fresh counter, so callers may use it as a sentinel
/// for "no request yet".
///
/// # Examples
///
/// ```rust
/// use sgkv_core::protocol::RequestIdCounter;
///
/// let counter = RequestIdCounter::new();
/// assert_eq!(counter.next(), 1);
/// assert_eq!(counter.next(), 2);
/// ```
pub struct RequestIdCounter {
    /// The underlying atomic integer, accessed by multiple threads
    /// simultaneously without a lock.
    inner: AtomicU64,
}

impl RequestIdCounter {
    /// Creates a new counter whose first issued id is 1.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(1),
        }
    }

    /// Returns the next request id and atomically increments the counter.
    ///
    /// The first call returns 1, the second returns 2, and so on. The
    /// counter wraps from `u64::MAX` to 0 without panicking; no realistic
    /// workload issues 2^64 requests on one counter.
    ///
    /// # Atomic ordering
    ///
    /// `Ordering::Relaxed` is sufficient because ids only need to be
    /// unique, not to synchronise any other memory between threads.
    pub fn next(&self) -> u64 {
        // `fetch_add` atomically adds 1 and returns the value *before* the
        // addition, wrapping at u64::MAX.
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the id the next call to [`next`] would issue, without
    /// issuing it.
    ///
    /// Useful for logging.  Another thread may claim the id between this
    /// load and any later call to [`next`].
    pub fn peek(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}

impl Default for RequestIdCounter {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: RequestIdCounter contains only an AtomicU64, which is already
// `Send + Sync`; Rust would derive these automatically.  They are stated
// explicitly so the sharing contract is visible at the definition.
unsafe impl Send for RequestIdCounter {}
unsafe impl Sync for RequestIdCounter {}
