//! Time-bounded memoization of generated briefs.
//!
//! Identical (document, audience, language) requests inside the freshness
//! window are served from memory instead of re-invoking a provider.
//!
//! Expiry is lazy: an entry is checked against the freshness window at
//! lookup time and removed there if stale. There is no background sweep,
//! so entries for keys that are never looked up again persist for the life
//! of the process. Unbounded growth is a documented tradeoff of this
//! design, not an oversight.

use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use policylens_core::{Audience, BriefResult, Language};

/// Time source for freshness checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time source used outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic freshness tests.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Fingerprint of (document, audience, language).
///
/// The document contributes a 64-bit hash; audience and language are
/// carried literally, so two requests collide only when the document text
/// and both labels match. The fingerprint is deterministic within a process
/// run; cross-process stability is not required because the cache is never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    document_hash: u64,
    audience: Audience,
    language: Language,
}

impl CacheKey {
    /// Create a cache key from request fields.
    pub fn new(document: &str, audience: Audience, language: Language) -> Self {
        let mut hasher = DefaultHasher::new();
        document.hash(&mut hasher);
        Self {
            document_hash: hasher.finish(),
            audience,
            language,
        }
    }
}

/// Cache abstraction injected into the brief generator.
pub trait BriefCache: Send + Sync {
    /// Return the stored value if present and fresh; stale entries are
    /// removed during the lookup and treated as absent.
    fn lookup(&self, key: &CacheKey) -> Option<BriefResult>;

    /// Unconditionally overwrite any existing entry with a freshly
    /// timestamped value.
    fn store(&self, key: CacheKey, value: BriefResult);
}

struct CacheEntry {
    value: BriefResult,
    created_at: Instant,
}

/// In-memory cache with lookup-time expiry.
///
/// Concurrent `lookup`/`store` on the same key is last-store-wins; an
/// interleaved lookup may observe either value. Each operation holds the
/// lock only for the duration of one map access.
pub struct InMemoryCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryCache {
    /// Create a cache with the given freshness window.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an injected time source.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Number of entries currently held, fresh or not.
    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }
}

impl BriefCache for InMemoryCache {
    fn lookup(&self, key: &CacheKey) -> Option<BriefResult> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            // Fresh means strictly inside the window
            Some(entry) if self.clock.now().duration_since(entry.created_at) < self.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn store(&self, key: CacheKey, value: BriefResult) {
        self.entries.lock().insert(
            key,
            CacheEntry {
                value,
                created_at: self.clock.now(),
            },
        );
    }
}
