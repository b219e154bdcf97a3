//! # Keyed Locks
//!
//! A table of async mutexes, one per key. Holders of the same key are
//! serialized; different keys never contend. The guard is owned so it can be
//! held across `.await` points for a whole read-decide-act cycle.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Table size below which idle slots are never swept.
const MIN_SWEEP_AT: usize = 64;

#[derive(Debug)]
struct Slots<K> {
    by_key: HashMap<K, Arc<AsyncMutex<()>>>,
    /// Size at which the next `lock` sweeps idle slots.
    sweep_at: usize,
}

/// Per-key async mutual exclusion.
///
/// Idle slots are swept whenever the table doubles since the last sweep, so
/// its size tracks the keys in use rather than every key ever locked.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    slots: Mutex<Slots<K>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(Slots {
                by_key: HashMap::new(),
                sweep_at: MIN_SWEEP_AT,
            }),
        }
    }
}

impl<K> Slots<K> {
    /// A slot is idle when the table holds its only reference.
    fn sweep(&mut self) -> usize {
        let before = self.by_key.len();
        self.by_key.retain(|_, slot| Arc::strong_count(slot) > 1);
        self.sweep_at = (self.by_key.len() * 2).max(MIN_SWEEP_AT);
        before - self.by_key.len()
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`.
    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock();
            if slots.by_key.len() >= slots.sweep_at {
                let removed = slots.sweep();
                debug!(removed, remaining = slots.by_key.len(), "Swept idle lock slots");
            }
            slots
                .by_key
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }

    /// Drops slots that nobody holds or waits on.
    pub fn prune(&self) -> usize {
        let mut slots = self.slots.lock();
        let removed = slots.sweep();
        if removed > 0 {
            debug!(removed, remaining = slots.by_key.len(), "Pruned idle lock slots");
        }
        removed
    }

    /// Number of slots currently allocated.
    pub fn len(&self) -> usize {
        self.slots.lock().by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().by_key.is_empty()
    }
}
