//! Sync coordination locks
//!
//! Webhook-driven sync and batch sync must not touch the same resource at
//! the same time. Locks are in-process, keyed by resource name, and expire
//! after a timeout so a crashed holder cannot wedge the system.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use opsdeck_domain::constants::SYNC_LOCK_TIMEOUT_MS;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct LockEntry {
    locked_at: Instant,
    holder: Uuid,
}

/// In-process lock registry with expiring entries
pub struct SyncLockRegistry {
    locks: DashMap<String, LockEntry>,
    timeout: Duration,
}

impl Default for SyncLockRegistry {
    fn default() -> Self {
        Self::new(Duration::from_millis(SYNC_LOCK_TIMEOUT_MS))
    }
}

impl SyncLockRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self { locks: DashMap::new(), timeout }
    }

    /// Try to acquire the lock for a resource
    ///
    /// Returns the holder token on success, `None` while another holder's
    /// lock is still live. An expired lock is taken over.
    pub fn acquire(&self, resource: &str) -> Option<Uuid> {
        let holder = Uuid::new_v4();
        let now = Instant::now();

        let mut entry = self.locks.entry(resource.to_string()).or_insert(LockEntry {
            locked_at: now,
            holder,
        });

        if entry.holder == holder {
            debug!(resource, %holder, "sync lock acquired");
            return Some(holder);
        }

        if now.duration_since(entry.locked_at) >= self.timeout {
            warn!(resource, stale_holder = %entry.holder, "taking over expired sync lock");
            *entry = LockEntry { locked_at: now, holder };
            return Some(holder);
        }

        None
    }

    /// Release a lock; a stale token from a previous holder is ignored
    pub fn release(&self, resource: &str, holder: Uuid) {
        let released = self
            .locks
            .remove_if(resource, |_, entry| entry.holder == holder)
            .is_some();
        if released {
            debug!(resource, %holder, "sync lock released");
        }
    }

    pub fn is_locked(&self, resource: &str) -> bool {
        self.locks
            .get(resource)
            .map(|entry| entry.locked_at.elapsed() < self.timeout)
            .unwrap_or(false)
    }
}
