//! Per-SOP serialization of the read-recompute-write of the aggregate status.
//!
//! Stage rows are unique per participant and safe to write concurrently, but the SOP
//! status is derived from all of them. Two participants finishing at the same time
//! would otherwise each derive from a snapshot missing the other's write.
//!
//! An entry lives only while some caller holds or waits on it, so the registry stays
//! bounded by the number of SOPs currently being mutated.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::{WorkflowError, WorkflowResult};

type LockMap = DashMap<Uuid, Arc<Mutex<()>>>;

/// Remove the entry for `sop_id` if the map holds the only remaining handle.
///
/// Waiters clone the handle under the same shard lock `remove_if` takes, so an
/// entry is never dropped while someone is queued on it.
fn release_entry(locks: &LockMap, sop_id: Uuid) {
    locks.remove_if(&sop_id, |_, lock| Arc::strong_count(lock) == 1);
}

/// Held for the duration of one SOP mutation; released on drop
#[derive(Debug)]
pub struct SopLockGuard {
    sop_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
}

impl SopLockGuard {
    pub fn sop_id(&self) -> Uuid {
        self.sop_id
    }
}

impl Drop for SopLockGuard {
    fn drop(&mut self) {
        // The mutex guard owns a handle to the entry; release it before the count check.
        drop(self.guard.take());
        release_entry(&self.locks, self.sop_id);
    }
}

#[derive(Debug)]
pub struct SopLockRegistry {
    locks: Arc<LockMap>,
    timeout: Duration,
}

impl SopLockRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
            timeout,
        }
    }

    /// Wait for exclusive access to `sop_id`, bounded by the configured timeout
    pub async fn acquire(&self, sop_id: Uuid) -> WorkflowResult<SopLockGuard> {
        let lock = self
            .locks
            .entry(sop_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(SopLockGuard {
                sop_id,
                guard: Some(guard),
                locks: Arc::clone(&self.locks),
            }),
            Err(_) => {
                release_entry(&self.locks, sop_id);
                tracing::warn!(
                    sop_id = %sop_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Timed out waiting for SOP lock"
                );
                Err(WorkflowError::internal(format!(
                    "Timed out after {:?} waiting for exclusive access to SOP {sop_id}",
                    self.timeout
                )))
            }
        }
    }

    /// Number of SOPs currently held or waited on
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Default for SopLockRegistry {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::constants::DEFAULT_LOCK_TIMEOUT_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_sop_is_exclusive() {
        let registry = SopLockRegistry::new(Duration::from_millis(50));
        let sop_id = Uuid::new_v4();

        let guard = registry.acquire(sop_id).await.unwrap();
        assert_eq!(guard.sop_id(), sop_id);

        let err = registry.acquire(sop_id).await.unwrap_err();
        assert!(err.to_string().contains("Timed out"));
        assert_eq!(registry.len(), 1, "timed-out waiter must not drop the held entry");

        drop(guard);
        assert!(registry.is_empty());
        assert!(registry.acquire(sop_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_distinct_sops_do_not_contend() {
        let registry = SopLockRegistry::new(Duration::from_millis(50));
        let first = registry.acquire(Uuid::new_v4()).await.unwrap();
        let second = registry.acquire(Uuid::new_v4()).await.unwrap();
        assert_eq!(registry.len(), 2);

        drop(first);
        assert_eq!(registry.len(), 1);
        drop(second);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_released_entries_do_not_accumulate() {
        let registry = SopLockRegistry::default();
        for _ in 0..50 {
            let guard = registry.acquire(Uuid::new_v4()).await.unwrap();
            drop(guard);
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_entry_survives_while_a_waiter_is_queued() {
        let registry = Arc::new(SopLockRegistry::new(Duration::from_secs(5)));
        let sop_id = Uuid::new_v4();

        let held = registry.acquire(sop_id).await.unwrap();
        let waiter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let _guard = registry.acquire(sop_id).await.unwrap();
                registry.len()
            })
        };

        // Let the waiter queue on the held mutex
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);

        assert_eq!(waiter.await.unwrap(), 1);
        assert!(registry.is_empty());
    }
}
