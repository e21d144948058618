//! Per-trip locking so that two edits to the same trip cannot interleave their
//! read, plan and commit steps.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tripboard_schema::TripId;

#[derive(Clone, Default)]
pub struct TripLockManager {
    locks: Arc<Mutex<HashMap<TripId, Arc<Semaphore>>>>,
}

impl TripLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    async fn semaphore(&self, trip_id: TripId) -> Arc<Semaphore> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(trip_id)
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone()
    }

    /// Wait for exclusive access to a trip. Released when the guard drops.
    pub async fn acquire(&self, trip_id: TripId) -> TripLockGuard {
        let permit = self
            .semaphore(trip_id)
            .await
            .acquire_owned()
            .await
            .expect("trip semaphores are never closed");
        TripLockGuard { _permit: permit }
    }

    /// Forget a trip's entry if nobody holds or waits on it, e.g. once the
    /// trip itself is gone.
    pub async fn release(&self, trip_id: TripId) {
        let mut locks = self.locks.lock().await;
        if locks.get(&trip_id).is_some_and(|sem| is_idle(sem)) {
            locks.remove(&trip_id);
        }
    }

    /// Drop entries for trips nobody holds or waits on.
    pub async fn cleanup_unused(&self) {
        let mut locks = self.locks.lock().await;
        let before = locks.len();
        locks.retain(|_, sem| !is_idle(sem));
        let dropped = before - locks.len();
        if dropped > 0 {
            tracing::debug!(dropped, remaining = locks.len(), "dropped idle trip locks");
        }
    }

    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

pub struct TripLockGuard {
    _permit: OwnedSemaphorePermit,
}

fn is_idle(sem: &Arc<Semaphore>) -> bool {
    sem.available_permits() >= 1 && Arc::strong_count(sem) == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn same_trip_is_serialized() {
        let manager = TripLockManager::new();
        let trip = Uuid::new_v4();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter1 = counter.clone();
        let manager1 = manager.clone();
        let t1 = tokio::spawn(async move {
            let _guard = manager1.acquire(trip).await;
            counter1.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            counter1.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(10)).await;

        let counter2 = counter.clone();
        let manager2 = manager.clone();
        let t2 = tokio::spawn(async move {
            let _guard = manager2.acquire(trip).await;
            assert!(counter2.load(Ordering::SeqCst) >= 2);
            counter2.fetch_add(1, Ordering::SeqCst);
        });

        t1.await.unwrap();
        t2.await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn different_trips_do_not_block() {
        let manager = TripLockManager::new();
        let _held = manager.acquire(Uuid::new_v4()).await;
        let other = tokio::time::timeout(Duration::from_millis(100), manager.acquire(Uuid::new_v4()))
            .await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn release_keeps_held_entries() {
        let manager = TripLockManager::new();
        let trip = Uuid::new_v4();

        let guard = manager.acquire(trip).await;
        manager.release(trip).await;
        assert_eq!(manager.tracked().await, 1);

        drop(guard);
        manager.release(trip).await;
        assert_eq!(manager.tracked().await, 0);
    }

    #[tokio::test]
    async fn cleanup_drops_idle_entries_only() {
        let manager = TripLockManager::new();
        let held = Uuid::new_v4();
        let _guard = manager.acquire(held).await;
        drop(manager.acquire(Uuid::new_v4()).await);

        assert_eq!(manager.tracked().await, 2);
        manager.cleanup_unused().await;
        assert_eq!(manager.tracked().await, 1);
    }
}
