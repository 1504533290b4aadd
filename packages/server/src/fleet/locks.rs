use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Registry = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Per-drone async mutexes, keyed by serial number.
///
/// Every code path that mutates a drone (loading, battery updates) holds the
/// drone's guard for the whole read-check-write transaction. The guard must be
/// taken before a database connection is acquired.
///
/// Entries only live while a guard is held or awaited, so the registry never
/// outgrows the number of drones being worked on concurrently.
#[derive(Clone, Default)]
pub struct DroneLocks {
    inner: Registry,
}

/// Exclusive access to one drone. Releasing the last guard for a serial
/// removes its registry entry.
pub struct DroneGuard {
    guard: Option<OwnedMutexGuard<()>>,
    serial: String,
    registry: Registry,
}

impl DroneLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `serial`.
    pub async fn lock(&self, serial: &str) -> DroneGuard {
        let mutex = self
            .inner
            .entry(serial.to_string())
            .or_default()
            .value()
            .clone();
        let guard = mutex.lock_owned().await;
        DroneGuard {
            guard: Some(guard),
            serial: serial.to_string(),
            registry: self.inner.clone(),
        }
    }

    /// Number of drones currently locked or waited on.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Drop for DroneGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold a clone of the mutex, so only an unshared entry goes.
        self.registry
            .remove_if(&self.serial, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
