//! In-process sync contexts backed by per-key read-write locks.
//!
//! Suitable for coordinating resolvers within one process. Keys are
//! acquired in sorted, deduplicated order so two contexts locking
//! overlapping key sets cannot deadlock, and every acquisition is held as
//! an owned guard so release-on-drop needs no bookkeeping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use quarry_core::session::Session;

use super::{AccessMode, SyncContext, SyncContextFactory, SyncError};

/// Registry of per-key locks shared by all contexts of one factory.
#[derive(Debug, Default)]
struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl KeyedLocks {
    fn lock_for(&self, key: &str) -> Result<Arc<RwLock<()>>, SyncError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| SyncError::new("lock registry poisoned"))?;
        Ok(Arc::clone(
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(RwLock::new(()))),
        ))
    }
}

/// Factory for in-process sync contexts.
///
/// Contexts from the same factory (or clones of it) coordinate with each
/// other; contexts from unrelated factories do not.
#[derive(Debug, Clone, Default)]
pub struct InMemorySyncContextFactory {
    locks: Arc<KeyedLocks>,
}

impl InMemorySyncContextFactory {
    /// Creates a factory with an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SyncContextFactory for InMemorySyncContextFactory {
    fn new_context(&self, _session: &Session, mode: AccessMode) -> Box<dyn SyncContext> {
        Box::new(InMemorySyncContext {
            locks: Arc::clone(&self.locks),
            mode,
            guards: Vec::new(),
        })
    }
}

enum Guard {
    Shared(OwnedRwLockReadGuard<()>),
    Exclusive(OwnedRwLockWriteGuard<()>),
}

struct InMemorySyncContext {
    locks: Arc<KeyedLocks>,
    mode: AccessMode,
    guards: Vec<Guard>,
}

#[async_trait]
impl SyncContext for InMemorySyncContext {
    async fn acquire(&mut self, keys: &[String]) -> Result<(), SyncError> {
        let mut ordered: Vec<&String> = keys.iter().collect();
        ordered.sort();
        ordered.dedup();

        for key in ordered {
            let lock = self.locks.lock_for(key)?;
            let guard = match self.mode {
                AccessMode::Shared => Guard::Shared(lock.read_owned().await),
                AccessMode::Exclusive => Guard::Exclusive(lock.write_owned().await),
            };
            self.guards.push(guard);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.guards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn shared_contexts_coexist() {
        let factory = InMemorySyncContextFactory::new();
        let session = Session::new();

        let mut first = factory.new_context(&session, AccessMode::Shared);
        let mut second = factory.new_context(&session, AccessMode::Shared);

        first.acquire(&keys(&["a"])).await.unwrap();
        second.acquire(&keys(&["a"])).await.unwrap();

        first.close();
        second.close();
    }

    #[tokio::test]
    async fn exclusive_context_waits_for_shared_release() {
        let factory = InMemorySyncContextFactory::new();
        let session = Session::new();

        let subjects = keys(&["a"]);
        let mut shared = factory.new_context(&session, AccessMode::Shared);
        shared.acquire(&subjects).await.unwrap();

        let mut exclusive = factory.new_context(&session, AccessMode::Exclusive);
        let pending = exclusive.acquire(&subjects);
        tokio::pin!(pending);

        assert!(
            tokio::time::timeout(Duration::from_millis(50), &mut pending)
                .await
                .is_err(),
            "exclusive acquisition should block while shared is held"
        );

        shared.close();
        pending.await.unwrap();
    }

    #[tokio::test]
    async fn dropping_a_context_releases_its_keys() {
        let factory = InMemorySyncContextFactory::new();
        let session = Session::new();

        {
            let mut exclusive = factory.new_context(&session, AccessMode::Exclusive);
            exclusive.acquire(&keys(&["a"])).await.unwrap();
        }

        let mut next = factory.new_context(&session, AccessMode::Exclusive);
        next.acquire(&keys(&["a"])).await.unwrap();
    }

    #[tokio::test]
    async fn overlapping_key_sets_do_not_deadlock() {
        let factory = InMemorySyncContextFactory::new();
        let done = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for key_set in [keys(&["a", "b"]), keys(&["b", "a"])] {
            let factory = factory.clone();
            let done = Arc::clone(&done);
            tasks.push(tokio::spawn(async move {
                let session = Session::new();
                for _ in 0..50 {
                    let mut context = factory.new_context(&session, AccessMode::Exclusive);
                    context.acquire(&key_set).await.unwrap();
                    context.close();
                }
                done.fetch_add(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            tokio::time::timeout(Duration::from_secs(5), task)
                .await
                .expect("tasks should finish without deadlocking")
                .unwrap();
        }
        assert_eq!(done.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn duplicate_keys_acquire_once() {
        let factory = InMemorySyncContextFactory::new();
        let session = Session::new();

        let mut context = factory.new_context(&session, AccessMode::Exclusive);
        context.acquire(&keys(&["a", "a", "a"])).await.unwrap();
        context.close();
    }
}
