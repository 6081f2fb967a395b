//! Process-wide cache of built indexes, keyed by source.
//!
//! The cache holds at most one index per [`CacheKey`]. A miss starts a build
//! future that is shared through the in-flight table, so concurrent callers
//! for the same key await one build instead of starting their own. Callers
//! for different keys never wait on each other's builds.
//!
//! Only a completed, successful build is ever published as a [`CacheEntry`].
//! A failed build is dropped from the in-flight table and the next request
//! starts over. When the last caller awaiting a build is cancelled, the build
//! is dropped with it; the next caller for that key starts a fresh one.

use crate::error::DocsError;
use crate::source::{CacheKey, SourceRef};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{Mutex, RwLock};

/// Type alias for shared index build futures.
type SharedBuild<I> = Shared<BoxFuture<'static, Result<Arc<I>, DocsError>>>;

type InFlight<I> = Mutex<HashMap<CacheKey, SharedBuild<I>>>;

/// Whether some caller other than the in-flight table still holds `build`.
///
/// A build nobody awaits never makes progress, so it is not worth joining.
fn has_waiters<I>(build: &SharedBuild<I>) -> bool {
    build.strong_count().is_some_and(|count| count > 1)
}

/// One caller's handles on an in-flight build.
///
/// `build` identifies the table entry and is never polled; `pending` is the
/// clone being awaited. Dropping the guard before [`WaiterGuard::disarm`]
/// means the caller was cancelled. If it was the last waiter, the build is
/// removed from the in-flight table, which drops the pipeline future.
struct WaiterGuard<'a, I> {
    in_flight: &'a InFlight<I>,
    key: CacheKey,
    build: SharedBuild<I>,
    pending: SharedBuild<I>,
    armed: bool,
}

impl<I> WaiterGuard<'_, I> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<I> Drop for WaiterGuard<'_, I> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Contended: another caller is joining or committing. A build left
        // behind here is replaced by the next caller (see `has_waiters`).
        let Ok(mut in_flight) = self.in_flight.try_lock() else {
            return;
        };
        // A completed `pending` has released its handle.
        let held = if self.pending.strong_count().is_some() { 2 } else { 1 };
        let abandoned = in_flight.get(&self.key).is_some_and(|current| {
            current.ptr_eq(&self.build) && self.build.strong_count() == Some(1 + held)
        });
        if abandoned {
            in_flight.remove(&self.key);
            tracing::debug!("Dropped abandoned index build for key {}", self.key);
        }
    }
}

/// A resident index together with its source.
#[derive(Debug)]
pub struct CacheEntry<I> {
    source: SourceRef,
    index: Arc<I>,
    created_at: SystemTime,
}

impl<I> CacheEntry<I> {
    pub fn key(&self) -> CacheKey {
        self.source.key()
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    pub fn index(&self) -> &Arc<I> {
        &self.index
    }

    /// When the index was published; diagnostics only.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

/// Build-or-reuse cache for per-source indexes.
pub struct IndexCache<I> {
    /// Published indexes
    entries: RwLock<HashMap<CacheKey, Arc<CacheEntry<I>>>>,

    /// In-flight build futures (can be awaited by multiple callers)
    in_flight: InFlight<I>,
}

impl<I> std::fmt::Debug for IndexCache<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCache")
            .field(
                "entries",
                &self.entries.try_read().map(|e| e.len()).unwrap_or_default(),
            )
            .field(
                "in_flight",
                &self.in_flight.try_lock().map(|f| f.len()).unwrap_or_default(),
            )
            .finish()
    }
}

impl<I> Default for IndexCache<I> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }
}

impl<I: Send + Sync + 'static> IndexCache<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index for `source`, building it with `build` on a miss.
    ///
    /// `build` is invoked at most once per miss; callers arriving while that
    /// build runs share its outcome. Errors are returned to every waiter and
    /// leave nothing cached.
    pub async fn get_or_build<F, Fut>(&self, source: &SourceRef, build: F) -> Result<Arc<I>, DocsError>
    where
        F: FnOnce(SourceRef) -> Fut,
        Fut: Future<Output = Result<I, DocsError>> + Send + 'static,
    {
        let key = source.key();

        // 1. Check published entries first
        if let Some(index) = self.lookup(key).await {
            tracing::debug!("Cache hit for {}", source);
            return Ok(index);
        }

        // 2. Join an in-flight build or start one. The entry check is repeated
        //    under the in-flight lock because a build may have been committed
        //    since step 1.
        let build_future = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(index) = self.lookup(key).await {
                tracing::debug!("Cache hit for {}", source);
                return Ok(index);
            }

            match in_flight.get(&key).filter(|future| has_waiters(future)) {
                Some(future) => {
                    tracing::debug!("Awaiting in-flight build for {}", source);
                    future.clone()
                }
                None => {
                    tracing::info!("Starting index build for {}", source);
                    let future: BoxFuture<'static, Result<Arc<I>, DocsError>> =
                        build(source.clone()).map(|result| result.map(Arc::new)).boxed();
                    let shared = future.shared();
                    in_flight.insert(key, shared.clone());
                    shared
                }
            }
        };

        // 3. Await the result
        let mut guard = WaiterGuard {
            in_flight: &self.in_flight,
            key,
            pending: build_future.clone(),
            build: build_future,
            armed: true,
        };
        let result = (&mut guard.pending).await;

        // 4. Commit: the first waiter to get here publishes (on success) and
        //    retires the in-flight future; later waiters find it already gone.
        {
            let mut in_flight = self.in_flight.lock().await;
            guard.disarm();
            let ours = in_flight
                .get(&key)
                .is_some_and(|current| current.ptr_eq(&guard.build));
            if ours {
                in_flight.remove(&key);
                match &result {
                    Ok(index) => {
                        let entry = CacheEntry {
                            source: source.clone(),
                            index: Arc::clone(index),
                            created_at: SystemTime::now(),
                        };
                        self.entries.write().await.insert(key, Arc::new(entry));
                        tracing::debug!("Cached index for {}", source);
                    }
                    Err(e) => {
                        tracing::warn!("Index build for {} failed: {}", source, e);
                    }
                }
            }
        }

        result
    }

    async fn lookup(&self, key: CacheKey) -> Option<Arc<I>> {
        self.entries
            .read()
            .await
            .get(&key)
            .map(|entry| Arc::clone(&entry.index))
    }

    /// Removes the entry for `source` so the next request rebuilds it.
    ///
    /// Returns whether an entry was present. A build already in flight is not
    /// affected and will publish when it completes.
    pub async fn invalidate(&self, source: &SourceRef) -> bool {
        let removed = self.entries.write().await.remove(&source.key()).is_some();
        if removed {
            tracing::info!("Invalidated cached index for {}", source);
        }
        removed
    }

    /// Get a cached index without triggering a build.
    pub async fn get_cached(&self, source: &SourceRef) -> Option<Arc<I>> {
        self.lookup(source.key()).await
    }

    /// Check if an index is cached for a source.
    pub async fn is_cached(&self, source: &SourceRef) -> bool {
        self.entries.read().await.contains_key(&source.key())
    }

    /// Check if a build is in progress for a source.
    pub async fn is_building(&self, source: &SourceRef) -> bool {
        self.in_flight
            .lock()
            .await
            .get(&source.key())
            .is_some_and(has_waiters)
    }

    /// Snapshot of all published entries, oldest first.
    pub async fn entries(&self) -> Vec<Arc<CacheEntry<I>>> {
        let mut entries: Vec<_> = self.entries.read().await.values().cloned().collect();
        entries.sort_by_key(|entry| (entry.created_at, entry.key()));
        entries
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
