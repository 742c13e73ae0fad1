//! # Query cache: keyed results with staleness and invalidation
//!
//! [`QueryClient`] is the client-side cache that sits between the UI and the
//! backend. Reads go through [`QueryClient::fetch`], which returns cached data
//! while it is fresh and otherwise runs the supplied fetcher. Writes elsewhere in
//! the app call [`QueryClient::invalidate`] with a key prefix; matching entries
//! keep their data (so the UI can keep rendering it) but are no longer fresh, and
//! the client's revision counter moves forward so observers know to refetch.
//!
//! ## Keys
//!
//! A [`QueryKey`] is an ordered list of segments, compared by prefix:
//!
//! | Key | Holds |
//! |-----|-------|
//! | `["user"]` | the current user |
//! | `["dashboard-tasks", <user id>]` | that user's task list |
//!
//! Invalidating `["dashboard-tasks"]` hits every user's list; invalidating
//! `["dashboard-tasks", id]` hits one.
//!
//! ## Freshness
//!
//! An entry is fresh when it has not been invalidated and is younger than
//! [`QueryOptions::stale_time`] (five minutes by default). Timestamps use
//! `chrono::Utc::now()`, which works on both native and wasm targets.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Ordered cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether `prefix` matches the leading segments of this key.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<&str> for QueryKey {
    fn from(segment: &str) -> Self {
        Self(vec![segment.to_string()])
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Cache behaviour shared by every query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryOptions {
    pub stale_time: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::minutes(5),
        }
    }
}

struct Entry {
    data: Arc<dyn Any + Send + Sync>,
    fetched_at: DateTime<Utc>,
    invalidated: bool,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    fetch_counts: HashMap<QueryKey, u64>,
    /// Revision at which each prefix was last invalidated, removed or cleared.
    invalidated_at: HashMap<QueryKey, u64>,
    revision: u64,
}

impl Inner {
    fn bump(&mut self, prefix: &QueryKey) {
        self.revision += 1;
        self.invalidated_at.insert(prefix.clone(), self.revision);
    }

    fn invalidated_since(&self, key: &QueryKey, revision: u64) -> bool {
        self.invalidated_at
            .iter()
            .any(|(prefix, at)| *at > revision && key.starts_with(prefix))
    }
}

/// Shared, cloneable query cache.
#[derive(Clone, Default)]
pub struct QueryClient {
    inner: Arc<Mutex<Inner>>,
    options: QueryOptions,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: QueryOptions) -> Self {
        Self {
            inner: Arc::default(),
            options,
        }
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached data for `key`, fresh or not.
    pub fn get<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.lock()
            .entries
            .get(key)
            .and_then(|entry| entry.data.downcast_ref::<T>().cloned())
    }

    /// Cached data for `key` only while it is fresh.
    pub fn get_fresh<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let now = Utc::now();
        let inner = self.lock();
        let entry = inner.entries.get(key)?;
        if entry.invalidated || now - entry.fetched_at >= self.options.stale_time {
            return None;
        }
        entry.data.downcast_ref::<T>().cloned()
    }

    pub fn set<T: Send + Sync + 'static>(&self, key: QueryKey, data: T) {
        self.lock().entries.insert(
            key,
            Entry {
                data: Arc::new(data),
                fetched_at: Utc::now(),
                invalidated: false,
            },
        );
    }

    /// Whether an entry exists for `key` and has been invalidated since its last fetch.
    pub fn is_invalidated(&self, key: &QueryKey) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|entry| entry.invalidated)
    }

    /// Return fresh cached data or run `fetcher` and cache its result.
    ///
    /// The cache lock is not held while the fetcher runs. A failed fetch leaves
    /// any existing entry untouched.
    pub async fn fetch<T, E, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(data) = self.get_fresh::<T>(key) {
            return Ok(data);
        }
        self.refetch(key, fetcher).await
    }

    /// Run `fetcher` unconditionally and cache its result.
    ///
    /// If `key` is invalidated while the fetcher runs, the result is still
    /// cached but stays invalidated so the next read fetches again.
    pub async fn refetch<T, E, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let started = {
            let mut inner = self.lock();
            *inner.fetch_counts.entry(key.clone()).or_default() += 1;
            inner.revision
        };
        tracing::debug!("Fetching query {key}");
        let data = fetcher().await?;

        let mut inner = self.lock();
        let superseded = inner.invalidated_since(key, started);
        if superseded {
            tracing::debug!("Query {key} was invalidated while fetching");
        }
        inner.entries.insert(
            key.clone(),
            Entry {
                data: Arc::new(data.clone()),
                fetched_at: Utc::now(),
                invalidated: superseded,
            },
        );
        Ok(data)
    }

    /// Mark every entry under `prefix` as invalidated. Returns how many matched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.lock();
        let mut matched = 0;
        for (key, entry) in inner.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                matched += 1;
            }
        }
        inner.bump(prefix);
        tracing::debug!("Invalidated {matched} queries under {prefix}");
        matched
    }

    /// Drop every entry under `prefix`.
    pub fn remove(&self, prefix: &QueryKey) {
        let mut inner = self.lock();
        inner.entries.retain(|key, _| !key.starts_with(prefix));
        inner.bump(prefix);
    }

    /// Drop everything, e.g. on sign-out.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.bump(&QueryKey::new(Vec::<String>::new()));
    }

    /// Monotonic counter bumped on every invalidation or removal.
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Number of times a fetcher has run for `key`.
    pub fn fetch_count(&self, key: &QueryKey) -> u64 {
        self.lock().fetch_counts.get(key).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks_key(user: &str) -> QueryKey {
        QueryKey::new(["dashboard-tasks", user])
    }

    #[test]
    fn test_key_prefix_matching() {
        let key = tasks_key("u1");
        assert!(key.starts_with(&QueryKey::from("dashboard-tasks")));
        assert!(key.starts_with(&key));
        assert!(!key.starts_with(&tasks_key("u2")));
        assert!(!QueryKey::from("user").starts_with(&key));
        assert_eq!(key.to_string(), "[dashboard-tasks, u1]");
    }

    #[tokio::test]
    async fn test_fetch_uses_cache_while_fresh() {
        let client = QueryClient::new();
        let key = tasks_key("u1");

        let first: Result<Vec<u32>, ()> = client.fetch(&key, || async { Ok(vec![1, 2]) }).await;
        assert_eq!(first, Ok(vec![1, 2]));

        let second: Result<Vec<u32>, ()> = client.fetch(&key, || async { Ok(vec![9]) }).await;
        assert_eq!(second, Ok(vec![1, 2]));
        assert_eq!(client.fetch_count(&key), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let client = QueryClient::new();
        let key = tasks_key("u1");
        client.set(key.clone(), vec![1u32]);
        let before = client.revision();

        assert_eq!(client.invalidate(&QueryKey::from("dashboard-tasks")), 1);
        assert!(client.is_invalidated(&key));
        assert!(client.revision() > before);
        // Stale data is still readable.
        assert_eq!(client.get::<Vec<u32>>(&key), Some(vec![1]));
        assert_eq!(client.get_fresh::<Vec<u32>>(&key), None);

        let refetched: Result<Vec<u32>, ()> =
            client.fetch(&key, || async { Ok(vec![1, 2]) }).await;
        assert_eq!(refetched, Ok(vec![1, 2]));
        assert!(!client.is_invalidated(&key));
        assert_eq!(client.fetch_count(&key), 1);
    }

    #[tokio::test]
    async fn test_invalidate_is_scoped_to_prefix() {
        let client = QueryClient::new();
        client.set(tasks_key("u1"), 1u8);
        client.set(tasks_key("u2"), 2u8);
        client.set(QueryKey::from("user"), 3u8);

        assert_eq!(client.invalidate(&tasks_key("u1")), 1);
        assert!(client.is_invalidated(&tasks_key("u1")));
        assert!(!client.is_invalidated(&tasks_key("u2")));
        assert!(!client.is_invalidated(&QueryKey::from("user")));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_entry() {
        let client = QueryClient::new();
        let key = QueryKey::from("user");
        client.set(key.clone(), "alice".to_string());
        client.invalidate(&key);

        let result: Result<String, &str> = client.fetch(&key, || async { Err("offline") }).await;
        assert_eq!(result, Err("offline"));
        assert_eq!(client.get::<String>(&key).as_deref(), Some("alice"));
        assert!(client.is_invalidated(&key));
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_refetches() {
        let client = QueryClient::with_options(QueryOptions {
            stale_time: Duration::zero(),
        });
        let key = QueryKey::from("user");

        let _: Result<u8, ()> = client.fetch(&key, || async { Ok(1) }).await;
        let second: Result<u8, ()> = client.fetch(&key, || async { Ok(2) }).await;
        assert_eq!(second, Ok(2));
        assert_eq!(client.fetch_count(&key), 2);
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_keeps_entry_stale() {
        let client = QueryClient::new();
        let key = tasks_key("u1");

        let inner = client.clone();
        let first: Result<Vec<u32>, ()> = client
            .fetch(&key, || async move {
                // a create lands while the list is loading
                inner.invalidate(&QueryKey::from("dashboard-tasks"));
                Ok(vec![1])
            })
            .await;
        assert_eq!(first, Ok(vec![1]));
        assert!(client.is_invalidated(&key));
        assert_eq!(client.get_fresh::<Vec<u32>>(&key), None);

        let second: Result<Vec<u32>, ()> =
            client.fetch(&key, || async { Ok(vec![1, 2]) }).await;
        assert_eq!(second, Ok(vec![1, 2]));
        assert!(!client.is_invalidated(&key));
        assert_eq!(client.fetch_count(&key), 2);
    }

    #[tokio::test]
    async fn test_unrelated_invalidation_during_fetch_is_ignored() {
        let client = QueryClient::new();
        let key = tasks_key("u1");

        let inner = client.clone();
        let _: Result<u8, ()> = client
            .fetch(&key, || async move {
                inner.invalidate(&QueryKey::from("user"));
                inner.invalidate(&tasks_key("u2"));
                Ok(1)
            })
            .await;
        assert!(!client.is_invalidated(&key));
        assert_eq!(client.get_fresh::<u8>(&key), Some(1));
    }

    #[tokio::test]
    async fn test_clear_during_fetch_keeps_entry_stale() {
        let client = QueryClient::new();
        let key = QueryKey::from("user");

        let inner = client.clone();
        let _: Result<u8, ()> = client
            .fetch(&key, || async move {
                inner.clear();
                Ok(1)
            })
            .await;
        assert!(client.is_invalidated(&key));
    }

    #[test]
    fn test_clear_and_remove() {
        let client = QueryClient::new();
        client.set(tasks_key("u1"), 1u8);
        client.set(QueryKey::from("user"), 2u8);

        client.remove(&QueryKey::from("dashboard-tasks"));
        assert_eq!(client.get::<u8>(&tasks_key("u1")), None);
        assert_eq!(client.get::<u8>(&QueryKey::from("user")), Some(2));

        client.clear();
        assert_eq!(client.get::<u8>(&QueryKey::from("user")), None);
    }

    #[test]
    fn test_wrong_type_reads_as_none() {
        let client = QueryClient::new();
        client.set(QueryKey::from("user"), 7u8);
        assert_eq!(client.get::<String>(&QueryKey::from("user")), None);
    }
}
