//! Memoizing wrappers around external fetch operations.
//!
//! A [`Querier`] owns one zero-argument method and at most one cached
//! result. Queriers are shared between states through `Arc`, and states
//! only see them through the object-safe [`AnyQuerier`] view when they
//! need to flush caches without knowing the result type.

use crate::error::{BoxError, QueryError};
use crate::id::QuerierId;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Name given to queriers built without one.
pub const DEFAULT_QUERIER_NAME: &str = "Unnamed Querier";

type Method<T> = Box<dyn Fn() -> Result<T, BoxError> + Send + Sync>;

struct Cached<T> {
    value: T,
    fetched_at: DateTime<Utc>,
}

/// A named, memoizing wrapper around a data-fetch operation.
///
/// The cache is guarded by a mutex that is held across the fetch, so a
/// concurrent `clear` sees either the old value or the new one. A method
/// must not query its own querier.
pub struct Querier<T> {
    id: QuerierId,
    name: String,
    method: Method<T>,
    cache: Mutex<Option<Cached<T>>>,
}

impl<T: Clone + Send> Querier<T> {
    /// Wrap a method that may fail.
    pub fn new<F>(name: impl Into<String>, method: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            id: QuerierId::next(),
            name: name.into(),
            method: Box::new(method),
            cache: Mutex::new(None),
        }
    }

    /// Wrap a method that always produces a value.
    pub fn infallible<F>(name: impl Into<String>, method: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(name, move || Ok(method()))
    }

    /// Wrap a method under [`DEFAULT_QUERIER_NAME`].
    pub fn unnamed<F>(method: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::new(DEFAULT_QUERIER_NAME, method)
    }

    /// Move into an `Arc` so several states can share this querier.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn id(&self) -> QuerierId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the cached value, fetching it first if there is none.
    ///
    /// With `use_cache == false` the cache is cleared before looking, so
    /// the method always runs. A failing method leaves the cache as it
    /// was at that point.
    pub fn query(&self, use_cache: bool) -> Result<T, QueryError> {
        self.lookup(use_cache).map(|(value, _)| value)
    }

    /// Like [`Querier::query`], also reporting whether the cache served
    /// the value.
    pub(crate) fn lookup(&self, use_cache: bool) -> Result<(T, bool), QueryError> {
        let mut cache = self.lock_cache();
        if !use_cache && cache.take().is_some() {
            tracing::trace!(querier = %self.name, "cache bypassed");
        }

        if let Some(hit) = cache.as_ref() {
            tracing::trace!(querier = %self.name, "cache hit");
            return Ok((hit.value.clone(), true));
        }

        tracing::debug!(querier = %self.name, id = %self.id, "fetching");
        let value = (self.method)().map_err(|source| QueryError {
            querier: self.name.clone(),
            source,
        })?;
        *cache = Some(Cached {
            value: value.clone(),
            fetched_at: Utc::now(),
        });
        Ok((value, false))
    }

    /// Discard the cached value. Idempotent.
    pub fn clear(&self) {
        if self.lock_cache().take().is_some() {
            tracing::trace!(querier = %self.name, "cache cleared");
        }
    }

    pub fn is_cached(&self) -> bool {
        self.lock_cache().is_some()
    }

    /// When the cached value was fetched, if there is one.
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.lock_cache().as_ref().map(|c| c.fetched_at)
    }

    /// The cached value, without ever running the method.
    pub fn peek(&self) -> Option<T> {
        self.lock_cache().as_ref().map(|c| c.value.clone())
    }

    fn lock_cache(&self) -> MutexGuard<'_, Option<Cached<T>>> {
        // The cache is only written after a successful fetch, so a panic
        // inside a method cannot leave a partial value behind.
        self.cache.lock().unwrap_or_else(|poisoned| {
            tracing::warn!(querier = %self.name, "recovering poisoned querier cache");
            poisoned.into_inner()
        })
    }
}

impl<T: Clone + Send + fmt::Display> fmt::Display for Querier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.query(true) {
            Ok(value) => write!(f, "{}:\n{}", self.name, value),
            Err(err) => write!(f, "{}:\n<{}>", self.name, err),
        }
    }
}

impl<T> fmt::Debug for Querier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Querier '{}'>", self.name)
    }
}

/// Type-erased view of a querier, enough to identify and flush it.
pub trait AnyQuerier: Send + Sync {
    fn id(&self) -> QuerierId;

    fn name(&self) -> &str;

    /// Discard the cached value.
    fn clear(&self);

    fn is_cached(&self) -> bool;
}

impl<T: Clone + Send> AnyQuerier for Querier<T> {
    fn id(&self) -> QuerierId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn clear(&self) {
        Querier::clear(self);
    }

    fn is_cached(&self) -> bool {
        Querier::is_cached(self)
    }
}

impl fmt::Debug for dyn AnyQuerier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Querier '{}'>", self.name())
    }
}
