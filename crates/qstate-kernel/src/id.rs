//! Identifiers for states and queriers.
//!
//! States carry a random UUID so ids stay unique no matter how quickly
//! they are constructed. Queriers use a process-local counter: their id
//! is only an identity key for deduplicating cache flushes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Opaque unique identifier assigned to every state at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(Uuid);

impl StateId {
    /// A fresh, random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static NEXT_QUERIER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a querier object within this process.
///
/// Two queriers with the same name and an equivalent method still get
/// different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuerierId(u64);

impl QuerierId {
    pub(crate) fn next() -> Self {
        Self(NEXT_QUERIER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QuerierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}
