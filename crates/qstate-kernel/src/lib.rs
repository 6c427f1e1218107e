//! # qstate Kernel
//!
//! Boolean states as cached, composable predicates over external
//! observations.
//!
//! A fundamental state reads one [`Querier`] and reduces the raw value to
//! a boolean. Composite states combine other states with NOT, OR and AND.
//! Every querier caches its last result; any node can flush the caches of
//! its whole subtree in one call.
//!
//! ## Architecture
//!
//! ```text
//! Querier<T>            ← named fetch method + at most one cached value
//!     │
//! FundamentalState      ← querier + evaluator: T → bool
//!     │
//! State                 ← Fundamental | Composite(Negation, Disjunction, Conjunction)
//!     │
//! Evaluation            ← serializable trace of one inspection
//! ```
//!
//! ## Example
//!
//! ```
//! use qstate_kernel::{FundamentalState, Querier, State};
//!
//! let disk = Querier::infallible("Disk Usage", || 0.93_f64).shared();
//! let full = FundamentalState::new("Disk Full", disk, |used: &f64| *used > 0.9);
//! let healthy = State::negation(full);
//!
//! assert_eq!(healthy.name(), "NOT Disk Full");
//! assert_eq!(healthy.canonical_name(), "not_disk_full");
//! assert!(!healthy.inspect(true).unwrap());
//! ```

pub mod error;
pub mod fingerprint;
pub mod id;
pub mod naming;
pub mod policy;
pub mod querier;
pub mod report;
pub mod state;
pub mod truthy;

pub use error::{BoxError, QueryError, StateError};
pub use fingerprint::ContentHash;
pub use id::{QuerierId, StateId};
pub use naming::canonicalize;
pub use policy::{EvalPolicy, InspectOptions};
pub use querier::{AnyQuerier, DEFAULT_QUERIER_NAME, Querier};
pub use report::Evaluation;
pub use state::{CompositeKind, CompositeState, FundamentalState, State, StateKind};
pub use truthy::Truthy;
