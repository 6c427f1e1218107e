//! Inspection options.
//!
//! The caching flag decides whether a call may be served from querier
//! caches. The evaluation policy decides whether disjunctions and
//! conjunctions stop at the first deciding child.

use serde::{Deserialize, Serialize};

/// How OR / AND nodes walk their children.
///
/// Children are always visited left to right. Under `ShortCircuit` an OR
/// stops at the first `true` and an AND at the first `false`; under
/// `Exhaustive` every child is inspected, so every side-effecting
/// querier in the tree runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EvalPolicy {
    #[default]
    ShortCircuit,
    Exhaustive,
}

impl std::fmt::Display for EvalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShortCircuit => write!(f, "short_circuit"),
            Self::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

impl std::str::FromStr for EvalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "short_circuit" | "lazy" => Ok(Self::ShortCircuit),
            "exhaustive" | "eager" | "all" => Ok(Self::Exhaustive),
            _ => Err(format!("unknown evaluation policy: {s}")),
        }
    }
}

/// Options for one inspection of a state tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct InspectOptions {
    /// Serve querier results from cache when present. When false, every
    /// querier in the subtree is flushed before evaluating.
    pub use_cache: bool,

    pub policy: EvalPolicy,
}

impl InspectOptions {
    pub fn cached() -> Self {
        Self::default()
    }

    /// Flush the subtree before evaluating.
    pub fn fresh() -> Self {
        Self {
            use_cache: false,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: EvalPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            policy: EvalPolicy::ShortCircuit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parse() {
        assert_eq!(
            "short-circuit".parse::<EvalPolicy>().unwrap(),
            EvalPolicy::ShortCircuit
        );
        assert_eq!(
            "Exhaustive".parse::<EvalPolicy>().unwrap(),
            EvalPolicy::Exhaustive
        );
        assert!("sometimes".parse::<EvalPolicy>().is_err());
    }

    #[test]
    fn policy_display_round_trips() {
        for policy in [EvalPolicy::ShortCircuit, EvalPolicy::Exhaustive] {
            assert_eq!(policy.to_string().parse::<EvalPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: InspectOptions = serde_json::from_str(r#"{"policy":"exhaustive"}"#).unwrap();
        assert!(opts.use_cache);
        assert_eq!(opts.policy, EvalPolicy::Exhaustive);

        let opts: InspectOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, InspectOptions::cached());
    }

    #[test]
    fn fresh_disables_cache() {
        let opts = InspectOptions::fresh().with_policy(EvalPolicy::Exhaustive);
        assert!(!opts.use_cache);
        assert_eq!(opts.policy, EvalPolicy::Exhaustive);
    }
}
