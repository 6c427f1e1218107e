//! Evaluation reports.
//!
//! [`State::explain`](crate::State::explain) records every node it
//! visits. The report mirrors the evaluated part of the tree: children
//! skipped by short-circuiting appear only by canonical name in
//! `skipped`.

use crate::state::StateKind;
use serde::{Deserialize, Serialize};

/// One evaluated node and its evaluated children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub name: String,
    pub canonical_name: String,
    pub kind: StateKind,
    pub value: bool,

    /// Name of the querier consulted (leaves only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub querier: Option<String>,

    /// Whether the querier served a cached value (leaves only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Evaluation>,

    /// Canonical names of children never inspected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl Evaluation {
    /// All evaluated leaves, depth-first.
    pub fn leaves(&self) -> Vec<&Evaluation> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Evaluation>) {
        if self.kind == StateKind::Fundamental {
            out.push(self);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// Number of leaf reads that ran their querier's method.
    pub fn fetch_count(&self) -> usize {
        self.leaves()
            .iter()
            .filter(|leaf| leaf.cache_hit == Some(false))
            .count()
    }
}
