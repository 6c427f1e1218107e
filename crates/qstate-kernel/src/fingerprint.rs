//! Structural fingerprints of state trees.
//!
//! A fingerprint hashes what a tree *is*: node kinds, canonical names,
//! the querier names of leaves, and the fingerprints of children in
//! declared order. Ids and cache contents never contribute, so rebuilding
//! the same tree yields the same fingerprint.
//!
//! Each node is hashed from canonical JSON (sorted keys, no whitespace),
//! which makes the hash Merkle-style: a parent only reads its children's
//! memoized fingerprints.

use crate::state::State;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::fmt;

/// Prefix marking the fingerprint scheme version.
pub const FINGERPRINT_PREFIX: &str = "st1_";

/// A content-addressed hash identifying the structure of a state tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Hash raw bytes under the current scheme prefix.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{FINGERPRINT_PREFIX}{hash:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the fingerprint of one node from its own identity material
/// and its children's fingerprints.
pub(crate) fn structure_hash(state: &State) -> ContentHash {
    let children: Vec<&str> = state
        .children()
        .iter()
        .map(|child| child.fingerprint().as_str())
        .collect();

    let mut material = json!({
        "kind": state.kind(),
        "canonicalName": state.canonical_name(),
        "children": children,
    });
    if let (State::Fundamental(leaf), Value::Object(map)) = (state, &mut material) {
        map.insert(
            "querier".to_string(),
            Value::String(leaf.querier().name().to_string()),
        );
    }

    ContentHash::from_bytes(&canonical_json_bytes(&material))
}

fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Array(items) => {
            let mut out = vec![b'['];
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                out.extend(canonical_json_bytes(item));
            }
            out.push(b']');
            out
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut out = vec![b'{'];
            for (idx, key) in keys.iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                out.extend(canonical_json_bytes(&Value::String((*key).clone())));
                out.push(b':');
                out.extend(canonical_json_bytes(&map[key.as_str()]));
            }
            out.push(b'}');
            out
        }
        scalar => scalar.to_string().into_bytes(),
    }
}
