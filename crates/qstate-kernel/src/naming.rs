//! Canonical names.
//!
//! A canonical name is the display name lower-cased, stripped of every
//! character that is neither a word character nor a space, with each run
//! of spaces collapsed into a single underscore:
//!
//! ```text
//! "Always True State"     → "always_true_state"
//! "A__State Name _ A # "  → "a__state_name___a_"
//! ```

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w ]").expect("static pattern compiles"));

static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("static pattern compiles"));

/// Derive the canonical form of a display name.
///
/// Pure and deterministic. States call this at most once and memoize the
/// result.
pub fn canonicalize(name: &str) -> String {
    #[cfg(test)]
    counter::bump();

    let lowered = name.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    SPACE_RUN.replace_all(&stripped, "_").into_owned()
}
