//! Fuzzy subsequence matching used by task search.
//!
//! A query matches a target when every character of the query appears in the
//! target in the same order, not necessarily adjacent. Characters are
//! consumed greedily left to right, so the test is linear in the target
//! length. This is not an edit-distance or token match.

/// Returns `true` if `query` is a subsequence of `target`.
///
/// The empty query matches every target.
pub fn is_subsequence(query: &str, target: &str) -> bool {
    let mut remaining = target.chars();
    query
        .chars()
        .all(|wanted| remaining.by_ref().any(|candidate| candidate == wanted))
}

/// Case-insensitive variant of [`is_subsequence`].
pub fn matches(query: &str, target: &str) -> bool {
    is_subsequence(&fold_case(query), &fold_case(target))
}

/// Lowercases each character on its own. `str::to_lowercase` picks the final
/// form of sigma by position, which would make `Σ` fold differently in a
/// query than at the end of a word in a task name.
fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}
