use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Branch tips of one namespace (local heads or one remote's tracking refs).
///
/// Keys are branch short-names such as `main` or `feature/x`; values are the
/// full hex object id at the tip. Iteration is ordered by branch name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchTipSet {
    tips: BTreeMap<String, String>,
}

impl BranchTipSet {
    /// Create an empty tip set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the tip of `branch`, returning the previous tip if one existed.
    pub fn insert(&mut self, branch: impl Into<String>, oid: impl Into<String>) -> Option<String> {
        self.tips.insert(branch.into(), oid.into())
    }

    /// Tip of the given branch, if present.
    #[must_use]
    pub fn get(&self, branch: &str) -> Option<&str> {
        self.tips.get(branch).map(String::as_str)
    }

    /// Whether the set holds a tip for `branch`.
    #[must_use]
    pub fn contains(&self, branch: &str) -> bool {
        self.tips.contains_key(branch)
    }

    /// Number of branches in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tips.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    /// Iterate `(branch, oid)` pairs ordered by branch name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.tips
            .iter()
            .map(|(branch, oid)| (branch.as_str(), oid.as_str()))
    }
}

impl<B, O> FromIterator<(B, O)> for BranchTipSet
where
    B: Into<String>,
    O: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (B, O)>>(iter: I) -> Self {
        Self {
            tips: iter
                .into_iter()
                .map(|(branch, oid)| (branch.into(), oid.into()))
                .collect(),
        }
    }
}

impl IntoIterator for BranchTipSet {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tips.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_is_ordered_by_branch_name() {
        let tips: BranchTipSet = [("zeta", "3"), ("alpha", "1"), ("feature/x", "2")]
            .into_iter()
            .collect();

        let names: Vec<&str> = tips.iter().map(|(branch, _)| branch).collect();
        assert_eq!(names, vec!["alpha", "feature/x", "zeta"]);
    }

    #[test]
    fn equality_compares_keys_and_values() {
        let left: BranchTipSet = [("main", "aaa"), ("dev", "bbb")].into_iter().collect();
        let right: BranchTipSet = [("dev", "bbb"), ("main", "aaa")].into_iter().collect();
        let moved: BranchTipSet = [("dev", "bbb"), ("main", "ccc")].into_iter().collect();

        assert_eq!(left, right);
        assert_ne!(left, moved);
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut tips = BranchTipSet::new();
        tips.insert("main", "0123456789abcdef0123456789abcdef01234567");

        let json = serde_json::to_string(&tips).expect("serialize tips");
        assert_eq!(
            json,
            r#"{"main":"0123456789abcdef0123456789abcdef01234567"}"#
        );
    }
}
