//! Structural relation between two component sets.

use super::types::ComponentSet;

/// How an entry `b` relates to an entry `a`, seen from `a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kinship {
	/// Same components.
	Sibling,
	/// `b` contains every component of `a`: `b` is derived from `a`.
	Child,
	/// `a` contains every component of `b`.
	Parent,
	Unrelated,
}

/// Classifies `b` relative to `a`. Equality wins over the subset checks.
pub fn classify(a: &ComponentSet, b: &ComponentSet) -> Kinship {
	if a == b {
		Kinship::Sibling
	} else if a.is_subset(b) {
		Kinship::Child
	} else if b.is_subset(a) {
		Kinship::Parent
	} else {
		Kinship::Unrelated
	}
}
