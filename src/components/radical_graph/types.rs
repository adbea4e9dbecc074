use std::collections::BTreeSet;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use super::error::Result;

/// Position or displacement in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
	pub x: f64,
	pub y: f64,
}

impl Vec2 {
	pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn length_squared(self) -> f64 {
		self.x * self.x + self.y * self.y
	}

	pub fn length(self) -> f64 {
		self.length_squared().sqrt()
	}

	pub fn distance(self, other: Self) -> f64 {
		(self - other).length()
	}
}

impl Add for Vec2 {
	type Output = Self;
	fn add(self, rhs: Self) -> Self {
		Self::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl AddAssign for Vec2 {
	fn add_assign(&mut self, rhs: Self) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl Sub for Vec2 {
	type Output = Self;
	fn sub(self, rhs: Self) -> Self {
		Self::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl SubAssign for Vec2 {
	fn sub_assign(&mut self, rhs: Self) {
		self.x -= rhs.x;
		self.y -= rhs.y;
	}
}

impl Mul<f64> for Vec2 {
	type Output = Self;
	fn mul(self, k: f64) -> Self {
		Self::new(self.x * k, self.y * k)
	}
}

impl Div<f64> for Vec2 {
	type Output = Self;
	fn div(self, k: f64) -> Self {
		Self::new(self.x / k, self.y / k)
	}
}

/// Unordered set of component tokens ("radicals") of one entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentSet(BTreeSet<String>);

impl ComponentSet {
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn is_subset(&self, other: &Self) -> bool {
		self.0.is_subset(&other.0)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}

impl<S: Into<String>> FromIterator<S> for ComponentSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

/// Static, read-only mapping from entry id to its components.
///
/// Cloning shares the underlying table; iteration follows insertion order so
/// expansion discovers neighbors deterministically.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(from = "IndexMap<String, Vec<String>>")]
pub struct ReferenceData {
	entries: Arc<IndexMap<String, Arc<ComponentSet>>>,
}

impl ReferenceData {
	/// Builds the dataset from `(id, components)` pairs; later duplicates win.
	pub fn from_entries<I, C, S>(entries: I) -> Self
	where
		I: IntoIterator<Item = (S, C)>,
		C: IntoIterator,
		C::Item: Into<String>,
		S: Into<String>,
	{
		let entries = entries
			.into_iter()
			.map(|(id, components)| {
				let set: ComponentSet = components.into_iter().collect();
				(id.into(), Arc::new(set))
			})
			.collect();
		Self {
			entries: Arc::new(entries),
		}
	}

	/// Parses a JSON object of the form `{ "亜": ["｜", "一", "口"], ... }`.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Parses KRADFILE text: `<kanji> : <radical> <radical> ...` per line.
	pub fn from_kradfile(text: &str) -> Self {
		let entries = text
			.lines()
			.map(str::trim)
			.filter(|line| !line.is_empty() && !line.starts_with('#'))
			.filter_map(|line| line.split_once(" : "))
			.map(|(kanji, radicals)| (kanji.trim(), radicals.split_whitespace()));
		Self::from_entries(entries)
	}

	pub fn get(&self, id: &str) -> Option<&Arc<ComponentSet>> {
		self.entries.get(id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.entries.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<ComponentSet>)> {
		self.entries.iter().map(|(id, set)| (id.as_str(), set))
	}
}

impl From<IndexMap<String, Vec<String>>> for ReferenceData {
	fn from(raw: IndexMap<String, Vec<String>>) -> Self {
		Self::from_entries(raw)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disclosure {
	/// Hinted at as a neighbor of a confirmed node.
	Preview,
	/// Fully revealed; its own neighbors have been discovered.
	Confirmed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
	Root,
	Standard,
}

/// Stored link relation. `Parent` discoveries are canonicalized into `Child`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkRelation {
	Sibling,
	Child,
}

/// Link between two live nodes. For `Child`, `from` has fewer components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
	pub from: String,
	pub to: String,
	pub relation: LinkRelation,
}

impl Link {
	pub fn touches(&self, id: &str) -> bool {
		self.from == id || self.to == id
	}

	/// The endpoint opposite `id`, if `id` is an endpoint.
	pub fn other(&self, id: &str) -> Option<&str> {
		if self.from == id {
			Some(&self.to)
		} else if self.to == id {
			Some(&self.from)
		} else {
			None
		}
	}
}

/// Details handed to the host when selection changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedEntry {
	pub id: String,
	pub components: Vec<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kradfile_lines_are_parsed_and_comments_skipped() {
		let text = "# KRADFILE\n\n亜 : ｜ 一 口\n唖 : ｜ 一 口 口\nbroken line\n";
		let data = ReferenceData::from_kradfile(text);
		assert_eq!(data.len(), 2);
		let a = data.get("亜").unwrap();
		assert_eq!(a.iter().collect::<Vec<_>>(), vec!["一", "口", "｜"]);
		// duplicate tokens collapse into one component
		assert_eq!(data.get("唖").unwrap().len(), 3);
	}

	#[test]
	fn bundled_sample_loads() {
		let data = ReferenceData::from_kradfile(include_str!("../../../data/sample_kradfile.txt"));
		assert_eq!(data.len(), 56);
		assert_eq!(data.get("悪").unwrap().len(), 4);
		assert_eq!(data.get("｜").unwrap().iter().collect::<Vec<_>>(), vec!["｜"]);
		assert_eq!(data.iter().next().map(|(id, _)| id), Some("亜"));
	}

	#[test]
	fn json_reference_keeps_insertion_order() {
		let data = ReferenceData::from_json(r#"{"B": ["x", "y", "z"], "A": ["x", "y"]}"#).unwrap();
		let ids: Vec<_> = data.iter().map(|(id, _)| id).collect();
		assert_eq!(ids, vec!["B", "A"]);
	}

	#[test]
	fn malformed_json_is_an_error() {
		assert!(ReferenceData::from_json("[1, 2]").is_err());
	}

	#[test]
	fn link_other_endpoint() {
		let link = Link {
			from: "A".into(),
			to: "B".into(),
			relation: LinkRelation::Child,
		};
		assert_eq!(link.other("A"), Some("B"));
		assert_eq!(link.other("B"), Some("A"));
		assert_eq!(link.other("C"), None);
	}
}
