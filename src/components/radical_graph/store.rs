//! Live graph: nodes, links and their disclosure lifecycle.
//!
//! The store owns identity and topology. Node positions are written in exactly
//! two places: at creation (a new neighbor spawns on top of the node that
//! discovered it) and through [`LayoutView`], which is only handed to the
//! layout simulator.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info};

use super::error::{GraphError, Result};
use super::relation::{Kinship, classify};
use super::simulation::LayoutTarget;
use super::types::{ComponentSet, Disclosure, Link, LinkRelation, ReferenceData, Role, Vec2};

#[derive(Clone, Debug)]
pub struct Node {
	pub id: String,
	pub components: Arc<ComponentSet>,
	pub disclosure: Disclosure,
	pub role: Role,
	position: Vec2,
	velocity: Vec2,
	pinned: Option<Vec2>,
}

impl Node {
	fn new(id: &str, components: Arc<ComponentSet>, role: Role, position: Vec2) -> Self {
		Self {
			id: id.to_owned(),
			components,
			disclosure: Disclosure::Preview,
			role,
			position,
			velocity: Vec2::ZERO,
			pinned: None,
		}
	}

	pub fn position(&self) -> Vec2 {
		self.position
	}

	pub fn pinned(&self) -> Option<Vec2> {
		self.pinned
	}

	pub fn is_root(&self) -> bool {
		self.role == Role::Root
	}

	pub fn is_preview(&self) -> bool {
		self.disclosure == Disclosure::Preview
	}
}

/// What an expansion added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Expansion {
	pub nodes_added: usize,
	pub links_added: usize,
}

/// Node ids removed by a contraction or demotion, in removal order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Removal {
	pub removed: Vec<String>,
}

impl Removal {
	pub fn contains(&self, id: &str) -> bool {
		self.removed.iter().any(|r| r == id)
	}
}

type PairKey = (String, String);

fn pair_key(a: &str, b: &str) -> PairKey {
	if a <= b {
		(a.to_owned(), b.to_owned())
	} else {
		(b.to_owned(), a.to_owned())
	}
}

pub struct GraphStore {
	reference: ReferenceData,
	nodes: IndexMap<String, Node>,
	/// Keyed by the unordered endpoint pair, so a pair holds at most one link.
	links: IndexMap<PairKey, Link>,
	spawn: Vec2,
	child_horizon: usize,
}

impl GraphStore {
	pub fn new(reference: ReferenceData, child_horizon: usize) -> Self {
		Self {
			reference,
			nodes: IndexMap::new(),
			links: IndexMap::new(),
			spawn: Vec2::ZERO,
			child_horizon,
		}
	}

	pub fn reference(&self) -> &ReferenceData {
		&self.reference
	}

	/// Where a node created without a discovering neighbor appears.
	pub fn set_spawn_point(&mut self, spawn: Vec2) {
		self.spawn = spawn;
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn link_count(&self) -> usize {
		self.links.len()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	pub fn links(&self) -> impl Iterator<Item = &Link> {
		self.links.values()
	}

	pub fn link_between(&self, a: &str, b: &str) -> Option<&Link> {
		self.links.get(&pair_key(a, b))
	}

	pub fn root(&self) -> Option<&Node> {
		self.nodes.values().find(|n| n.is_root())
	}

	pub fn neighbors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.links.values().filter_map(move |l| l.other(id))
	}

	pub fn degree(&self, id: &str) -> usize {
		self.links.values().filter(|l| l.touches(id)).count()
	}

	/// Confirms `id` and reveals every related entry as a preview neighbor.
	///
	/// Structurally simpler entries are always revealed; more complex ones
	/// only when they have at most `child_horizon` extra components.
	pub fn expand(&mut self, id: &str) -> Result<Expansion> {
		self.expand_as(id, None)
	}

	/// Makes `id` the single root, then expands it.
	pub fn promote_to_root(&mut self, id: &str) -> Result<Expansion> {
		if !self.reference.contains(id) {
			return Err(GraphError::not_found(id));
		}
		for node in self.nodes.values_mut() {
			node.role = Role::Standard;
		}
		self.expand_as(id, Some(Role::Root))
	}

	fn expand_as(&mut self, id: &str, forced: Option<Role>) -> Result<Expansion> {
		let reference = self.reference.clone();
		let components = reference.get(id).ok_or_else(|| GraphError::not_found(id))?;

		let mut outcome = Expansion::default();
		let role = forced.unwrap_or(if self.nodes.is_empty() {
			Role::Root
		} else {
			Role::Standard
		});
		let spawn = self.spawn;
		let target = self.nodes.entry(id.to_owned()).or_insert_with(|| {
			outcome.nodes_added += 1;
			Node::new(id, components.clone(), role, spawn)
		});
		target.disclosure = Disclosure::Confirmed;
		if let Some(role) = forced {
			target.role = role;
		}
		let anchor = target.position;

		for (other_id, other) in reference.iter() {
			if other_id == id {
				continue;
			}
			let (from, to, relation) = match classify(components, other) {
				Kinship::Unrelated => continue,
				Kinship::Child if other.len() - components.len() > self.child_horizon => continue,
				Kinship::Child => (id, other_id, LinkRelation::Child),
				Kinship::Parent => (other_id, id, LinkRelation::Child),
				Kinship::Sibling => (id, other_id, LinkRelation::Sibling),
			};

			if !self.nodes.contains_key(other_id) {
				self.nodes.insert(
					other_id.to_owned(),
					Node::new(other_id, other.clone(), Role::Standard, anchor),
				);
				outcome.nodes_added += 1;
			}
			if self.insert_link(from, to, relation) {
				outcome.links_added += 1;
			}
		}

		info!(
			"expanded {id}: +{} nodes, +{} links",
			outcome.nodes_added, outcome.links_added
		);
		Ok(outcome)
	}

	fn insert_link(&mut self, from: &str, to: &str, relation: LinkRelation) -> bool {
		let key = pair_key(from, to);
		if self.links.contains_key(&key) {
			return false;
		}
		self.links.insert(
			key,
			Link {
				from: from.to_owned(),
				to: to.to_owned(),
				relation,
			},
		);
		true
	}

	/// Removes `id` with its links, then sweeps non-root nodes left without
	/// any link until nothing changes.
	pub fn contract(&mut self, id: &str) -> Result<Removal> {
		if self.nodes.shift_remove(id).is_none() {
			return Err(GraphError::not_found(id));
		}
		self.links.retain(|_, link| !link.touches(id));

		let mut removal = Removal {
			removed: vec![id.to_owned()],
		};
		loop {
			let linked: HashSet<&str> = self
				.links
				.values()
				.flat_map(|l| [l.from.as_str(), l.to.as_str()])
				.collect();
			let orphans: Vec<String> = self
				.nodes
				.values()
				.filter(|n| !n.is_root() && !linked.contains(n.id.as_str()))
				.map(|n| n.id.clone())
				.collect();
			if orphans.is_empty() {
				break;
			}
			for orphan in orphans {
				self.remove_node(&orphan);
				removal.removed.push(orphan);
			}
		}

		info!("contracted {id}: {} nodes removed", removal.removed.len());
		Ok(removal)
	}

	/// Returns `id` to preview and prunes preview nodes that no longer reach a
	/// confirmed node (or the root) through the remaining links.
	pub fn demote(&mut self, id: &str) -> Result<Removal> {
		let node = self.nodes.get_mut(id).ok_or_else(|| GraphError::not_found(id))?;
		node.disclosure = Disclosure::Preview;

		let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
		for link in self.links.values() {
			adjacency.entry(link.from.as_str()).or_default().push(link.to.as_str());
			adjacency.entry(link.to.as_str()).or_default().push(link.from.as_str());
		}

		let mut reachable: HashSet<&str> = self
			.nodes
			.values()
			.filter(|n| !n.is_preview() || n.is_root())
			.map(|n| n.id.as_str())
			.collect();
		let mut queue: VecDeque<&str> = reachable.iter().copied().collect();
		while let Some(current) = queue.pop_front() {
			for &next in adjacency.get(current).into_iter().flatten() {
				if reachable.insert(next) {
					queue.push_back(next);
				}
			}
		}

		let doomed: Vec<String> = self
			.nodes
			.keys()
			.filter(|key| !reachable.contains(key.as_str()))
			.cloned()
			.collect();
		for id in &doomed {
			self.remove_node(id);
		}

		debug!("demoted {id}: {} preview nodes pruned", doomed.len());
		Ok(Removal { removed: doomed })
	}

	fn remove_node(&mut self, id: &str) {
		self.nodes.shift_remove(id);
		self.links.retain(|_, link| !link.touches(id));
	}

	/// Fixes `id` at `at`; the simulator stops moving it until [`unpin`](Self::unpin).
	pub fn pin(&mut self, id: &str, at: Vec2) -> bool {
		match self.nodes.get_mut(id) {
			Some(node) => {
				node.pinned = Some(at);
				true
			}
			None => false,
		}
	}

	pub fn unpin(&mut self, id: &str) {
		if let Some(node) = self.nodes.get_mut(id) {
			node.pinned = None;
		}
	}

	/// Position-write access for the layout simulator.
	pub fn layout_view(&mut self) -> LayoutView<'_> {
		LayoutView {
			nodes: &mut self.nodes,
			links: &self.links,
		}
	}
}

pub struct LayoutView<'a> {
	nodes: &'a mut IndexMap<String, Node>,
	links: &'a IndexMap<PairKey, Link>,
}

impl LayoutTarget for LayoutView<'_> {
	fn len(&self) -> usize {
		self.nodes.len()
	}

	fn position(&self, index: usize) -> Vec2 {
		self.nodes[index].position
	}

	fn velocity(&self, index: usize) -> Vec2 {
		self.nodes[index].velocity
	}

	fn pinned(&self, index: usize) -> Option<Vec2> {
		self.nodes[index].pinned
	}

	fn edges(&self) -> Vec<(usize, usize)> {
		self.links
			.values()
			.filter_map(|l| Some((self.nodes.get_index_of(&l.from)?, self.nodes.get_index_of(&l.to)?)))
			.collect()
	}

	fn set_motion(&mut self, index: usize, position: Vec2, velocity: Vec2) {
		let node = &mut self.nodes[index];
		node.position = position;
		node.velocity = velocity;
	}
}
