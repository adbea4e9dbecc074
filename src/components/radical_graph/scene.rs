//! Id-keyed visual objects derived from logical graph state.
//!
//! A reconcile pass drops visuals whose node is gone, creates visuals for new
//! nodes, and recomputes every drawn attribute from role, disclosure,
//! selection and hover. Positions are copied from the store, never written.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::store::{GraphStore, Node};
use super::types::{LinkRelation, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
	pub fn rgba(self, alpha: f64) -> String {
		let Color(hex) = self;
		format!(
			"rgba({}, {}, {}, {alpha})",
			(hex >> 16) & 0xff,
			(hex >> 8) & 0xff,
			hex & 0xff
		)
	}
}

pub mod palette {
	use super::Color;

	pub const BACKGROUND: Color = Color(0xf8fafc);
	pub const WHITE: Color = Color(0xffffff);
	pub const SELECTED_FILL: Color = Color(0xeff6ff);
	pub const SELECTED_STROKE: Color = Color(0x2563eb);
	pub const PREVIEW_FILL: Color = Color(0xf1f5f9);
	pub const ROOT_FILL: Color = Color(0xfee2e2);
	pub const ROOT_STROKE: Color = Color(0xef4444);
	pub const STROKE: Color = Color(0x3b82f6);
	pub const SLATE_300: Color = Color(0xcbd5e1);
	pub const SLATE_400: Color = Color(0x94a3b8);
	pub const SLATE_500: Color = Color(0x64748b);
	pub const SLATE_600: Color = Color(0x475569);
	pub const SLATE_800: Color = Color(0x1e293b);
}

/// Current selection and hover target.
#[derive(Clone, Copy, Debug, Default)]
pub struct Focus<'a> {
	pub selected: Option<&'a str>,
	pub hovered: Option<&'a str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub fill: Color,
	pub stroke: Color,
	pub stroke_width: f64,
	/// Outline opacity.
	pub alpha: f64,
	pub dashed: bool,
	pub label: Color,
	pub label_visible: bool,
}

#[derive(Clone, Debug)]
pub struct NodeVisual {
	pub id: String,
	/// Creation order; unchanged for as long as the node stays live.
	pub serial: u64,
	pub position: Vec2,
	pub style: NodeStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkVisual {
	pub from: Vec2,
	pub to: Vec2,
	pub color: Color,
	pub width: f64,
	pub alpha: f64,
	pub dashed: bool,
	/// Touches the hovered node; drawn after all other links.
	pub hovered: bool,
}

#[derive(Default)]
pub struct Scene {
	visuals: IndexMap<String, NodeVisual>,
	links: Vec<LinkVisual>,
	next_serial: u64,
}

impl Scene {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn visual(&self, id: &str) -> Option<&NodeVisual> {
		self.visuals.get(id)
	}

	pub fn visuals(&self) -> impl Iterator<Item = &NodeVisual> {
		self.visuals.values()
	}

	/// Links in draw order.
	pub fn links(&self) -> &[LinkVisual] {
		&self.links
	}

	pub fn len(&self) -> usize {
		self.visuals.len()
	}

	pub fn is_empty(&self) -> bool {
		self.visuals.is_empty()
	}

	/// Releases every visual object.
	pub fn clear(&mut self) {
		self.visuals.clear();
		self.links.clear();
	}

	pub fn reconcile(&mut self, store: &GraphStore, focus: Focus<'_>) {
		self.visuals.retain(|id, _| store.node(id).is_some());

		let neighbors: HashSet<&str> = focus
			.hovered
			.map(|hovered| store.neighbors(hovered).collect())
			.unwrap_or_default();

		for node in store.nodes() {
			let hovered = focus.hovered == Some(node.id.as_str());
			let style = node_style(
				node,
				NodeFlags {
					selected: focus.selected == Some(node.id.as_str()),
					hovered,
					hover_neighbor: neighbors.contains(node.id.as_str()),
					hover_active: focus.hovered.is_some(),
				},
			);
			match self.visuals.get_mut(&node.id) {
				Some(visual) => {
					visual.position = node.position();
					visual.style = style;
				}
				None => {
					let serial = self.next_serial;
					self.next_serial += 1;
					self.visuals.insert(
						node.id.clone(),
						NodeVisual {
							id: node.id.clone(),
							serial,
							position: node.position(),
							style,
						},
					);
				}
			}
		}

		self.links.clear();
		for link in store.links() {
			let (Some(from), Some(to)) = (store.node(&link.from), store.node(&link.to)) else {
				continue;
			};
			let hovered = focus.hovered.is_some_and(|h| link.touches(h));
			let preview = from.is_preview() || to.is_preview();
			let sibling = link.relation == LinkRelation::Sibling;
			let (color, width, alpha) = match (preview, hovered, sibling) {
				(true, true, _) => (palette::SLATE_400, 2.0, 0.6),
				(true, false, _) => (palette::SLATE_300, 1.0, 0.15),
				(false, _, true) => (palette::SLATE_400, 1.0, 0.3),
				(false, _, false) => (palette::SLATE_500, 2.0, 1.0),
			};
			self.links.push(LinkVisual {
				from: from.position(),
				to: to.position(),
				color,
				width,
				alpha,
				dashed: sibling,
				hovered,
			});
		}
		self.links.sort_by_key(|l| l.hovered);
	}
}

#[derive(Clone, Copy)]
struct NodeFlags {
	selected: bool,
	hovered: bool,
	hover_neighbor: bool,
	hover_active: bool,
}

fn node_style(node: &Node, flags: NodeFlags) -> NodeStyle {
	let preview = node.is_preview();
	let prominent = preview && (flags.hovered || flags.hover_neighbor);

	let fill = if flags.selected {
		palette::SELECTED_FILL
	} else if preview {
		palette::PREVIEW_FILL
	} else if node.is_root() {
		palette::ROOT_FILL
	} else {
		palette::WHITE
	};

	let (stroke, stroke_width) = if prominent && !flags.selected {
		(palette::SLATE_400, 2.0)
	} else if flags.selected {
		(palette::SELECTED_STROKE, 3.0)
	} else if node.is_root() {
		(palette::ROOT_STROKE, if preview { 1.0 } else { 2.0 })
	} else {
		(palette::STROKE, if preview { 1.0 } else { 2.0 })
	};

	let label = match (preview, prominent) {
		(true, true) => palette::SLATE_600,
		(true, false) => palette::SLATE_400,
		(false, _) => palette::SLATE_800,
	};

	NodeStyle {
		fill,
		stroke,
		stroke_width,
		alpha: if preview && !prominent { 0.6 } else { 1.0 },
		dashed: preview && !prominent,
		label,
		label_visible: !preview || prominent || flags.selected || !flags.hover_active,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::radical_graph::types::{Disclosure, ReferenceData};

	fn store() -> GraphStore {
		let reference = ReferenceData::from_entries([
			("亜", vec!["｜", "一", "口"]),
			("口", vec!["口"]),
			("一", vec!["一"]),
			("悪", vec!["｜", "一", "口", "心"]),
			("心", vec!["心"]),
		]);
		let mut store = GraphStore::new(reference, 1);
		store.expand("亜").unwrap();
		store
	}

	#[test]
	fn color_formats_as_css_rgba() {
		assert_eq!(Color(0x2563eb).rgba(0.5), "rgba(37, 99, 235, 0.5)");
	}

	#[test]
	fn visuals_are_created_once_and_reused() {
		let mut store = store();
		let mut scene = Scene::new();
		scene.reconcile(&store, Focus::default());
		assert_eq!(scene.len(), 4);
		let serial = scene.visual("口").unwrap().serial;

		store.expand("悪").unwrap();
		scene.reconcile(&store, Focus::default());
		assert_eq!(scene.len(), 5);
		assert_eq!(scene.visual("口").unwrap().serial, serial);
		assert!(scene.visual("心").unwrap().serial > serial);
	}

	#[test]
	fn visuals_of_removed_nodes_are_dropped() {
		let mut store = store();
		store.expand("悪").unwrap();
		let mut scene = Scene::new();
		scene.reconcile(&store, Focus::default());
		assert!(scene.visual("心").is_some());

		store.contract("悪").unwrap();
		scene.reconcile(&store, Focus::default());
		assert!(scene.visual("悪").is_none());
		assert!(scene.visual("心").is_none());
		assert_eq!(scene.len(), store.node_count());
	}

	#[test]
	fn root_and_selection_styles() {
		let store = store();
		let mut scene = Scene::new();
		scene.reconcile(&store, Focus::default());
		let root = &scene.visual("亜").unwrap().style;
		assert_eq!((root.fill, root.stroke), (palette::ROOT_FILL, palette::ROOT_STROKE));

		scene.reconcile(
			&store,
			Focus {
				selected: Some("口"),
				hovered: None,
			},
		);
		let selected = &scene.visual("口").unwrap().style;
		assert_eq!(selected.fill, palette::SELECTED_FILL);
		assert_eq!(selected.stroke_width, 3.0);
	}

	#[test]
	fn hover_reveals_preview_node_and_its_links() {
		let mut store = store();
		store.expand("悪").unwrap();
		let mut scene = Scene::new();
		scene.reconcile(
			&store,
			Focus {
				selected: None,
				hovered: Some("心"),
			},
		);

		assert_eq!(store.node("心").unwrap().disclosure, Disclosure::Preview);
		let hovered = &scene.visual("心").unwrap().style;
		let unrelated = &scene.visual("口").unwrap().style;
		assert_eq!(hovered.alpha, 1.0);
		assert!(hovered.label_visible);
		assert_eq!(unrelated.alpha, 0.6);
		assert!(!unrelated.label_visible);

		let links = scene.links();
		let last = links.last().unwrap();
		assert!(last.hovered);
		assert_eq!(last.alpha, 0.6);
		assert!(links.iter().filter(|l| !l.hovered).all(|l| l.alpha <= 1.0));
		let first_hovered = links.iter().position(|l| l.hovered).unwrap();
		assert!(links[first_hovered..].iter().all(|l| l.hovered));
	}

	#[test]
	fn hover_neighbor_of_confirmed_node_is_prominent() {
		let store = store();
		let mut scene = Scene::new();
		scene.reconcile(
			&store,
			Focus {
				selected: None,
				hovered: Some("亜"),
			},
		);
		for id in ["口", "一", "悪"] {
			let style = &scene.visual(id).unwrap().style;
			assert_eq!(style.alpha, 1.0);
			assert_eq!(style.stroke, palette::SLATE_400);
		}
		assert!(scene.links().iter().all(|l| l.hovered && l.alpha == 0.6));
	}

	#[test]
	fn clear_releases_everything() {
		let store = store();
		let mut scene = Scene::new();
		scene.reconcile(&store, Focus::default());
		scene.clear();
		assert!(scene.is_empty());
		assert!(scene.links().is_empty());
	}
}
