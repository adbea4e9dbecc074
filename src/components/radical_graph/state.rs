use std::mem;

use log::{info, warn};

use super::camera::Camera;
use super::config::GraphConfig;
use super::error::{GraphError, Result};
use super::interaction::Mode;
use super::scene::{Focus, Scene};
use super::simulation::LayoutSimulator;
use super::store::{Expansion, GraphStore, Removal};
use super::types::{ReferenceData, SelectedEntry};

/// Requests the host can send to a mounted graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphCommand {
	/// Make the id the root and reveal its neighbors.
	Search(String),
	Expand(String),
	/// Remove the node and anything only reachable through it.
	Hide(String),
	/// Return the node to preview and prune unanchored previews.
	Collapse(String),
}

/// Notifications for the host, drained after each input or frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphEvent {
	Selected(Option<SelectedEntry>),
	Notice(String),
}

pub struct GraphState {
	pub(super) store: GraphStore,
	pub(super) simulation: LayoutSimulator,
	pub(super) camera: Camera,
	pub(super) scene: Scene,
	pub(super) mode: Mode,
	pub(super) config: GraphConfig,
	selected: Option<String>,
	events: Vec<GraphEvent>,
}

impl GraphState {
	pub fn new(reference: ReferenceData, config: GraphConfig, width: f64, height: f64) -> Self {
		let simulation = LayoutSimulator::new(config.simulation.clone());
		let mut store = GraphStore::new(reference, config.child_horizon);
		store.set_spawn_point(simulation.center());
		info!(
			"radical graph ready: {} entries, {width}x{height}",
			store.reference().len()
		);
		Self {
			store,
			simulation,
			camera: Camera::new(width, height, config.camera.clone()),
			scene: Scene::new(),
			mode: Mode::Idle,
			config,
			selected: None,
			events: Vec::new(),
		}
	}

	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	pub fn simulation(&self) -> &LayoutSimulator {
		&self.simulation
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	pub fn take_events(&mut self) -> Vec<GraphEvent> {
		mem::take(&mut self.events)
	}

	/// Runs a host command; lookup failures become a notice.
	pub fn apply(&mut self, command: GraphCommand) {
		let result = match &command {
			GraphCommand::Search(id) => self.search(id).map(drop),
			GraphCommand::Expand(id) => self.expand(id).map(drop),
			GraphCommand::Hide(id) => self.hide(id).map(drop),
			GraphCommand::Collapse(id) => self.collapse(id).map(drop),
		};
		if let Err(err) = result {
			self.notify(&err);
		}
	}

	pub(super) fn notify(&mut self, err: &GraphError) {
		warn!("{err}");
		self.events.push(GraphEvent::Notice(err.to_string()));
	}

	/// Promotes `id` to root, selects it and flies the camera to it.
	pub fn search(&mut self, id: &str) -> Result<Expansion> {
		let id = id.trim();
		let expansion = self.store.promote_to_root(id)?;
		self.simulation.restart();
		self.select(Some(id));
		if let Some(node) = self.store.node(id) {
			self.camera.focus_on(node.position());
		}
		self.reconcile();
		Ok(expansion)
	}

	pub fn expand(&mut self, id: &str) -> Result<Expansion> {
		let expansion = self.store.expand(id)?;
		self.simulation.restart();
		self.reconcile();
		Ok(expansion)
	}

	pub fn hide(&mut self, id: &str) -> Result<Removal> {
		let removal = self.store.contract(id)?;
		self.forget(&removal);
		Ok(removal)
	}

	pub fn collapse(&mut self, id: &str) -> Result<Removal> {
		let removal = self.store.demote(id)?;
		self.forget(&removal);
		Ok(removal)
	}

	/// Drops selection, hover and drag that point at removed nodes.
	fn forget(&mut self, removal: &Removal) {
		if self.selected.as_deref().is_some_and(|id| removal.contains(id)) {
			self.select(None);
		}
		if self.mode.target().is_some_and(|id| removal.contains(id)) {
			if matches!(self.mode, Mode::Dragging { .. }) {
				self.simulation.end_drag();
			}
			self.mode = Mode::Idle;
		}
		self.simulation.restart();
		self.reconcile();
	}

	pub fn select(&mut self, id: Option<&str>) {
		if self.selected.as_deref() == id {
			return;
		}
		self.selected = id.map(str::to_owned);
		let entry = id.and_then(|id| self.store.node(id)).map(|node| SelectedEntry {
			id: node.id.clone(),
			components: node.components.iter().map(str::to_owned).collect(),
		});
		self.events.push(GraphEvent::Selected(entry));
	}

	/// One animation frame: camera easing, a simulation tick, then reconcile.
	pub fn frame(&mut self, dt: f64) {
		self.camera.step(dt);
		self.simulation.tick(&mut self.store.layout_view());
		self.reconcile();
	}

	pub fn reconcile(&mut self) {
		let focus = Focus {
			selected: self.selected.as_deref(),
			hovered: self.mode.hovered(),
		};
		self.scene.reconcile(&self.store, focus);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.resize(width, height);
		self.simulation.nudge();
		info!("resized to {width}x{height}");
	}

	/// Stops ticking and releases all visual objects.
	pub fn teardown(&mut self) {
		self.simulation.stop();
		self.scene.clear();
		self.mode = Mode::Idle;
		info!("radical graph torn down");
	}
}

#[cfg(test)]
pub(super) mod tests {
	use super::*;
	use crate::components::radical_graph::types::Disclosure;

	pub(crate) fn sample() -> GraphState {
		let reference = ReferenceData::from_entries([
			("亜", vec!["｜", "一", "口"]),
			("唖", vec!["｜", "一", "口"]),
			("悪", vec!["｜", "一", "口", "心"]),
			("口", vec!["口"]),
			("一", vec!["一"]),
			("｜", vec!["｜"]),
			("心", vec!["心"]),
			("杏", vec!["口", "木"]),
			("木", vec!["木"]),
		]);
		GraphState::new(reference, GraphConfig::default(), 800.0, 600.0)
	}

	#[test]
	fn search_promotes_selects_and_focuses() {
		let mut state = sample();
		state.search("亜").unwrap();
		assert_eq!(state.store().root().unwrap().id, "亜");
		assert_eq!(state.selected(), Some("亜"));
		assert!(state.camera().is_animating());
		assert_eq!(state.scene().len(), state.store().node_count());

		let events = state.take_events();
		let GraphEvent::Selected(Some(entry)) = &events[0] else {
			panic!("expected selection, got {events:?}");
		};
		assert_eq!(entry.components, vec!["一", "口", "｜"]);
	}

	#[test]
	fn unknown_search_leaves_graph_untouched_and_notifies() {
		let mut state = sample();
		state.apply(GraphCommand::Search("亜".into()));
		state.take_events();
		let nodes = state.store().node_count();

		state.apply(GraphCommand::Search("猫".into()));
		assert_eq!(state.store().node_count(), nodes);
		assert_eq!(state.store().root().unwrap().id, "亜");
		assert_eq!(state.selected(), Some("亜"));
		assert_eq!(
			state.take_events(),
			vec![GraphEvent::Notice("\"猫\" was not found in the dataset".into())]
		);
	}

	#[test]
	fn hiding_selected_node_clears_selection() {
		let mut state = sample();
		state.search("亜").unwrap();
		state.apply(GraphCommand::Expand("悪".into()));
		state.select(Some("悪"));
		state.take_events();

		state.apply(GraphCommand::Hide("悪".into()));
		assert!(state.store().node("心").is_none());
		assert_eq!(state.selected(), None);
		assert_eq!(state.take_events(), vec![GraphEvent::Selected(None)]);
	}

	#[test]
	fn collapse_returns_node_to_preview() {
		let mut state = sample();
		state.search("亜").unwrap();
		state.apply(GraphCommand::Expand("悪".into()));
		state.apply(GraphCommand::Collapse("悪".into()));
		assert_eq!(state.store().node("悪").unwrap().disclosure, Disclosure::Preview);
		// still anchored to the confirmed root through 悪
		assert!(state.store().node("心").unwrap().is_preview());
		assert_eq!(state.store().root().unwrap().id, "亜");
	}

	#[test]
	fn topology_change_reheats_layout() {
		let mut state = sample();
		state.search("亜").unwrap();
		for _ in 0..400 {
			state.frame(1.0 / 60.0);
		}
		assert!(state.simulation().is_settled());
		state.apply(GraphCommand::Expand("悪".into()));
		assert_eq!(state.simulation().alpha(), 1.0);
	}

	#[test]
	fn resize_nudges_without_resetting_graph() {
		let mut state = sample();
		state.search("亜").unwrap();
		for _ in 0..400 {
			state.frame(1.0 / 60.0);
		}
		let nodes = state.store().node_count();
		state.resize(1024.0, 768.0);
		assert_eq!(state.store().node_count(), nodes);
		assert!(!state.simulation().is_settled());
		assert_eq!(state.camera().size(), (1024.0, 768.0));
	}

	#[test]
	fn teardown_stops_ticks_and_releases_visuals() {
		let mut state = sample();
		state.search("亜").unwrap();
		state.teardown();
		assert!(state.scene().is_empty());
		let ticks = state.simulation().ticks();
		state.simulation.tick(&mut state.store.layout_view());
		assert_eq!(state.simulation().ticks(), ticks);
	}
}
