//! Pointer state machine: hover, node drag, selection and camera gestures.
//!
//! Handlers return `true` when the caller should redraw right away instead of
//! waiting for the next frame (hover is independent of the simulation).

use log::debug;

use super::state::GraphState;
use super::types::Vec2;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Mode {
	#[default]
	Idle,
	Hovering(String),
	Dragging {
		id: String,
		/// Pointer minus node position at grab time, in world units.
		grab: Vec2,
	},
}

impl Mode {
	/// Node under the pointer, if any.
	pub fn target(&self) -> Option<&str> {
		match self {
			Mode::Idle => None,
			Mode::Hovering(id) | Mode::Dragging { id, .. } => Some(id),
		}
	}

	/// Node whose neighborhood is revealed. A dragged node keeps its reveal.
	pub fn hovered(&self) -> Option<&str> {
		self.target()
	}

	pub fn is_dragging(&self) -> bool {
		matches!(self, Mode::Dragging { .. })
	}
}

impl GraphState {
	pub fn mode(&self) -> &Mode {
		&self.mode
	}

	/// Closest node within the pick radius of a screen point.
	pub fn hit_test(&self, screen: Vec2) -> Option<&str> {
		let world = self.camera.screen_to_world(screen);
		let radius = self.config.pick_radius;
		self.store
			.nodes()
			.map(|node| (node, node.position().distance(world)))
			.filter(|&(_, d)| d < radius)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(node, _)| node.id.as_str())
	}

	pub fn pointer_move(&mut self, screen: Vec2) -> bool {
		if let Mode::Dragging { id, grab } = &self.mode {
			let pin = self.camera.screen_to_world(screen) - *grab;
			self.store.pin(id, pin);
			return false;
		}
		if self.camera.is_panning() {
			self.camera.pan_to(screen);
			return true;
		}

		let next = match self.hit_test(screen) {
			Some(id) => Mode::Hovering(id.to_owned()),
			None => Mode::Idle,
		};
		if next == self.mode {
			return false;
		}
		self.mode = next;
		self.reconcile();
		true
	}

	/// Grabs and selects the node under the pointer, expanding it if it was
	/// only a preview. On empty space clears selection and starts a pan.
	/// A press during an active drag or pan is ignored.
	pub fn pointer_down(&mut self, screen: Vec2) -> bool {
		if self.mode.is_dragging() || self.camera.is_panning() {
			return false;
		}
		let Some(id) = self.hit_test(screen).map(str::to_owned) else {
			self.select(None);
			self.camera.begin_pan(screen);
			self.reconcile();
			return true;
		};
		let Some(node) = self.store.node(&id) else {
			return false;
		};
		let position = node.position();
		let preview = node.is_preview();

		self.store.pin(&id, position);
		self.mode = Mode::Dragging {
			id: id.clone(),
			grab: self.camera.screen_to_world(screen) - position,
		};
		self.select(Some(&id));
		if preview {
			if let Err(err) = self.expand(&id) {
				self.notify(&err);
			}
		}
		self.simulation.begin_drag();
		debug!("drag start on {id}");
		self.reconcile();
		true
	}

	/// Releases a dragged node back to the simulation and ends any pan.
	pub fn pointer_up(&mut self, screen: Vec2) -> bool {
		self.camera.end_pan();
		if !self.release_drag() {
			return false;
		}
		self.mode = match self.hit_test(screen) {
			Some(id) => Mode::Hovering(id.to_owned()),
			None => Mode::Idle,
		};
		self.reconcile();
		true
	}

	/// Pointer left the surface: ends every gesture and clears hover.
	pub fn pointer_leave(&mut self) -> bool {
		self.camera.end_pan();
		self.release_drag();
		if self.mode == Mode::Idle {
			return false;
		}
		self.mode = Mode::Idle;
		self.reconcile();
		true
	}

	fn release_drag(&mut self) -> bool {
		let Mode::Dragging { id, .. } = &self.mode else {
			return false;
		};
		self.store.unpin(id);
		self.simulation.end_drag();
		debug!("drag end on {id}");
		self.mode = Mode::Idle;
		true
	}

	/// Wheel zoom; ignored while a node is being dragged.
	pub fn wheel(&mut self, screen: Vec2, delta_y: f64) -> bool {
		if self.mode.is_dragging() {
			return false;
		}
		self.camera.wheel(screen, delta_y);
		true
	}
}

#[cfg(test)]
mod tests {
	use super::super::state::GraphEvent;
	use super::super::state::tests::sample;
	use super::*;
	use crate::components::radical_graph::types::Disclosure;

	const DT: f64 = 1.0 / 60.0;

	/// Sample graph rooted at 亜 with a spread-out layout.
	fn settled() -> GraphState {
		let mut state = sample();
		state.search("亜").unwrap();
		for _ in 0..400 {
			state.frame(DT);
		}
		state.take_events();
		state
	}

	fn screen_of(state: &GraphState, id: &str) -> Vec2 {
		state
			.camera()
			.world_to_screen(state.store().node(id).unwrap().position())
	}

	#[test]
	fn hovering_preview_reveals_without_disclosing() {
		let mut state = settled();
		let at = screen_of(&state, "悪");
		assert!(state.pointer_move(at));
		assert_eq!(state.mode(), &Mode::Hovering("悪".into()));
		assert_eq!(state.store().node("悪").unwrap().disclosure, Disclosure::Preview);
		assert_eq!(state.scene().visual("悪").unwrap().style.alpha, 1.0);
		assert_eq!(state.scene().visual("口").unwrap().style.alpha, 0.6);

		// same target again needs no redraw
		assert!(!state.pointer_move(at));
	}

	#[test]
	fn moving_off_nodes_returns_to_idle() {
		let mut state = settled();
		state.pointer_move(screen_of(&state, "悪"));
		assert!(state.pointer_move(Vec2::new(-5000.0, -5000.0)));
		assert_eq!(state.mode(), &Mode::Idle);
	}

	#[test]
	fn clicking_preview_selects_and_expands() {
		let mut state = settled();
		let nodes = state.store().node_count();
		state.pointer_down(screen_of(&state, "悪"));

		assert!(state.mode().is_dragging());
		assert_eq!(state.selected(), Some("悪"));
		assert_eq!(state.store().node("悪").unwrap().disclosure, Disclosure::Confirmed);
		assert!(state.store().node("心").is_some());
		assert!(state.store().node_count() > nodes);
		assert!(state.simulation().alpha() > 0.0);
		match state.take_events().as_slice() {
			[GraphEvent::Selected(Some(entry))] => assert_eq!(entry.id, "悪"),
			other => panic!("unexpected events {other:?}"),
		}
	}

	#[test]
	fn clicking_confirmed_node_only_selects() {
		let mut state = settled();
		state.select(None);
		let nodes = state.store().node_count();
		let links = state.store().link_count();
		state.pointer_down(screen_of(&state, "亜"));
		assert_eq!(state.selected(), Some("亜"));
		assert_eq!(
			(state.store().node_count(), state.store().link_count()),
			(nodes, links)
		);
	}

	#[test]
	fn drag_pins_node_to_pointer_until_release() {
		let mut state = settled();
		let start = screen_of(&state, "口");
		let others: Vec<(String, Vec2)> = state
			.store()
			.nodes()
			.filter(|n| n.id != "口")
			.map(|n| (n.id.clone(), n.position()))
			.collect();

		state.pointer_down(start);
		let target = start + Vec2::new(120.0, -80.0);
		state.pointer_move(target);

		// pointer motion alone never moves other nodes
		for (id, position) in &others {
			assert_eq!(state.store().node(id).unwrap().position(), *position);
		}

		let expected = state.camera().screen_to_world(target);
		for _ in 0..10 {
			state.frame(DT);
			let node = state.store().node("口").unwrap();
			assert!(node.position().distance(expected) < 1e-9);
			assert!(node.pinned().is_some());
		}

		state.pointer_up(target);
		assert_eq!(state.store().node("口").unwrap().pinned(), None);
		assert!(!state.mode().is_dragging());
		assert!(state.simulation().alpha() > 0.0);

		for _ in 0..30 {
			state.frame(DT);
		}
		assert!(state.store().node("口").unwrap().position().distance(expected) > 1e-6);
	}

	#[test]
	fn drag_suppresses_zoom() {
		let mut state = settled();
		state.pointer_down(screen_of(&state, "亜"));
		let scale = state.camera().scale();
		assert!(!state.wheel(Vec2::new(10.0, 10.0), -1.0));
		assert_eq!(state.camera().scale(), scale);
		state.pointer_leave();
		assert!(state.wheel(Vec2::new(10.0, 10.0), -1.0));
		assert!(state.camera().scale() > scale);
	}

	#[test]
	fn clicking_empty_space_clears_selection_and_pans() {
		let mut state = settled();
		assert_eq!(state.selected(), Some("亜"));
		let empty = Vec2::new(-3000.0, -3000.0);
		state.pointer_down(empty);
		assert_eq!(state.selected(), None);
		assert_eq!(state.take_events(), vec![GraphEvent::Selected(None)]);

		let before = state.camera().translation();
		state.pointer_move(empty + Vec2::new(40.0, 25.0));
		assert_eq!(state.camera().translation(), before + Vec2::new(40.0, 25.0));
		state.pointer_up(empty);
		assert!(!state.camera().is_panning());
	}

	#[test]
	fn second_press_during_drag_is_ignored() {
		let mut state = settled();
		state.pointer_down(screen_of(&state, "口"));
		let other = screen_of(&state, "一");
		assert!(!state.pointer_down(other));
		assert_eq!(state.mode().target(), Some("口"));
		assert_eq!(state.selected(), Some("口"));
		assert_eq!(state.store().node("一").unwrap().pinned(), None);

		state.pointer_up(other);
		assert!(state.store().nodes().all(|n| n.pinned().is_none()));
		assert_eq!(state.simulation().alpha_target(), 0.0);
	}

	#[test]
	fn drag_and_pan_never_overlap() {
		let mut state = settled();
		let empty = Vec2::new(-3000.0, -3000.0);

		state.pointer_down(screen_of(&state, "亜"));
		assert!(!state.pointer_down(empty));
		assert!(state.mode().is_dragging() && !state.camera().is_panning());
		state.pointer_up(empty);

		state.pointer_down(empty);
		let node = screen_of(&state, "亜");
		assert!(!state.pointer_down(node));
		assert!(state.camera().is_panning() && !state.mode().is_dragging());
		assert_eq!(state.store().node("亜").unwrap().pinned(), None);
	}

	#[test]
	fn hiding_dragged_node_ends_drag() {
		let mut state = settled();
		state.pointer_down(screen_of(&state, "悪"));
		state.hide("悪").unwrap();
		assert_eq!(state.mode(), &Mode::Idle);
		assert_eq!(state.simulation().alpha_target(), 0.0);
	}
}
