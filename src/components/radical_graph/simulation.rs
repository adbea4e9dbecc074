//! Force-directed layout driven by a decaying energy level (`alpha`).
//!
//! Each tick composes link attraction, pairwise repulsion, collision and a
//! weak pull toward the layout center, then integrates velocities. Pinned
//! bodies stay where they are pinned but still push and pull their neighbors.

use log::debug;

use super::config::SimulationConfig;
use super::types::Vec2;

/// Position-write access to the bodies being laid out.
///
/// This is the only way the simulator reaches node data; it cannot see ids,
/// roles or disclosure state.
pub trait LayoutTarget {
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn position(&self, index: usize) -> Vec2;
	fn velocity(&self, index: usize) -> Vec2;
	fn pinned(&self, index: usize) -> Option<Vec2>;
	/// Linked body index pairs.
	fn edges(&self) -> Vec<(usize, usize)>;
	fn set_motion(&mut self, index: usize, position: Vec2, velocity: Vec2);
}

pub struct LayoutSimulator {
	config: SimulationConfig,
	alpha: f64,
	alpha_target: f64,
	center: Vec2,
	running: bool,
	seed: u64,
	ticks: u64,
}

impl LayoutSimulator {
	pub fn new(config: SimulationConfig) -> Self {
		Self {
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			center: Vec2::ZERO,
			running: true,
			seed: 0,
			ticks: 0,
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn center(&self) -> Vec2 {
		self.center
	}

	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Full restart after a topology change.
	pub fn restart(&mut self) {
		self.alpha = 1.0;
		self.running = true;
	}

	/// Raises alpha to at least `alpha` without cooling an already hot layout.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
		self.running = true;
	}

	/// Raises alpha to the configured reheat level.
	pub fn nudge(&mut self) {
		self.reheat(self.config.reheat_alpha);
	}

	pub fn begin_drag(&mut self) {
		self.alpha_target = self.config.drag_alpha_target;
		self.nudge();
	}

	pub fn end_drag(&mut self) {
		self.alpha_target = 0.0;
	}

	/// Stops producing ticks until the next restart.
	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	/// Advances the layout one step. Returns `false` when idle.
	pub fn tick(&mut self, target: &mut impl LayoutTarget) -> bool {
		if !self.running || self.is_settled() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		let n = target.len();
		let pins: Vec<Option<Vec2>> = (0..n).map(|i| target.pinned(i)).collect();
		let mut pos: Vec<Vec2> = (0..n)
			.map(|i| pins[i].unwrap_or_else(|| target.position(i)))
			.collect();
		let mut vel: Vec<Vec2> = (0..n).map(|i| target.velocity(i)).collect();
		let edges = target.edges();

		self.apply_links(&pos, &mut vel, &edges);
		self.apply_charge(&pos, &mut vel);
		self.apply_collide(&pos, &mut vel);
		self.apply_position(&pos, &mut vel);

		let retain = 1.0 - self.config.velocity_decay;
		for i in 0..n {
			match pins[i] {
				Some(pin) => {
					pos[i] = pin;
					vel[i] = Vec2::ZERO;
				}
				None => {
					vel[i] = vel[i] * retain;
					pos[i] += vel[i];
				}
			}
			target.set_motion(i, pos[i], vel[i]);
		}

		self.ticks += 1;
		if self.is_settled() {
			debug!("layout settled after {} ticks", self.ticks);
		}
		true
	}

	/// Tiny deterministic offset separating coincident bodies.
	fn jiggle(&mut self) -> f64 {
		self.seed = self
			.seed
			.wrapping_mul(6364136223846793005)
			.wrapping_add(1442695040888963407);
		let unit = (self.seed >> 11) as f64 / (1u64 << 53) as f64;
		(unit - 0.5) * 1e-6
	}

	fn separate(&mut self, mut d: Vec2) -> Vec2 {
		if d.x == 0.0 {
			d.x = self.jiggle();
		}
		if d.y == 0.0 {
			d.y = self.jiggle();
		}
		d
	}

	fn apply_links(&mut self, pos: &[Vec2], vel: &mut [Vec2], edges: &[(usize, usize)]) {
		let mut degree = vec![0usize; pos.len()];
		for &(s, t) in edges {
			degree[s] += 1;
			degree[t] += 1;
		}
		for &(s, t) in edges {
			let strength = 1.0 / degree[s].min(degree[t]) as f64;
			let bias = degree[s] as f64 / (degree[s] + degree[t]) as f64;
			let d = self.separate((pos[t] + vel[t]) - (pos[s] + vel[s]));
			let l = d.length();
			let d = d * ((l - self.config.link_distance) / l * self.alpha * strength);
			vel[t] -= d * bias;
			vel[s] += d * (1.0 - bias);
		}
	}

	fn apply_charge(&mut self, pos: &[Vec2], vel: &mut [Vec2]) {
		let min2 = self.config.charge_distance_min * self.config.charge_distance_min;
		let weight = self.config.charge_strength * self.alpha;
		for i in 0..pos.len() {
			for j in 0..pos.len() {
				if i == j {
					continue;
				}
				let d = self.separate(pos[j] - pos[i]);
				let mut l2 = d.length_squared();
				if l2 < min2 {
					l2 = (min2 * l2).sqrt();
				}
				vel[i] += d * (weight / l2);
			}
		}
	}

	fn apply_collide(&mut self, pos: &[Vec2], vel: &mut [Vec2]) {
		let r = self.config.collide_radius * 2.0;
		for _ in 0..self.config.collide_iterations {
			for i in 0..pos.len() {
				let xi = pos[i] + vel[i];
				for j in i + 1..pos.len() {
					let d = xi - (pos[j] + vel[j]);
					if d.length_squared() >= r * r {
						continue;
					}
					let d = self.separate(d);
					let l = d.length();
					let push = d * ((r - l) / l * self.config.collide_strength);
					// equal radii share the correction evenly
					vel[i] += push * 0.5;
					vel[j] -= push * 0.5;
				}
			}
		}
	}

	fn apply_position(&self, pos: &[Vec2], vel: &mut [Vec2]) {
		let k = self.config.position_strength * self.alpha;
		for (p, v) in pos.iter().zip(vel.iter_mut()) {
			*v += (self.center - *p) * k;
		}
	}
}
