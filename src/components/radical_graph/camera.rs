use std::f64::consts::PI;

use super::config::CameraConfig;
use super::types::Vec2;

fn ease_in_out_sine(t: f64) -> f64 {
	-((PI * t).cos() - 1.0) / 2.0
}

#[derive(Clone, Debug)]
struct PanGesture {
	start: Vec2,
	origin: Vec2,
}

/// Eased move of the viewport center and scale.
#[derive(Clone, Debug)]
struct Flight {
	from: Vec2,
	to: Vec2,
	from_k: f64,
	to_k: f64,
	elapsed: f64,
	duration: f64,
}

/// Pan/zoom transform: `screen = world * k + (x, y)`.
#[derive(Clone, Debug)]
pub struct Camera {
	x: f64,
	y: f64,
	k: f64,
	width: f64,
	height: f64,
	config: CameraConfig,
	pan: Option<PanGesture>,
	flight: Option<Flight>,
}

impl Camera {
	/// World origin starts at the middle of the surface.
	pub fn new(width: f64, height: f64, config: CameraConfig) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
			width,
			height,
			config,
			pan: None,
			flight: None,
		}
	}

	pub fn scale(&self) -> f64 {
		self.k
	}

	pub fn translation(&self) -> Vec2 {
		Vec2::new(self.x, self.y)
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
		Vec2::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
	}

	pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
		Vec2::new(world.x * self.k + self.x, world.y * self.k + self.y)
	}

	/// World point currently under the middle of the surface.
	pub fn world_center(&self) -> Vec2 {
		self.screen_to_world(Vec2::new(self.width / 2.0, self.height / 2.0))
	}

	pub fn begin_pan(&mut self, at: Vec2) {
		self.flight = None;
		self.pan = Some(PanGesture {
			start: at,
			origin: self.translation(),
		});
	}

	pub fn pan_to(&mut self, at: Vec2) {
		if let Some(pan) = &self.pan {
			self.x = pan.origin.x + (at.x - pan.start.x);
			self.y = pan.origin.y + (at.y - pan.start.y);
		}
	}

	pub fn end_pan(&mut self) {
		self.pan = None;
	}

	pub fn is_panning(&self) -> bool {
		self.pan.is_some()
	}

	/// Scales by `factor` keeping the world point under `at` fixed on screen.
	pub fn zoom_at(&mut self, at: Vec2, factor: f64) {
		self.flight = None;
		let k = (self.k * factor).clamp(self.config.min_scale, self.config.max_scale);
		let ratio = k / self.k;
		self.x = at.x - (at.x - self.x) * ratio;
		self.y = at.y - (at.y - self.y) * ratio;
		self.k = k;
	}

	/// One wheel notch; positive `delta_y` zooms out.
	pub fn wheel(&mut self, at: Vec2, delta_y: f64) {
		let step = self.config.wheel_step;
		let factor = if delta_y > 0.0 { 1.0 / step } else { step };
		self.zoom_at(at, factor);
	}

	/// Keeps the world point at the middle of the surface in the middle.
	pub fn resize(&mut self, width: f64, height: f64) {
		let center = self.world_center();
		self.width = width;
		self.height = height;
		self.look_at(center, self.k);
	}

	/// Starts an eased flight centering `world` at the configured focus scale.
	pub fn focus_on(&mut self, world: Vec2) {
		let to_k = self
			.config
			.focus_scale
			.clamp(self.config.min_scale, self.config.max_scale);
		self.flight = Some(Flight {
			from: self.world_center(),
			to: world,
			from_k: self.k,
			to_k,
			elapsed: 0.0,
			duration: self.config.focus_duration.max(f64::EPSILON),
		});
	}

	pub fn is_animating(&self) -> bool {
		self.flight.is_some()
	}

	/// Advances a running flight by `dt` seconds.
	pub fn step(&mut self, dt: f64) {
		let Some(flight) = &mut self.flight else {
			return;
		};
		flight.elapsed = (flight.elapsed + dt).min(flight.duration);
		let t = ease_in_out_sine(flight.elapsed / flight.duration);
		let center = flight.from + (flight.to - flight.from) * t;
		let k = flight.from_k + (flight.to_k - flight.from_k) * t;
		let done = flight.elapsed >= flight.duration;
		self.look_at(center, k);
		if done {
			self.flight = None;
		}
	}

	fn look_at(&mut self, world: Vec2, k: f64) {
		self.k = k;
		self.x = self.width / 2.0 - world.x * k;
		self.y = self.height / 2.0 - world.y * k;
	}
}
