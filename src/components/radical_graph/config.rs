use serde::Deserialize;

/// Engine tuning knobs. Every field has a default, so hosts may deserialize a
/// partial object.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
	pub simulation: SimulationConfig,
	pub camera: CameraConfig,
	/// Hit-test radius in world units.
	pub pick_radius: f64,
	/// Drawn node radius in world units.
	pub node_radius: f64,
	/// Largest component-count difference at which a more complex entry is
	/// still revealed as a `child` of the expanding node.
	pub child_horizon: usize,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			simulation: SimulationConfig::default(),
			camera: CameraConfig::default(),
			pick_radius: 25.0,
			node_radius: 20.0,
			child_horizon: 1,
		}
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
	pub link_distance: f64,
	/// Negative values repel.
	pub charge_strength: f64,
	pub charge_distance_min: f64,
	pub collide_radius: f64,
	pub collide_strength: f64,
	pub collide_iterations: usize,
	/// Strength of the pull toward the layout center on each axis.
	pub position_strength: f64,
	pub velocity_decay: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Energy injected on drag start and on resize.
	pub reheat_alpha: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			link_distance: 80.0,
			charge_strength: -800.0,
			charge_distance_min: 1.0,
			collide_radius: 40.0,
			collide_strength: 0.7,
			collide_iterations: 2,
			position_strength: 0.05,
			velocity_decay: 0.6,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.1,
			reheat_alpha: 0.3,
		}
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
	pub min_scale: f64,
	pub max_scale: f64,
	/// Zoom factor applied per wheel notch.
	pub wheel_step: f64,
	/// Scale the camera settles at when focusing a new root.
	pub focus_scale: f64,
	/// Seconds.
	pub focus_duration: f64,
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.2,
			max_scale: 3.0,
			wheel_step: 1.1,
			focus_scale: 1.5,
			focus_duration: 1.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config_falls_back_to_defaults() {
		let config: GraphConfig =
			serde_json::from_str(r#"{"pick_radius": 30.0, "camera": {"max_scale": 4.0}}"#).unwrap();
		assert_eq!(config.pick_radius, 30.0);
		assert_eq!(config.camera.max_scale, 4.0);
		assert_eq!(config.camera.min_scale, 0.2);
		assert_eq!(config.simulation, SimulationConfig::default());
	}

	#[test]
	fn alpha_decay_cools_to_min_in_300_ticks() {
		let sim = SimulationConfig::default();
		let alpha = (1.0 - sim.alpha_decay).powi(300);
		assert!((alpha - sim.alpha_min).abs() < 1e-9);
	}
}
