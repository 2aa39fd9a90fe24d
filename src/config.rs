//! Render and simulation settings.
//!
//! Every field has a default, so a bundle may carry a partial `config`
//! object and only override what it names.

use std::fmt::Display;

use log::warn;
use serde::{Deserialize, Serialize};

/// Parameters handed to the force simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Node repulsion strength.
	pub force_charge: f32,
	/// Link spring stiffness.
	pub force_spring: f32,
	/// Upper bound on any single force.
	pub force_max: f32,
	/// Velocity scale.
	pub node_speed: f32,
	/// Velocity damping per update.
	pub damping_factor: f32,
	/// Mass given to every node.
	pub node_mass: f32,
	/// Fraction of alpha lost each tick.
	pub alpha_decay: f64,
	/// Below this alpha the layout stops moving.
	pub alpha_min: f64,
	/// Simulated seconds per animation frame.
	pub frame_dt: f32,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			node_mass: 10.0,
			alpha_decay: 0.0228,
			alpha_min: 0.001,
			frame_dt: 0.016,
		}
	}
}

impl SimulationConfig {
	/// Replace values the simulation cannot run with by their defaults.
	///
	/// Forces must be finite and non-negative, damping within `[0, 1]`,
	/// mass and `frame_dt` positive, and the alpha settings strictly
	/// between 0 and 1 so that cooling always converges.
	pub fn sanitized(mut self) -> Self {
		let d = Self::default();
		let force = |v: f32| v.is_finite() && v >= 0.0;
		let unit = |v: f64| v > 0.0 && v < 1.0;
		reset(&mut self.force_charge, "force_charge", force, d.force_charge);
		reset(&mut self.force_spring, "force_spring", force, d.force_spring);
		reset(&mut self.force_max, "force_max", force, d.force_max);
		reset(&mut self.node_speed, "node_speed", force, d.node_speed);
		reset(
			&mut self.damping_factor,
			"damping_factor",
			|v| (0.0..=1.0).contains(&v),
			d.damping_factor,
		);
		reset(&mut self.node_mass, "node_mass", |v| positive(v.into()), d.node_mass);
		reset(&mut self.alpha_decay, "alpha_decay", unit, d.alpha_decay);
		reset(&mut self.alpha_min, "alpha_min", unit, d.alpha_min);
		reset(&mut self.frame_dt, "frame_dt", |v| positive(v.into()), d.frame_dt);
		self
	}
}

/// Size and interaction limits of the rendered view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
	/// Viewport width in pixels.
	pub width: f64,
	/// Viewport height in pixels.
	pub height: f64,
	/// Smallest zoom factor.
	pub min_zoom: f64,
	/// Largest zoom factor.
	pub max_zoom: f64,
	/// World-space rectangle `[[x0, y0], [x1, y1]]` the viewport may show.
	/// Derived from the viewport size when absent.
	pub translate_extent: Option<[[f64; 2]; 2]>,
	/// Simulation parameters.
	pub simulation: SimulationConfig,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 800.0,
			min_zoom: 1.0,
			max_zoom: 40.0,
			translate_extent: None,
			simulation: SimulationConfig::default(),
		}
	}
}

impl RenderConfig {
	/// The effective translate extent.
	pub fn extent(&self) -> [[f64; 2]; 2] {
		self.translate_extent.unwrap_or([
			[-100.0, -100.0],
			[self.width + 90.0, self.height + 100.0],
		])
	}

	/// Replace unusable values by their defaults, logging each one.
	///
	/// Viewport sizes and zoom bounds must be finite and positive, and a
	/// translate extent with a non-finite corner is dropped.
	pub fn sanitized(mut self) -> Self {
		let d = Self::default();
		reset(&mut self.width, "width", positive, d.width);
		reset(&mut self.height, "height", positive, d.height);
		reset(&mut self.min_zoom, "min_zoom", positive, d.min_zoom);
		reset(&mut self.max_zoom, "max_zoom", positive, d.max_zoom);
		if let Some(extent) = self.translate_extent {
			if !extent.iter().flatten().all(|v| v.is_finite()) {
				warn!("ignoring invalid translate_extent {extent:?}");
				self.translate_extent = None;
			}
		}
		self.simulation = self.simulation.sanitized();
		self
	}

	/// Zoom bounds, ordered and kept positive.
	pub fn zoom_bounds(&self) -> (f64, f64) {
		let lo = self.min_zoom.min(self.max_zoom).max(f64::EPSILON);
		let hi = self.min_zoom.max(self.max_zoom).max(lo);
		(lo, hi)
	}
}

fn positive(v: f64) -> bool {
	v.is_finite() && v > 0.0
}

fn reset<T: Copy + Display>(value: &mut T, name: &str, valid: impl Fn(T) -> bool, default: T) {
	if !valid(*value) {
		warn!("ignoring invalid {name} {value}, using {default}");
		*value = default;
	}
}

/// Default document title for exports.
pub const DEFAULT_EXPORT_TITLE: &str = "Network Visualization";
/// Default CSS width for exports.
pub const DEFAULT_EXPORT_WIDTH: &str = "100%";
/// Default export height in pixels.
pub const DEFAULT_EXPORT_HEIGHT: u32 = 600;
