//! Interactive radical graph: kanji linked by shared component sets, laid
//! out by a force simulation and drawn on a canvas.
//!
//! Everything except [`component`] and [`render`] is free of DOM calls.

mod camera;
mod component;
mod config;
mod error;
mod interaction;
mod relation;
mod render;
mod scene;
mod simulation;
mod state;
mod store;
mod types;

pub use component::RadicalGraphCanvas;
pub use config::GraphConfig;
pub use error::GraphError;
pub use state::{GraphCommand, GraphEvent};
pub use types::{ReferenceData, SelectedEntry};
