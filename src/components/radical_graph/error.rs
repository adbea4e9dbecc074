use thiserror::Error;

/// Failures surfaced by the radical graph engine.
///
/// Lookup failures leave the engine untouched; the host shows the `Display`
/// text as a notice.
#[derive(Debug, Error)]
pub enum GraphError {
	#[error("\"{id}\" was not found in the dataset")]
	NotFound { id: String },

	#[error("canvas surface unavailable: {0}")]
	Surface(String),

	#[error("invalid reference data: {0}")]
	Data(#[from] serde_json::Error),
}

impl GraphError {
	pub fn not_found(id: impl Into<String>) -> Self {
		Self::NotFound { id: id.into() }
	}
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
