//! Structured error types for vgrid.
//!
//! Only programmer misuse surfaces here. Conditions that are expected during
//! normal interaction (an off-screen coordinate, a stale timer, a drop that
//! lands where it started) are reported through `Option`/`bool` instead.

use crate::types::ColumnKind;

/// All errors that can occur while driving a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A column lookup that must succeed did not.
    #[error("Column not found: {0}")]
    ColumnNotFound(ColumnKind),

    /// An argument had the wrong shape (unknown feature name, bad index list, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed delimited text.
    #[error("CSV: {0}")]
    Csv(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
