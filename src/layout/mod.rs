//! Layout engine for the rendered region and viewport management.
//!
//! This module handles:
//! - Viewport state (scroll offsets in whole columns/rows, size)
//! - Scroll limits for the current content
//! - Per-pass visible column/row records
//! - Binary search for the column/row under a pixel

mod rendered;
mod viewport;

pub use rendered::{RenderedLayout, VisibleColumn, VisibleRow};
pub(crate) use viewport::leading_width;
pub use viewport::{ScrollLimits, Viewport};
