//! vgrid - virtualized data grid engine
//!
//! The parts a canvas/DOM grid needs underneath its painter:
//! - Column registry: full schema columns plus the ordered active list
//! - Coordinate resolver: schema, active, rendered and pixel spaces
//! - Cell cursor: one reusable, lazily-derived view of a cell per paint step
//! - Feature pipeline: ordered interaction handlers (move, resize, fixation,
//!   selection, auto-scroll) driven by pointer, key and timer events
//!
//! # Usage (Rust)
//!
//! ```
//! use vgrid::{csv::Delimiter, Grid, GridConfig};
//!
//! let mut grid = Grid::from_delimited(b"a,b\n1,2\n", Delimiter::Comma, GridConfig::default())?;
//! grid.paint(|cell| {
//!     let _text = cell.formatted_value();
//! });
//! # Ok::<(), vgrid::GridError>(())
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'vgrid';
//! await init();
//! const view = GridView.fromCsv(text, "{}");
//! view.pointerDown(x, y, 0, false, false);
//! ```

pub mod config;
pub mod csv;
pub mod cursor;
pub mod data;
pub mod error;
pub mod events;
pub mod features;
pub mod format;
pub mod grid;
pub mod layout;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use config::GridConfig;
pub use cursor::{CellContext, CellCursor, CellView};
pub use data::{DataSource, LocalDataSource};
pub use error::{GridError, Result};
pub use events::{GridEvent, SubscriptionId};
pub use grid::{Grid, GridModel};
pub use registry::{ColumnRegistry, ColumnSource, GridState, Placement};
pub use resolver::CoordinateResolver;
pub use types::*;
pub use viewer::GridView;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
