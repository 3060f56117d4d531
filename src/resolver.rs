//! Coordinate resolver.
//!
//! Maps between schema order, active order, rendered order and pixels. It
//! holds no state of its own: every answer is derived from the registry, the
//! configuration, the viewport and the current rendered records. Anything not
//! currently on screen resolves to `None`, which callers treat as "not
//! interactable" rather than as zero.

use serde::Serialize;

use crate::config::GridConfig;
use crate::layout::{leading_width, RenderedLayout, Viewport, VisibleColumn, VisibleRow};
use crate::registry::ColumnRegistry;
use crate::types::{ColumnKind, GridColumn, Point, Subgrid};

/// Result of a hit test: the cell under a point and the point's offset
/// inside that cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellHit {
    pub column: VisibleColumn,
    pub row: VisibleRow,
    pub offset: Point,
}

/// Read-only view over everything needed to translate coordinates.
#[derive(Clone, Copy)]
pub struct CoordinateResolver<'a> {
    registry: &'a ColumnRegistry,
    config: &'a GridConfig,
    viewport: &'a Viewport,
    layout: &'a RenderedLayout,
}

impl<'a> CoordinateResolver<'a> {
    pub fn new(
        registry: &'a ColumnRegistry,
        config: &'a GridConfig,
        viewport: &'a Viewport,
        layout: &'a RenderedLayout,
    ) -> Self {
        Self {
            registry,
            config,
            viewport,
            layout,
        }
    }

    pub fn layout(&self) -> &'a RenderedLayout {
        self.layout
    }

    /// Active index of schema column `data_index`, or `None` if hidden.
    pub fn grid_index_from_data_index(&self, data_index: usize) -> Option<usize> {
        self.registry.active_index_of(ColumnKind::Data(data_index))
    }

    /// Schema index of the column at active index `grid_index`.
    pub fn data_index_from_grid_index(&self, grid_index: usize) -> Option<usize> {
        self.registry
            .active()
            .get(grid_index)
            .and_then(|k| k.data_index())
    }

    /// Leftmost grid column: the row handle if shown, else the tree column if
    /// shown, else the first active column.
    pub fn leftmost_column(&self) -> GridColumn {
        if self.config.show_row_numbers {
            GridColumn::RowHandle
        } else if self.config.show_tree_column {
            GridColumn::TreeIndent
        } else {
            GridColumn::Active(0)
        }
    }

    /// Whether `column` is inside the fixed (non-scrolling) region.
    pub fn is_fixed_column(&self, column: GridColumn) -> bool {
        match column {
            GridColumn::Active(i) => i < self.fixed_column_count(),
            GridColumn::RowHandle | GridColumn::TreeIndent => false,
        }
    }

    pub fn fixed_column_count(&self) -> usize {
        self.config
            .fixed_column_count
            .min(self.registry.active_len())
    }

    /// Left pixel edge of `column`, summing the widths in front of it.
    ///
    /// Widths are read live from the registry rather than from a prefix sum.
    /// Columns scrolled out behind the fixed region, hidden synthetic
    /// columns, and edges past the viewport's right side resolve to `None`.
    /// `Active(len)` is the right edge of the last column.
    pub fn column_start_pixel(&self, column: GridColumn) -> Option<f32> {
        let handle_width = self
            .registry
            .column(ColumnKind::RowHandle)
            .map_or(0.0, |c| c.width());
        let x = match column {
            GridColumn::RowHandle => self.config.show_row_numbers.then_some(0.0)?,
            GridColumn::TreeIndent => {
                if !self.config.show_tree_column {
                    return None;
                }
                if self.config.show_row_numbers {
                    handle_width
                } else {
                    0.0
                }
            }
            GridColumn::Active(g) => {
                let active = self.registry.active();
                if g > active.len() {
                    return None;
                }
                let width_of =
                    |i: usize| -> f32 { self.registry.active_width(GridColumn::Active(i)).unwrap_or(0.0) };
                let fixed = self.fixed_column_count();
                let mut x = leading_width(self.registry, self.config);
                x += (0..g.min(fixed)).map(width_of).sum::<f32>();
                if g >= fixed {
                    let first = fixed + self.viewport.scroll_left;
                    if g < first {
                        return None;
                    }
                    x += (first..g).map(width_of).sum::<f32>();
                }
                x
            }
        };
        (x <= self.viewport.width).then_some(x)
    }

    /// Pixel right edge of the fixed region (synthetic + fixed columns).
    pub fn fixed_boundary_pixel(&self) -> f32 {
        let fixed = self.fixed_column_count();
        leading_width(self.registry, self.config)
            + (0..fixed)
                .filter_map(|i| self.registry.active_width(GridColumn::Active(i)))
                .sum::<f32>()
    }

    /// Pixel bottom edge of the header rows plus the fixed data rows.
    pub fn fixed_row_boundary_pixel(&self) -> f32 {
        let fixed = self.config.fixed_row_count;
        self.layout
            .rows
            .iter()
            .take_while(|r| r.subgrid != Subgrid::Data || r.row_index < fixed)
            .last()
            .map_or(0.0, VisibleRow::bottom)
    }

    pub fn column_at_pixel(&self, x: f32) -> Option<&'a VisibleColumn> {
        self.layout.column_at_x(x)
    }

    pub fn row_at_pixel(&self, y: f32) -> Option<&'a VisibleRow> {
        self.layout.row_at_y(y)
    }

    /// Rendered record for grid column `column`.
    pub fn visible_column(&self, column: GridColumn) -> Option<&'a VisibleColumn> {
        self.layout.columns.iter().find(|c| c.column == column)
    }

    /// Rendered record for schema column `kind`.
    pub fn visible_data_column(&self, kind: ColumnKind) -> Option<&'a VisibleColumn> {
        self.layout.columns.iter().find(|c| c.kind == kind)
    }

    /// Rendered record at grid row `index`.
    pub fn visible_row(&self, index: usize) -> Option<&'a VisibleRow> {
        self.layout.rows.get(index)
    }

    /// Rendered record for `row_index` within `subgrid`.
    pub fn visible_data_row(&self, row_index: usize, subgrid: Subgrid) -> Option<&'a VisibleRow> {
        self.layout
            .rows
            .iter()
            .find(|r| r.subgrid == subgrid && r.row_index == row_index)
    }

    pub fn final_column_boundary(&self) -> f32 {
        self.layout.final_column_boundary()
    }

    /// The cell under `point` and the point's offset inside it.
    pub fn cell_at_point(&self, point: Point) -> Option<CellHit> {
        let column = *self.column_at_pixel(point.x)?;
        let row = *self.row_at_pixel(point.y)?;
        Some(CellHit {
            column,
            row,
            offset: Point::new(point.x - column.left, point.y - row.top),
        })
    }

    /// Active index of the column edge nearest to `x`, as an insertion point.
    ///
    /// Exact ties resolve to the right edge. The right edge of a rendered
    /// column is the start of the next rendered column, so the boundary
    /// after the fixed region names the first scrolled-in column. Left of
    /// all data columns resolves to the first rendered one; past the last
    /// rendered column snaps back inside the run to the last one.
    pub fn nearest_column_boundary(&self, x: f32) -> Option<usize> {
        let rendered: Vec<&VisibleColumn> = self.layout.active_columns().collect();
        let first = rendered.first()?;
        let last = rendered.last()?;
        if x < first.left {
            return first.column.active_index();
        }
        if x >= last.right() {
            return last.column.active_index();
        }
        let pos = rendered
            .iter()
            .position(|c| x >= c.left && x < c.right())?;
        let under = rendered.get(pos)?;
        let index = under.column.active_index()?;
        if (under.left - x).abs() < (under.right() - x).abs() {
            Some(index)
        } else {
            Some(
                rendered
                    .get(pos + 1)
                    .and_then(|c| c.column.active_index())
                    .unwrap_or(index + 1),
            )
        }
    }

    /// Data-row edge nearest to `y`, as a row index. Same tie and clamp
    /// rules as [`Self::nearest_column_boundary`].
    pub fn nearest_row_boundary(&self, y: f32) -> Option<usize> {
        let rendered: Vec<&VisibleRow> = self.layout.data_rows().collect();
        let first = rendered.first()?;
        let last = rendered.last()?;
        if y < first.top {
            return Some(first.row_index);
        }
        if y >= last.bottom() {
            return Some(last.row_index);
        }
        let pos = rendered
            .iter()
            .position(|r| y >= r.top && y < r.bottom())?;
        let under = rendered.get(pos)?;
        if (under.top - y).abs() < (under.bottom() - y).abs() {
            Some(under.row_index)
        } else {
            Some(
                rendered
                    .get(pos + 1)
                    .map_or(under.row_index + 1, |r| r.row_index),
            )
        }
    }
}
