//! Per-pass records of what is on screen.
//!
//! A renderer builds one [`RenderedLayout`] per paint from the active list,
//! the fixed counts and the scroll offsets. Everything else (resolver,
//! cursor, features) only reads these records.

use serde::Serialize;

use super::Viewport;
use crate::config::GridConfig;
use crate::registry::ColumnRegistry;
use crate::types::{ColumnKind, GridColumn, Subgrid};

/// One on-screen column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleColumn {
    /// Position among rendered columns
    pub index: usize,
    /// Grid (active-space) position
    pub column: GridColumn,
    /// Schema identity
    pub kind: ColumnKind,
    pub left: f32,
    pub width: f32,
}

impl VisibleColumn {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }
}

/// One on-screen row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRow {
    /// Position among rendered rows; also the grid-space row coordinate
    pub index: usize,
    /// Row index within its subgrid
    pub row_index: usize,
    pub subgrid: Subgrid,
    pub top: f32,
    pub height: f32,
}

impl VisibleRow {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Rendered column/row records for one pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedLayout {
    pub columns: Vec<VisibleColumn>,
    pub rows: Vec<VisibleRow>,
}

impl RenderedLayout {
    /// Lay out the columns and rows that fit in `viewport`.
    ///
    /// Synthetic columns come first, then the fixed active columns, then the
    /// scrollable ones starting `scroll_left` past the fixed boundary. Rows
    /// follow the same scheme: header rows, the filter row, fixed data rows,
    /// then scrolled data rows.
    pub fn compute(
        registry: &ColumnRegistry,
        config: &GridConfig,
        viewport: &Viewport,
        row_count: usize,
    ) -> Self {
        let mut columns: Vec<VisibleColumn> = Vec::new();
        let mut x = 0.0;
        let mut push_col = |column: GridColumn, kind: ColumnKind, width: f32, x: &mut f32| {
            columns.push(VisibleColumn {
                index: columns.len(),
                column,
                kind,
                left: *x,
                width,
            });
            *x += width;
        };

        let synthetic = [
            (config.show_row_numbers, GridColumn::RowHandle, ColumnKind::RowHandle),
            (config.show_tree_column, GridColumn::TreeIndent, ColumnKind::TreeIndent),
        ];
        for (shown, column, kind) in synthetic {
            if shown {
                if let Some(col) = registry.column(kind) {
                    push_col(column, kind, col.width(), &mut x);
                }
            }
        }

        let active = registry.active();
        let fixed = config.fixed_column_count.min(active.len());
        let scrolled = (fixed + viewport.scroll_left..active.len()).map(|i| (i, true));
        for (i, scrollable) in (0..fixed).map(|i| (i, false)).chain(scrolled) {
            if scrollable && x >= viewport.width {
                break;
            }
            let Some(&kind) = active.get(i) else {
                break;
            };
            let width = registry.column(kind).map_or(0.0, |c| c.width());
            push_col(GridColumn::Active(i), kind, width, &mut x);
        }

        let mut rows: Vec<VisibleRow> = Vec::new();
        let mut y = 0.0;
        let mut push_row = |row_index: usize, subgrid: Subgrid, height: f32, y: &mut f32| {
            rows.push(VisibleRow {
                index: rows.len(),
                row_index,
                subgrid,
                top: *y,
                height,
            });
            *y += height;
        };

        for r in 0..config.header_row_count {
            push_row(r, Subgrid::Header, config.header_row_height, &mut y);
        }
        if config.show_filter_row {
            push_row(0, Subgrid::Filter, config.default_row_height, &mut y);
        }
        let fixed_rows = config.fixed_row_count.min(row_count);
        let scrolled_rows = (fixed_rows + viewport.scroll_top..row_count).map(|r| (r, true));
        for (r, scrollable) in (0..fixed_rows).map(|r| (r, false)).chain(scrolled_rows) {
            if scrollable && y >= viewport.height {
                break;
            }
            push_row(r, Subgrid::Data, config.default_row_height, &mut y);
        }

        Self { columns, rows }
    }

    /// Rendered column containing `x`, by binary search over left edges.
    pub fn column_at_x(&self, x: f32) -> Option<&VisibleColumn> {
        let i = self.columns.partition_point(|c| c.left <= x);
        let col = self.columns.get(i.checked_sub(1)?)?;
        (x < col.right()).then_some(col)
    }

    /// Rendered row containing `y`.
    pub fn row_at_y(&self, y: f32) -> Option<&VisibleRow> {
        let i = self.rows.partition_point(|r| r.top <= y);
        let row = self.rows.get(i.checked_sub(1)?)?;
        (y < row.bottom()).then_some(row)
    }

    /// Right edge of the last rendered column.
    pub fn final_column_boundary(&self) -> f32 {
        self.columns.last().map_or(0.0, VisibleColumn::right)
    }

    /// Bottom edge of the last rendered row.
    pub fn final_row_boundary(&self) -> f32 {
        self.rows.last().map_or(0.0, VisibleRow::bottom)
    }

    /// Rendered data columns (active-list members) only.
    pub fn active_columns(&self) -> impl Iterator<Item = &VisibleColumn> + '_ {
        self.columns
            .iter()
            .filter(|c| matches!(c.column, GridColumn::Active(_)))
    }

    /// Rendered data rows only.
    pub fn data_rows(&self) -> impl Iterator<Item = &VisibleRow> + '_ {
        self.rows.iter().filter(|r| r.subgrid == Subgrid::Data)
    }
}
