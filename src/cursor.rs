//! The cell cursor: one reusable, mutable view of "the cell being looked at".
//!
//! A grid owns a single long-lived [`CellCursor`] and rebinds it once per
//! on-screen cell during a paint, so binding must be cheap and must never
//! allocate per cell. Derived values (merged properties, formatted text,
//! bounds) are computed on first access after a bind and cached until the
//! next bind or [`CellCursor::invalidate`].
//!
//! The shared cursor must not be held across calls; take a [`CellCursor::fork`]
//! when a coordinate has to outlive the current pass.

use std::cell::OnceCell;

use serde::Serialize;
use serde_json::Value;

use crate::config::GridConfig;
use crate::data::DataSource;
use crate::format::FormatterRegistry;
use crate::layout::{RenderedLayout, VisibleColumn, VisibleRow};
use crate::registry::ColumnRegistry;
use crate::types::{
    CellValue, Column, ColumnKind, DataCell, GridCell, GridColumn, PropertyMap, Rect,
    SelectionModel, Span, Subgrid,
};

/// Column-property keys that hold section-specific overrides.
const SECTION_HEADER: &str = "columnHeader";
const SECTION_FILTER: &str = "filterRow";
const SECTION_ROW_HEADER: &str = "rowHeader";
const SECTION_TREE_HEADER: &str = "treeHeader";
const SECTION_KEYS: &[&str] = &[
    SECTION_HEADER,
    SECTION_FILTER,
    SECTION_ROW_HEADER,
    SECTION_TREE_HEADER,
];

/// Everything a cursor reads from. Built fresh by the grid for each pass.
#[derive(Clone, Copy)]
pub struct CellContext<'a> {
    pub registry: &'a ColumnRegistry,
    pub config: &'a GridConfig,
    pub layout: &'a RenderedLayout,
    pub data: &'a dyn DataSource,
    pub selection: &'a SelectionModel,
    pub hovered: Option<GridCell>,
    pub formatters: &'a FormatterRegistry,
}

/// The coordinates a bound cursor resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub visible_column: VisibleColumn,
    pub visible_row: VisibleRow,
    pub grid_cell: GridCell,
    pub data_cell: DataCell,
    /// Where the value actually lives; differs from `data_cell` when the
    /// cell is covered by a neighbour's span.
    pub value_cell: DataCell,
}

/// Reusable cell cursor. Unbound until the first successful reset.
#[derive(Debug, Default)]
pub struct CellCursor {
    binding: Option<Binding>,
    own_snapshot: Option<PropertyMap>,
    properties: OnceCell<PropertyMap>,
    formatted: OnceCell<String>,
    bounds: OnceCell<Rect>,
}

impl CellCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Drop every cached derived value.
    pub fn invalidate(&mut self) {
        self.properties.take();
        self.formatted.take();
        self.bounds.take();
    }

    /// Bind to a rendered column/row pair. Caches are cleared, the four
    /// coordinate pairs are copied, and a cell covered by another cell's span
    /// has its value coordinate redirected to the covering cell.
    pub fn reset(&mut self, ctx: &CellContext<'_>, column: VisibleColumn, row: VisibleRow) {
        self.invalidate();
        self.own_snapshot = None;

        let data_cell = DataCell {
            x: column.kind,
            y: row.row_index,
            subgrid: row.subgrid,
        };
        let value_cell = span_owner(ctx, column, row).unwrap_or(data_cell);
        if value_cell != data_cell {
            tracing::trace!(
                target: "vgrid::cursor",
                from = ?data_cell,
                to = ?value_cell,
                "render-skip redirect"
            );
        }
        self.binding = Some(Binding {
            visible_column: column,
            visible_row: row,
            grid_cell: GridCell {
                x: column.column,
                y: row.index,
            },
            data_cell,
            value_cell,
        });
    }

    /// Bind by grid coordinate. Returns `false`, leaving the cursor exactly
    /// as it was, when either coordinate is not currently rendered.
    pub fn reset_by_grid_coordinate(
        &mut self,
        ctx: &CellContext<'_>,
        x: GridColumn,
        y: usize,
    ) -> bool {
        let Some(column) = ctx.layout.columns.iter().find(|c| c.column == x).copied() else {
            return false;
        };
        let Some(row) = ctx.layout.rows.get(y).copied() else {
            return false;
        };
        self.reset(ctx, column, row);
        true
    }

    /// Bind by data coordinate. Same failure contract as
    /// [`Self::reset_by_grid_coordinate`].
    pub fn reset_by_data_coordinate(
        &mut self,
        ctx: &CellContext<'_>,
        x: ColumnKind,
        y: usize,
        subgrid: Subgrid,
    ) -> bool {
        let Some(column) = ctx.layout.columns.iter().find(|c| c.kind == x).copied() else {
            return false;
        };
        let Some(row) = ctx
            .layout
            .rows
            .iter()
            .find(|r| r.subgrid == subgrid && r.row_index == y)
            .copied()
        else {
            return false;
        };
        self.reset(ctx, column, row);
        true
    }

    /// Independent cursor bound to the same coordinates. With `copy_own`, the
    /// cell's own properties are snapshotted so later edits to the live cell
    /// do not show through.
    pub fn fork(&self, ctx: &CellContext<'_>, copy_own: bool) -> CellCursor {
        let own_snapshot = if copy_own {
            self.binding
                .as_ref()
                .and_then(|b| self.own_properties(ctx, b).cloned())
                .or_else(|| Some(PropertyMap::new()))
        } else {
            None
        };
        CellCursor {
            binding: self.binding,
            own_snapshot,
            ..CellCursor::default()
        }
    }

    /// Read-only accessors for the bound cell. `None` while unbound.
    pub fn view<'c>(&'c self, ctx: &'c CellContext<'c>) -> Option<CellView<'c>> {
        let binding = self.binding.as_ref()?;
        Some(CellView {
            cursor: self,
            binding,
            ctx,
        })
    }

    /// Write through to the data source at the value coordinate. Only data
    /// cells hold values; anything else is ignored and returns `false`.
    pub fn set_value(&mut self, data: &mut dyn DataSource, value: CellValue) -> bool {
        let Some(b) = self.binding else {
            return false;
        };
        let (Subgrid::Data, Some(x)) = (b.value_cell.subgrid, b.value_cell.x.data_index()) else {
            return false;
        };
        data.set_value(x, b.value_cell.y, value);
        self.formatted.take();
        true
    }

    /// Set a cell-level property override, stored in the row's metadata under
    /// the column's name.
    pub fn set_cell_property(
        &mut self,
        data: &mut dyn DataSource,
        registry: &ColumnRegistry,
        key: &str,
        value: Value,
    ) -> bool {
        let Some(b) = self.binding else {
            return false;
        };
        if b.data_cell.subgrid != Subgrid::Data {
            return false;
        }
        let Some(column) = registry.column(b.data_cell.x) else {
            return false;
        };
        let mut meta = data.row_metadata(b.data_cell.y).cloned().unwrap_or_default();
        let entry = meta
            .entry(column.name.clone())
            .or_insert_with(|| Value::Object(PropertyMap::new()));
        if !entry.is_object() {
            *entry = Value::Object(PropertyMap::new());
        }
        if let Value::Object(cell) = entry {
            cell.insert(key.to_string(), value.clone());
        }
        data.set_row_metadata(b.data_cell.y, meta);
        if let Some(snapshot) = self.own_snapshot.as_mut() {
            snapshot.insert(key.to_string(), value);
        }
        self.properties.take();
        self.formatted.take();
        true
    }

    fn own_properties<'c>(&'c self, ctx: &CellContext<'c>, b: &Binding) -> Option<&'c PropertyMap> {
        if let Some(snapshot) = self.own_snapshot.as_ref() {
            return Some(snapshot);
        }
        if b.data_cell.subgrid != Subgrid::Data {
            return None;
        }
        let column = ctx.registry.column(b.data_cell.x)?;
        ctx.data
            .row_metadata(b.data_cell.y)?
            .get(&column.name)?
            .as_object()
    }
}

/// Locate the cell whose span covers `(column, row)`, searching back in
/// active order up to `span_lookback` columns and rows.
fn span_owner(ctx: &CellContext<'_>, column: VisibleColumn, row: VisibleRow) -> Option<DataCell> {
    if row.subgrid != Subgrid::Data || !ctx.data.has_spans() {
        return None;
    }
    let active_index = column.column.active_index()?;
    let lookback = ctx.config.span_lookback;
    let active = ctx.registry.active();
    for dy in 0..=lookback {
        let Some(y) = row.row_index.checked_sub(dy) else {
            break;
        };
        for dx in 0..=lookback {
            if dx == 0 && dy == 0 {
                continue;
            }
            let Some(a) = active_index.checked_sub(dx) else {
                break;
            };
            let Some(x) = active.get(a).and_then(|k| k.data_index()) else {
                continue;
            };
            let span = ctx.data.span(x, y);
            if span.colspan > dx && span.rowspan > dy {
                return Some(DataCell {
                    x: ColumnKind::Data(x),
                    y,
                    subgrid: Subgrid::Data,
                });
            }
        }
    }
    None
}

/// Accessors over a bound cursor.
pub struct CellView<'c> {
    cursor: &'c CellCursor,
    binding: &'c Binding,
    ctx: &'c CellContext<'c>,
}

impl<'c> CellView<'c> {
    pub fn binding(&self) -> &'c Binding {
        self.binding
    }

    pub fn grid_cell(&self) -> GridCell {
        self.binding.grid_cell
    }

    pub fn data_cell(&self) -> DataCell {
        self.binding.data_cell
    }

    pub fn value_cell(&self) -> DataCell {
        self.binding.value_cell
    }

    pub fn visible_column(&self) -> &'c VisibleColumn {
        &self.binding.visible_column
    }

    pub fn visible_row(&self) -> &'c VisibleRow {
        &self.binding.visible_row
    }

    pub fn column(&self) -> Option<&'c Column> {
        self.ctx.registry.column(self.binding.data_cell.x)
    }

    /// Current value: data cells read through the value coordinate, header
    /// cells show the column header, row handles show the 1-based row number.
    pub fn value(&self) -> CellValue {
        let b = self.binding;
        match (b.data_cell.subgrid, b.data_cell.x) {
            (Subgrid::Data, ColumnKind::Data(_)) => match b.value_cell.x.data_index() {
                Some(x) => self.ctx.data.get_value(x, b.value_cell.y),
                None => CellValue::Empty,
            },
            (Subgrid::Data, ColumnKind::RowHandle) => {
                #[allow(clippy::cast_precision_loss)]
                let n = (b.data_cell.y + 1) as f64;
                CellValue::Number(n)
            }
            (Subgrid::Header, ColumnKind::Data(_) | ColumnKind::TreeIndent) => self
                .column()
                .map_or(CellValue::Empty, |c| CellValue::Text(c.header.clone())),
            (Subgrid::Filter, ColumnKind::Data(_)) => self
                .properties()
                .get("filter")
                .and_then(Value::as_str)
                .map_or(CellValue::Empty, CellValue::from),
            _ => CellValue::Empty,
        }
    }

    /// Merged properties: grid defaults, then column, then the column's
    /// section override, then the cell's own overrides.
    pub fn properties(&self) -> &'c PropertyMap {
        self.cursor.properties.get_or_init(|| self.merge_properties())
    }

    pub fn property(&self, key: &str) -> Option<&'c Value> {
        self.properties().get(key)
    }

    fn merge_properties(&self) -> PropertyMap {
        let mut merged = self.ctx.config.cell_defaults.clone();
        let column = self.column();
        if let Some(col) = column {
            for (k, v) in &col.properties {
                if !SECTION_KEYS.contains(&k.as_str()) {
                    merged.insert(k.clone(), v.clone());
                }
            }
            let section = match (self.binding.data_cell.subgrid, self.binding.data_cell.x) {
                (Subgrid::Header, _) => Some(SECTION_HEADER),
                (Subgrid::Filter, _) => Some(SECTION_FILTER),
                (Subgrid::Data, ColumnKind::RowHandle) => Some(SECTION_ROW_HEADER),
                (Subgrid::Data, ColumnKind::TreeIndent) => Some(SECTION_TREE_HEADER),
                (Subgrid::Data, ColumnKind::Data(_)) => None,
            };
            if let Some(obj) = section
                .and_then(|s| col.properties.get(s))
                .and_then(Value::as_object)
            {
                for (k, v) in obj {
                    merged.insert(k.clone(), v.clone());
                }
            }
        }
        if let Some(own) = self.cursor.own_properties(self.ctx, self.binding) {
            for (k, v) in own {
                merged.insert(k.clone(), v.clone());
            }
        }
        merged
    }

    /// Display text for the current value.
    pub fn formatted_value(&self) -> &'c str {
        self.cursor
            .formatted
            .get_or_init(|| self.ctx.formatters.format(&self.value(), self.properties()))
    }

    /// Span anchored at this cell (single for non-data cells).
    pub fn span(&self) -> Span {
        let b = self.binding;
        match (b.data_cell.subgrid, b.data_cell.x.data_index()) {
            (Subgrid::Data, Some(x)) => self.ctx.data.span(x, b.data_cell.y),
            _ => Span::SINGLE,
        }
    }

    /// Pixel rectangle, widened to cover the cells this cell spans.
    pub fn bounds(&self) -> Rect {
        *self.cursor.bounds.get_or_init(|| {
            let vc = self.binding.visible_column;
            let vr = self.binding.visible_row;
            let mut rect = Rect {
                x: vc.left,
                y: vr.top,
                width: vc.width,
                height: vr.height,
            };
            if self.is_render_skip() {
                return rect;
            }
            let span = self.span();
            if let (true, Some(a)) = (span.is_merge(), vc.column.active_index()) {
                rect.width += (a + 1..a + span.colspan)
                    .filter_map(|i| self.ctx.registry.active_width(GridColumn::Active(i)))
                    .sum::<f32>();
                rect.height += (1..span.rowspan)
                    .map(|_| self.ctx.config.default_row_height)
                    .sum::<f32>();
            }
            rect
        })
    }

    pub fn is_render_skip(&self) -> bool {
        self.binding.value_cell != self.binding.data_cell
    }

    pub fn is_data_row(&self) -> bool {
        self.binding.data_cell.subgrid == Subgrid::Data
    }

    pub fn is_header_row(&self) -> bool {
        self.binding.data_cell.subgrid == Subgrid::Header
    }

    pub fn is_filter_row(&self) -> bool {
        self.binding.data_cell.subgrid == Subgrid::Filter
    }

    pub fn is_data_column(&self) -> bool {
        matches!(self.binding.data_cell.x, ColumnKind::Data(_))
    }

    pub fn is_handle_column(&self) -> bool {
        self.binding.data_cell.x == ColumnKind::RowHandle
    }

    pub fn is_tree_column(&self) -> bool {
        self.binding.data_cell.x == ColumnKind::TreeIndent
    }

    pub fn is_data_cell(&self) -> bool {
        self.is_data_row() && self.is_data_column()
    }

    pub fn is_header_cell(&self) -> bool {
        self.is_header_row() && self.is_data_column()
    }

    pub fn is_header_handle(&self) -> bool {
        self.is_header_row() && self.is_handle_column()
    }

    pub fn is_handle_cell(&self) -> bool {
        self.is_data_row() && self.is_handle_column()
    }

    /// Data column inside the fixed region.
    pub fn is_column_fixed(&self) -> bool {
        self.is_data_column()
            && self
                .active_index()
                .is_some_and(|a| a < self.ctx.config.fixed_column_count)
    }

    /// Data row inside the fixed region.
    pub fn is_row_fixed(&self) -> bool {
        self.is_data_row() && self.binding.data_cell.y < self.ctx.config.fixed_row_count
    }

    pub fn is_column_selected(&self) -> bool {
        self.active_index()
            .is_some_and(|a| self.ctx.selection.is_column_selected(a))
    }

    pub fn is_row_selected(&self) -> bool {
        self.is_data_row() && self.ctx.selection.is_row_selected(self.binding.data_cell.y)
    }

    pub fn is_cell_selected(&self) -> bool {
        self.is_data_row()
            && self
                .active_index()
                .is_some_and(|a| self.ctx.selection.is_cell_selected(self.binding.data_cell.y, a))
    }

    pub fn is_hovered(&self) -> bool {
        self.ctx.hovered == Some(self.binding.grid_cell)
    }

    pub fn is_row_hovered(&self) -> bool {
        self.ctx
            .hovered
            .is_some_and(|h| h.y == self.binding.grid_cell.y)
    }

    pub fn is_column_hovered(&self) -> bool {
        self.ctx
            .hovered
            .is_some_and(|h| h.x == self.binding.grid_cell.x)
    }

    fn active_index(&self) -> Option<usize> {
        self.binding.grid_cell.x.active_index()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::data::{schema_from_headers, LocalDataSource};
    use crate::layout::Viewport;
    use serde_json::json;

    struct Fixture {
        registry: ColumnRegistry,
        config: GridConfig,
        layout: RenderedLayout,
        data: LocalDataSource,
        selection: SelectionModel,
        formatters: FormatterRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let config = GridConfig::default();
            let registry =
                ColumnRegistry::with_schema(&schema_from_headers(&["a", "b", "c"]), &config);
            let data = LocalDataSource::generate(3, 10, |x, y| CellValue::Number((y * 10 + x) as f64));
            let layout =
                RenderedLayout::compute(&registry, &config, &Viewport::with_size(800.0, 200.0), 10);
            Self {
                registry,
                config,
                layout,
                data,
                selection: SelectionModel::new(),
                formatters: FormatterRegistry::new(),
            }
        }

        fn ctx(&self) -> CellContext<'_> {
            CellContext {
                registry: &self.registry,
                config: &self.config,
                layout: &self.layout,
                data: &self.data,
                selection: &self.selection,
                hovered: None,
                formatters: &self.formatters,
            }
        }
    }

    #[test]
    fn failed_reset_keeps_previous_binding() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut cursor = CellCursor::new();
        assert!(!cursor.is_bound());
        assert!(cursor.reset_by_grid_coordinate(&ctx, GridColumn::Active(1), 2));
        let before = *cursor.binding().unwrap();
        let (text, bounds) = {
            let view = cursor.view(&ctx).unwrap();
            (view.formatted_value().to_owned(), view.bounds())
        };
        assert!(!cursor.reset_by_grid_coordinate(&ctx, GridColumn::Active(1), 500));
        assert!(!cursor.reset_by_grid_coordinate(&ctx, GridColumn::Active(9), 2));
        assert!(!cursor.reset_by_data_coordinate(&ctx, ColumnKind::Data(1), 500, Subgrid::Data));
        assert_eq!(*cursor.binding().unwrap(), before);
        let view = cursor.view(&ctx).unwrap();
        assert_eq!(view.formatted_value(), text);
        assert_eq!(view.bounds(), bounds);
    }

    #[test]
    fn header_and_data_values() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut cursor = CellCursor::new();
        cursor.reset_by_grid_coordinate(&ctx, GridColumn::Active(2), 0);
        let view = cursor.view(&ctx).unwrap();
        assert!(view.is_header_cell());
        assert_eq!(view.value(), CellValue::Text("c".into()));

        cursor.reset_by_data_coordinate(&ctx, ColumnKind::Data(1), 3, Subgrid::Data);
        let view = cursor.view(&ctx).unwrap();
        assert!(view.is_data_cell());
        assert_eq!(view.formatted_value(), "31");

        cursor.reset_by_data_coordinate(&ctx, ColumnKind::RowHandle, 3, Subgrid::Data);
        assert_eq!(cursor.view(&ctx).unwrap().value(), CellValue::Number(4.0));
    }

    #[test]
    fn reset_clears_cached_format() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut cursor = CellCursor::new();
        cursor.reset_by_data_coordinate(&ctx, ColumnKind::Data(0), 1, Subgrid::Data);
        assert_eq!(cursor.view(&ctx).unwrap().formatted_value(), "10");
        cursor.reset_by_data_coordinate(&ctx, ColumnKind::Data(0), 2, Subgrid::Data);
        assert_eq!(cursor.view(&ctx).unwrap().formatted_value(), "20");
    }

    #[test]
    fn properties_layer_in_order() {
        let mut f = Fixture::new();
        f.config.cell_defaults.insert("color".into(), json!("black"));
        f.config.cell_defaults.insert("font".into(), json!("mono"));
        f.registry
            .add_column_properties(
                ColumnKind::Data(0),
                json!({"color": "blue", "columnHeader": {"color": "grey"}})
                    .as_object()
                    .unwrap(),
            )
            .unwrap();
        let mut meta = PropertyMap::new();
        meta.insert("a".into(), json!({"color": "red"}));
        f.data.set_row_metadata(1, meta);

        let ctx = f.ctx();
        let mut cursor = CellCursor::new();
        cursor.reset_by_data_coordinate(&ctx, ColumnKind::Data(0), 0, Subgrid::Data);
        let view = cursor.view(&ctx).unwrap();
        assert_eq!(view.property("color"), Some(&json!("blue")));
        assert_eq!(view.property("font"), Some(&json!("mono")));
        assert!(view.property("columnHeader").is_none());

        cursor.reset_by_data_coordinate(&ctx, ColumnKind::Data(0), 1, Subgrid::Data);
        assert_eq!(cursor.view(&ctx).unwrap().property("color"), Some(&json!("red")));

        cursor.reset_by_data_coordinate(&ctx, ColumnKind::Data(0), 0, Subgrid::Header);
        assert_eq!(cursor.view(&ctx).unwrap().property("color"), Some(&json!("grey")));
    }

    #[test]
    fn covered_cell_redirects_value_and_owner_widens() {
        let mut f = Fixture::new();
        f.data.set_span(0, 1, Span::new(2, 2));
        let ctx = f.ctx();
        let mut cursor = CellCursor::new();

        cursor.reset_by_data_coordinate(&ctx, ColumnKind::Data(1), 2, Subgrid::Data);
        let view = cursor.view(&ctx).unwrap();
        assert!(view.is_render_skip());
        assert_eq!(view.value_cell().x, ColumnKind::Data(0));
        assert_eq!(view.value_cell().y, 1);
        assert_eq!(view.value(), CellValue::Number(10.0));

        cursor.reset_by_data_coordinate(&ctx, ColumnKind::Data(0), 1, Subgrid::Data);
        let view = cursor.view(&ctx).unwrap();
        assert!(!view.is_render_skip());
        assert_eq!(view.bounds().width, 200.0);
        assert_eq!(view.bounds().height, 40.0);

        cursor.reset_by_data_coordinate(&ctx, ColumnKind::Data(2), 1, Subgrid::Data);
        assert!(!cursor.view(&ctx).unwrap().is_render_skip());
    }

    #[test]
    fn fork_with_own_properties_is_a_snapshot() {
        let mut f = Fixture::new();
        let mut cursor = CellCursor::new();
        cursor.reset_by_data_coordinate(&f.ctx(), ColumnKind::Data(0), 0, Subgrid::Data);
        cursor.set_cell_property(&mut f.data, &f.registry, "note", json!("x"));

        let ctx = f.ctx();
        let copy = cursor.fork(&ctx, true);
        let live = cursor.fork(&ctx, false);
        assert_eq!(copy.binding(), cursor.binding());

        let mut cursor2 = live;
        cursor2.set_cell_property(&mut f.data, &f.registry, "note", json!("y"));
        let ctx = f.ctx();
        assert_eq!(copy.view(&ctx).unwrap().property("note"), Some(&json!("x")));
        assert_eq!(cursor2.view(&ctx).unwrap().property("note"), Some(&json!("y")));
    }

    #[test]
    fn set_value_writes_through_value_cell() {
        let mut f = Fixture::new();
        let mut cursor = CellCursor::new();
        cursor.reset_by_data_coordinate(&f.ctx(), ColumnKind::Data(2), 4, Subgrid::Data);
        assert!(cursor.set_value(&mut f.data, CellValue::from("new")));
        assert_eq!(f.data.get_value(2, 4), CellValue::from("new"));

        cursor.reset_by_grid_coordinate(&f.ctx(), GridColumn::Active(0), 0);
        assert!(!cursor.set_value(&mut f.data, CellValue::from("header")));
    }
}
