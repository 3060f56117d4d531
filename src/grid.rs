//! The grid: model state, the interaction pipeline, the shared cell cursor
//! and change notification, wired together.

use serde::Serialize;

use crate::config::GridConfig;
use crate::csv::{parse_delimited, Delimiter};
use crate::cursor::{CellContext, CellCursor, CellView};
use crate::data::DataSource;
use crate::error::Result;
use crate::events::{GridEvent, Notifier, SubscriptionId};
use crate::features::{
    CellInfo, CursorIcon, Feature, FeatureContext, Flow, KeyEvent, Overlays, Pipeline,
    PointerEvent,
};
use crate::format::FormatterRegistry;
use crate::layout::{RenderedLayout, ScrollLimits, Viewport};
use crate::registry::{moved_positions, ColumnRegistry, ColumnSource, GridState, Placement};
use crate::resolver::CoordinateResolver;
use crate::types::{
    CellValue, ColumnKind, ColumnSchema, DataCell, GridCell, GridColumn, Point, Rect,
    SelectionModel, Subgrid,
};

/// Everything features read and mutate.
pub struct GridModel {
    pub registry: ColumnRegistry,
    pub config: GridConfig,
    pub viewport: Viewport,
    pub layout: RenderedLayout,
    pub selection: SelectionModel,
    pub hovered: Option<GridCell>,
    pub data: Box<dyn DataSource>,
    pub formatters: FormatterRegistry,
    pub overlays: Overlays,
    events: Vec<GridEvent>,
    relaid_out: bool,
}

impl std::fmt::Debug for GridModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridModel")
            .field("active", &self.registry.active_len())
            .field("rows", &self.data.row_count())
            .field("viewport", &self.viewport)
            .field("selection", &self.selection)
            .field("overlays", &self.overlays)
            .finish_non_exhaustive()
    }
}

impl GridModel {
    pub fn new(data: Box<dyn DataSource>, schema: &[ColumnSchema], config: GridConfig) -> Self {
        let registry = ColumnRegistry::with_schema(schema, &config);
        let mut model = Self {
            registry,
            config,
            viewport: Viewport::new(),
            layout: RenderedLayout::default(),
            selection: SelectionModel::new(),
            hovered: None,
            data,
            formatters: FormatterRegistry::new(),
            overlays: Overlays::default(),
            events: Vec::new(),
            relaid_out: false,
        };
        model.relayout();
        model
    }

    pub fn row_count(&self) -> usize {
        self.data.row_count()
    }

    pub fn resolver(&self) -> CoordinateResolver<'_> {
        CoordinateResolver::new(&self.registry, &self.config, &self.viewport, &self.layout)
    }

    pub fn cell_context(&self) -> CellContext<'_> {
        CellContext {
            registry: &self.registry,
            config: &self.config,
            layout: &self.layout,
            data: self.data.as_ref(),
            selection: &self.selection,
            hovered: self.hovered,
            formatters: &self.formatters,
        }
    }

    pub fn scroll_limits(&self) -> ScrollLimits {
        ScrollLimits::compute(&self.registry, &self.config, &self.viewport, self.row_count())
    }

    /// Clamp scroll and rebuild the rendered records.
    pub fn relayout(&mut self) {
        let limits = self.scroll_limits();
        self.viewport.clamp_scroll(limits);
        self.layout =
            RenderedLayout::compute(&self.registry, &self.config, &self.viewport, self.row_count());
        self.relaid_out = true;
    }

    /// Scroll by whole columns/rows. Returns whether anything moved.
    pub fn scroll_by(&mut self, columns: isize, rows: isize) -> bool {
        let limits = self.scroll_limits();
        let moved = self.viewport.scroll_by(columns, rows, limits);
        if moved {
            self.relayout();
        }
        moved
    }

    pub fn scroll_to(&mut self, left: usize, top: usize) {
        let limits = self.scroll_limits();
        self.viewport.set_scroll(left, top, limits);
        self.relayout();
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport.resize(width, height);
        self.relayout();
    }

    /// Set the fixed column count, clamped to the active length.
    pub fn set_fixed_column_count(&mut self, count: usize) -> bool {
        let after = count.min(self.registry.active_len());
        let before = self.config.fixed_column_count;
        if before == after {
            return false;
        }
        self.config.fixed_column_count = after;
        tracing::debug!(target: "vgrid::grid", before, after, "fixed column count");
        self.emit(GridEvent::FixedColumnCountChanged { before, after });
        self.relayout();
        true
    }

    /// Set the fixed row count, clamped to the row count.
    pub fn set_fixed_row_count(&mut self, count: usize) -> bool {
        let after = count.min(self.row_count());
        let before = self.config.fixed_row_count;
        if before == after {
            return false;
        }
        self.config.fixed_row_count = after;
        tracing::debug!(target: "vgrid::grid", before, after, "fixed row count");
        self.emit(GridEvent::FixedRowCountChanged { before, after });
        self.relayout();
        true
    }

    /// Reorder active columns. A column selection follows the moved columns.
    pub fn move_columns(&mut self, from: usize, count: usize, to: usize) -> bool {
        let len = self.registry.active_len();
        if !self.registry.move_columns(from, count, to) {
            return false;
        }
        if let Some(positions) = moved_positions(len, from, count, to) {
            let before = self.selection.clone();
            self.selection.remap_columns(&positions);
            if self.selection != before {
                self.emit(GridEvent::SelectionChanged);
            }
        }
        self.relayout();
        true
    }

    pub fn show_columns(
        &mut self,
        source: ColumnSource,
        indexes: &[usize],
        placement: Placement,
        allow_duplicates: bool,
    ) {
        self.registry
            .show_columns(source, indexes, placement, allow_duplicates);
        self.clamp_fixed_columns();
        self.relayout();
    }

    pub fn hide_columns(&mut self, source: ColumnSource, indexes: &[usize]) {
        self.registry.hide_columns(source, indexes);
        self.clamp_fixed_columns();
        self.relayout();
    }

    /// Set a column's width (clamped). Does not notify; resize gestures emit
    /// their own event on commit.
    pub fn set_column_width(&mut self, kind: ColumnKind, width: f32) -> Option<f32> {
        let stored = self.registry.set_column_width(kind, width)?;
        self.relayout();
        Some(stored)
    }

    pub fn emit(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    /// Drain pending notifications, registry ones first.
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        let mut events = self.registry.take_events();
        events.append(&mut self.events);
        events
    }

    fn take_relaid_out(&mut self) -> bool {
        std::mem::take(&mut self.relaid_out)
    }

    fn clamp_fixed_columns(&mut self) {
        let len = self.registry.active_len();
        if self.config.fixed_column_count > len {
            self.set_fixed_column_count(len);
        }
    }
}

/// One cell as produced by [`Grid::painted_cells`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintedCell {
    pub grid_cell: GridCell,
    pub data_cell: DataCell,
    pub bounds: Rect,
    pub text: String,
    pub selected: bool,
    pub hovered: bool,
    pub fixed: bool,
}

/// A virtualized grid instance.
pub struct Grid {
    model: GridModel,
    pipeline: Pipeline,
    cursor: CellCursor,
    notifier: Notifier,
    now_ms: f64,
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("model", &self.model)
            .field("pipeline", &self.pipeline)
            .field("now_ms", &self.now_ms)
            .finish_non_exhaustive()
    }
}

impl Grid {
    /// Build a grid over `data`, with the pipeline `config.features` names.
    ///
    /// # Errors
    /// Returns an error if a configured feature name is unknown.
    pub fn new(data: Box<dyn DataSource>, schema: &[ColumnSchema], config: GridConfig) -> Result<Self> {
        let pipeline = Pipeline::from_names(&config.features)?;
        Ok(Self::with_pipeline(data, schema, config, pipeline))
    }

    pub fn with_pipeline(
        data: Box<dyn DataSource>,
        schema: &[ColumnSchema],
        config: GridConfig,
        pipeline: Pipeline,
    ) -> Self {
        let mut model = GridModel::new(data, schema, config);
        model.take_events();
        model.take_relaid_out();
        Self {
            model,
            pipeline,
            cursor: CellCursor::new(),
            notifier: Notifier::new(),
            now_ms: 0.0,
        }
    }

    /// Load delimited text; the first line names the columns.
    ///
    /// # Errors
    /// Returns an error for malformed input or an unknown feature name.
    pub fn from_delimited(bytes: &[u8], delimiter: Delimiter, config: GridConfig) -> Result<Self> {
        let table = parse_delimited(bytes, delimiter)?;
        Self::new(Box::new(table.data), &table.schema, config)
    }

    /// Replace the data and schema. Column state is rebuilt from the schema.
    pub fn load(&mut self, data: Box<dyn DataSource>, schema: &[ColumnSchema]) {
        self.model.data = data;
        self.model.registry.reset(schema, &self.model.config);
        self.model.selection.clear();
        self.model.hovered = None;
        self.model.overlays = Overlays::default();
        self.model.clamp_fixed_columns();
        let rows = self.model.row_count();
        if self.model.config.fixed_row_count > rows {
            self.model.set_fixed_row_count(rows);
        }
        self.model.relayout();
        self.flush_events();
    }

    pub fn model(&self) -> &GridModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut GridModel {
        &mut self.model
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.model.registry
    }

    pub fn config(&self) -> &GridConfig {
        &self.model.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.model.viewport
    }

    pub fn layout(&self) -> &RenderedLayout {
        &self.model.layout
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.model.selection
    }

    pub fn overlays(&self) -> &Overlays {
        &self.model.overlays
    }

    pub fn resolver(&self) -> CoordinateResolver<'_> {
        self.model.resolver()
    }

    pub fn cell_context(&self) -> CellContext<'_> {
        self.model.cell_context()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        self.pipeline.cursor_icon()
    }

    /// Host clock used to schedule timers for the next dispatched event.
    pub fn set_clock(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) -> Result<()> {
        self.model.set_viewport_size(width, height);
        self.after_change()
    }

    pub fn scroll_to(&mut self, left: usize, top: usize) -> Result<()> {
        self.model.scroll_to(left, top);
        self.after_change()
    }

    pub fn scroll_by(&mut self, columns: isize, rows: isize) -> Result<()> {
        self.model.scroll_by(columns, rows);
        self.after_change()
    }

    pub fn set_fixed_column_count(&mut self, count: usize) -> Result<()> {
        self.model.set_fixed_column_count(count);
        self.after_change()
    }

    pub fn set_fixed_row_count(&mut self, count: usize) -> Result<()> {
        self.model.set_fixed_row_count(count);
        self.after_change()
    }

    pub fn move_columns(&mut self, from: usize, count: usize, to: usize) -> Result<bool> {
        let moved = self.model.move_columns(from, count, to);
        self.after_change()?;
        Ok(moved)
    }

    pub fn show_columns(
        &mut self,
        source: ColumnSource,
        indexes: &[usize],
        placement: Placement,
        allow_duplicates: bool,
    ) -> Result<()> {
        self.model
            .show_columns(source, indexes, placement, allow_duplicates);
        self.after_change()
    }

    pub fn hide_columns(&mut self, source: ColumnSource, indexes: &[usize]) -> Result<()> {
        self.model.hide_columns(source, indexes);
        self.after_change()
    }

    /// # Errors
    /// Dispatch errors from features.
    pub fn pointer_down(&mut self, event: PointerEvent) -> Result<()> {
        let event = self.resolve(event);
        self.dispatch(|f, ctx| f.on_pointer_down(ctx, &event))
    }

    /// # Errors
    /// Dispatch errors from features.
    pub fn pointer_move(&mut self, event: PointerEvent) -> Result<()> {
        let event = self.resolve(event);
        self.dispatch(|f, ctx| f.on_pointer_move(ctx, &event))
    }

    /// # Errors
    /// Dispatch errors from features.
    pub fn pointer_drag(&mut self, event: PointerEvent) -> Result<()> {
        let event = self.resolve(event);
        self.dispatch(|f, ctx| f.on_pointer_drag(ctx, &event))
    }

    /// # Errors
    /// Dispatch errors from features.
    pub fn pointer_up(&mut self, event: PointerEvent) -> Result<()> {
        let event = self.resolve(event);
        self.dispatch(|f, ctx| f.on_pointer_up(ctx, &event))
    }

    /// # Errors
    /// Dispatch errors from features.
    pub fn double_click(&mut self, event: PointerEvent) -> Result<()> {
        let event = self.resolve(event);
        self.dispatch(|f, ctx| f.on_double_click(ctx, &event))
    }

    /// # Errors
    /// Dispatch errors from features.
    pub fn context_menu(&mut self, event: PointerEvent) -> Result<()> {
        let event = self.resolve(event);
        self.dispatch(|f, ctx| f.on_context_menu(ctx, &event))
    }

    /// # Errors
    /// Dispatch errors from features.
    pub fn key_down(&mut self, event: &KeyEvent) -> Result<()> {
        self.dispatch(|f, ctx| f.on_key_down(ctx, event))
    }

    /// # Errors
    /// Dispatch errors from features.
    pub fn key_up(&mut self, event: &KeyEvent) -> Result<()> {
        self.dispatch(|f, ctx| f.on_key_up(ctx, event))
    }

    /// Advance the clock and fire due timers.
    ///
    /// # Errors
    /// The first error raised by a timer callback.
    pub fn tick(&mut self, now_ms: f64) -> Result<()> {
        self.now_ms = now_ms;
        let result = self.pipeline.tick(&mut self.model, &mut self.cursor, now_ms);
        let rendered = self.notify_rendered();
        self.flush_events();
        result.and(rendered)
    }

    /// Earliest pending timer.
    pub fn next_due(&self) -> Option<f64> {
        self.pipeline.next_due()
    }

    /// One paint pass: the shared cursor is reset once per rendered cell and
    /// handed to `visit`. The view must not be kept past the callback.
    pub fn paint(&mut self, mut visit: impl FnMut(&CellView<'_>)) {
        let ctx = self.model.cell_context();
        for row in &self.model.layout.rows {
            for column in &self.model.layout.columns {
                self.cursor.reset(&ctx, *column, *row);
                if let Some(view) = self.cursor.view(&ctx) {
                    visit(&view);
                }
            }
        }
    }

    /// Paint into plain records, skipping cells covered by a span.
    pub fn painted_cells(&mut self) -> Vec<PaintedCell> {
        let mut cells = Vec::with_capacity(self.model.layout.rows.len() * self.model.layout.columns.len());
        self.paint(|view| {
            if view.is_render_skip() {
                return;
            }
            cells.push(PaintedCell {
                grid_cell: view.grid_cell(),
                data_cell: view.data_cell(),
                bounds: view.bounds(),
                text: view.formatted_value().to_string(),
                selected: view.is_cell_selected() || view.is_row_selected() || view.is_column_selected(),
                hovered: view.is_hovered(),
                fixed: view.is_column_fixed() || view.is_row_fixed(),
            });
        });
        cells
    }

    /// Independent cursor bound to a grid coordinate, if it is on screen.
    pub fn cursor_at_grid(&mut self, x: GridColumn, y: usize) -> Option<CellCursor> {
        let ctx = self.model.cell_context();
        if !self.cursor.reset_by_grid_coordinate(&ctx, x, y) {
            return None;
        }
        Some(self.cursor.fork(&ctx, false))
    }

    /// Independent cursor bound to a data coordinate, if it is on screen.
    pub fn cursor_at_data(&mut self, x: ColumnKind, y: usize, subgrid: Subgrid) -> Option<CellCursor> {
        let ctx = self.model.cell_context();
        if !self.cursor.reset_by_data_coordinate(&ctx, x, y, subgrid) {
            return None;
        }
        Some(self.cursor.fork(&ctx, false))
    }

    /// Write a value through the cell at a grid coordinate. Covered cells
    /// write to the cell whose span covers them.
    pub fn set_value_at(&mut self, x: GridColumn, y: usize, value: CellValue) -> bool {
        let bound = {
            let ctx = self.model.cell_context();
            self.cursor.reset_by_grid_coordinate(&ctx, x, y)
        };
        bound && self.cursor.set_value(self.model.data.as_mut(), value)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GridEvent) + 'static) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn state(&self) -> GridState {
        self.model.registry.snapshot(&self.model.config)
    }

    pub fn restore_state(&mut self, state: &GridState) -> Result<()> {
        let model = &mut self.model;
        model.registry.restore(state, &mut model.config);
        let rows = model.row_count();
        model.config.fixed_row_count = model.config.fixed_row_count.min(rows);
        model.selection.clear();
        model.relayout();
        self.after_change()
    }

    fn resolve(&mut self, mut event: PointerEvent) -> PointerEvent {
        event.cell = self.cell_info(event.point);
        event
    }

    fn cell_info(&mut self, point: Point) -> Option<CellInfo> {
        let hit = self.model.resolver().cell_at_point(point)?;
        let ctx = self.model.cell_context();
        self.cursor.reset(&ctx, hit.column, hit.row);
        let view = self.cursor.view(&ctx)?;
        Some(CellInfo {
            column: hit.column,
            row: hit.row,
            offset: hit.offset,
            grid_cell: view.grid_cell(),
            data_cell: view.data_cell(),
            is_header_row: view.is_header_row(),
            is_filter_row: view.is_filter_row(),
            is_data_row: view.is_data_row(),
            is_data_column: view.is_data_column(),
            is_handle_column: view.is_handle_column(),
            is_tree_column: view.is_tree_column(),
            is_column_fixed: view.is_column_fixed(),
            is_row_fixed: view.is_row_fixed(),
        })
    }

    fn dispatch<F>(&mut self, call: F) -> Result<()>
    where
        F: FnMut(&mut dyn Feature, &mut FeatureContext<'_>) -> Result<Flow>,
    {
        let result = self
            .pipeline
            .dispatch(&mut self.model, &mut self.cursor, self.now_ms, call);
        let rendered = self.notify_rendered();
        self.flush_events();
        result.and(rendered)
    }

    fn after_change(&mut self) -> Result<()> {
        let rendered = self.notify_rendered();
        self.flush_events();
        rendered
    }

    fn notify_rendered(&mut self) -> Result<()> {
        if !self.model.take_relaid_out() {
            return Ok(());
        }
        self.pipeline
            .dispatch(&mut self.model, &mut self.cursor, self.now_ms, |f, ctx| {
                f.on_rendered(ctx)
            })
    }

    fn flush_events(&mut self) {
        let events = self.model.take_events();
        self.notifier.emit_all(events);
    }
}
