//! Cell range selection on data cells.
//!
//! Pointer presses and drags pick a rectangle from an anchor cell. A drag
//! that leaves the data area scrolls towards the pointer on the timer queue
//! and keeps extending the range. Arrow keys move the focus cell; Shift
//! extends from the anchor and Ctrl jumps to the edge of the data.

use super::{Button, CellInfo, Feature, FeatureContext, Flow, KeyEvent, PointerEvent, TimerToken};
use crate::error::Result;
use crate::events::GridEvent;
use crate::grid::GridModel;
use crate::types::{Point, Selection, SelectionType, Subgrid};

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragScroll {
    columns: isize,
    rows: isize,
    token: TimerToken,
}

#[derive(Debug, Default)]
pub struct CellSelection {
    /// (row, active column) the current range started from
    anchor: Option<(usize, usize)>,
    /// Opposite corner from the anchor; where keyboard moves start
    focus: Option<(usize, usize)>,
    dragging: bool,
    last_point: Option<Point>,
    scroll: Option<DragScroll>,
}

fn data_coordinate(cell: &CellInfo) -> Option<(usize, usize)> {
    if !cell.is_data_cell() {
        return None;
    }
    Some((cell.data_cell.y, cell.active_index()?))
}

/// Scroll direction for a drag at `point`: towards whichever side of the
/// scrollable data area the pointer has left.
fn drag_direction(model: &GridModel, point: Point) -> (isize, isize) {
    let resolver = model.resolver();
    let limits = model.scroll_limits();
    let right = model.layout.final_column_boundary().min(model.viewport.width);
    let bottom = model.layout.final_row_boundary().min(model.viewport.height);

    let columns = if point.x < resolver.fixed_boundary_pixel() && model.viewport.scroll_left > 0 {
        -1
    } else if point.x >= right && model.viewport.scroll_left < limits.max_left {
        1
    } else {
        0
    };
    let rows = if point.y < resolver.fixed_row_boundary_pixel() && model.viewport.scroll_top > 0 {
        -1
    } else if point.y >= bottom && model.viewport.scroll_top < limits.max_top {
        1
    } else {
        0
    };
    (columns, rows)
}

/// Data cell under `point` after pulling it inside the rendered data area.
fn clamped_cell(model: &GridModel, point: Point) -> Option<(usize, usize)> {
    let first_column = model.layout.active_columns().next()?;
    let first_row = model.layout.data_rows().next()?;
    let right = model.layout.final_column_boundary().min(model.viewport.width) - 1.0;
    let bottom = model.layout.final_row_boundary().min(model.viewport.height) - 1.0;
    let clamped = Point::new(
        point.x.clamp(first_column.left, right.max(first_column.left)),
        point.y.clamp(first_row.top, bottom.max(first_row.top)),
    );
    let hit = model.resolver().cell_at_point(clamped)?;
    if hit.row.subgrid != Subgrid::Data {
        return None;
    }
    Some((hit.row.row_index, hit.column.column.active_index()?))
}

fn fully_shown_column(model: &GridModel, col: usize) -> bool {
    model
        .layout
        .active_columns()
        .find(|c| c.column.active_index() == Some(col))
        .is_some_and(|c| c.right() <= model.viewport.width)
}

fn fully_shown_row(model: &GridModel, row: usize) -> bool {
    model
        .layout
        .data_rows()
        .find(|r| r.row_index == row)
        .is_some_and(|r| r.bottom() <= model.viewport.height)
}

/// Scroll the least distance that puts the cell at (`row`, `col`) on screen.
fn reveal(model: &mut GridModel, row: usize, col: usize) {
    let fixed = model.resolver().fixed_column_count();
    if col >= fixed {
        let first = fixed + model.viewport.scroll_left;
        if col < first {
            let top = model.viewport.scroll_top;
            model.scroll_to(col - fixed, top);
        } else {
            while col > fixed + model.viewport.scroll_left
                && !fully_shown_column(model, col)
                && model.scroll_by(1, 0)
            {}
        }
    }

    let fixed = model.config.fixed_row_count;
    if row >= fixed {
        let first = fixed + model.viewport.scroll_top;
        if row < first {
            let left = model.viewport.scroll_left;
            model.scroll_to(left, row - fixed);
        } else {
            while row > fixed + model.viewport.scroll_top
                && !fully_shown_row(model, row)
                && model.scroll_by(0, 1)
            {}
        }
    }
}

/// Step `from` by `delta` inside `0..len`; `to_edge` goes all the way.
fn step(from: usize, delta: isize, len: usize, to_edge: bool) -> usize {
    let last = len.saturating_sub(1);
    match (delta.signum(), to_edge) {
        (0, _) => from.min(last),
        (-1, true) => 0,
        (_, true) if delta > 0 => last,
        _ => from.saturating_add_signed(delta).min(last),
    }
}

impl CellSelection {
    /// Extend the current range to `cell`. Returns whether it changed.
    fn extend_to(&mut self, model: &mut GridModel, cell: (usize, usize)) -> bool {
        let Some((r0, c0)) = self.anchor else {
            return false;
        };
        self.focus = Some(cell);
        let next = Selection::cell_range(r0, c0, cell.0, cell.1);
        if model.selection.last_of(SelectionType::CellRange) == Some(&next) {
            return false;
        }
        model.selection.extend_last(next);
        model.emit(GridEvent::SelectionChanged);
        true
    }

    /// One auto-scroll step, then re-aim the range at the pointer.
    fn scroll_step(&mut self, model: &mut GridModel, columns: isize, rows: isize) -> bool {
        if !model.scroll_by(columns, rows) {
            return false;
        }
        if let Some(cell) = self.last_point.and_then(|p| clamped_cell(model, p)) {
            self.extend_to(model, cell);
        }
        true
    }

    fn stop_drag(&mut self) {
        self.dragging = false;
        self.last_point = None;
        self.scroll = None;
    }

    fn on_arrow(&mut self, model: &mut GridModel, event: &KeyEvent, delta: (isize, isize)) -> bool {
        let rows = model.row_count();
        let cols = model.registry.active_len();
        if rows == 0 || cols == 0 || model.selection.last_of(SelectionType::CellRange).is_none() {
            return false;
        }
        let Some((row, col)) = self.focus.or(self.anchor) else {
            return false;
        };
        let to_edge = event.modifiers.toggle();
        let next = (step(row, delta.0, rows, to_edge), step(col, delta.1, cols, to_edge));

        if event.modifiers.shift {
            self.extend_to(model, next);
        } else {
            let single = Selection::cell_range(next.0, next.1, next.0, next.1);
            self.anchor = Some(next);
            self.focus = Some(next);
            if model.selection.ranges() != [single] {
                model.selection.push(single, false);
                model.emit(GridEvent::SelectionChanged);
            }
        }
        reveal(model, next.0, next.1);
        tracing::trace!(
            target: "vgrid::cell_selection",
            key = event.key.as_str(),
            row = next.0,
            col = next.1,
            "focus moved"
        );
        true
    }

    fn select_all(&mut self, model: &mut GridModel) -> bool {
        let rows = model.row_count();
        let cols = model.registry.active_len();
        if rows == 0 || cols == 0 {
            return false;
        }
        model
            .selection
            .push(Selection::cell_range(0, 0, rows - 1, cols - 1), false);
        self.anchor = Some((0, 0));
        self.focus = Some((rows - 1, cols - 1));
        model.emit(GridEvent::SelectionChanged);
        true
    }
}

impl Feature for CellSelection {
    fn name(&self) -> &'static str {
        "cell_selection"
    }

    fn on_pointer_down(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        if event.button != Button::Primary {
            return Ok(Flow::Continue);
        }
        let Some((row, col)) = event.cell.as_ref().and_then(data_coordinate) else {
            return Ok(Flow::Continue);
        };
        let selection = &mut ctx.model.selection;
        match (event.modifiers.shift, self.anchor) {
            (true, Some((r0, c0))) => {
                selection.extend_last(Selection::cell_range(r0, c0, row, col));
            }
            _ => {
                selection.push(Selection::cell_range(row, col, row, col), event.modifiers.toggle());
                self.anchor = Some((row, col));
            }
        }
        self.focus = Some((row, col));
        self.dragging = true;
        self.last_point = Some(event.point);
        self.scroll = None;
        ctx.model.emit(GridEvent::SelectionChanged);
        Ok(Flow::Stop)
    }

    fn on_pointer_drag(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        if !self.dragging {
            return Ok(Flow::Continue);
        }
        self.last_point = Some(event.point);

        match (drag_direction(ctx.model, event.point), self.scroll) {
            ((0, 0), _) => self.scroll = None,
            ((columns, rows), Some(s)) if s.columns == columns && s.rows == rows => {}
            ((columns, rows), _) => {
                // First step is immediate; the timer carries the rest.
                self.scroll = None;
                if self.scroll_step(ctx.model, columns, rows) {
                    let interval = ctx.model.config.select_scroll_interval_ms;
                    let token = ctx.schedule(interval);
                    self.scroll = Some(DragScroll { columns, rows, token });
                }
            }
        }

        let cell = event
            .cell
            .as_ref()
            .and_then(data_coordinate)
            .or_else(|| clamped_cell(ctx.model, event.point));
        if let Some(cell) = cell {
            self.extend_to(ctx.model, cell);
        }
        Ok(Flow::Stop)
    }

    fn on_timer(&mut self, ctx: &mut FeatureContext<'_>, token: TimerToken) -> Result<()> {
        let Some(scroll) = self.scroll.filter(|s| self.dragging && s.token == token) else {
            tracing::trace!(target: "vgrid::cell_selection", "stale drag-scroll tick");
            return Ok(());
        };
        self.scroll = None;
        if self.scroll_step(ctx.model, scroll.columns, scroll.rows) {
            let interval = ctx.model.config.select_scroll_interval_ms;
            let token = ctx.schedule(interval);
            self.scroll = Some(DragScroll { token, ..scroll });
        }
        Ok(())
    }

    fn on_pointer_up(&mut self, _ctx: &mut FeatureContext<'_>, _event: &PointerEvent) -> Result<Flow> {
        let was_dragging = self.dragging;
        self.stop_drag();
        if was_dragging {
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    }

    fn on_key_down(&mut self, ctx: &mut FeatureContext<'_>, event: &KeyEvent) -> Result<Flow> {
        let handled = match event.key.as_str() {
            "Escape" if !ctx.model.selection.is_empty() => {
                ctx.model.selection.clear();
                self.anchor = None;
                self.focus = None;
                self.stop_drag();
                ctx.model.emit(GridEvent::SelectionChanged);
                true
            }
            "a" | "A" if event.modifiers.toggle() => self.select_all(ctx.model),
            "ArrowUp" => self.on_arrow(ctx.model, event, (-1, 0)),
            "ArrowDown" => self.on_arrow(ctx.model, event, (1, 0)),
            "ArrowLeft" => self.on_arrow(ctx.model, event, (0, -1)),
            "ArrowRight" => self.on_arrow(ctx.model, event, (0, 1)),
            _ => false,
        };
        Ok(if handled { Flow::Stop } else { Flow::Continue })
    }
}
