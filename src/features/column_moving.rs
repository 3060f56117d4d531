//! Header drag to reorder columns.
//!
//! A press on a movable header arms a drag of either the pressed column or,
//! when the current column selection is a contiguous run containing it, the
//! whole run. Arming detaches the rest of the pipeline. While dragging, the
//! floater follows the pointer and the drop indicator tracks the nearest
//! column boundary; near either edge an auto-scroll loop runs on the timer
//! queue instead. Release commits the move and schedules reattachment.

use super::{Bar, Button, CursorIcon, Feature, FeatureContext, Flow, KeyEvent, PointerEvent, TimerToken};
use crate::error::Result;
use crate::events::GridEvent;
use crate::grid::GridModel;
use crate::types::{is_contiguous, GridColumn, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
struct AutoScroll {
    direction: isize,
    attempt: u32,
    token: TimerToken,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveDrag {
    /// Active index of the first dragged column
    pub start: usize,
    pub count: usize,
    /// Insertion point the drop would use, if the pointer has picked one
    pub target: Option<usize>,
    grab_offset: f32,
    floater: Rect,
    last_point: Point,
    autoscroll: Option<AutoScroll>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    Armed(MoveDrag),
    Dragging(MoveDrag),
}

#[derive(Debug, Default)]
pub struct ColumnMoving {
    state: MoveState,
}

impl ColumnMoving {
    pub fn state(&self) -> &MoveState {
        &self.state
    }

    /// Run to drag for a press on active column `col`.
    fn run_for(model: &GridModel, col: usize) -> (usize, usize) {
        let fixed = model.resolver().fixed_column_count();
        let selected = model.selection.selected_columns();
        match (selected.first(), selected.last()) {
            (Some(&first), Some(&last))
                if selected.len() > 1
                    && first >= fixed
                    && (first..=last).contains(&col)
                    && is_contiguous(&selected) =>
            {
                (first, selected.len())
            }
            _ => (col, 1),
        }
    }

    fn indicator(model: &GridModel, target: usize) -> Bar {
        let x = model
            .resolver()
            .column_start_pixel(GridColumn::Active(target))
            .unwrap_or_else(|| model.layout.final_column_boundary());
        Bar {
            x,
            y: 0.0,
            length: model.layout.final_row_boundary(),
            thickness: model.config.column_move_insert_line_width,
        }
    }

    /// Drop point for pointer `x`, never inside the fixed region nor among
    /// the columns scrolled out behind it.
    fn target_at(model: &GridModel, x: f32) -> Option<usize> {
        let first_scrolled = model.resolver().fixed_column_count() + model.viewport.scroll_left;
        let nearest = model.resolver().nearest_column_boundary(x)?;
        Some(nearest.max(first_scrolled))
    }

    /// Scroll one column towards `direction` and re-aim the drop indicator.
    fn scroll_step(model: &mut GridModel, drag: &mut MoveDrag, direction: isize) -> bool {
        if !model.scroll_by(direction, 0) {
            return false;
        }
        if let Some(target) = Self::target_at(model, drag.last_point.x) {
            drag.target = Some(target);
            model.overlays.drop_indicator = Some(Self::indicator(model, target));
        }
        true
    }

    /// Auto-scroll direction for a pointer at `x`, if it is near an edge and
    /// the viewport can still scroll that way.
    fn edge_direction(model: &GridModel, x: f32) -> Option<isize> {
        let threshold = model.config.autoscroll_threshold;
        let limits = model.scroll_limits();
        if x < threshold && model.viewport.scroll_left > 0 {
            Some(-1)
        } else if x > model.layout.final_column_boundary().min(model.viewport.width) - threshold
            && model.viewport.scroll_left < limits.max_left
        {
            Some(1)
        } else {
            None
        }
    }

    fn finish(&mut self, ctx: &mut FeatureContext<'_>) -> Option<MoveDrag> {
        let drag = match std::mem::take(&mut self.state) {
            MoveState::Idle => return None,
            MoveState::Armed(d) | MoveState::Dragging(d) => d,
        };
        ctx.model.overlays.clear_column_drag();
        Some(drag)
    }
}

impl Feature for ColumnMoving {
    fn name(&self) -> &'static str {
        "column_moving"
    }

    fn on_pointer_down(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        let Some(cell) = event.cell else {
            return Ok(Flow::Continue);
        };
        let Some(col) = cell.active_index() else {
            return Ok(Flow::Continue);
        };
        if event.button != Button::Primary
            || event.modifiers.any()
            || !ctx.model.config.columns_reorderable
            || !cell.is_header_cell()
            || cell.is_column_fixed
        {
            return Ok(Flow::Continue);
        }

        let model = &*ctx.model;
        let (start, count) = Self::run_for(model, col);
        let resolver = model.resolver();
        let left = resolver
            .column_start_pixel(GridColumn::Active(start))
            .unwrap_or(cell.column.left);
        let width: f32 = (start..start + count)
            .filter_map(|i| model.registry.active_width(GridColumn::Active(i)))
            .sum();
        let floater = Rect {
            x: left,
            y: 0.0,
            width,
            height: model.layout.final_row_boundary(),
        };
        let indicator = Self::indicator(model, start);

        tracing::debug!(target: "vgrid::column_moving", start, count, "armed");
        self.state = MoveState::Armed(MoveDrag {
            start,
            count,
            target: None,
            grab_offset: event.point.x - left,
            floater,
            last_point: event.point,
            autoscroll: None,
        });
        ctx.model.overlays.column_floater = Some(floater);
        ctx.model.overlays.drop_indicator = Some(indicator);
        ctx.detach();
        Ok(Flow::Stop)
    }

    fn on_pointer_drag(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        let mut drag = match self.state {
            MoveState::Idle => return Ok(Flow::Continue),
            MoveState::Armed(d) | MoveState::Dragging(d) => d,
        };
        drag.last_point = event.point;
        drag.floater.x = event.point.x - drag.grab_offset;
        ctx.model.overlays.column_floater = Some(drag.floater);

        match (Self::edge_direction(ctx.model, event.point.x), drag.autoscroll) {
            (Some(direction), Some(scroll)) if scroll.direction == direction => {}
            (Some(direction), _) => {
                // First step is immediate; the timer carries the rest.
                drag.autoscroll = if Self::scroll_step(ctx.model, &mut drag, direction) {
                    let delay = ctx.model.config.scroll_delay(0);
                    Some(AutoScroll {
                        direction,
                        attempt: 0,
                        token: ctx.schedule(delay),
                    })
                } else {
                    None
                };
            }
            (None, _) => {
                drag.autoscroll = None;
                let inside_run = event
                    .cell
                    .and_then(|c| c.active_index())
                    .is_some_and(|i| (drag.start..drag.start + drag.count).contains(&i));
                if inside_run {
                    // Dropping onto itself is a no-op.
                    drag.target = None;
                    ctx.model.overlays.drop_indicator = Some(Self::indicator(ctx.model, drag.start));
                } else if let Some(target) = Self::target_at(ctx.model, event.point.x) {
                    drag.target = Some(target);
                    ctx.model.overlays.drop_indicator = Some(Self::indicator(ctx.model, target));
                }
            }
        }
        self.state = MoveState::Dragging(drag);
        Ok(Flow::Stop)
    }

    fn on_timer(&mut self, ctx: &mut FeatureContext<'_>, token: TimerToken) -> Result<()> {
        let MoveState::Dragging(mut drag) = self.state else {
            tracing::trace!(target: "vgrid::column_moving", "tick after drag ended");
            return Ok(());
        };
        let Some(mut scroll) = drag.autoscroll.filter(|s| s.token == token) else {
            tracing::trace!(target: "vgrid::column_moving", "stale auto-scroll tick");
            return Ok(());
        };

        if Self::scroll_step(ctx.model, &mut drag, scroll.direction) {
            scroll.attempt = scroll.attempt.saturating_add(1);
            let delay = ctx.model.config.scroll_delay(scroll.attempt);
            scroll.token = ctx.schedule(delay);
            tracing::trace!(
                target: "vgrid::column_moving",
                direction = scroll.direction,
                attempt = scroll.attempt,
                "auto-scroll"
            );
            drag.autoscroll = Some(scroll);
        } else {
            drag.autoscroll = None;
        }
        self.state = MoveState::Dragging(drag);
        Ok(())
    }

    fn on_pointer_up(&mut self, ctx: &mut FeatureContext<'_>, _event: &PointerEvent) -> Result<Flow> {
        let dragged = matches!(self.state, MoveState::Dragging(_));
        let Some(drag) = self.finish(ctx) else {
            return Ok(Flow::Continue);
        };
        ctx.reattach_later();

        let Some(target) = drag.target.filter(|_| dragged) else {
            return Ok(Flow::Stop);
        };
        if ctx.model.move_columns(drag.start, drag.count, target) {
            let new_start = if target > drag.start {
                target - drag.count
            } else {
                target
            };
            tracing::debug!(
                target: "vgrid::column_moving",
                from = drag.start,
                count = drag.count,
                to = new_start,
                "dropped"
            );
            let before = ctx.model.selection.clone();
            ctx.model
                .selection
                .select_column_range(new_start, new_start + drag.count - 1);
            if ctx.model.selection != before {
                ctx.model.emit(GridEvent::SelectionChanged);
            }
        }
        Ok(Flow::Stop)
    }

    fn on_key_down(&mut self, ctx: &mut FeatureContext<'_>, event: &KeyEvent) -> Result<Flow> {
        if event.key != "Escape" {
            return Ok(Flow::Continue);
        }
        if self.finish(ctx).is_none() {
            return Ok(Flow::Continue);
        }
        tracing::debug!(target: "vgrid::column_moving", "drag discarded");
        ctx.reattach_now();
        Ok(Flow::Stop)
    }

    fn cursor_icon(&self) -> Option<CursorIcon> {
        match self.state {
            MoveState::Idle => None,
            MoveState::Armed(_) => Some(CursorIcon::Grab),
            MoveState::Dragging(_) => Some(CursorIcon::Grabbing),
        }
    }
}
