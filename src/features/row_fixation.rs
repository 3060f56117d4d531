//! Dragging the fixed-row divider, grabbed inside the row-handle column.

use super::{Bar, Button, CursorIcon, Feature, FeatureContext, Flow, KeyEvent, PointerEvent};
use crate::error::Result;
use crate::grid::GridModel;

#[derive(Debug, Default)]
pub struct RowFixation {
    dragging: Option<usize>,
    over_handle: bool,
}

impl RowFixation {
    fn on_handle(model: &GridModel, event: &PointerEvent) -> bool {
        if !event.cell.is_some_and(|c| c.is_handle_column) || model.row_count() == 0 {
            return false;
        }
        let boundary = model.resolver().fixed_row_boundary_pixel();
        let reach = model.config.fixed_line_width / 2.0 + model.config.resize_margin;
        (event.point.y - boundary).abs() <= reach
    }

    fn target(model: &GridModel, y: f32) -> Option<usize> {
        let nearest = model.resolver().nearest_row_boundary(y)?;
        let last = model.layout.data_rows().last()?.row_index;
        Some(nearest.min(last))
    }

    fn bar(model: &GridModel, count: usize) -> Bar {
        let y = model
            .layout
            .data_rows()
            .find(|r| r.row_index == count)
            .map_or_else(|| model.resolver().fixed_row_boundary_pixel(), |r| r.top);
        Bar {
            x: 0.0,
            y,
            length: model.layout.final_column_boundary(),
            thickness: model.config.fixed_line_width,
        }
    }
}

impl Feature for RowFixation {
    fn name(&self) -> &'static str {
        "row_fixation"
    }

    fn on_pointer_move(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        self.over_handle = Self::on_handle(ctx.model, event);
        Ok(Flow::Continue)
    }

    fn on_pointer_down(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        if event.button != Button::Primary
            || event.modifiers.any()
            || !Self::on_handle(ctx.model, event)
        {
            return Ok(Flow::Continue);
        }
        let left = ctx.model.viewport.scroll_left;
        ctx.model.scroll_to(left, 0);
        let count = ctx.model.config.fixed_row_count;
        self.dragging = Some(count);
        ctx.model.overlays.row_fixation_bar = Some(Self::bar(ctx.model, count));
        Ok(Flow::Stop)
    }

    fn on_pointer_drag(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        if self.dragging.is_none() {
            return Ok(Flow::Continue);
        }
        if let Some(target) = Self::target(ctx.model, event.point.y) {
            self.dragging = Some(target);
            ctx.model.overlays.row_fixation_bar = Some(Self::bar(ctx.model, target));
        }
        Ok(Flow::Stop)
    }

    fn on_pointer_up(&mut self, ctx: &mut FeatureContext<'_>, _event: &PointerEvent) -> Result<Flow> {
        let Some(target) = self.dragging.take() else {
            return Ok(Flow::Continue);
        };
        ctx.model.overlays.row_fixation_bar = None;
        if ctx.model.set_fixed_row_count(target) {
            tracing::debug!(target: "vgrid::row_fixation", count = target, "committed");
        }
        Ok(Flow::Stop)
    }

    fn on_key_down(&mut self, ctx: &mut FeatureContext<'_>, event: &KeyEvent) -> Result<Flow> {
        if event.key == "Escape" && self.dragging.take().is_some() {
            ctx.model.overlays.row_fixation_bar = None;
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    }

    fn cursor_icon(&self) -> Option<CursorIcon> {
        (self.dragging.is_some() || self.over_handle).then_some(CursorIcon::RowResize)
    }
}
