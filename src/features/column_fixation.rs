//! Dragging the fixed-column divider.

use super::{Bar, Button, CursorIcon, Feature, FeatureContext, Flow, KeyEvent, PointerEvent};
use crate::error::Result;
use crate::grid::GridModel;
use crate::types::GridColumn;

#[derive(Debug, Default)]
pub struct ColumnFixation {
    /// Fixed count the divider would commit to
    dragging: Option<usize>,
    over_handle: bool,
}

impl ColumnFixation {
    fn on_handle(model: &GridModel, event: &PointerEvent) -> bool {
        if !event.cell.is_some_and(|c| c.is_header_row) || model.registry.active_len() == 0 {
            return false;
        }
        let boundary = model.resolver().fixed_boundary_pixel();
        let reach = model.config.fixed_line_width / 2.0 + model.config.resize_margin;
        (event.point.x - boundary).abs() <= reach
    }

    /// Nearest boundary, kept short of the last rendered column so something
    /// always scrolls.
    fn target(model: &GridModel, x: f32) -> Option<usize> {
        let resolver = model.resolver();
        let nearest = resolver.nearest_column_boundary(x)?;
        let last = model
            .layout
            .active_columns()
            .last()
            .and_then(|c| c.column.active_index())?;
        Some(nearest.min(last))
    }

    fn bar(model: &GridModel, count: usize) -> Option<Bar> {
        let resolver = model.resolver();
        let x = if count == resolver.fixed_column_count() {
            resolver.fixed_boundary_pixel()
        } else {
            resolver.column_start_pixel(GridColumn::Active(count))?
        };
        Some(Bar {
            x,
            y: 0.0,
            length: model.layout.final_row_boundary(),
            thickness: model.config.fixed_line_width,
        })
    }
}

impl Feature for ColumnFixation {
    fn name(&self) -> &'static str {
        "column_fixation"
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
        // Columns hidden behind the scroll must be on screen to be picked.
        let top = ctx.model.viewport.scroll_top;
        ctx.model.scroll_to(0, top);
        let count = ctx.model.resolver().fixed_column_count();
        self.dragging = Some(count);
        ctx.model.overlays.fixation_bar = Self::bar(ctx.model, count);
        Ok(Flow::Stop)
    }

    fn on_pointer_drag(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        if self.dragging.is_none() {
            return Ok(Flow::Continue);
        }
        if let Some(target) = Self::target(ctx.model, event.point.x) {
            self.dragging = Some(target);
            ctx.model.overlays.fixation_bar = Self::bar(ctx.model, target);
        }
        Ok(Flow::Stop)
    }

    fn on_pointer_up(&mut self, ctx: &mut FeatureContext<'_>, _event: &PointerEvent) -> Result<Flow> {
        let Some(target) = self.dragging.take() else {
            return Ok(Flow::Continue);
        };
        ctx.model.overlays.fixation_bar = None;
        if ctx.model.set_fixed_column_count(target) {
            tracing::debug!(target: "vgrid::column_fixation", count = target, "committed");
        }
        Ok(Flow::Stop)
    }

    fn on_key_down(&mut self, ctx: &mut FeatureContext<'_>, event: &KeyEvent) -> Result<Flow> {
        if event.key == "Escape" && self.dragging.take().is_some() {
            ctx.model.overlays.fixation_bar = None;
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    }

    fn cursor_icon(&self) -> Option<CursorIcon> {
        (self.dragging.is_some() || self.over_handle).then_some(CursorIcon::ColResize)
    }
}
