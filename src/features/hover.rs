use super::{Feature, FeatureContext, Flow, PointerEvent};
use crate::error::Result;

/// Tracks the cell under the pointer.
#[derive(Debug, Default)]
pub struct OnHover;

impl Feature for OnHover {
    fn name(&self) -> &'static str {
        "on_hover"
    }

    fn on_pointer_move(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        let hovered = event.cell.map(|c| c.grid_cell);
        if ctx.model.hovered != hovered {
            tracing::trace!(target: "vgrid::hover", ?hovered, "hover");
            ctx.model.hovered = hovered;
        }
        Ok(Flow::Continue)
    }

    fn on_rendered(&mut self, ctx: &mut FeatureContext<'_>) -> Result<Flow> {
        // Grid coordinates shift under the pointer after a scroll.
        ctx.model.hovered = None;
        Ok(Flow::Continue)
    }
}
