use super::{Button, Feature, FeatureContext, Flow, PointerEvent};
use crate::error::Result;
use crate::events::GridEvent;

/// Turns a secondary-button press over a cell into a notification. A host
/// that reports both the press and a separate context-menu event gets one
/// notification, not two.
#[derive(Debug, Default)]
pub struct ContextMenu {
    from_press: bool,
}

impl ContextMenu {
    fn request(ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Flow {
        let Some(cell) = event.cell else {
            return Flow::Continue;
        };
        ctx.model.emit(GridEvent::ContextMenuRequested {
            point: event.point,
            grid_cell: cell.grid_cell,
            data_cell: cell.data_cell,
        });
        Flow::Stop
    }
}

impl Feature for ContextMenu {
    fn name(&self) -> &'static str {
        "context_menu"
    }

    fn on_pointer_down(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        if event.button != Button::Secondary {
            self.from_press = false;
            return Ok(Flow::Continue);
        }
        let flow = Self::request(ctx, event);
        self.from_press = flow == Flow::Stop;
        Ok(flow)
    }

    fn on_context_menu(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        if std::mem::take(&mut self.from_press) {
            return Ok(Flow::Stop);
        }
        Ok(Self::request(ctx, event))
    }
}
