//! Column divider drag and double-click autosize.

use super::{Button, CellInfo, CursorIcon, Feature, FeatureContext, Flow, KeyEvent, PointerEvent};
use crate::error::Result;
use crate::events::GridEvent;
use crate::grid::GridModel;
use crate::types::ColumnKind;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeDrag {
    column: ColumnKind,
    start_width: f32,
    start_x: f32,
}

#[derive(Debug, Default)]
pub struct ColumnResizing {
    drag: Option<ResizeDrag>,
    over_divider: bool,
}

impl ColumnResizing {
    /// Column whose divider is under the pointer. The left edge of a cell
    /// belongs to the previous rendered column.
    fn divider_column(model: &GridModel, event: &PointerEvent) -> Option<ColumnKind> {
        let cell: CellInfo = event.cell?;
        if !cell.is_header_row {
            return None;
        }
        let margin = model.config.resize_margin;
        let kind = if cell.offset.x <= margin {
            let previous = cell.column.index.checked_sub(1)?;
            model.layout.columns.get(previous)?.kind
        } else if cell.offset.x >= cell.column.width - margin {
            cell.column.kind
        } else {
            return None;
        };
        let resizable = model.registry.column(kind).is_some_and(|c| !c.fixed);
        resizable.then_some(kind)
    }

    /// Width that fits the widest rendered text in the column.
    fn autosize(ctx: &mut FeatureContext<'_>, kind: ColumnKind) -> Option<(f32, f32)> {
        let model = &*ctx.model;
        let column = *model.layout.columns.iter().find(|c| c.kind == kind)?;
        let cells = model.cell_context();
        let mut widest = 0usize;
        for row in &model.layout.rows {
            ctx.cursor.reset(&cells, column, *row);
            if let Some(view) = ctx.cursor.view(&cells) {
                widest = widest.max(view.formatted_value().chars().count());
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let wanted = widest as f32 * model.config.autosize_char_width + model.config.autosize_padding;
        let before = model.registry.column(kind)?.width();
        let after = ctx.model.set_column_width(kind, wanted)?;
        Some((before, after))
    }
}

fn rounded_differs(a: f32, b: f32) -> bool {
    (a.round() - b.round()).abs() >= 1.0
}

impl Feature for ColumnResizing {
    fn name(&self) -> &'static str {
        "column_resizing"
    }

    fn on_pointer_move(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        self.over_divider = Self::divider_column(ctx.model, event).is_some();
        Ok(Flow::Continue)
    }

    fn on_pointer_down(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        if event.button != Button::Primary {
            return Ok(Flow::Continue);
        }
        let Some(column) = Self::divider_column(ctx.model, event) else {
            return Ok(Flow::Continue);
        };
        let Some(start_width) = ctx.model.registry.column(column).map(|c| c.width()) else {
            return Ok(Flow::Continue);
        };
        self.drag = Some(ResizeDrag {
            column,
            start_width,
            start_x: event.point.x,
        });
        Ok(Flow::Stop)
    }

    fn on_pointer_drag(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        let Some(drag) = self.drag else {
            return Ok(Flow::Continue);
        };
        let width = drag.start_width + (event.point.x - drag.start_x);
        ctx.model.set_column_width(drag.column, width);
        Ok(Flow::Stop)
    }

    fn on_pointer_up(&mut self, ctx: &mut FeatureContext<'_>, _event: &PointerEvent) -> Result<Flow> {
        let Some(drag) = self.drag.take() else {
            return Ok(Flow::Continue);
        };
        let Some(after) = ctx.model.registry.column(drag.column).map(|c| c.width()) else {
            return Ok(Flow::Stop);
        };
        if rounded_differs(after, drag.start_width) {
            tracing::debug!(
                target: "vgrid::column_resizing",
                column = %drag.column,
                before = drag.start_width,
                after,
                "resized"
            );
            ctx.model.emit(GridEvent::ColumnResized {
                column: drag.column,
                before: drag.start_width,
                after,
            });
        }
        Ok(Flow::Stop)
    }

    fn on_double_click(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        let Some(column) = Self::divider_column(ctx.model, event) else {
            return Ok(Flow::Continue);
        };
        if let Some((before, after)) = Self::autosize(ctx, column) {
            if rounded_differs(after, before) {
                ctx.model.emit(GridEvent::ColumnResized {
                    column,
                    before,
                    after,
                });
            }
        }
        Ok(Flow::Stop)
    }

    fn on_key_down(&mut self, ctx: &mut FeatureContext<'_>, event: &KeyEvent) -> Result<Flow> {
        if event.key != "Escape" {
            return Ok(Flow::Continue);
        }
        let Some(drag) = self.drag.take() else {
            return Ok(Flow::Continue);
        };
        ctx.model.set_column_width(drag.column, drag.start_width);
        Ok(Flow::Stop)
    }

    fn cursor_icon(&self) -> Option<CursorIcon> {
        (self.drag.is_some() || self.over_divider).then_some(CursorIcon::ColResize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_hides_subpixel_drags() {
        assert!(!rounded_differs(100.4, 100.0));
        assert!(rounded_differs(137.0, 100.0));
    }
}
