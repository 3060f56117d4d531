//! Row selection through the row-handle column.

use super::{Button, Feature, FeatureContext, Flow, PointerEvent};
use crate::error::Result;
use crate::events::GridEvent;
use crate::types::{Selection, SelectionType};

#[derive(Debug, Default)]
pub struct RowSelection {
    anchor: Option<usize>,
    dragging: bool,
}

impl Feature for RowSelection {
    fn name(&self) -> &'static str {
        "row_selection"
    }

    fn on_pointer_down(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        let Some(cell) = event.cell else {
            return Ok(Flow::Continue);
        };
        if event.button != Button::Primary
            || !ctx.model.config.row_selection
            || !(cell.is_data_row && cell.is_handle_column)
        {
            return Ok(Flow::Continue);
        }
        let row = cell.data_cell.y;
        let selection = &mut ctx.model.selection;
        let last = selection.last_of(SelectionType::RowRange).copied();
        match (event.modifiers.shift, event.modifiers.toggle(), self.anchor, last) {
            (true, _, Some(anchor), Some(_)) => {
                selection.extend_last(Selection::row_range(anchor, row));
            }
            (_, true, _, _) if selection.is_row_selected(row) => {
                selection.deselect_row(row);
                self.anchor = Some(row);
            }
            (_, keep, _, _) => {
                selection.push(Selection::row_range(row, row), keep);
                self.anchor = Some(row);
            }
        }
        self.dragging = true;
        ctx.model.emit(GridEvent::SelectionChanged);
        Ok(Flow::Stop)
    }

    fn on_pointer_drag(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        if !self.dragging {
            return Ok(Flow::Continue);
        }
        let (Some(anchor), Some(cell)) = (self.anchor, event.cell) else {
            return Ok(Flow::Stop);
        };
        if cell.is_data_row {
            let next = Selection::row_range(anchor, cell.data_cell.y);
            if ctx.model.selection.last_of(SelectionType::RowRange) != Some(&next) {
                ctx.model.selection.extend_last(next);
                ctx.model.emit(GridEvent::SelectionChanged);
            }
        }
        Ok(Flow::Stop)
    }

    fn on_pointer_up(&mut self, _ctx: &mut FeatureContext<'_>, _event: &PointerEvent) -> Result<Flow> {
        if std::mem::take(&mut self.dragging) {
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    }
}
