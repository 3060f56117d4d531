//! Column selection by clicking header cells.
//!
//! Presses are passed on so the move feature can start a drag from the same
//! press. Drag-to-extend only applies when columns cannot be reordered, since
//! otherwise a header drag is a move.

use super::{Button, Feature, FeatureContext, Flow, PointerEvent};
use crate::error::Result;
use crate::events::GridEvent;
use crate::types::Selection;

#[derive(Debug, Default)]
pub struct ColumnSelection {
    anchor: Option<usize>,
    extending: bool,
}

impl Feature for ColumnSelection {
    fn name(&self) -> &'static str {
        "column_selection"
    }

    fn on_pointer_down(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        let Some(cell) = event.cell.filter(|c| c.is_header_cell()) else {
            return Ok(Flow::Continue);
        };
        let Some(col) = cell.active_index() else {
            return Ok(Flow::Continue);
        };
        if event.button != Button::Primary {
            return Ok(Flow::Continue);
        }
        let before = ctx.model.selection.clone();
        let selection = &mut ctx.model.selection;
        if let (true, Some(anchor)) = (event.modifiers.shift, self.anchor) {
            selection.select_column_range(anchor, col);
        } else if event.modifiers.toggle() {
            if selection.is_column_selected(col) {
                selection.deselect_column(col);
            } else {
                selection.push(Selection::column_range(col, col), true);
            }
            self.anchor = Some(col);
        } else {
            if !selection.is_column_selected(col) {
                selection.push(Selection::column_range(col, col), false);
            }
            self.anchor = Some(col);
        }
        self.extending = !ctx.model.config.columns_reorderable;
        if ctx.model.selection != before {
            ctx.model.emit(GridEvent::SelectionChanged);
        }
        Ok(Flow::Continue)
    }

    fn on_pointer_drag(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        if !self.extending {
            return Ok(Flow::Continue);
        }
        let (Some(anchor), Some(col)) = (self.anchor, event.cell.and_then(|c| c.active_index())) else {
            return Ok(Flow::Stop);
        };
        let next = Selection::column_range(anchor, col);
        if ctx.model.selection.last_of(next.selection_type) != Some(&next) {
            ctx.model.selection.select_column_range(anchor, col);
            ctx.model.emit(GridEvent::SelectionChanged);
        }
        Ok(Flow::Stop)
    }

    fn on_pointer_up(&mut self, _ctx: &mut FeatureContext<'_>, _event: &PointerEvent) -> Result<Flow> {
        self.extending = false;
        Ok(Flow::Continue)
    }
}
