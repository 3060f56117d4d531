//! Page-wise scrolling from the keyboard. Shift pages horizontally.

use super::{Feature, FeatureContext, Flow, KeyEvent};
use crate::error::Result;
use crate::grid::GridModel;

#[derive(Debug, Default)]
pub struct KeyPaging;

/// Scrollable rows (or columns) currently on screen, at least one.
fn page(model: &GridModel, horizontal: bool) -> isize {
    let n = if horizontal {
        let fixed = model.resolver().fixed_column_count();
        model
            .layout
            .active_columns()
            .filter(|c| c.column.active_index().is_some_and(|i| i >= fixed))
            .count()
    } else {
        let fixed = model.config.fixed_row_count;
        model
            .layout
            .data_rows()
            .filter(|r| r.row_index >= fixed)
            .count()
    };
    isize::try_from(n.max(1)).unwrap_or(isize::MAX)
}

impl Feature for KeyPaging {
    fn name(&self) -> &'static str {
        "key_paging"
    }

    fn on_key_down(&mut self, ctx: &mut FeatureContext<'_>, event: &KeyEvent) -> Result<Flow> {
        let horizontal = event.modifiers.shift;
        let model = &mut *ctx.model;
        let size = page(model, horizontal);
        let (left, top) = (model.viewport.scroll_left, model.viewport.scroll_top);
        match event.key.as_str() {
            "PageDown" if horizontal => model.scroll_by(size, 0),
            "PageDown" => model.scroll_by(0, size),
            "PageUp" if horizontal => model.scroll_by(-size, 0),
            "PageUp" => model.scroll_by(0, -size),
            "Home" if horizontal => {
                model.scroll_to(0, top);
                true
            }
            "Home" => {
                model.scroll_to(left, 0);
                true
            }
            "End" if horizontal => {
                let limits = model.scroll_limits();
                model.scroll_to(limits.max_left, top);
                true
            }
            "End" => {
                let limits = model.scroll_limits();
                model.scroll_to(left, limits.max_top);
                true
            }
            _ => return Ok(Flow::Continue),
        };
        tracing::trace!(
            target: "vgrid::key_paging",
            key = event.key.as_str(),
            left = model.viewport.scroll_left,
            top = model.viewport.scroll_top,
            "paged"
        );
        Ok(Flow::Stop)
    }
}
