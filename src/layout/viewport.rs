//! Viewport state: scroll position and size.
//!
//! Scroll is counted in whole columns/rows past the fixed region, the unit the
//! grid's scroll bars move in.

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::registry::ColumnRegistry;

/// Largest valid scroll offsets for the current content and viewport size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollLimits {
    pub max_left: usize,
    pub max_top: usize,
}

impl ScrollLimits {
    /// Compute limits so the last column/row can be scrolled fully into view.
    pub fn compute(
        registry: &ColumnRegistry,
        config: &GridConfig,
        viewport: &Viewport,
        row_count: usize,
    ) -> Self {
        let fixed_cols = config.fixed_column_count.min(registry.active_len());
        let leading: f32 = leading_width(registry, config)
            + registry
                .active_columns()
                .take(fixed_cols)
                .map(|c| c.width())
                .sum::<f32>();
        let available_w = (viewport.width - leading).max(0.0);

        let scrollable: Vec<f32> = registry
            .active_columns()
            .skip(fixed_cols)
            .map(|c| c.width())
            .collect();
        let mut tail = 0.0;
        let mut fitting = 0;
        for w in scrollable.iter().rev() {
            if tail + w > available_w {
                break;
            }
            tail += w;
            fitting += 1;
        }
        // Keep at least one scrollable column on screen.
        let max_left = scrollable.len().saturating_sub(fitting.max(1));

        let fixed_rows = config.fixed_row_count.min(row_count);
        #[allow(clippy::cast_precision_loss)]
        let leading_h = config.header_height() + fixed_rows as f32 * config.default_row_height;
        let available_h = (viewport.height - leading_h).max(0.0);
        let fitting_rows = if config.default_row_height > 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let n = (available_h / config.default_row_height).floor() as usize;
            n.max(1)
        } else {
            1
        };
        let max_top = row_count
            .saturating_sub(fixed_rows)
            .saturating_sub(fitting_rows);

        Self { max_left, max_top }
    }
}

/// Width of the synthetic columns that are shown.
pub(crate) fn leading_width(registry: &ColumnRegistry, config: &GridConfig) -> f32 {
    let mut w = 0.0;
    if config.show_row_numbers {
        w += registry
            .column(crate::types::ColumnKind::RowHandle)
            .map_or(0.0, |c| c.width());
    }
    if config.show_tree_column {
        w += registry
            .column(crate::types::ColumnKind::TreeIndent)
            .map_or(0.0, |c| c.width());
    }
    w
}

/// Viewport state - the visible area of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Scrollable columns hidden to the left of the fixed region
    pub scroll_left: usize,
    /// Scrollable rows hidden above the fixed region
    pub scroll_top: usize,
    /// Viewport width in pixels
    pub width: f32,
    /// Viewport height in pixels
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Create a new viewport with default values
    pub fn new() -> Self {
        Self {
            scroll_left: 0,
            scroll_top: 0,
            width: 800.0,
            height: 600.0,
        }
    }

    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::new()
        }
    }

    /// Clamp scroll position to valid range.
    pub fn clamp_scroll(&mut self, limits: ScrollLimits) {
        self.scroll_left = self.scroll_left.min(limits.max_left);
        self.scroll_top = self.scroll_top.min(limits.max_top);
    }

    /// Scroll by delta amounts. Returns whether the position changed.
    pub fn scroll_by(&mut self, delta_x: isize, delta_y: isize, limits: ScrollLimits) -> bool {
        let before = (self.scroll_left, self.scroll_top);
        self.scroll_left = self.scroll_left.saturating_add_signed(delta_x);
        self.scroll_top = self.scroll_top.saturating_add_signed(delta_y);
        self.clamp_scroll(limits);
        before != (self.scroll_left, self.scroll_top)
    }

    /// Set absolute scroll position
    pub fn set_scroll(&mut self, left: usize, top: usize, limits: ScrollLimits) {
        self.scroll_left = left;
        self.scroll_top = top;
        self.clamp_scroll(limits);
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }
}
