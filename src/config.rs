//! Grid configuration.
//!
//! Every field has a default so a host can pass a partial JSON object.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PropertyMap;

/// Default feature order. Resizing and fixation must see a press before
/// selection and moving do, or a divider grab reads as a reorder start.
pub const DEFAULT_FEATURES: &[&str] = &[
    "on_hover",
    "column_fixation",
    "row_fixation",
    "column_resizing",
    "row_selection",
    "column_selection",
    "column_moving",
    "cell_selection",
    "key_paging",
    "context_menu",
];

/// Grid-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Leading active columns excluded from horizontal scrolling
    pub fixed_column_count: usize,
    /// Leading data rows excluded from vertical scrolling
    pub fixed_row_count: usize,
    /// Column header rows
    pub header_row_count: usize,
    pub show_filter_row: bool,
    pub show_row_numbers: bool,
    pub show_tree_column: bool,
    pub columns_reorderable: bool,
    pub row_selection: bool,

    pub default_column_width: f32,
    pub minimum_column_width: f32,
    pub maximum_column_width: Option<f32>,
    pub default_row_height: f32,
    pub header_row_height: f32,
    pub row_handle_width: f32,
    pub tree_column_width: f32,

    /// Pixel distance from a divider that still counts as grabbing it
    pub resize_margin: f32,
    pub column_move_insert_line_width: f32,
    pub fixed_line_width: f32,
    /// Distance from a viewport edge that starts drag auto-scroll
    pub autoscroll_threshold: f32,
    pub min_scroll_delay_ms: f64,
    pub max_scroll_delay_ms: f64,
    pub scroll_delay_step_ms: f64,
    /// Interval between drag-select auto-scroll steps
    pub select_scroll_interval_ms: f64,
    /// Delay before a detached pipeline is reattached after a drop
    pub reattach_delay_ms: f64,

    pub autosize_char_width: f32,
    pub autosize_padding: f32,

    /// How many columns/rows back a span owner is searched for
    pub span_lookback: usize,

    /// Properties every cell starts from
    pub cell_defaults: PropertyMap,

    /// Pipeline order, by feature name
    pub features: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            fixed_column_count: 0,
            fixed_row_count: 0,
            header_row_count: 1,
            show_filter_row: false,
            show_row_numbers: true,
            show_tree_column: false,
            columns_reorderable: true,
            row_selection: true,

            default_column_width: 100.0,
            minimum_column_width: 5.0,
            maximum_column_width: None,
            default_row_height: 20.0,
            header_row_height: 24.0,
            row_handle_width: 40.0,
            tree_column_width: 20.0,

            resize_margin: 3.0,
            column_move_insert_line_width: 2.0,
            fixed_line_width: 2.0,
            autoscroll_threshold: 20.0,
            min_scroll_delay_ms: 30.0,
            max_scroll_delay_ms: 100.0,
            scroll_delay_step_ms: 5.0,
            select_scroll_interval_ms: 25.0,
            reattach_delay_ms: 200.0,

            autosize_char_width: 7.0,
            autosize_padding: 12.0,

            span_lookback: 8,

            cell_defaults: PropertyMap::new(),

            features: DEFAULT_FEATURES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl GridConfig {
    /// Parse a (possibly partial) JSON configuration object.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Height of all rows above the data region.
    pub fn header_height(&self) -> f32 {
        let filter = if self.show_filter_row {
            self.default_row_height
        } else {
            0.0
        };
        self.header_height_rows() + filter
    }

    fn header_height_rows(&self) -> f32 {
        (0..self.header_row_count).map(|_| self.header_row_height).sum()
    }

    /// Number of rendered rows above the data region (headers + filter).
    pub fn top_row_count(&self) -> usize {
        self.header_row_count + usize::from(self.show_filter_row)
    }

    /// Scroll delay for the `attempt`-th auto-scroll step.
    pub fn scroll_delay(&self, attempt: u32) -> f64 {
        let stepped = self.max_scroll_delay_ms - f64::from(attempt) * self.scroll_delay_step_ms;
        stepped.max(self.min_scroll_delay_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = GridConfig::from_json(r#"{"fixedColumnCount": 2, "showRowNumbers": false}"#)
            .unwrap();
        assert_eq!(cfg.fixed_column_count, 2);
        assert!(!cfg.show_row_numbers);
        assert_eq!(cfg.resize_margin, 3.0);
        assert_eq!(cfg.features.len(), DEFAULT_FEATURES.len());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(GridConfig::from_json("{ fixedColumnCount: ").is_err());
        assert!(GridConfig::from_json(r#"{"fixedColumnCount": "two"}"#).is_err());
    }

    #[test]
    fn scroll_delay_ramps_down_to_floor() {
        let cfg = GridConfig::default();
        assert_eq!(cfg.scroll_delay(0), 100.0);
        assert_eq!(cfg.scroll_delay(1), 95.0);
        assert_eq!(cfg.scroll_delay(14), 30.0);
        assert_eq!(cfg.scroll_delay(40), 30.0);
    }

    #[test]
    fn header_height_includes_filter_row() {
        let mut cfg = GridConfig::default();
        assert_eq!(cfg.header_height(), 24.0);
        cfg.show_filter_row = true;
        assert_eq!(cfg.header_height(), 44.0);
        assert_eq!(cfg.top_row_count(), 2);
    }
}
