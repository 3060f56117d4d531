//! Transient drag visuals. Features position these; hosts draw them.

use serde::Serialize;

use crate::types::Rect;

/// A thin marker line, vertical unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub length: f32,
    pub thickness: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlays {
    /// Floating proxy of the columns being dragged
    pub column_floater: Option<Rect>,
    /// Where the dragged columns would land
    pub drop_indicator: Option<Bar>,
    /// Proxy for the fixed-column divider while it is dragged
    pub fixation_bar: Option<Bar>,
    /// Horizontal proxy for the fixed-row divider while it is dragged
    pub row_fixation_bar: Option<Bar>,
}

impl Overlays {
    pub fn is_empty(&self) -> bool {
        self.column_floater.is_none()
            && self.drop_indicator.is_none()
            && self.fixation_bar.is_none()
            && self.row_fixation_bar.is_none()
    }

    pub fn clear_column_drag(&mut self) {
        self.column_floater = None;
        self.drop_indicator = None;
    }
}
