//! `GridView`, the WASM-exported entry point.
//!
//! Wraps a [`Grid`] for JavaScript hosts. The host owns the DOM: it forwards
//! pointer, key and timer events here and reads back layout, overlays and
//! painted cells to draw. Getters return JSON strings on every target; on
//! wasm32 the same data is also available as plain JS objects.

#[cfg(target_arch = "wasm32")]
use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::config::GridConfig;
use crate::csv::Delimiter;
use crate::error::GridError;
use crate::features::{Button, KeyEvent, Modifiers, PointerEvent};
use crate::grid::Grid;
use crate::registry::GridState;
use crate::types::{GridColumn, Point};

fn js_error(e: GridError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// DOM `MouseEvent.button` numbering.
fn button_from_dom(button: u8) -> Button {
    match button {
        1 => Button::Middle,
        2 => Button::Secondary,
        _ => Button::Primary,
    }
}

/// Grid column from the host's numbering: -2 is the row handle, -1 the tree
/// column, anything else an active index.
fn grid_column(x: i32) -> Option<GridColumn> {
    match x {
        -2 => Some(GridColumn::RowHandle),
        -1 => Some(GridColumn::TreeIndent),
        _ => usize::try_from(x).ok().map(GridColumn::Active),
    }
}

#[wasm_bindgen]
pub struct GridView {
    grid: Grid,
}

#[wasm_bindgen]
impl GridView {
    /// Build a view over comma-separated text. `config_json` may be `"{}"`.
    #[wasm_bindgen(js_name = "fromCsv")]
    pub fn from_csv(text: &str, config_json: &str) -> Result<GridView, JsValue> {
        Self::from_text(text, Delimiter::Comma, config_json)
    }

    /// Build a view over tab-separated text.
    #[wasm_bindgen(js_name = "fromTsv")]
    pub fn from_tsv(text: &str, config_json: &str) -> Result<GridView, JsValue> {
        Self::from_text(text, Delimiter::Tab, config_json)
    }

    #[wasm_bindgen(js_name = "setViewportSize")]
    pub fn set_viewport_size(&mut self, width: f32, height: f32) -> Result<(), JsValue> {
        self.grid.set_viewport_size(width, height).map_err(js_error)
    }

    /// Scroll by whole columns/rows.
    #[wasm_bindgen(js_name = "scrollBy")]
    pub fn scroll_by(&mut self, columns: i32, rows: i32) -> Result<(), JsValue> {
        let columns = isize::try_from(columns).unwrap_or_default();
        let rows = isize::try_from(rows).unwrap_or_default();
        self.grid.scroll_by(columns, rows).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "scrollTo")]
    pub fn scroll_to(&mut self, left: u32, top: u32) -> Result<(), JsValue> {
        self.grid
            .scroll_to(left as usize, top as usize)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = "setFixedColumnCount")]
    pub fn set_fixed_column_count(&mut self, count: u32) -> Result<(), JsValue> {
        self.grid
            .set_fixed_column_count(count as usize)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = "setFixedRowCount")]
    pub fn set_fixed_row_count(&mut self, count: u32) -> Result<(), JsValue> {
        self.grid.set_fixed_row_count(count as usize).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "moveColumns")]
    pub fn move_columns(&mut self, from: u32, count: u32, to: u32) -> Result<bool, JsValue> {
        self.grid
            .move_columns(from as usize, count as usize, to as usize)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(
        &mut self,
        x: f32,
        y: f32,
        button: u8,
        shift: bool,
        ctrl: bool,
    ) -> Result<(), JsValue> {
        let event = self.pointer(x, y, button, shift, ctrl);
        self.grid.pointer_down(event).map_err(js_error)
    }

    /// Pointer motion with no button held.
    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        let event = self.pointer(x, y, 0, false, false);
        self.grid.pointer_move(event).map_err(js_error)
    }

    /// Pointer motion with a button held.
    #[wasm_bindgen(js_name = "pointerDrag")]
    pub fn pointer_drag(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
    ) -> Result<(), JsValue> {
        let event = self.pointer(x, y, 0, shift, ctrl);
        self.grid.pointer_drag(event).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&mut self, x: f32, y: f32, button: u8) -> Result<(), JsValue> {
        let event = self.pointer(x, y, button, false, false);
        self.grid.pointer_up(event).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "doubleClick")]
    pub fn double_click(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        let event = self.pointer(x, y, 0, false, false);
        self.grid.double_click(event).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "contextMenu")]
    pub fn context_menu(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        let event = self.pointer(x, y, 2, false, false);
        self.grid.context_menu(event).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "keyDown")]
    pub fn key_down(&mut self, key: &str, shift: bool, ctrl: bool) -> Result<(), JsValue> {
        self.sync_clock();
        let event = KeyEvent::new(key, Self::modifiers(shift, ctrl));
        self.grid.key_down(&event).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "keyUp")]
    pub fn key_up(&mut self, key: &str, shift: bool, ctrl: bool) -> Result<(), JsValue> {
        self.sync_clock();
        let event = KeyEvent::new(key, Self::modifiers(shift, ctrl));
        self.grid.key_up(&event).map_err(js_error)
    }

    /// Fire timers due at `now_ms` (host clock, e.g. `performance.now()`).
    pub fn tick(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.grid.tick(now_ms).map_err(js_error)
    }

    /// When the host should call [`tick`](Self::tick) next, if at all.
    #[wasm_bindgen(js_name = "nextDue")]
    pub fn next_due(&self) -> Option<f64> {
        self.grid.next_due()
    }

    #[wasm_bindgen(js_name = "cursorIcon")]
    pub fn cursor_icon(&self) -> Result<String, JsValue> {
        let icon = serde_json::to_value(self.grid.cursor_icon())
            .map_err(|e| js_error(e.into()))?;
        Ok(icon.as_str().unwrap_or("default").to_string())
    }

    /// Formatted text of one on-screen cell.
    #[wasm_bindgen(js_name = "cellText")]
    pub fn cell_text(&mut self, x: i32, y: u32) -> Option<String> {
        let column = grid_column(x)?;
        let cursor = self.grid.cursor_at_grid(column, y as usize)?;
        let ctx = self.grid.cell_context();
        let view = cursor.view(&ctx)?;
        Some(view.formatted_value().to_string())
    }

    #[wasm_bindgen(js_name = "stateJson")]
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.grid.state()).map_err(|e| js_error(e.into()))
    }

    #[wasm_bindgen(js_name = "restoreStateJson")]
    pub fn restore_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GridState = serde_json::from_str(json).map_err(|e| js_error(e.into()))?;
        self.grid.restore_state(&state).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "layoutJson")]
    pub fn layout_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.grid.layout()).map_err(|e| js_error(e.into()))
    }

    #[wasm_bindgen(js_name = "overlaysJson")]
    pub fn overlays_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.grid.overlays()).map_err(|e| js_error(e.into()))
    }

    #[wasm_bindgen(js_name = "selectionJson")]
    pub fn selection_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.grid.selection()).map_err(|e| js_error(e.into()))
    }

    /// One paint pass over the rendered area.
    #[wasm_bindgen(js_name = "paintJson")]
    pub fn paint_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.grid.painted_cells()).map_err(|e| js_error(e.into()))
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl GridView {
    /// Register `callback(event)` for every change notification.
    #[wasm_bindgen(js_name = "setListener")]
    pub fn set_listener(&mut self, callback: Function) {
        self.grid.subscribe(move |event| {
            match serde_wasm_bindgen::to_value(event) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        tracing::warn!(target: "vgrid::viewer", error = ?e, "listener threw");
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "vgrid::viewer", error = %e, "event not serializable");
                }
            }
        });
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.grid.state()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn layout(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.grid.layout()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn overlays(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.grid.overlays()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn paint(&mut self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.grid.painted_cells())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl GridView {
    fn from_text(text: &str, delimiter: Delimiter, config_json: &str) -> Result<GridView, JsValue> {
        #[cfg(target_arch = "wasm32")]
        console_error_panic_hook::set_once();

        let config = GridConfig::from_json(config_json).map_err(js_error)?;
        let grid = Grid::from_delimited(text.as_bytes(), delimiter, config).map_err(js_error)?;
        tracing::debug!(
            target: "vgrid::viewer",
            columns = grid.registry().active_len(),
            rows = grid.model().row_count(),
            "loaded"
        );
        Ok(GridView { grid })
    }

    /// The wrapped grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    fn modifiers(shift: bool, ctrl: bool) -> Modifiers {
        Modifiers {
            shift,
            ctrl,
            ..Modifiers::NONE
        }
    }

    fn pointer(&mut self, x: f32, y: f32, button: u8, shift: bool, ctrl: bool) -> PointerEvent {
        self.sync_clock();
        PointerEvent::new(
            Point::new(x, y),
            button_from_dom(button),
            Self::modifiers(shift, ctrl),
        )
    }

    #[cfg(target_arch = "wasm32")]
    fn sync_clock(&mut self) {
        self.grid.set_clock(js_sys::Date::now());
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn sync_clock(&mut self) {}
}
