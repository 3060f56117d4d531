//! Common test utilities: grid builders and pointer/key shorthands.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

use std::cell::RefCell;
use std::rc::Rc;

use vgrid::data::schema_from_headers;
use vgrid::features::{Button, KeyEvent, Modifiers, PointerEvent};
use vgrid::{CellValue, ColumnKind, Grid, GridConfig, GridEvent, LocalDataSource, Point};

/// Row-handle column width under the default config.
pub const HANDLE: f32 = 40.0;
/// Default data column width.
pub const COL: f32 = 100.0;
/// Default header row height.
pub const HEADER: f32 = 24.0;
/// Default data row height.
pub const ROW: f32 = 20.0;

/// `columns` named A, B, C, ... over `rows` rows whose cells read `"<name><row>"`.
pub fn lettered(columns: usize, rows: usize, config: GridConfig) -> Grid {
    let names: Vec<String> = (0..columns).map(letter).collect();
    let data = LocalDataSource::generate(columns, rows, |x, y| {
        CellValue::Text(format!("{}{}", letter(x), y))
    });
    Grid::new(Box::new(data), &schema_from_headers(&names), config).expect("default features")
}

pub fn letter(i: usize) -> String {
    let mut s = String::new();
    let mut n = i + 1;
    while n > 0 {
        n -= 1;
        s.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    s
}

/// Active order as column names.
pub fn order(grid: &Grid) -> Vec<String> {
    grid.registry()
        .active_columns()
        .map(|c| c.name.clone())
        .collect()
}

/// Center x of the active column at rendered slot `slot` (0 = first data column),
/// assuming default widths and no scroll.
pub fn column_center(slot: usize) -> f32 {
    HANDLE + COL * slot as f32 + COL / 2.0
}

/// Center y of data row `row` with one header row and no scroll.
pub fn row_center(row: usize) -> f32 {
    HEADER + ROW * row as f32 + ROW / 2.0
}

pub fn press(x: f32, y: f32) -> PointerEvent {
    PointerEvent::new(Point::new(x, y), Button::Primary, Modifiers::NONE)
}

pub fn press_with(x: f32, y: f32, modifiers: Modifiers) -> PointerEvent {
    PointerEvent::new(Point::new(x, y), Button::Primary, modifiers)
}

pub fn secondary(x: f32, y: f32) -> PointerEvent {
    PointerEvent::new(Point::new(x, y), Button::Secondary, Modifiers::NONE)
}

pub fn shift() -> Modifiers {
    Modifiers {
        shift: true,
        ..Modifiers::NONE
    }
}

pub fn ctrl() -> Modifiers {
    Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    }
}

pub fn key(name: &str) -> KeyEvent {
    KeyEvent::new(name, Modifiers::NONE)
}

/// Press, drag through `path`, release at the last point.
pub fn drag(grid: &mut Grid, from: (f32, f32), path: &[(f32, f32)]) {
    grid.pointer_down(press(from.0, from.1)).unwrap();
    for &(x, y) in path {
        grid.pointer_drag(press(x, y)).unwrap();
    }
    let (x, y) = path.last().copied().unwrap_or(from);
    grid.pointer_up(press(x, y)).unwrap();
}

/// Collect every notification the grid emits from now on.
pub fn record(grid: &mut Grid) -> Rc<RefCell<Vec<GridEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    grid.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    events
}

pub fn width_of(grid: &Grid, kind: ColumnKind) -> f32 {
    grid.registry().column(kind).unwrap().width()
}
