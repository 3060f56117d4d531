//! Cell cursor tests
//!
//! Paint passes, coordinate binding, span redirection, property layering and
//! write-through, driven through a full grid.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::*;
use serde_json::json;
use vgrid::data::schema_from_headers;
use vgrid::{
    CellValue, ColumnKind, DataSource, Grid, GridColumn, GridConfig, LocalDataSource, Rect, Span,
    Subgrid,
};

fn spanned() -> Grid {
    let mut data = LocalDataSource::generate(4, 6, |x, y| CellValue::Text(format!("{}{}", letter(x), y)));
    data.set_span(0, 0, Span::new(2, 2));
    Grid::new(
        Box::new(data),
        &schema_from_headers(&["A", "B", "C", "D"]),
        GridConfig::default(),
    )
    .unwrap()
}

fn text_at(grid: &mut Grid, x: GridColumn, y: usize) -> Option<String> {
    let cursor = grid.cursor_at_grid(x, y)?;
    let ctx = grid.cell_context();
    let view = cursor.view(&ctx)?;
    Some(view.formatted_value().to_string())
}

// ============================================================================
// Paint pass
// ============================================================================

#[test]
fn paint_visits_every_rendered_cell_once() {
    let mut grid = lettered(3, 5, GridConfig::default());
    let expected = grid.layout().rows.len() * grid.layout().columns.len();
    let mut seen = Vec::new();
    grid.paint(|cell| seen.push(cell.grid_cell()));
    assert_eq!(seen.len(), expected);
    seen.sort_by_key(|c| (c.y, c.x));
    seen.dedup();
    assert_eq!(seen.len(), expected);
}

#[test]
fn headers_data_and_row_numbers() {
    let mut grid = lettered(3, 5, GridConfig::default());
    assert_eq!(text_at(&mut grid, GridColumn::Active(1), 0).as_deref(), Some("B"));
    assert_eq!(text_at(&mut grid, GridColumn::Active(2), 3).as_deref(), Some("C2"));
    assert_eq!(text_at(&mut grid, GridColumn::RowHandle, 1).as_deref(), Some("1"));
    assert_eq!(text_at(&mut grid, GridColumn::RowHandle, 0).as_deref(), Some(""));
}

#[test]
fn values_follow_column_moves() {
    let mut grid = lettered(3, 2, GridConfig::default());
    grid.move_columns(0, 1, 3).unwrap();
    assert_eq!(text_at(&mut grid, GridColumn::Active(0), 0).as_deref(), Some("B"));
    assert_eq!(text_at(&mut grid, GridColumn::Active(2), 1).as_deref(), Some("A0"));
}

#[test]
fn scrolled_rows_keep_their_data_index() {
    let mut grid = lettered(2, 500, GridConfig::default());
    grid.scroll_to(0, 100).unwrap();
    let cursor = grid.cursor_at_grid(GridColumn::Active(0), 1).unwrap();
    let ctx = grid.cell_context();
    let view = cursor.view(&ctx).unwrap();
    assert_eq!(view.data_cell().y, 100);
    assert_eq!(view.grid_cell().y, 1);
    assert_eq!(view.formatted_value(), "A100");
}

#[test]
fn off_screen_coordinates_do_not_bind() {
    let mut grid = lettered(2, 500, GridConfig::default());
    assert!(grid.cursor_at_grid(GridColumn::Active(0), 400).is_none());
    assert!(grid.cursor_at_grid(GridColumn::Active(7), 1).is_none());
    assert!(grid
        .cursor_at_data(ColumnKind::Data(0), 400, Subgrid::Data)
        .is_none());
    assert!(grid
        .cursor_at_data(ColumnKind::Data(1), 3, Subgrid::Data)
        .is_some());
}

#[test]
fn hidden_tree_column_is_not_rendered() {
    let mut grid = lettered(2, 2, GridConfig::default());
    assert!(grid.cursor_at_grid(GridColumn::TreeIndent, 1).is_none());

    let config = GridConfig {
        show_tree_column: true,
        ..GridConfig::default()
    };
    let mut grid = lettered(2, 2, config);
    let cursor = grid.cursor_at_grid(GridColumn::TreeIndent, 0).unwrap();
    let ctx = grid.cell_context();
    let view = cursor.view(&ctx).unwrap();
    assert!(view.is_tree_column());
    assert_eq!(view.bounds().x, HANDLE);
}

// ============================================================================
// Spans
// ============================================================================

#[test]
fn covered_cells_redirect_to_the_span_owner() {
    let mut grid = spanned();
    let mut skipped = Vec::new();
    grid.paint(|cell| {
        if cell.is_render_skip() {
            skipped.push((cell.grid_cell().x, cell.grid_cell().y));
            assert_eq!(cell.value_cell().x, ColumnKind::Data(0));
            assert_eq!(cell.value_cell().y, 0);
            assert_eq!(cell.formatted_value(), "A0");
        }
    });
    skipped.sort();
    assert_eq!(
        skipped,
        vec![
            (GridColumn::Active(0), 2),
            (GridColumn::Active(1), 1),
            (GridColumn::Active(1), 2),
        ]
    );
}

#[test]
fn span_owner_bounds_cover_the_merge() {
    let mut grid = spanned();
    let cursor = grid.cursor_at_grid(GridColumn::Active(0), 1).unwrap();
    let ctx = grid.cell_context();
    let view = cursor.view(&ctx).unwrap();
    assert_eq!(
        view.bounds(),
        Rect {
            x: HANDLE,
            y: HEADER,
            width: 2.0 * COL,
            height: 2.0 * ROW,
        }
    );
}

#[test]
fn painted_cells_skip_covered_cells() {
    let mut grid = spanned();
    let total = grid.layout().rows.len() * grid.layout().columns.len();
    assert_eq!(grid.painted_cells().len(), total - 3);
}

#[test]
fn writing_a_covered_cell_writes_the_owner() {
    let mut grid = spanned();
    assert!(grid.set_value_at(GridColumn::Active(1), 2, "merged".into()));
    assert_eq!(grid.model().data.get_value(0, 0), CellValue::Text("merged".into()));
    assert_eq!(grid.model().data.get_value(1, 1), CellValue::Text("B1".into()));
}

#[test]
fn header_cells_are_read_only() {
    let mut grid = lettered(2, 2, GridConfig::default());
    assert!(!grid.set_value_at(GridColumn::Active(0), 0, "x".into()));
    assert!(!grid.set_value_at(GridColumn::Active(0), 99, "x".into()));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn properties_layer_defaults_column_section_and_cell() {
    let mut config = GridConfig::default();
    config.cell_defaults.insert("format".into(), json!("text"));
    config.cell_defaults.insert("color".into(), json!("black"));
    let data = LocalDataSource::generate(1, 3, |_, y| CellValue::Number(1234.5 + y as f64));
    let mut grid = Grid::new(Box::new(data), &schema_from_headers(&["amount"]), config).unwrap();

    let mut props = serde_json::Map::new();
    props.insert("format".into(), json!("number"));
    props.insert("columnHeader".into(), json!({ "color": "blue" }));
    grid.model_mut()
        .registry
        .add_column_properties(ColumnKind::Data(0), &props)
        .unwrap();

    assert_eq!(text_at(&mut grid, GridColumn::Active(0), 1).as_deref(), Some("1,234.50"));

    let cursor = grid.cursor_at_grid(GridColumn::Active(0), 0).unwrap();
    let ctx = grid.cell_context();
    let header = cursor.view(&ctx).unwrap();
    assert_eq!(header.property("color"), Some(&json!("blue")));
    assert!(header.property("columnHeader").is_none());

    let mut cell = grid.cursor_at_grid(GridColumn::Active(0), 2).unwrap();
    {
        let model = grid.model_mut();
        assert!(cell.set_cell_property(model.data.as_mut(), &model.registry, "format", json!("integer")));
    }
    let ctx = grid.cell_context();
    let view = cell.view(&ctx).unwrap();
    assert_eq!(view.formatted_value(), "1,236");
    assert_eq!(view.property("color"), Some(&json!("black")));
    // Other rows keep the column format.
    assert_eq!(text_at(&mut grid, GridColumn::Active(0), 3).as_deref(), Some("1,236.50"));
}

#[test]
fn cell_overrides_travel_with_the_column() {
    let mut grid = lettered(2, 2, GridConfig::default());
    let mut cell = grid.cursor_at_grid(GridColumn::Active(1), 1).unwrap();
    {
        let model = grid.model_mut();
        cell.set_cell_property(model.data.as_mut(), &model.registry, "bold", json!(true));
    }
    grid.move_columns(1, 1, 0).unwrap();
    let cursor = grid.cursor_at_grid(GridColumn::Active(0), 1).unwrap();
    let ctx = grid.cell_context();
    assert_eq!(cursor.view(&ctx).unwrap().property("bold"), Some(&json!(true)));
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn flags_reflect_fixed_regions_and_selection() {
    let config = GridConfig {
        fixed_column_count: 1,
        fixed_row_count: 1,
        ..GridConfig::default()
    };
    let mut grid = lettered(3, 4, config);
    grid.pointer_down(press(column_center(1), row_center(2))).unwrap();
    grid.pointer_up(press(column_center(1), row_center(2))).unwrap();

    let mut checked = 0;
    grid.paint(|cell| {
        let GridColumn::Active(a) = cell.grid_cell().x else {
            assert!(cell.is_handle_column());
            return;
        };
        if cell.is_header_row() {
            assert!(cell.is_header_cell());
            assert!(!cell.is_row_fixed());
            return;
        }
        assert!(cell.is_data_cell());
        assert_eq!(cell.is_column_fixed(), a == 0);
        assert_eq!(cell.is_row_fixed(), cell.data_cell().y == 0);
        assert_eq!(cell.is_cell_selected(), a == 1 && cell.data_cell().y == 2);
        checked += 1;
    });
    assert_eq!(checked, 3 * 4);
}

#[test]
fn hover_marks_the_cell_row_and_column() {
    let mut grid = lettered(3, 4, GridConfig::default());
    grid.pointer_move(press(column_center(2), row_center(1))).unwrap();
    let mut hovered = 0;
    grid.paint(|cell| {
        if cell.is_hovered() {
            hovered += 1;
            assert_eq!(cell.grid_cell().x, GridColumn::Active(2));
            assert_eq!(cell.data_cell().y, 1);
        }
        if cell.is_row_hovered() {
            assert_eq!(cell.grid_cell().y, 2);
        }
        if cell.is_column_hovered() {
            assert_eq!(cell.grid_cell().x, GridColumn::Active(2));
        }
    });
    assert_eq!(hovered, 1);
}
