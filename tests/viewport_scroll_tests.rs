//! Viewport and scrolling tests
//!
//! Scroll limits, fixed regions staying put while the rest scrolls, and
//! pixel lookups against a scrolled layout.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::*;
use test_case::test_case;
use vgrid::{ColumnSource, GridColumn, GridConfig, Subgrid};

fn active_slots(grid: &vgrid::Grid) -> Vec<usize> {
    grid.layout()
        .active_columns()
        .filter_map(|c| c.column.active_index())
        .collect()
}

#[test]
fn column_start_without_row_handle() {
    let config = GridConfig {
        show_row_numbers: false,
        ..GridConfig::default()
    };
    let grid = lettered(4, 3, config);
    let resolver = grid.resolver();
    assert_eq!(resolver.column_start_pixel(GridColumn::Active(0)), Some(0.0));
    assert_eq!(resolver.column_start_pixel(GridColumn::Active(2)), Some(200.0));
    assert_eq!(resolver.column_start_pixel(GridColumn::Active(4)), Some(400.0));
    assert_eq!(resolver.column_start_pixel(GridColumn::Active(5)), None);
    assert_eq!(resolver.column_start_pixel(GridColumn::RowHandle), None);
}

#[test]
fn horizontal_scroll_stops_once_the_last_column_fits() {
    let mut grid = lettered(20, 5, GridConfig::default());
    // 760px of room after the row handle holds seven full columns.
    assert_eq!(grid.model().scroll_limits().max_left, 13);
    grid.scroll_to(99, 0).unwrap();
    assert_eq!(grid.viewport().scroll_left, 13);
    assert_eq!(active_slots(&grid).last(), Some(&19));
}

#[test]
fn vertical_scroll_stops_once_the_last_row_fits() {
    let mut grid = lettered(3, 100, GridConfig::default());
    // (600 - 24) / 20 rows fit below the header.
    assert_eq!(grid.model().scroll_limits().max_top, 72);
    grid.scroll_by(0, 500).unwrap();
    assert_eq!(grid.viewport().scroll_top, 72);
    let last = grid.layout().data_rows().last().unwrap();
    assert_eq!(last.row_index, 99);
}

#[test]
fn scrolling_back_past_the_start_clamps_to_zero() {
    let mut grid = lettered(20, 100, GridConfig::default());
    grid.scroll_to(5, 5).unwrap();
    grid.scroll_by(-9, -9).unwrap();
    assert_eq!(grid.viewport().scroll_left, 0);
    assert_eq!(grid.viewport().scroll_top, 0);
}

#[test]
fn short_content_never_scrolls() {
    let mut grid = lettered(3, 4, GridConfig::default());
    grid.scroll_by(2, 2).unwrap();
    assert_eq!(grid.viewport().scroll_left, 0);
    assert_eq!(grid.viewport().scroll_top, 0);
}

#[test]
fn fixed_columns_stay_while_the_rest_scrolls() {
    let config = GridConfig {
        fixed_column_count: 1,
        ..GridConfig::default()
    };
    let mut grid = lettered(20, 5, config);
    grid.scroll_by(3, 0).unwrap();
    let slots = active_slots(&grid);
    assert_eq!(&slots[..3], &[0, 4, 5]);

    let resolver = grid.resolver();
    assert_eq!(resolver.column_start_pixel(GridColumn::Active(0)), Some(HANDLE));
    assert_eq!(resolver.column_start_pixel(GridColumn::Active(4)), Some(HANDLE + COL));
    // Scrolled out behind the fixed region, including the first one after it.
    assert_eq!(resolver.column_start_pixel(GridColumn::Active(1)), None);
    assert_eq!(resolver.column_start_pixel(GridColumn::Active(2)), None);
    // Past the right edge of the viewport.
    assert_eq!(resolver.column_start_pixel(GridColumn::Active(19)), None);
    assert_eq!(resolver.fixed_boundary_pixel(), HANDLE + COL);
}

#[test]
fn fixed_rows_stay_while_the_rest_scrolls() {
    let config = GridConfig {
        fixed_row_count: 2,
        ..GridConfig::default()
    };
    let mut grid = lettered(3, 100, config);
    grid.scroll_to(0, 10).unwrap();
    let rows: Vec<usize> = grid.layout().data_rows().map(|r| r.row_index).take(3).collect();
    assert_eq!(rows, vec![0, 1, 12]);
    assert_eq!(grid.resolver().fixed_row_boundary_pixel(), HEADER + 2.0 * ROW);
    let header = &grid.layout().rows[0];
    assert_eq!(header.subgrid, Subgrid::Header);
}

#[test]
fn growing_the_viewport_clamps_scroll() {
    let mut grid = lettered(20, 100, GridConfig::default());
    grid.scroll_to(13, 72).unwrap();
    grid.set_viewport_size(2500.0, 3000.0).unwrap();
    assert_eq!(grid.viewport().scroll_left, 0);
    assert_eq!(grid.viewport().scroll_top, 0);
    assert_eq!(active_slots(&grid).len(), 20);
    assert_eq!(grid.layout().data_rows().count(), 100);
}

#[test]
fn rendered_columns_stop_at_the_viewport_edge() {
    let mut grid = lettered(20, 5, GridConfig::default());
    grid.set_viewport_size(350.0, 200.0).unwrap();
    // D starts at 340, inside the 350px edge, so it is the last one laid out.
    assert_eq!(active_slots(&grid), vec![0, 1, 2, 3]);
    assert_eq!(grid.layout().final_column_boundary(), HANDLE + 4.0 * COL);
}

#[test]
fn hit_tests_follow_the_scroll() {
    let mut grid = lettered(20, 100, GridConfig::default());
    grid.scroll_to(2, 30).unwrap();
    let hit = grid
        .resolver()
        .cell_at_point(vgrid::Point::new(column_center(0), row_center(0)))
        .unwrap();
    assert_eq!(hit.column.column, GridColumn::Active(2));
    assert_eq!(hit.row.row_index, 30);
    assert_eq!(hit.offset.x, COL / 2.0);
}

#[test]
fn nearest_boundary_snaps_to_the_rendered_run() {
    let grid = lettered(4, 3, GridConfig::default());
    let resolver = grid.resolver();
    assert_eq!(resolver.nearest_column_boundary(5.0), Some(0));
    assert_eq!(resolver.nearest_column_boundary(HANDLE + 30.0), Some(0));
    assert_eq!(resolver.nearest_column_boundary(HANDLE + 70.0), Some(1));
    // Exact middle goes right.
    assert_eq!(resolver.nearest_column_boundary(HANDLE + 50.0), Some(1));
    assert_eq!(resolver.nearest_column_boundary(HANDLE + 390.0), Some(4));
    assert_eq!(resolver.nearest_column_boundary(700.0), Some(3));
}

#[test_case(&[], None, 0 ; "untouched")]
#[test_case(&[(1, 1, 4)], None, 0 ; "one move")]
#[test_case(&[(0, 3, 9), (5, 2, 1)], None, 2 ; "runs moved then scrolled")]
#[test_case(&[(2, 1, 0)], Some(6), 0 ; "move and a hidden column")]
#[test_case(&[(7, 2, 3), (0, 1, 8)], Some(1), 2 ; "moves, hidden column and scroll")]
fn grid_and_data_indexes_round_trip(
    moves: &[(usize, usize, usize)],
    hidden: Option<usize>,
    scroll: usize,
) {
    let mut grid = lettered(10, 5, GridConfig::default());
    for &(from, count, to) in moves {
        assert!(grid.move_columns(from, count, to).unwrap());
    }
    if let Some(data) = hidden {
        grid.hide_columns(ColumnSource::All, &[data]).unwrap();
    }
    grid.scroll_to(scroll, 0).unwrap();
    assert_eq!(grid.viewport().scroll_left, scroll);

    let resolver = grid.resolver();
    let active = grid.registry().active_len();
    assert_eq!(active, if hidden.is_some() { 9 } else { 10 });
    for g in 0..active {
        let data = resolver.data_index_from_grid_index(g).unwrap();
        assert_eq!(resolver.grid_index_from_data_index(data), Some(g));
    }
    for data in 0..10 {
        match resolver.grid_index_from_data_index(data) {
            Some(g) => assert_eq!(resolver.data_index_from_grid_index(g), Some(data)),
            None => assert_eq!(hidden, Some(data)),
        }
    }
    assert_eq!(resolver.data_index_from_grid_index(active), None);

    // Every rendered slot names the schema column the round trip agrees on.
    for g in active_slots(&grid) {
        let data = resolver.data_index_from_grid_index(g).unwrap();
        assert_eq!(letter(data), order(&grid)[g]);
    }
}
