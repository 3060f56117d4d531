//! Column registry tests
//!
//! Active-list membership, show/hide placement, column moves and state
//! snapshots.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use test_case::test_case;
use vgrid::data::schema_from_headers;
use vgrid::{ColumnKind, ColumnRegistry, ColumnSource, GridConfig, GridEvent, Placement};

fn registry(names: &[&str]) -> ColumnRegistry {
    ColumnRegistry::with_schema(&schema_from_headers(names), &GridConfig::default())
}

fn names(registry: &ColumnRegistry) -> String {
    registry
        .active_columns()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("")
}

// ============================================================================
// Moves
// ============================================================================

#[test_case(1, 1, 3, "ACBD" ; "single column right")]
#[test_case(2, 1, 0, "CABD" ; "single column to front")]
#[test_case(0, 1, 4, "BCDA" ; "single column to end")]
#[test_case(1, 2, 4, "ADBC" ; "run to end")]
#[test_case(2, 2, 0, "CDAB" ; "run to front")]
#[test_case(2, 2, 1, "ACDB" ; "run one left")]
#[test_case(0, 3, 4, "DABC" ; "long run right")]
fn move_lands_before_target(from: usize, count: usize, to: usize, expected: &str) {
    let mut reg = registry(&["A", "B", "C", "D"]);
    assert!(reg.move_columns(from, count, to));
    assert_eq!(names(&reg), expected);
}

#[test_case(1, 1, 1 ; "onto itself")]
#[test_case(1, 1, 2 ; "onto its own right edge")]
#[test_case(1, 2, 2 ; "target inside run")]
#[test_case(1, 2, 3 ; "target at run end")]
#[test_case(0, 0, 3 ; "empty run")]
#[test_case(3, 2, 0 ; "run past end")]
#[test_case(0, 1, 5 ; "target past end")]
fn move_without_effect_is_silent(from: usize, count: usize, to: usize) {
    let mut reg = registry(&["A", "B", "C", "D"]);
    assert!(!reg.move_columns(from, count, to));
    assert_eq!(names(&reg), "ABCD");
    assert!(reg.take_events().is_empty());
}

#[test]
fn scenario_move_single_column_right() {
    let mut reg = registry(&["A", "B", "C", "D"]);
    reg.move_columns(1, 1, 3);
    assert_eq!(names(&reg), "ACBD");
}

#[test]
fn two_column_run_before_last_is_unchanged_and_past_it_moves() {
    let mut reg = registry(&["A", "B", "C", "D"]);
    // Inserting [B,C] before D, where it already sits.
    assert!(!reg.move_columns(1, 2, 3));
    assert_eq!(names(&reg), "ABCD");
    // Inserting after D.
    assert!(reg.move_columns(1, 2, 4));
    assert_eq!(names(&reg), "ADBC");
}

#[test]
fn moves_can_be_undone_by_the_inverse_move() {
    let mut reg = registry(&["A", "B", "C", "D", "E", "F"]);
    for (from, count, to) in [(1, 2, 5), (4, 2, 0), (0, 3, 6), (3, 1, 1)] {
        let before = names(&reg);
        assert!(reg.move_columns(from, count, to));
        let landed = if to > from { to - count } else { to };
        let back = if landed > from { from } else { from + count };
        assert!(reg.move_columns(landed, count, back));
        assert_eq!(names(&reg), before, "undo of ({from}, {count}, {to})");
    }
}

#[test]
fn move_keeps_every_column_exactly_once() {
    let mut reg = registry(&["A", "B", "C", "D", "E"]);
    reg.move_columns(0, 2, 5);
    reg.move_columns(3, 2, 1);
    let mut order = reg.column_order();
    order.sort_unstable();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
}

#[test]
fn move_reports_before_and_after() {
    let mut reg = registry(&["A", "B", "C"]);
    reg.move_columns(0, 1, 3);
    let events = reg.take_events();
    assert_eq!(
        events,
        vec![GridEvent::ColumnsReordered {
            before: vec![ColumnKind::Data(0), ColumnKind::Data(1), ColumnKind::Data(2)],
            after: vec![ColumnKind::Data(1), ColumnKind::Data(2), ColumnKind::Data(0)],
        }]
    );
}

#[test]
fn swap_exchanges_two_slots() {
    let mut reg = registry(&["A", "B", "C"]);
    assert!(reg.swap_columns(0, 2));
    assert_eq!(names(&reg), "CBA");
    assert!(!reg.swap_columns(1, 1));
    assert!(!reg.swap_columns(0, 7));
}

// ============================================================================
// Show / hide
// ============================================================================

#[test]
fn hide_then_show_restores_order() {
    let mut reg = registry(&["A", "B", "C"]);
    reg.hide_columns(ColumnSource::All, &[1]);
    assert_eq!(names(&reg), "AC");
    reg.show_columns(ColumnSource::All, &[1], Placement::Before(1), false);
    assert_eq!(names(&reg), "ABC");
}

#[test]
fn hidden_column_stays_reachable_by_identity() {
    let mut reg = registry(&["A", "B", "C"]);
    reg.set_column_width(ColumnKind::Data(1), 150.0);
    reg.hide_columns(ColumnSource::All, &[1]);
    assert_eq!(reg.active_index_of(ColumnKind::Data(1)), None);
    let hidden = reg.hidden_columns();
    assert_eq!(hidden.len(), 1);
    assert_eq!(hidden[0].name, "B");
    assert_eq!(reg.column(ColumnKind::Data(1)).unwrap().width(), 150.0);
}

#[test]
fn hide_by_active_index_uses_current_order() {
    let mut reg = registry(&["A", "B", "C"]);
    reg.move_columns(2, 1, 0);
    assert_eq!(names(&reg), "CAB");
    reg.hide_columns(ColumnSource::Active, &[0]);
    assert_eq!(names(&reg), "AB");
}

#[test]
fn showing_an_active_column_moves_it() {
    let mut reg = registry(&["A", "B", "C", "D"]);
    reg.show_columns(ColumnSource::All, &[3], Placement::Before(1), false);
    assert_eq!(names(&reg), "ADBC");
}

#[test]
fn removal_before_insert_point_shifts_it_left() {
    let mut reg = registry(&["A", "B", "C", "D"]);
    // A is removed from in front of slot 3, so it lands before D.
    reg.show_columns(ColumnSource::All, &[0], Placement::Before(3), false);
    assert_eq!(names(&reg), "BCAD");
}

#[test]
fn duplicates_only_when_asked() {
    let mut reg = registry(&["A", "B"]);
    reg.show_columns(ColumnSource::All, &[0], Placement::End, true);
    assert_eq!(names(&reg), "ABA");
}

#[test]
fn unknown_indexes_are_ignored() {
    let mut reg = registry(&["A", "B"]);
    reg.show_columns(ColumnSource::All, &[9, 1], Placement::Before(0), false);
    assert_eq!(names(&reg), "BA");
    reg.hide_columns(ColumnSource::Active, &[42]);
    assert_eq!(names(&reg), "BA");
}

#[test]
fn placement_past_end_appends() {
    let mut reg = registry(&["A", "B", "C"]);
    reg.hide_columns(ColumnSource::All, &[0]);
    reg.show_columns(ColumnSource::All, &[0], Placement::Before(99), false);
    assert_eq!(names(&reg), "BCA");
}

#[test]
fn membership_change_is_reported_once() {
    let mut reg = registry(&["A", "B", "C"]);
    reg.hide_columns(ColumnSource::All, &[0, 2]);
    let events = reg.take_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        GridEvent::ActiveColumnsChanged { after, .. } if after == &vec![ColumnKind::Data(1)]
    ));
}

// ============================================================================
// Lookups, widths, properties, snapshots
// ============================================================================

#[test]
fn synthetic_columns_always_exist() {
    let reg = registry(&[]);
    assert!(reg.column(ColumnKind::RowHandle).is_some());
    assert!(reg.column(ColumnKind::TreeIndent).is_some());
    assert_eq!(reg.active_len(), 0);
}

#[test]
fn string_index_reaches_active_and_synthetic_columns() {
    let reg = registry(&["A", "B"]);
    assert_eq!(reg.active_column_str("1").unwrap().name, "B");
    assert_eq!(reg.active_column_str("-2").unwrap().kind, ColumnKind::RowHandle);
    assert_eq!(reg.active_column_str("-1").unwrap().kind, ColumnKind::TreeIndent);
    assert!(reg.active_column_str("5").is_none());
    assert!(reg.active_column_str("abc").is_none());
}

#[test]
fn width_is_clamped_to_column_limits() {
    let config = GridConfig {
        maximum_column_width: Some(120.0),
        ..GridConfig::default()
    };
    let mut reg = ColumnRegistry::with_schema(&schema_from_headers(&["A"]), &config);
    assert_eq!(reg.set_column_width(ColumnKind::Data(0), 137.0), Some(120.0));
    assert_eq!(reg.set_column_width(ColumnKind::Data(0), 1.0), Some(5.0));
    assert_eq!(reg.set_column_width(ColumnKind::Data(4), 50.0), None);
}

#[test]
fn properties_merge_and_replace() {
    let mut reg = registry(&["A"]);
    let mut props = serde_json::Map::new();
    props.insert("halign".into(), "right".into());
    reg.add_column_properties(ColumnKind::Data(0), &props).unwrap();
    let mut more = serde_json::Map::new();
    more.insert("color".into(), "red".into());
    reg.add_column_properties(ColumnKind::Data(0), &more).unwrap();
    let column = reg.column(ColumnKind::Data(0)).unwrap();
    assert_eq!(column.properties.len(), 2);

    reg.set_column_properties(ColumnKind::Data(0), more).unwrap();
    assert_eq!(reg.column(ColumnKind::Data(0)).unwrap().properties.len(), 1);
    assert!(reg
        .set_column_properties(ColumnKind::Data(3), serde_json::Map::new())
        .is_err());
}

#[test]
fn reset_renumbers_schema_densely() {
    let mut schema = schema_from_headers(&["A", "B", "C"]);
    schema[1].index = 10;
    schema[2].index = 20;
    let reg = ColumnRegistry::with_schema(&schema, &GridConfig::default());
    assert_eq!(reg.column_order(), vec![0, 1, 2]);
    assert_eq!(reg.column(ColumnKind::Data(2)).unwrap().name, "C");
}

#[test]
fn snapshot_restores_order_widths_and_fixed_count() {
    let mut config = GridConfig::default();
    let mut reg = registry(&["A", "B", "C"]);
    reg.move_columns(0, 1, 3);
    reg.set_column_width(ColumnKind::Data(2), 64.0);
    config.fixed_column_count = 1;
    let state = reg.snapshot(&config);

    let json = serde_json::to_string(&state).unwrap();
    let parsed = serde_json::from_str(&json).unwrap();

    let mut other = registry(&["A", "B", "C"]);
    let mut other_config = GridConfig::default();
    other.restore(&parsed, &mut other_config);
    assert_eq!(names(&other), "BCA");
    assert_eq!(other.column(ColumnKind::Data(2)).unwrap().width(), 64.0);
    assert_eq!(other_config.fixed_column_count, 1);
}

#[test]
fn restore_skips_columns_that_no_longer_exist() {
    let config = GridConfig::default();
    let mut wide = registry(&["A", "B", "C", "D"]);
    wide.move_columns(3, 1, 0);
    let state = wide.snapshot(&config);

    let mut narrow = registry(&["A", "B"]);
    let mut narrow_config = GridConfig::default();
    narrow.restore(&state, &mut narrow_config);
    assert_eq!(names(&narrow), "AB");
}
