use serde::{Deserialize, Serialize};

/// Type of selection for row/column headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionType {
    /// Standard cell selection (default)
    #[default]
    CellRange,
    /// Entire row(s) selected
    RowRange,
    /// Entire column(s) selected
    ColumnRange,
}

/// One selected rectangle.
///
/// Columns are active indexes, rows are data row indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selection_type: SelectionType,
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl Selection {
    /// Create a new cell range selection
    pub fn cell_range(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            selection_type: SelectionType::CellRange,
            start_row,
            start_col,
            end_row,
            end_col,
        }
    }

    /// Create a row range selection
    pub fn row_range(start_row: usize, end_row: usize) -> Self {
        Self {
            selection_type: SelectionType::RowRange,
            start_row,
            start_col: 0,
            end_row,
            end_col: usize::MAX,
        }
    }

    /// Create a column range selection
    pub fn column_range(start_col: usize, end_col: usize) -> Self {
        Self {
            selection_type: SelectionType::ColumnRange,
            start_row: 0,
            start_col,
            end_row: usize::MAX,
            end_col,
        }
    }

    /// Get normalized bounds (min_row, min_col, max_row, max_col)
    pub fn bounds(&self) -> (usize, usize, usize, usize) {
        (
            self.start_row.min(self.end_row),
            self.start_col.min(self.end_col),
            self.start_row.max(self.end_row),
            self.start_col.max(self.end_col),
        )
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        let (r0, c0, r1, c1) = self.bounds();
        (r0..=r1).contains(&row) && (c0..=c1).contains(&col)
    }
}

/// All current selections of a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionModel {
    ranges: Vec<Selection>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self) -> &[Selection] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Add a range; with `keep == false` the new range replaces everything.
    pub fn push(&mut self, selection: Selection, keep: bool) {
        if !keep {
            self.ranges.clear();
        }
        self.ranges.push(selection);
    }

    /// Replace the most recent range of the same type (drag/shift extension).
    pub fn extend_last(&mut self, selection: Selection) {
        let same = self
            .ranges
            .iter()
            .rposition(|r| r.selection_type == selection.selection_type);
        match same.and_then(|i| self.ranges.get_mut(i)) {
            Some(slot) => *slot = selection,
            None => self.ranges.push(selection),
        }
    }

    pub fn last_of(&self, kind: SelectionType) -> Option<&Selection> {
        self.ranges.iter().rev().find(|r| r.selection_type == kind)
    }

    pub fn select_column_range(&mut self, start: usize, end: usize) {
        self.ranges
            .retain(|r| r.selection_type != SelectionType::ColumnRange);
        self.ranges.push(Selection::column_range(start, end));
    }

    /// Remove column `col` from any column range that contains it, splitting as needed.
    pub fn deselect_column(&mut self, col: usize) {
        let mut next = Vec::with_capacity(self.ranges.len() + 1);
        for range in self.ranges.drain(..) {
            if range.selection_type != SelectionType::ColumnRange {
                next.push(range);
                continue;
            }
            let (_, c0, _, c1) = range.bounds();
            if !(c0..=c1).contains(&col) {
                next.push(range);
                continue;
            }
            if col > c0 {
                next.push(Selection::column_range(c0, col - 1));
            }
            if col < c1 {
                next.push(Selection::column_range(col + 1, c1));
            }
        }
        self.ranges = next;
    }

    /// Remove row `row` from any row range that contains it, splitting as needed.
    pub fn deselect_row(&mut self, row: usize) {
        let mut next = Vec::with_capacity(self.ranges.len() + 1);
        for range in self.ranges.drain(..) {
            if range.selection_type != SelectionType::RowRange {
                next.push(range);
                continue;
            }
            let (r0, _, r1, _) = range.bounds();
            if !(r0..=r1).contains(&row) {
                next.push(range);
                continue;
            }
            if row > r0 {
                next.push(Selection::row_range(r0, row - 1));
            }
            if row < r1 {
                next.push(Selection::row_range(row + 1, r1));
            }
        }
        self.ranges = next;
    }

    /// Sorted, de-duplicated active indexes of all selected columns.
    pub fn selected_columns(&self) -> Vec<usize> {
        let mut cols: Vec<usize> = self
            .ranges
            .iter()
            .filter(|r| r.selection_type == SelectionType::ColumnRange)
            .flat_map(|r| {
                let (_, c0, _, c1) = r.bounds();
                c0..=c1
            })
            .collect();
        cols.sort_unstable();
        cols.dedup();
        cols
    }

    /// Sorted, de-duplicated data indexes of all selected rows.
    pub fn selected_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .ranges
            .iter()
            .filter(|r| r.selection_type == SelectionType::RowRange)
            .flat_map(|r| {
                let (r0, _, r1, _) = r.bounds();
                r0..=r1
            })
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    pub fn is_column_selected(&self, col: usize) -> bool {
        self.ranges.iter().any(|r| {
            let (_, c0, _, c1) = r.bounds();
            r.selection_type == SelectionType::ColumnRange && (c0..=c1).contains(&col)
        })
    }

    pub fn is_row_selected(&self, row: usize) -> bool {
        self.ranges.iter().any(|r| {
            let (r0, _, r1, _) = r.bounds();
            r.selection_type == SelectionType::RowRange && (r0..=r1).contains(&row)
        })
    }

    pub fn is_cell_selected(&self, row: usize, col: usize) -> bool {
        self.ranges
            .iter()
            .any(|r| r.selection_type == SelectionType::CellRange && r.contains(row, col))
    }

    /// Follow a reorder of the active columns. `positions[i]` is the new index
    /// of the column that sat at `i`.
    ///
    /// Column ranges are rebuilt as contiguous runs of the moved columns. A
    /// cell range whose columns are no longer adjacent is dropped.
    pub fn remap_columns(&mut self, positions: &[usize]) {
        let map = |c: usize| positions.get(c).copied();
        let mut columns = Vec::new();
        let mut next = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            let (r0, c0, r1, c1) = range.bounds();
            match range.selection_type {
                SelectionType::RowRange => next.push(range),
                SelectionType::ColumnRange => columns.extend((c0..=c1).filter_map(map)),
                SelectionType::CellRange => {
                    let mut mapped: Vec<usize> = (c0..=c1).filter_map(map).collect();
                    mapped.sort_unstable();
                    if let (Some(&first), Some(&last)) = (mapped.first(), mapped.last()) {
                        if is_contiguous(&mapped) {
                            next.push(Selection::cell_range(r0, first, r1, last));
                        }
                    }
                }
            }
        }
        columns.sort_unstable();
        columns.dedup();
        for run in columns.chunk_by(|a, b| *b == *a + 1) {
            if let (Some(&first), Some(&last)) = (run.first(), run.last()) {
                next.push(Selection::column_range(first, last));
            }
        }
        self.ranges = next;
    }
}

/// True when `sorted` has no gaps. Empty and single-element slices are contiguous.
pub fn is_contiguous(sorted: &[usize]) -> bool {
    sorted.windows(2).all(|w| match w {
        [a, b] => *b == *a + 1,
        _ => true,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_normalized() {
        let sel = Selection::cell_range(5, 4, 1, 2);
        assert_eq!(sel.bounds(), (1, 2, 5, 4));
        assert!(sel.contains(3, 3));
        assert!(!sel.contains(0, 3));
    }

    #[test]
    fn remap_follows_a_column_move() {
        // Five columns, run 1..=2 moved to the end: [0, 3, 4, 1, 2].
        let positions = [0, 3, 4, 1, 2];
        let mut model = SelectionModel::new();
        model.push(Selection::column_range(1, 2), false);
        model.push(Selection::row_range(4, 6), true);
        model.remap_columns(&positions);
        assert_eq!(model.selected_columns(), vec![3, 4]);
        assert_eq!(model.selected_rows(), vec![4, 5, 6]);

        // Columns split apart by the move become two runs.
        let mut split = SelectionModel::new();
        split.push(Selection::column_range(0, 1), false);
        split.remap_columns(&positions);
        assert_eq!(split.selected_columns(), vec![0, 3]);
        assert_eq!(split.ranges().len(), 2);

        // A rectangle that is torn apart cannot survive.
        let mut cells = SelectionModel::new();
        cells.push(Selection::cell_range(0, 2, 1, 3), false);
        cells.remap_columns(&positions);
        assert!(cells.is_empty());
        cells.push(Selection::cell_range(0, 1, 1, 2), false);
        cells.remap_columns(&positions);
        assert!(cells.is_cell_selected(1, 4));
        assert!(!cells.is_cell_selected(1, 1));
    }

    #[test]
    fn selected_columns_merges_ranges() {
        let mut model = SelectionModel::new();
        model.push(Selection::column_range(3, 1), false);
        model.push(Selection::column_range(2, 5), true);
        assert_eq!(model.selected_columns(), vec![1, 2, 3, 4, 5]);
        assert!(is_contiguous(&model.selected_columns()));
    }

    #[test]
    fn deselect_column_splits_range() {
        let mut model = SelectionModel::new();
        model.select_column_range(1, 4);
        model.deselect_column(2);
        assert_eq!(model.selected_columns(), vec![1, 3, 4]);
        assert!(!is_contiguous(&model.selected_columns()));
    }

    #[test]
    fn extend_last_replaces_same_kind_only() {
        let mut model = SelectionModel::new();
        model.push(Selection::row_range(0, 0), false);
        model.push(Selection::cell_range(1, 1, 1, 1), true);
        model.extend_last(Selection::row_range(0, 3));
        assert_eq!(model.selected_rows(), vec![0, 1, 2, 3]);
        assert!(model.is_cell_selected(1, 1));
    }
}
