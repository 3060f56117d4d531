//! Data source contract and an in-memory implementation.
//!
//! The grid never owns row storage; it reads and writes through
//! [`DataSource`] using schema column indexes and raw row indexes.

use std::collections::HashMap;

use crate::types::{CellValue, ColumnSchema, PropertyMap, Span};

/// What the grid needs from the tabular store behind it.
pub trait DataSource {
    /// Number of data rows.
    fn row_count(&self) -> usize;

    /// Value at schema column `x`, row `y`. Out-of-range reads yield `Empty`.
    fn get_value(&self, x: usize, y: usize) -> CellValue;

    /// Store a value. Out-of-range writes are ignored.
    fn set_value(&mut self, x: usize, y: usize, value: CellValue);

    /// Per-row metadata, which also carries per-cell property overrides keyed
    /// by column name.
    fn row_metadata(&self, y: usize) -> Option<&PropertyMap>;

    /// Replace the metadata object of row `y`.
    fn set_row_metadata(&mut self, y: usize, metadata: PropertyMap);

    /// Merge extent anchored at `(x, y)`.
    fn span(&self, _x: usize, _y: usize) -> Span {
        Span::SINGLE
    }

    /// Whether any merge exists at all. Lets callers skip span searches.
    fn has_spans(&self) -> bool {
        true
    }
}

/// Row-major in-memory table
#[derive(Debug, Clone, Default)]
pub struct LocalDataSource {
    rows: Vec<Vec<CellValue>>,
    metadata: HashMap<usize, PropertyMap>,
    spans: HashMap<(usize, usize), Span>,
}

impl LocalDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Build a table from a schema column count and a value generator.
    pub fn generate(
        columns: usize,
        rows: usize,
        mut f: impl FnMut(usize, usize) -> CellValue,
    ) -> Self {
        let rows = (0..rows)
            .map(|y| (0..columns).map(|x| f(x, y)).collect())
            .collect();
        Self::from_rows(rows)
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Register a merge anchored at `(x, y)`. A `1 x 1` span clears it.
    pub fn set_span(&mut self, x: usize, y: usize, span: Span) {
        if span.is_merge() {
            self.spans.insert((x, y), span);
        } else {
            self.spans.remove(&(x, y));
        }
    }
}

impl DataSource for LocalDataSource {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn get_value(&self, x: usize, y: usize) -> CellValue {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .cloned()
            .unwrap_or_default()
    }

    fn set_value(&mut self, x: usize, y: usize, value: CellValue) {
        let Some(row) = self.rows.get_mut(y) else {
            return;
        };
        if x >= row.len() {
            row.resize(x + 1, CellValue::Empty);
        }
        if let Some(slot) = row.get_mut(x) {
            *slot = value;
        }
    }

    fn row_metadata(&self, y: usize) -> Option<&PropertyMap> {
        self.metadata.get(&y)
    }

    fn set_row_metadata(&mut self, y: usize, metadata: PropertyMap) {
        if y < self.rows.len() {
            self.metadata.insert(y, metadata);
        }
    }

    fn span(&self, x: usize, y: usize) -> Span {
        self.spans.get(&(x, y)).copied().unwrap_or_default()
    }

    fn has_spans(&self) -> bool {
        !self.spans.is_empty()
    }
}

/// Build a schema from header names, one column per name.
pub fn schema_from_headers<S: AsRef<str>>(headers: &[S]) -> Vec<ColumnSchema> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| ColumnSchema::new(i, h.as_ref()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_are_empty() {
        let ds = LocalDataSource::generate(2, 2, |x, y| CellValue::Number((x + y * 10) as f64));
        assert_eq!(ds.get_value(1, 1), CellValue::Number(11.0));
        assert_eq!(ds.get_value(5, 0), CellValue::Empty);
        assert_eq!(ds.get_value(0, 9), CellValue::Empty);
    }

    #[test]
    fn set_value_grows_short_rows_only() {
        let mut ds = LocalDataSource::from_rows(vec![vec![]]);
        ds.set_value(2, 0, "x".into());
        assert_eq!(ds.get_value(2, 0), CellValue::Text("x".into()));
        ds.set_value(0, 3, "ignored".into());
        assert_eq!(ds.row_count(), 1);
    }

    #[test]
    fn spans_are_cleared_by_single() {
        let mut ds = LocalDataSource::generate(3, 3, |_, _| CellValue::Empty);
        ds.set_span(0, 0, Span::new(2, 1));
        assert_eq!(ds.span(0, 0).colspan, 2);
        ds.set_span(0, 0, Span::SINGLE);
        assert_eq!(ds.span(0, 0), Span::SINGLE);
    }

    #[test]
    fn metadata_needs_existing_row() {
        let mut ds = LocalDataSource::generate(1, 1, |_, _| CellValue::Empty);
        let mut meta = PropertyMap::new();
        meta.insert("height".into(), 30.into());
        ds.set_row_metadata(0, meta.clone());
        ds.set_row_metadata(4, meta);
        assert!(ds.row_metadata(0).is_some());
        assert!(ds.row_metadata(4).is_none());
    }
}
