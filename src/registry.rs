//! Column registry: the full schema-ordered column table plus the active
//! (visible) column order.
//!
//! The active list stores [`ColumnKind`] handles into the column table, so a
//! column reached through either list is the same object. Every mutation of
//! the active list builds the new order off to the side and assigns it in one
//! step; readers never observe a half-spliced list.

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::events::GridEvent;
use crate::types::{Column, ColumnKind, ColumnSchema, GridColumn, PropertyMap};

/// Which list `show_columns`/`hide_columns` indexes refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// Indexes are active indexes.
    Active,
    /// Indexes are schema indexes.
    All,
}

/// Where `show_columns` puts the requested columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Insert before this active index (clamped to the end).
    Before(usize),
    /// Append.
    End,
    /// Remove the columns and do not reinsert them.
    RemoveOnly,
}

/// Persisted shape of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnState {
    pub kind: ColumnKind,
    pub width: f32,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: PropertyMap,
}

/// Plain structured dump of registry contents plus the fixed counts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridState {
    /// Active order, as schema indexes
    pub column_order: Vec<usize>,
    pub columns: Vec<ColumnState>,
    pub fixed_column_count: usize,
    pub fixed_row_count: usize,
}

/// Owns every column and the active order.
#[derive(Debug, Clone)]
pub struct ColumnRegistry {
    columns: Vec<Column>,
    row_handle: Column,
    tree: Column,
    active: Vec<ColumnKind>,
    events: Vec<GridEvent>,
}

impl Default for ColumnRegistry {
    fn default() -> Self {
        Self::new(&GridConfig::default())
    }
}

impl ColumnRegistry {
    /// An empty registry holding only the synthetic columns.
    pub fn new(config: &GridConfig) -> Self {
        Self {
            columns: Vec::new(),
            row_handle: row_handle_column(config),
            tree: tree_column(config),
            active: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_schema(schema: &[ColumnSchema], config: &GridConfig) -> Self {
        let mut registry = Self::new(config);
        registry.reset(schema, config);
        registry.events.clear();
        registry
    }

    /// Rebuild every column from `schema`. The active list becomes the full
    /// schema order. Synthetic columns are recreated but keep their previous
    /// width and properties, so per-session edits survive a reload.
    pub fn reset(&mut self, schema: &[ColumnSchema], config: &GridConfig) {
        let before = self.active.clone();

        let mut row_handle = row_handle_column(config);
        row_handle.properties = std::mem::take(&mut self.row_handle.properties);
        row_handle.set_width(self.row_handle.width());
        let mut tree = tree_column(config);
        tree.properties = std::mem::take(&mut self.tree.properties);
        tree.set_width(self.tree.width());

        let mut sorted: Vec<&ColumnSchema> = schema.iter().collect();
        sorted.sort_by_key(|s| s.index);
        sorted.dedup_by_key(|s| s.index);
        let columns: Vec<Column> = sorted
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let mut col = Column::from_schema(s, config.default_column_width);
                col.kind = ColumnKind::Data(i);
                col.minimum_width = config.minimum_column_width;
                col.maximum_width = config.maximum_column_width;
                col.set_width(config.default_column_width);
                col
            })
            .collect();

        self.active = columns.iter().map(|c| c.kind).collect();
        self.columns = columns;
        self.row_handle = row_handle;
        self.tree = tree;

        tracing::debug!(
            target: "vgrid::registry",
            columns = self.columns.len(),
            "registry reset"
        );
        self.push_active_change(before);
    }

    /// Column by schema identity. O(1).
    pub fn column(&self, kind: ColumnKind) -> Option<&Column> {
        match kind {
            ColumnKind::RowHandle => Some(&self.row_handle),
            ColumnKind::TreeIndent => Some(&self.tree),
            ColumnKind::Data(i) => self.columns.get(i),
        }
    }

    pub fn column_mut(&mut self, kind: ColumnKind) -> Option<&mut Column> {
        match kind {
            ColumnKind::RowHandle => Some(&mut self.row_handle),
            ColumnKind::TreeIndent => Some(&mut self.tree),
            ColumnKind::Data(i) => self.columns.get_mut(i),
        }
    }

    /// Column at a grid position. The synthetic positions always resolve.
    pub fn active_column(&self, index: GridColumn) -> Option<&Column> {
        match index {
            GridColumn::RowHandle => Some(&self.row_handle),
            GridColumn::TreeIndent => Some(&self.tree),
            GridColumn::Active(i) => self.active.get(i).and_then(|k| self.column(*k)),
        }
    }

    /// Lookup for callers that hold the index as text. `-2` and `-1` name the
    /// row-handle and tree columns.
    pub fn active_column_str(&self, index: &str) -> Option<&Column> {
        match index.trim() {
            "-2" => self.active_column(GridColumn::RowHandle),
            "-1" => self.active_column(GridColumn::TreeIndent),
            other => other
                .parse::<usize>()
                .ok()
                .and_then(|i| self.active_column(GridColumn::Active(i))),
        }
    }

    /// Active index of a column, by linear scan.
    pub fn active_index_of(&self, kind: ColumnKind) -> Option<usize> {
        self.active.iter().position(|k| *k == kind)
    }

    /// Active-list kinds in visible order.
    pub fn active(&self) -> &[ColumnKind] {
        &self.active
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Data columns in schema order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn active_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.active.iter().filter_map(|k| self.column(*k))
    }

    /// Width of the active column at `index`.
    pub fn active_width(&self, index: GridColumn) -> Option<f32> {
        self.active_column(index).map(Column::width)
    }

    /// Data columns not in the active list, in schema order.
    pub fn hidden_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| !self.active.contains(&c.kind))
            .collect()
    }

    /// Show columns picked from `source` at `placement`.
    ///
    /// Unknown indexes are dropped before anything is spliced. Unless
    /// `allow_duplicates` is set, requested columns that are already active
    /// are removed first, shifting the insertion point left for each one
    /// removed before it.
    pub fn show_columns(
        &mut self,
        source: ColumnSource,
        indexes: &[usize],
        placement: Placement,
        allow_duplicates: bool,
    ) {
        let picked: Vec<ColumnKind> = indexes
            .iter()
            .filter_map(|&i| match source {
                ColumnSource::Active => self.active.get(i).copied(),
                ColumnSource::All => self.columns.get(i).map(|c| c.kind),
            })
            .collect();

        let mut next = self.active.clone();
        let mut insert_at = match placement {
            Placement::Before(i) => Some(i),
            Placement::End | Placement::RemoveOnly => None,
        };

        if !allow_duplicates {
            for kind in &picked {
                while let Some(i) = next.iter().position(|k| k == kind) {
                    next.remove(i);
                    if let Some(at) = insert_at.as_mut() {
                        if *at > i {
                            *at -= 1;
                        }
                    }
                }
            }
        }

        match placement {
            Placement::RemoveOnly => {}
            Placement::End => next.extend(picked.iter().copied()),
            Placement::Before(_) => {
                let at = insert_at.unwrap_or(next.len()).min(next.len());
                next.splice(at..at, picked.iter().copied());
            }
        }

        tracing::debug!(
            target: "vgrid::registry",
            ?source,
            ?placement,
            count = picked.len(),
            "show columns"
        );
        self.commit_active(next);
    }

    /// Remove columns from the active list.
    pub fn hide_columns(&mut self, source: ColumnSource, indexes: &[usize]) {
        self.show_columns(source, indexes, Placement::RemoveOnly, false);
    }

    /// Move the run of `count` active columns starting at `from` so that it
    /// lands before the column currently at `to`.
    ///
    /// When `to` is past the run the target shifts left by the run length.
    /// A `to` inside the run, or a move that leaves the order unchanged, is a
    /// no-op. Returns whether the order changed.
    pub fn move_columns(&mut self, from: usize, count: usize, to: usize) -> bool {
        let Some(next) = reordered(&self.active, from, count, to) else {
            return false;
        };
        if next == self.active {
            return false;
        }
        tracing::debug!(target: "vgrid::registry", from, count, to, "move columns");
        let before = std::mem::replace(&mut self.active, next);
        self.events.push(GridEvent::ColumnsReordered {
            before,
            after: self.active.clone(),
        });
        true
    }

    /// Swap two active slots. Returns whether anything changed.
    pub fn swap_columns(&mut self, a: usize, b: usize) -> bool {
        if a == b || a >= self.active.len() || b >= self.active.len() {
            return false;
        }
        let mut next = self.active.clone();
        next.swap(a, b);
        let before = std::mem::replace(&mut self.active, next);
        tracing::debug!(target: "vgrid::registry", a, b, "swap columns");
        self.events.push(GridEvent::ColumnsReordered {
            before,
            after: self.active.clone(),
        });
        true
    }

    /// Replace a column's properties.
    ///
    /// # Errors
    /// Returns [`GridError::ColumnNotFound`] if `kind` does not exist.
    pub fn set_column_properties(&mut self, kind: ColumnKind, props: PropertyMap) -> Result<()> {
        let column = self
            .column_mut(kind)
            .ok_or(GridError::ColumnNotFound(kind))?;
        column.properties = props;
        Ok(())
    }

    /// Merge into a column's properties.
    ///
    /// # Errors
    /// Returns [`GridError::ColumnNotFound`] if `kind` does not exist.
    pub fn add_column_properties(&mut self, kind: ColumnKind, props: &PropertyMap) -> Result<()> {
        let column = self
            .column_mut(kind)
            .ok_or(GridError::ColumnNotFound(kind))?;
        column.add_properties(props);
        Ok(())
    }

    /// Set a clamped width. Returns the stored width, or `None` for an
    /// unknown column.
    pub fn set_column_width(&mut self, kind: ColumnKind, width: f32) -> Option<f32> {
        self.column_mut(kind).map(|c| c.set_width(width))
    }

    /// Active order as schema indexes.
    pub fn column_order(&self) -> Vec<usize> {
        self.active.iter().filter_map(|k| k.data_index()).collect()
    }

    /// Replace the active order. Unknown and repeated indexes are dropped.
    pub fn set_column_order(&mut self, order: &[usize]) {
        let mut next: Vec<ColumnKind> = Vec::with_capacity(order.len());
        for &i in order {
            let kind = ColumnKind::Data(i);
            if i < self.columns.len() && !next.contains(&kind) {
                next.push(kind);
            }
        }
        self.commit_active(next);
    }

    /// Structured dump of widths, properties and order.
    pub fn snapshot(&self, config: &GridConfig) -> GridState {
        let columns = [&self.row_handle, &self.tree]
            .into_iter()
            .chain(self.columns.iter())
            .map(|c| ColumnState {
                kind: c.kind,
                width: c.width(),
                properties: c.properties.clone(),
            })
            .collect();
        GridState {
            column_order: self.column_order(),
            columns,
            fixed_column_count: config.fixed_column_count,
            fixed_row_count: config.fixed_row_count,
        }
    }

    /// Apply a snapshot. Entries naming columns that no longer exist are skipped.
    pub fn restore(&mut self, state: &GridState, config: &mut GridConfig) {
        for entry in &state.columns {
            if let Some(column) = self.column_mut(entry.kind) {
                column.set_width(entry.width);
                column.properties.clone_from(&entry.properties);
            }
        }
        self.set_column_order(&state.column_order);
        config.fixed_column_count = state.fixed_column_count.min(self.active.len());
        config.fixed_row_count = state.fixed_row_count;
    }

    /// Drain pending change notifications.
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    fn commit_active(&mut self, next: Vec<ColumnKind>) {
        let before = std::mem::replace(&mut self.active, next);
        self.push_active_change(before);
    }

    fn push_active_change(&mut self, before: Vec<ColumnKind>) {
        if before != self.active {
            self.events.push(GridEvent::ActiveColumnsChanged {
                before,
                after: self.active.clone(),
            });
        }
    }
}

fn row_handle_column(config: &GridConfig) -> Column {
    let mut col = Column::new(ColumnKind::RowHandle, "", config.row_handle_width);
    col.minimum_width = config.minimum_column_width;
    col.fixed = true;
    col
}

fn tree_column(config: &GridConfig) -> Column {
    let mut col = Column::new(ColumnKind::TreeIndent, "Tree", config.tree_column_width);
    col.minimum_width = config.minimum_column_width;
    col
}

/// Apply the `move_columns` target rule to `items`. `None` when the run or
/// target is out of range.
fn reordered<T: Clone>(items: &[T], from: usize, count: usize, to: usize) -> Option<Vec<T>> {
    let len = items.len();
    let end = from.checked_add(count)?;
    if count == 0 || end > len || to > len {
        return None;
    }
    let target = if to >= end {
        to - count
    } else if to > from {
        from
    } else {
        to
    };
    let mut next = items.to_vec();
    let run: Vec<T> = next.drain(from..end).collect();
    let at = target.min(next.len());
    next.splice(at..at, run);
    Some(next)
}

/// Where each of `len` active slots ends up after `move_columns(from, count, to)`.
/// Entry `i` is the new index of the column that sat at `i`.
pub fn moved_positions(len: usize, from: usize, count: usize, to: usize) -> Option<Vec<usize>> {
    let order = reordered(&(0..len).collect::<Vec<_>>(), from, count, to)?;
    let mut positions = vec![0; len];
    for (new, old) in order.into_iter().enumerate() {
        if let Some(slot) = positions.get_mut(old) {
            *slot = new;
        }
    }
    Some(positions)
}
