//! Change notifications and their delivery.

use serde::Serialize;

use crate::types::{ColumnKind, DataCell, GridCell, Point};

/// Named change events emitted by the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum GridEvent {
    #[serde(rename_all = "camelCase")]
    ColumnResized {
        column: ColumnKind,
        before: f32,
        after: f32,
    },
    #[serde(rename_all = "camelCase")]
    ColumnsReordered {
        before: Vec<ColumnKind>,
        after: Vec<ColumnKind>,
    },
    FixedColumnCountChanged { before: usize, after: usize },
    FixedRowCountChanged { before: usize, after: usize },
    ActiveColumnsChanged {
        before: Vec<ColumnKind>,
        after: Vec<ColumnKind>,
    },
    SelectionChanged,
    #[serde(rename_all = "camelCase")]
    ContextMenuRequested {
        point: Point,
        grid_cell: GridCell,
        data_cell: DataCell,
    },
}

impl GridEvent {
    /// Event name as seen by hosts.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ColumnResized { .. } => "column-resized",
            Self::ColumnsReordered { .. } => "columns-reordered",
            Self::FixedColumnCountChanged { .. } => "fixed-column-count-changed",
            Self::FixedRowCountChanged { .. } => "fixed-row-count-changed",
            Self::ActiveColumnsChanged { .. } => "active-columns-changed",
            Self::SelectionChanged => "selection-changed",
            Self::ContextMenuRequested { .. } => "context-menu-requested",
        }
    }
}

/// Handle returned by [`Notifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GridEvent)>;

/// Callback list.
#[derive(Default)]
pub struct Notifier {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, f: impl FnMut(&GridEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(f)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &GridEvent) {
        tracing::debug!(target: "vgrid::events", event = event.name(), "emit");
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn emit_all(&mut self, events: impl IntoIterator<Item = GridEvent>) {
        for event in events {
            self.emit(&event);
        }
    }
}
