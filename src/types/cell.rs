use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ColumnKind, GridColumn};

/// Style/behaviour property bag (column properties, cell overrides, row metadata).
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;

/// Raw cell value as held by a data source
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Parse untyped text the way a loader would: numbers, booleans, then text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Self::Number(n);
            }
        }
        match trimmed {
            "true" | "TRUE" | "True" => Self::Bool(true),
            "false" | "FALSE" | "False" => Self::Bool(false),
            _ => Self::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Merge extent of a cell; `1 x 1` means no merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub colspan: usize,
    pub rowspan: usize,
}

impl Span {
    pub const SINGLE: Span = Span {
        colspan: 1,
        rowspan: 1,
    };

    pub fn new(colspan: usize, rowspan: usize) -> Self {
        Self {
            colspan: colspan.max(1),
            rowspan: rowspan.max(1),
        }
    }

    pub fn is_merge(self) -> bool {
        self.colspan > 1 || self.rowspan > 1
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// Row section a rendered row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subgrid {
    /// Column header rows
    Header,
    /// Filter row under the headers
    Filter,
    /// Data rows
    #[default]
    Data,
}

/// Coordinate in active-column + on-screen-row space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: GridColumn,
    pub y: usize,
}

/// Coordinate in schema + raw-row space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataCell {
    pub x: ColumnKind,
    pub y: usize,
    pub subgrid: Subgrid,
}

/// Point in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Rectangle in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}
