use serde::{Deserialize, Serialize};
use std::fmt;

use super::PropertyMap;

/// Identity of a column in full schema space.
///
/// The two synthetic columns always exist and always sort ahead of data
/// columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "index")]
pub enum ColumnKind {
    /// Row number / row handle column.
    RowHandle,
    /// Tree indentation column.
    TreeIndent,
    /// A data column, by schema index.
    Data(usize),
}

impl ColumnKind {
    /// Schema index for data columns.
    pub fn data_index(self) -> Option<usize> {
        match self {
            Self::Data(i) => Some(i),
            Self::RowHandle | Self::TreeIndent => None,
        }
    }

    pub fn is_synthetic(self) -> bool {
        !matches!(self, Self::Data(_))
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowHandle => f.write_str("row-handle"),
            Self::TreeIndent => f.write_str("tree"),
            Self::Data(i) => write!(f, "#{i}"),
        }
    }
}

/// Column position in active (grid) space.
///
/// `Active(i)` is the i-th entry of the active list; the synthetic columns
/// sit before index 0 regardless of scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "index")]
pub enum GridColumn {
    RowHandle,
    TreeIndent,
    Active(usize),
}

impl GridColumn {
    pub fn active_index(self) -> Option<usize> {
        match self {
            Self::Active(i) => Some(i),
            Self::RowHandle | Self::TreeIndent => None,
        }
    }
}

/// One entry of the schema provider's column list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub index: usize,
    pub name: String,
    pub header: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ColumnSchema {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            index,
            header: name.clone(),
            name,
            type_name: None,
        }
    }
}

/// A data field or one of the synthetic columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub kind: ColumnKind,
    pub name: String,
    pub header: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    width: f32,
    /// Lower clamp for `width`
    pub minimum_width: f32,
    /// Upper clamp for `width` (unbounded when `None`)
    pub maximum_width: Option<f32>,
    /// Width locked against interactive resizing
    pub fixed: bool,
    /// Style/behaviour overrides layered over the grid defaults
    pub properties: PropertyMap,
}

impl Column {
    pub fn new(kind: ColumnKind, name: impl Into<String>, width: f32) -> Self {
        let name = name.into();
        Self {
            kind,
            header: name.clone(),
            name,
            type_name: None,
            width,
            minimum_width: 5.0,
            maximum_width: None,
            fixed: false,
            properties: PropertyMap::new(),
        }
    }

    pub fn from_schema(schema: &ColumnSchema, width: f32) -> Self {
        let mut column = Self::new(ColumnKind::Data(schema.index), schema.name.clone(), width);
        column.header.clone_from(&schema.header);
        column.type_name.clone_from(&schema.type_name);
        column
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Set the width, clamped to `[minimum_width, maximum_width]`.
    /// Returns the width actually stored.
    pub fn set_width(&mut self, width: f32) -> f32 {
        let max = self.maximum_width.unwrap_or(f32::INFINITY).max(self.minimum_width);
        self.width = width.clamp(self.minimum_width, max);
        self.width
    }

    pub fn schema_index(&self) -> Option<usize> {
        self.kind.data_index()
    }

    /// Shallow-merge `props` into this column's own properties.
    pub fn add_properties(&mut self, props: &PropertyMap) {
        for (key, value) in props {
            self.properties.insert(key.clone(), value.clone());
        }
    }
}
