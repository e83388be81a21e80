use std::collections::HashMap;
use std::fmt;

use crate::error::EmptyDatasetError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the grid
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what the decoders can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Placeholder shown (and exported) for a missing cell.
pub const MISSING_PLACEHOLDER: &str = "N/A";

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Null and the empty string both count as "no value".
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text for display: the stringified value, or [`MISSING_PLACEHOLDER`].
    pub fn display_or_placeholder(&self) -> String {
        if self.is_missing() {
            MISSING_PLACEHOLDER.to_string()
        } else {
            self.to_string()
        }
    }

    /// Lower-cased string form used by both filtering and sorting.
    pub fn folded(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// One key-value record as produced by mapping-shaped sources, in source key order.
pub type Record = Vec<(String, CellValue)>;

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// A loaded table. Every row stores exactly one cell per column, so a column
/// index is valid for every row. Replaced wholesale on the next load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset from mapping-shaped records.
    ///
    /// Without `known_columns` the column list is the union of record keys in
    /// first-seen order. With it, keys outside the list are dropped.
    pub fn load(
        records: Vec<Record>,
        known_columns: Option<Vec<String>>,
    ) -> Result<Self, EmptyDatasetError> {
        if records.is_empty() {
            return Err(EmptyDatasetError);
        }

        let mut columns = Vec::new();
        let mut column_index = HashMap::new();
        let fixed = known_columns.is_some();
        let seed = known_columns.unwrap_or_default();
        for name in seed {
            push_column(&mut columns, &mut column_index, name);
        }
        if !fixed {
            for rec in &records {
                for (key, _) in rec {
                    if !column_index.contains_key(key) {
                        push_column(&mut columns, &mut column_index, key.clone());
                    }
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|rec| {
                let mut cells = vec![CellValue::Null; columns.len()];
                for (key, value) in rec {
                    if let Some(&idx) = column_index.get(&key) {
                        cells[idx] = value;
                    }
                }
                cells
            })
            .collect();

        Ok(Dataset {
            columns,
            column_index,
            rows,
        })
    }

    /// Build a dataset from an array-of-arrays source whose first row is the
    /// header. A header-only table is a valid dataset with zero rows.
    pub fn from_table(table: Vec<Vec<CellValue>>) -> Result<Self, EmptyDatasetError> {
        let mut iter = table.into_iter();
        let header = iter.next().ok_or(EmptyDatasetError)?;

        let mut columns = Vec::new();
        let mut column_index = HashMap::new();
        // Source position of each kept column; duplicates keep their first position.
        let mut positions = Vec::new();
        for (pos, cell) in header.iter().enumerate() {
            let name = cell.to_string();
            if column_index.contains_key(&name) {
                continue;
            }
            push_column(&mut columns, &mut column_index, name);
            positions.push(pos);
        }

        let rows = iter
            .map(|mut raw| {
                positions
                    .iter()
                    .map(|&pos| {
                        raw.get_mut(pos)
                            .map(|c| std::mem::replace(c, CellValue::Null))
                            .unwrap_or(CellValue::Null)
                    })
                    .collect()
            })
            .collect();

        Ok(Dataset {
            columns,
            column_index,
            rows,
        })
    }

    /// A dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A zero-row dataset that keeps `columns` (duplicates collapse).
    pub fn with_columns(columns: &[String]) -> Self {
        let mut ds = Self::default();
        for name in columns {
            push_column(&mut ds.columns, &mut ds.column_index, name.clone());
        }
        ds
    }

    /// Ordered, distinct column names. Stable for the lifetime of the dataset.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_position(&self, column: &str) -> Option<usize> {
        self.column_index.get(column).copied()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index.contains_key(column)
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Cell lookup by column name. `None` for an unknown row or column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_position(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn push_column(columns: &mut Vec<String>, index: &mut HashMap<String, usize>, name: String) {
    if index.contains_key(&name) {
        return;
    }
    index.insert(name.clone(), columns.len());
    columns.push(name);
}
