//! # Dataset Model
//!
//! Rows, datasets and pagination metadata exchanged with the dataset store,
//! plus the column type classifier that runs over them.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod cell;
pub mod column;
pub mod pagination;

pub use cell::CellValue;
pub use column::{classify, ColumnError, ColumnType, ColumnTypes};
pub use pagination::Pagination;

static MISSING: CellValue = CellValue::Null;

/// One record keyed by column name.
///
/// Key order carries no meaning; the owning [`Dataset::headers`] decide column
/// order. A key absent from the map reads as null.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `column`, null when the row has no such key.
    pub fn get(&self, column: &str) -> &CellValue {
        self.0.get(column).unwrap_or(&MISSING)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(column.into(), value.into());
    }

    /// Returns true if `column` is null, empty or absent.
    pub fn is_missing(&self, column: &str) -> bool {
        self.get(column).is_missing()
    }

    /// Iterates over the stored values, in no particular column order.
    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.0.values()
    }

    /// Keeps only `columns`, in their given order.
    pub fn project(&self, columns: &[String]) -> Row {
        columns
            .iter()
            .map(|column| (column.to_owned(), self.get(column).clone()))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Row(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }
}

/// Header list plus row sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Column identity and display order
    pub headers: Vec<String>,
    /// Records in store order
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// A dataset with `headers` and no rows.
    pub fn empty(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Zero rows is a valid, displayable state rather than an error.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Narrows the dataset to `columns`, in the given order.
    pub fn project(&self, columns: Vec<String>) -> Dataset {
        let rows = self.rows.iter().map(|row| row.project(&columns)).collect();
        Dataset { headers: columns, rows }
    }

    /// Cells of one row in header order, for table rendering.
    pub fn cells<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.headers.iter().map(move |column| row.get(column))
    }
}
