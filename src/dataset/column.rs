use crate::dataset::{CellValue, Dataset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors related to column type parsing.
#[derive(Error, Debug)]
pub enum ColumnError {
    #[error("Invalid column type '{0}'")]
    TypeError(String),
}

/// Semantic type of a column, inferred from a sampled value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Values coerce to numbers; nulls may be imputed
    Numeric,
    /// Free text; nulls disqualify the row
    Categorical,
}

/// Column name to inferred type, covering every header of the classified dataset.
pub type ColumnTypes = BTreeMap<String, ColumnType>;

impl ColumnType {
    /// Returns the string representation of the column type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
        }
    }

    /// Parses a column type from a string representation.
    /// Supports various aliases for each type.
    pub fn parse(name: &str) -> Result<Self, ColumnError> {
        match name.to_ascii_uppercase().as_str() {
            "NUMERIC" | "NUMBER" | "INT" | "INTEGER" | "FLOAT" | "DOUBLE" => Ok(Self::Numeric),
            "CATEGORICAL" | "TEXT" | "STRING" | "VARCHAR" => Ok(Self::Categorical),
            _ => Err(ColumnError::TypeError(name.to_string())),
        }
    }

    /// Infers the column type from its sampled value.
    /// A missing sample means the column had no value anywhere and is treated as text.
    pub fn from(sample: Option<&CellValue>) -> Self {
        match sample {
            Some(value) if value.is_numeric() => ColumnType::Numeric,
            _ => ColumnType::Categorical,
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }

    #[inline]
    pub fn is_categorical(&self) -> bool {
        matches!(self, ColumnType::Categorical)
    }
}

/// Classifies every header of `dataset`.
///
/// The sample for a column is the first row, in dataset order, whose value for
/// that column is not missing. Only that one value decides the type; the rest
/// of the column is not consulted.
pub fn classify(dataset: &Dataset) -> ColumnTypes {
    dataset
        .headers
        .iter()
        .map(|column| {
            let sample = dataset
                .rows
                .iter()
                .map(|row| row.get(column))
                .find(|value| !value.is_missing());
            (column.to_owned(), ColumnType::from(sample))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Row;
    use pretty_assertions::assert_eq;

    fn dataset(headers: &[&str], rows: Vec<Row>) -> Dataset {
        Dataset::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    #[test]
    fn parse_aliases() {
        assert_eq!(ColumnType::parse("number").unwrap(), ColumnType::Numeric);
        assert_eq!(ColumnType::parse("Text").unwrap(), ColumnType::Categorical);
        assert!(ColumnType::parse("blob").is_err());
        assert_eq!(ColumnType::Numeric.as_str(), "numeric");
    }

    #[test]
    fn first_non_null_value_decides() {
        let data = dataset(
            &["id", "city", "revenue"],
            vec![
                Row::from_iter([("id", 1.into()), ("city", "A".into()), ("revenue", 100.into())]),
                Row::from_iter([("id", 2.into()), ("city", CellValue::Null), ("revenue", CellValue::Null)]),
                Row::from_iter([("id", 3.into()), ("city", "B".into()), ("revenue", CellValue::Null)]),
            ],
        );

        let types = classify(&data);
        assert_eq!(
            types,
            ColumnTypes::from([
                ("id".to_string(), ColumnType::Numeric),
                ("city".to_string(), ColumnType::Categorical),
                ("revenue".to_string(), ColumnType::Numeric),
            ])
        );
    }

    #[test]
    fn skips_leading_missing_values() {
        let data = dataset(
            &["score"],
            vec![
                Row::from_iter([("score", CellValue::Null)]),
                Row::from_iter([("score", "".into())]),
                Row::from_iter([("score", "17.5".into())]),
                Row::from_iter([("score", "n/a".into())]),
            ],
        );
        assert_eq!(classify(&data)["score"], ColumnType::Numeric);
    }

    #[test]
    fn stray_first_value_wins() {
        let data = dataset(
            &["amount"],
            vec![
                Row::from_iter([("amount", "unknown".into())]),
                Row::from_iter([("amount", 10.into())]),
                Row::from_iter([("amount", 20.into())]),
            ],
        );
        assert_eq!(classify(&data)["amount"], ColumnType::Categorical);
    }

    #[test]
    fn all_null_and_absent_columns_are_categorical() {
        let data = dataset(
            &["empty", "absent"],
            vec![
                Row::from_iter([("empty", CellValue::Null)]),
                Row::from_iter([("empty", "".into())]),
            ],
        );
        let types = classify(&data);
        assert_eq!(types["empty"], ColumnType::Categorical);
        assert_eq!(types["absent"], ColumnType::Categorical);
    }

    #[test]
    fn covers_every_header_without_rows() {
        let data = dataset(&["a", "b"], vec![]);
        let types = classify(&data);
        assert_eq!(types.len(), 2);
        assert!(types.values().all(ColumnType::is_categorical));
    }

    #[test]
    fn deterministic() {
        let data = dataset(
            &["x", "y"],
            vec![Row::from_iter([("x", "1".into()), ("y", "q".into())])],
        );
        assert_eq!(classify(&data), classify(&data.clone()));
    }
}
