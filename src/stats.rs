//! Whole-dataset null statistics.
use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Row count and per-column missing-value counts for a dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub total_rows: u64,
    /// Missing (null or empty) cells per column, for every header
    pub null_counts: BTreeMap<String, u64>,
}

impl DatasetStatistics {
    /// Counts missing cells per header of a fully materialized dataset.
    pub fn compute(dataset: &Dataset) -> Self {
        let null_counts = dataset
            .headers
            .iter()
            .map(|column| {
                let nulls = dataset.rows.iter().filter(|row| row.is_missing(column)).count();
                (column.to_owned(), nulls as u64)
            })
            .collect();
        Self { total_rows: dataset.len() as u64, null_counts }
    }

    pub fn total_nulls(&self) -> u64 {
        self.null_counts.values().sum()
    }

    /// Columns with at least one missing cell, in name order.
    pub fn columns_with_nulls(&self) -> impl Iterator<Item = (&str, u64)> {
        self.null_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(column, count)| (column.as_str(), *count))
    }
}
