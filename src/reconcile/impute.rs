use crate::dataset::{CellValue, Row};

/// Outcome of imputing a single row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct RowImputation {
    /// Missing numeric cells filled with the row mean
    pub(crate) imputed: usize,
    /// Missing numeric cells left empty because the row had nothing to average
    pub(crate) unfilled: usize,
}

/// Rounds half away from zero to two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean of the row's own values in `features`, skipping cells that
/// are missing or do not coerce to a number.
pub(crate) fn row_mean(row: &Row, features: &[&str]) -> Option<f64> {
    let values: Vec<f64> = features
        .iter()
        .filter_map(|column| row.get(column).as_number())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Fills every missing `features` cell of `row` with the row mean rounded to
/// two decimals. Rows without any numeric value are left untouched.
pub(crate) fn impute_row(row: &mut Row, features: &[&str]) -> RowImputation {
    let missing: Vec<&str> = features
        .iter()
        .copied()
        .filter(|column| row.is_missing(column))
        .collect();
    if missing.is_empty() {
        return RowImputation::default();
    }

    match row_mean(row, features) {
        Some(mean) => {
            let fill = round2(mean);
            for column in &missing {
                row.set(*column, CellValue::Number(fill));
            }
            RowImputation { imputed: missing.len(), unfilled: 0 }
        }
        None => RowImputation { imputed: 0, unfilled: missing.len() },
    }
}
