//! # Dataset Reconciliation
//!
//! Splits the rows of a cleaned dataset into the ones kept for training and
//! the ones dropped, the way the inspector's processed/discarded tabs show them:
//!
//! 1. Columns are classified on the cleaned dataset.
//! 2. A row with a missing value in any categorical column is discarded.
//! 3. Every other row is accepted after its missing numeric cells are filled
//!    with the mean of the row's own numeric values, rounded to two decimals.
//!
//! The original dataset never influences the decision; it travels alongside
//! the result for side-by-side display only.
use crate::dataset::{classify, ColumnTypes, Dataset};
use crate::error::InspectorError;
use log::{debug, info};
use serde::{Deserialize, Serialize};

mod impute;

use impute::{impute_row, RowImputation};

/// Column layout of the discarded partition.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscardedView {
    /// Same headers as the cleaned dataset
    #[default]
    Full,
    /// Identifier column (when configured) followed by the categorical columns
    Projected,
}

impl DiscardedView {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscardedView::Full => "full",
            DiscardedView::Projected => "projected",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "projected" | "narrow" => Some(Self::Projected),
            _ => None,
        }
    }
}

/// Knobs for [`Reconciler`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Column holding row identifiers. It is excluded from the row mean and never
    /// imputed. `None` treats every numeric column as a feature.
    pub identifier_column: Option<String>,
    pub discarded_view: DiscardedView,
}

/// Counts describing one reconciliation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub accepted_rows: usize,
    pub discarded_rows: usize,
    /// Numeric cells filled with a row mean
    pub imputed_cells: usize,
    /// Numeric cells left missing because their row had nothing to average
    pub unfilled_cells: usize,
}

/// Accepted and discarded partitions of a cleaned dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub accepted: Dataset,
    pub discarded: Dataset,
    /// Types inferred from the cleaned dataset
    pub column_types: ColumnTypes,
    pub summary: ReconciliationSummary,
}

impl ReconciliationResult {
    /// Every cleaned row lands in exactly one partition.
    pub fn total_rows(&self) -> usize {
        self.accepted.len() + self.discarded.len()
    }
}

/// What the raw/processed/discarded inspector tabs render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inspection {
    /// Untouched original dataset
    pub original: Dataset,
    pub result: ReconciliationResult,
}

/// Partitions cleaned datasets according to [`ReconcileOptions`].
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Reconciles `cleaned` and pairs the result with `original` for display.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::IncompatibleSchema`] when `cleaned` has no headers.
    pub fn reconcile(&self, original: Dataset, cleaned: &Dataset) -> Result<Inspection, InspectorError> {
        let result = self.partition(cleaned)?;
        Ok(Inspection { original, result })
    }

    /// Splits `cleaned` into accepted (imputed) and discarded rows.
    ///
    /// An empty dataset yields two empty partitions.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::IncompatibleSchema`] when `cleaned` has no headers.
    pub fn partition(&self, cleaned: &Dataset) -> Result<ReconciliationResult, InspectorError> {
        if cleaned.headers.is_empty() {
            return Err(InspectorError::IncompatibleSchema {
                reason: "cleaned dataset has no headers".to_string(),
            });
        }

        let column_types = classify(cleaned);
        let identifier = self.identifier(cleaned);

        let categorical: Vec<&str> = cleaned
            .headers
            .iter()
            .filter(|column| column_types[column.as_str()].is_categorical())
            .map(String::as_str)
            .collect();
        let features: Vec<&str> = cleaned
            .headers
            .iter()
            .filter(|column| column_types[column.as_str()].is_numeric())
            .filter(|column| Some(column.as_str()) != identifier)
            .map(String::as_str)
            .collect();
        debug!(
            "Reconciling {} rows: categorical {:?}, numeric features {:?}",
            cleaned.len(),
            categorical,
            features
        );

        let (discarded_rows, candidates): (Vec<_>, Vec<_>) = cleaned
            .rows
            .iter()
            .cloned()
            .partition(|row| categorical.iter().any(|column| row.is_missing(column)));

        let mut totals = RowImputation::default();
        let accepted_rows: Vec<_> = candidates
            .into_iter()
            .map(|mut row| {
                let outcome = impute_row(&mut row, &features);
                totals.imputed += outcome.imputed;
                totals.unfilled += outcome.unfilled;
                row
            })
            .collect();

        let summary = ReconciliationSummary {
            accepted_rows: accepted_rows.len(),
            discarded_rows: discarded_rows.len(),
            imputed_cells: totals.imputed,
            unfilled_cells: totals.unfilled,
        };
        info!(
            "Reconciled {} rows: {} accepted, {} discarded, {} cells imputed, {} left empty",
            cleaned.len(),
            summary.accepted_rows,
            summary.discarded_rows,
            summary.imputed_cells,
            summary.unfilled_cells
        );

        let accepted = Dataset::new(cleaned.headers.clone(), accepted_rows);
        let discarded = Dataset::new(cleaned.headers.clone(), discarded_rows);
        let discarded = match self.options.discarded_view {
            DiscardedView::Full => discarded,
            DiscardedView::Projected => {
                let mut columns: Vec<String> = identifier.map(str::to_owned).into_iter().collect();
                columns.extend(
                    categorical
                        .iter()
                        .filter(|column| Some(**column) != identifier)
                        .map(|column| column.to_string()),
                );
                discarded.project(columns)
            }
        };

        Ok(ReconciliationResult { accepted, discarded, column_types, summary })
    }

    /// The configured identifier column, if the dataset has it.
    fn identifier<'a>(&'a self, dataset: &Dataset) -> Option<&'a str> {
        let identifier = self.options.identifier_column.as_deref()?;
        if dataset.headers.iter().any(|column| column == identifier) {
            Some(identifier)
        } else {
            debug!("Identifier column '{}' is not a header, ignoring it", identifier);
            None
        }
    }
}

/// Reconciles with default options: every numeric column is a feature and
/// discarded rows keep all columns.
///
/// # Errors
///
/// Returns [`InspectorError::IncompatibleSchema`] when `cleaned` has no headers.
pub fn reconcile(original: Dataset, cleaned: &Dataset) -> Result<Inspection, InspectorError> {
    Reconciler::default().reconcile(original, cleaned)
}
