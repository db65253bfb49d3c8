//! Session context shared with the host pipeline.
//!
//! The host tells the inspector which dataset is active and which cleaned
//! dataset belongs to it. Nothing here is global: the host owns a
//! [`SessionContext`] and passes it to the operations that need it.
use crate::error::InspectorError;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use regex::Regex;
use std::sync::OnceLock;

/// Steps of the host pipeline, in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStep {
    Load,
    Clean,
    Train,
    Evaluate,
}

impl PipelineStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::Load => "load",
            PipelineStep::Clean => "clean",
            PipelineStep::Train => "train",
            PipelineStep::Evaluate => "evaluate",
        }
    }
}

fn upload_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{8}_\d{6})_(.+)$").expect("Hardcode regex pattern"))
}

/// A dataset identifier as assigned by the store on upload.
///
/// Uploaded files are stored as `YYYYmmdd_HHMMSS_<file name>`; identifiers
/// that do not follow the layout are kept as-is without a timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveDataset {
    id: String,
    uploaded_at: Option<NaiveDateTime>,
    file_name: String,
}

impl ActiveDataset {
    pub fn parse(id: impl Into<String>) -> Self {
        let id = id.into();
        let parsed = upload_prefix().captures(&id).and_then(|captures| {
            let stamp = NaiveDateTime::parse_from_str(&captures[1], "%Y%m%d_%H%M%S").ok()?;
            Some((stamp, captures[2].to_string()))
        });
        match parsed {
            Some((stamp, file_name)) => Self { uploaded_at: Some(stamp), file_name, id },
            None => Self { uploaded_at: None, file_name: id.clone(), id },
        }
    }

    /// Identifier used with the store.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn uploaded_at(&self) -> Option<NaiveDateTime> {
        self.uploaded_at
    }

    /// File name without the upload prefix.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    active: Option<ActiveDataset>,
    cleaned: Option<ActiveDataset>,
    step: Option<PipelineStep>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session on `dataset`, dropping whatever was active before.
    pub fn activate(&mut self, dataset: impl Into<String>) -> &ActiveDataset {
        let dataset = ActiveDataset::parse(dataset);
        info!("Session started on '{}'", dataset.id());
        self.cleaned = None;
        self.step = Some(PipelineStep::Load);
        self.active.insert(dataset)
    }

    /// Records the cleaned counterpart of the active dataset.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::NoActiveDataset`] when no session is running.
    pub fn record_cleaned(&mut self, dataset: impl Into<String>) -> Result<(), InspectorError> {
        if self.active.is_none() {
            return Err(InspectorError::NoActiveDataset);
        }
        let dataset = ActiveDataset::parse(dataset);
        debug!("Cleaned dataset recorded as '{}'", dataset.id());
        self.cleaned = Some(dataset);
        self.advance(PipelineStep::Clean);
        Ok(())
    }

    /// Moves the session to `step`. Steps never move backwards; returns
    /// whether the step changed.
    pub fn advance(&mut self, step: PipelineStep) -> bool {
        match self.step {
            Some(current) if current < step => {
                debug!("Pipeline step {} -> {}", current.as_str(), step.as_str());
                self.step = Some(step);
                true
            }
            Some(current) => {
                if current > step {
                    warn!("Ignoring pipeline step {} after {}", step.as_str(), current.as_str());
                }
                false
            }
            None => false,
        }
    }

    /// Ends the session.
    pub fn end(&mut self) {
        if let Some(active) = self.active.take() {
            info!("Session on '{}' ended", active.id());
        }
        self.cleaned = None;
        self.step = None;
    }

    pub fn active(&self) -> Option<&ActiveDataset> {
        self.active.as_ref()
    }

    pub fn cleaned(&self) -> Option<&ActiveDataset> {
        self.cleaned.as_ref()
    }

    pub fn step(&self) -> Option<PipelineStep> {
        self.step
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Identifiers of the original and cleaned datasets to reconcile.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::NoActiveDataset`] unless both are known.
    pub fn reconcile_pair(&self) -> Result<(&str, &str), InspectorError> {
        match (&self.active, &self.cleaned) {
            (Some(original), Some(cleaned)) => Ok((original.id(), cleaned.id())),
            _ => Err(InspectorError::NoActiveDataset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_upload_prefix() {
        let dataset = ActiveDataset::parse("20240131_235959_sales 2024.csv");
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31).and_then(|date| date.and_hms_opt(23, 59, 59));

        assert_eq!(dataset.uploaded_at(), expected);
        assert_eq!(dataset.file_name(), "sales 2024.csv");
        assert_eq!(dataset.id(), "20240131_235959_sales 2024.csv");
    }

    #[test]
    fn plain_identifier_has_no_timestamp() {
        for id in ["sales.csv", "20241301_000000_bad_month.csv", "2024_01_01_x.csv"] {
            let dataset = ActiveDataset::parse(id);
            assert_eq!(dataset.uploaded_at(), None, "{}", id);
            assert_eq!(dataset.file_name(), id);
        }
    }

    #[test]
    fn lifecycle() {
        let mut session = SessionContext::new();
        assert!(matches!(session.reconcile_pair(), Err(InspectorError::NoActiveDataset)));
        assert!(matches!(session.record_cleaned("x"), Err(InspectorError::NoActiveDataset)));

        session.activate("20240101_120000_sales.csv");
        assert_eq!(session.step(), Some(PipelineStep::Load));
        assert!(matches!(session.reconcile_pair(), Err(InspectorError::NoActiveDataset)));

        session.record_cleaned("20240101_120500_sales_clean.csv").unwrap();
        assert_eq!(session.step(), Some(PipelineStep::Clean));
        assert_eq!(
            session.reconcile_pair().unwrap(),
            ("20240101_120000_sales.csv", "20240101_120500_sales_clean.csv")
        );

        session.end();
        assert!(!session.is_active());
        assert_eq!(session.step(), None);
        assert!(session.cleaned().is_none());
    }

    #[test]
    fn steps_only_move_forward() {
        let mut session = SessionContext::new();
        assert!(!session.advance(PipelineStep::Train));

        session.activate("a.csv");
        assert!(session.advance(PipelineStep::Train));
        assert!(!session.advance(PipelineStep::Clean));
        assert!(!session.advance(PipelineStep::Train));
        assert_eq!(session.step(), Some(PipelineStep::Train));
        assert!(session.advance(PipelineStep::Evaluate));
    }

    #[test]
    fn activate_replaces_previous_session() {
        let mut session = SessionContext::new();
        session.activate("a.csv");
        session.record_cleaned("a_clean.csv").unwrap();

        session.activate("b.csv");
        assert_eq!(session.active().map(ActiveDataset::id), Some("b.csv"));
        assert!(session.cleaned().is_none());
        assert_eq!(session.step(), Some(PipelineStep::Load));
    }
}
