//! Grading and attendance session orchestration.
//!
//! Couples an in-memory sheet with the backend it was loaded from: fetch on
//! load, submit the whole batch on save, refetch after a successful save.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;

use crate::attendance::{AttendanceSheet, SessionDate};
use crate::error::BackendError;
use crate::matrix::EvaluationMatrix;
use crate::traits::{AttendanceBackend, EvaluationBackend};

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Number of records submitted.
    pub saved: usize,
    /// Whether the matrix was refetched from the backend afterwards.
    pub reloaded: bool,
    /// Wall-clock duration of the save in milliseconds.
    pub duration_ms: u64,
}

/// One session's evaluation matrix bound to its backend.
pub struct GradingSession {
    backend: Arc<dyn EvaluationBackend>,
    matrix: EvaluationMatrix,
}

impl GradingSession {
    /// Fetch the matrix of `session_id` and build the engine.
    pub async fn load(
        backend: Arc<dyn EvaluationBackend>,
        session_id: &str,
    ) -> Result<Self, BackendError> {
        let snapshot = backend.fetch_matrix(session_id).await?;
        tracing::debug!(
            session = session_id,
            backend = backend.name(),
            participants = snapshot.participants.len(),
            competencies = snapshot.competencies.len(),
            "matrix loaded"
        );
        Ok(Self {
            matrix: EvaluationMatrix::from_snapshot(snapshot),
            backend,
        })
    }

    pub fn matrix(&self) -> &EvaluationMatrix {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut EvaluationMatrix {
        &mut self.matrix
    }

    /// Refetch the matrix, discarding local edits.
    pub async fn reload(&mut self) -> Result<(), BackendError> {
        let session_name = self.matrix.session_name().map(str::to_string);
        let snapshot = self.backend.fetch_matrix(self.matrix.session_id()).await?;
        self.matrix = EvaluationMatrix::from_snapshot(snapshot);
        if self.matrix.session_name().is_none() {
            if let Some(name) = session_name {
                self.matrix.set_session_name(name);
            }
        }
        Ok(())
    }

    /// Submit every present score in one batch.
    ///
    /// On failure the local edits are kept and the backend error is returned
    /// unchanged. On success the matrix is refetched; a failed refetch only
    /// leaves the (already saved) local state in place.
    pub async fn save(&mut self) -> Result<SaveOutcome, BackendError> {
        let start = Instant::now();
        let batch = self.matrix.to_save_batch();

        if let Err(e) = self.backend.save_evaluations(&batch).await {
            tracing::error!(session = self.matrix.session_id(), "save failed: {e}");
            return Err(e);
        }
        self.matrix.mark_clean();
        tracing::info!(
            session = self.matrix.session_id(),
            records = batch.len(),
            "evaluations saved"
        );

        let reloaded = match self.reload().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("refresh after save failed: {e}");
                false
            }
        };

        Ok(SaveOutcome {
            saved: batch.len(),
            reloaded,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// One session day's attendance bound to its backend.
pub struct AttendanceSession {
    backend: Arc<dyn AttendanceBackend>,
    dates: Vec<SessionDate>,
    sheet: AttendanceSheet,
}

impl AttendanceSession {
    /// Load the session's dates and the sheet for `date`, or for the first
    /// session date when `date` is `None`.
    pub async fn load(
        backend: Arc<dyn AttendanceBackend>,
        session_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Self, BackendError> {
        let dates = backend.session_dates(session_id).await?;
        let date = match date.or_else(|| dates.first().map(|d| d.date)) {
            Some(d) => d,
            None => {
                return Err(BackendError::SessionNotFound(format!(
                    "{session_id} has no scheduled dates"
                )))
            }
        };
        let entries = backend.presences_for(session_id, date).await?;
        Ok(Self {
            sheet: AttendanceSheet::from_roster(session_id, date, entries),
            dates,
            backend,
        })
    }

    pub fn dates(&self) -> &[SessionDate] {
        &self.dates
    }

    pub fn sheet(&self) -> &AttendanceSheet {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut AttendanceSheet {
        &mut self.sheet
    }

    /// Submit the whole day's attendance.
    pub async fn save(&mut self) -> Result<usize, BackendError> {
        let batch = self.sheet.to_save_batch();
        self.backend.record_presences(&batch).await?;
        tracing::info!(
            session = self.sheet.session_id(),
            date = %self.sheet.date(),
            records = batch.len(),
            "presences recorded"
        );
        if let Some(d) = self.dates.iter_mut().find(|d| d.date == self.sheet.date()) {
            d.has_presences = true;
        }
        Ok(batch.len())
    }
}
