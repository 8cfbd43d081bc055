//! Backend trait definitions.
//!
//! The remote training API is reached only through these async traits. They
//! are implemented by `evalmatrix-client` (HTTP and in-memory backends).

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::attendance::{PresenceEntry, PresenceRecord, SessionDate};
use crate::error::BackendError;
use crate::model::{MatrixSnapshot, SaveRecord};

// ---------------------------------------------------------------------------
// Evaluation backend
// ---------------------------------------------------------------------------

/// Source and sink of evaluation matrices.
#[async_trait]
pub trait EvaluationBackend: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Fetch the roster, competencies, and existing scores of a session.
    async fn fetch_matrix(&self, session_id: &str) -> Result<MatrixSnapshot, BackendError>;

    /// Persist a batch of scores. Succeeds or fails as a whole.
    async fn save_evaluations(&self, batch: &[SaveRecord]) -> Result<(), BackendError>;
}

// ---------------------------------------------------------------------------
// Attendance backend
// ---------------------------------------------------------------------------

/// Source and sink of attendance data.
#[async_trait]
pub trait AttendanceBackend: Send + Sync {
    /// Days of a session, with whether attendance was already recorded.
    async fn session_dates(&self, session_id: &str) -> Result<Vec<SessionDate>, BackendError>;

    /// Roster with recorded presences for one day.
    async fn presences_for(
        &self,
        session_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<PresenceEntry>, BackendError>;

    /// Persist a day's presences. Succeeds or fails as a whole.
    async fn record_presences(&self, batch: &[PresenceRecord]) -> Result<(), BackendError>;
}
