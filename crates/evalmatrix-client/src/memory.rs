//! In-memory evaluation backend, optionally persisted to a JSON file.
//!
//! Used for offline grading from the CLI and for tests that must not hit the
//! network.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use evalmatrix_core::error::BackendError;
use evalmatrix_core::model::{MatrixSnapshot, SaveRecord, ScoreEntry};
use evalmatrix_core::traits::EvaluationBackend;

/// Backend holding a single session's snapshot.
///
/// A save replaces the session's scores with the submitted batch.
pub struct MemoryBackend {
    snapshot: Mutex<MatrixSnapshot>,
    persist_to: Option<PathBuf>,
    fail_next_save: AtomicBool,
    save_count: AtomicU32,
}

impl MemoryBackend {
    /// Serve a snapshot from memory only.
    pub fn new(snapshot: MatrixSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            persist_to: None,
            fail_next_save: AtomicBool::new(false),
            save_count: AtomicU32::new(0),
        }
    }

    /// Serve the snapshot stored at `path` and write it back on every save.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let snapshot = MatrixSnapshot::load_json(path)?;
        Ok(Self {
            persist_to: Some(path.to_path_buf()),
            ..Self::new(snapshot)
        })
    }

    /// Write saves to `path` instead of the file the snapshot came from.
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_to = Some(path.into());
        self
    }

    /// Make the next save fail with a server error.
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::Relaxed);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }

    /// Current stored snapshot.
    pub fn snapshot(&self) -> MatrixSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MatrixSnapshot> {
        // Every mutation is a single assignment, so a poisoned lock still
        // holds a whole snapshot.
        match self.snapshot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl EvaluationBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_matrix(&self, session_id: &str) -> Result<MatrixSnapshot, BackendError> {
        let snapshot = self.lock();
        if snapshot.session_id != session_id {
            return Err(BackendError::SessionNotFound(session_id.to_string()));
        }
        Ok(snapshot.clone())
    }

    async fn save_evaluations(&self, batch: &[SaveRecord]) -> Result<(), BackendError> {
        if self.fail_next_save.swap(false, Ordering::Relaxed) {
            return Err(BackendError::Server {
                status: 503,
                message: "Service indisponible".into(),
            });
        }

        let mut updated = self.snapshot();
        if let Some(foreign) = batch.iter().find(|r| r.session_id != updated.session_id) {
            return Err(BackendError::SessionNotFound(foreign.session_id.clone()));
        }
        updated.scores = batch
            .iter()
            .map(|r| ScoreEntry {
                participant_id: r.participant_id.clone(),
                competency_id: r.competency_id.clone(),
                score: r.score,
            })
            .collect();

        if let Some(path) = &self.persist_to {
            updated
                .save_json(path)
                .map_err(|e| BackendError::Storage(format!("{e:#}")))?;
        }

        *self.lock() = updated;
        self.save_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(records = batch.len(), "memory backend saved batch");
        Ok(())
    }
}
