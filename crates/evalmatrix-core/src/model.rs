//! Core data model types for evalmatrix.
//!
//! These are the types exchanged with the evaluation backend: the roster,
//! the competency list, sparse scores, and the records sent on save.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A participant of a training session, identified by matricule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Matricule (personnel identifier).
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A gradeable skill of the training program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competency {
    /// Competency identifier.
    pub id: String,
    /// Display label.
    pub label: String,
}

impl Competency {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// An existing score as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub participant_id: String,
    pub competency_id: String,
    pub score: f64,
}

/// Everything the fetch boundary returns for one session's matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    /// Session code.
    pub session_id: String,
    /// Human-readable session name, if known.
    #[serde(default)]
    pub session_name: Option<String>,
    /// Roster, in display order.
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Competencies, in display order.
    #[serde(default)]
    pub competencies: Vec<Competency>,
    /// Sparse set of existing scores.
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
}

impl MatrixSnapshot {
    /// An empty snapshot for a session.
    pub fn empty(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            session_name: None,
            participants: Vec::new(),
            competencies: Vec::new(),
            scores: Vec::new(),
        }
    }

    /// Load a snapshot from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read matrix from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse matrix JSON: {}", path.display()))
    }

    /// Save the snapshot as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize matrix")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write matrix to {}", path.display()))?;
        Ok(())
    }
}

/// One score submitted on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub session_id: String,
    pub participant_id: String,
    pub competency_id: String,
    pub score: f64,
}

/// Certification outcome for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    Admitted,
    NotAdmitted,
    /// No score recorded yet.
    NoData,
}

impl AdmissionStatus {
    /// Derive the status from a participant average.
    pub fn from_average(average: Option<f64>) -> Self {
        match average {
            None => AdmissionStatus::NoData,
            Some(_) if crate::statistics::is_admitted(average) => AdmissionStatus::Admitted,
            Some(_) => AdmissionStatus::NotAdmitted,
        }
    }

    pub fn is_admitted(self) -> bool {
        self == AdmissionStatus::Admitted
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionStatus::Admitted => write!(f, "Admis"),
            AdmissionStatus::NotAdmitted => write!(f, "Non admis"),
            AdmissionStatus::NoData => write!(f, "—"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_status_from_average() {
        assert_eq!(
            AdmissionStatus::from_average(Some(10.0)),
            AdmissionStatus::Admitted
        );
        assert_eq!(
            AdmissionStatus::from_average(Some(9.99)),
            AdmissionStatus::NotAdmitted
        );
        assert_eq!(AdmissionStatus::from_average(None), AdmissionStatus::NoData);
        assert_eq!(
            AdmissionStatus::from_average(Some(0.0)),
            AdmissionStatus::NotAdmitted
        );
    }

    #[test]
    fn admission_status_display() {
        assert_eq!(AdmissionStatus::Admitted.to_string(), "Admis");
        assert_eq!(AdmissionStatus::NotAdmitted.to_string(), "Non admis");
        assert_eq!(AdmissionStatus::NoData.to_string(), "—");
    }

    #[test]
    fn snapshot_defaults_missing_lists() {
        let snapshot: MatrixSnapshot = serde_json::from_str(r#"{"session_id": "S1"}"#).unwrap();
        assert_eq!(snapshot.session_id, "S1");
        assert!(snapshot.participants.is_empty());
        assert!(snapshot.scores.is_empty());
        assert!(snapshot.session_name.is_none());
    }

    #[test]
    fn snapshot_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("matrix.json");
        let mut snapshot = MatrixSnapshot::empty("S1");
        snapshot.participants.push(Participant::new("M001", "Alice"));
        snapshot.save_json(&path).unwrap();

        let loaded = MatrixSnapshot::load_json(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }
}
