//! Result sheet: a frozen, serializable view of a graded matrix.
//!
//! This is what exports (HTML, JSON) are rendered from.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matrix::{EvaluationMatrix, ParticipantRow};
use crate::model::Competency;
use crate::statistics::SessionSummary;

/// Results of a session at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSheet {
    /// Unique sheet identifier.
    pub id: Uuid,
    /// When the sheet was produced.
    pub created_at: DateTime<Utc>,
    pub session_id: String,
    #[serde(default)]
    pub session_name: Option<String>,
    /// Column headers, in display order.
    pub competencies: Vec<Competency>,
    /// One row per participant, in roster order.
    pub rows: Vec<ParticipantRow>,
    pub summary: SessionSummary,
}

impl ResultSheet {
    /// Freeze the current state of a matrix.
    pub fn from_matrix(matrix: &EvaluationMatrix) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            session_id: matrix.session_id().to_string(),
            session_name: matrix.session_name().map(str::to_string),
            competencies: matrix.competencies().to_vec(),
            rows: matrix.rows(),
            summary: matrix.summary(),
        }
    }

    /// Title shown on exports: the session name, or its code.
    pub fn title(&self) -> &str {
        self.session_name.as_deref().unwrap_or(&self.session_id)
    }

    /// File stem for exports, e.g. `Resultats_Habilitation_electrique`.
    pub fn file_stem(&self) -> String {
        let cleaned: String = self
            .title()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("Resultats_{cleaned}")
    }

    /// Save the sheet as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize results")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Load a sheet from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse results JSON")
    }
}

/// Format an optional score or average for display, `—` when absent.
pub fn format_score(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "—".to_string(),
    }
}
