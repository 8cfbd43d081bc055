pub mod attendance;
pub mod export;
pub mod grade;
pub mod init;
pub mod show;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table};

use evalmatrix_client::config::{create_client, load_config_from, ClientConfig};
use evalmatrix_client::MemoryBackend;
use evalmatrix_core::model::AdmissionStatus;
use evalmatrix_core::report::format_score;
use evalmatrix_core::traits::EvaluationBackend;
use evalmatrix_core::{EvaluationMatrix, GradingSession};

use crate::SourceArgs;

/// Load the grading session described by the source arguments.
pub async fn open_session(source: &SourceArgs) -> Result<(GradingSession, ClientConfig)> {
    let config = load_config_from(source.config.as_deref())?;

    let (backend, session_id) = match (&source.session, &source.input) {
        (_, Some(path)) => {
            let memory = MemoryBackend::open(path)?;
            let session_id = memory.snapshot().session_id;
            (Arc::new(memory) as Arc<dyn EvaluationBackend>, session_id)
        }
        (Some(session), None) => (
            Arc::new(create_client(&config)?) as Arc<dyn EvaluationBackend>,
            session.clone(),
        ),
        (None, None) => anyhow::bail!("either --session or --input is required"),
    };

    tracing::debug!(backend = backend.name(), session = %session_id, "opening grading session");
    let mut session = GradingSession::load(backend, &session_id)
        .await
        .with_context(|| format!("failed to load evaluation matrix for session {session_id}"))?;
    if let Some(name) = &source.name {
        session.matrix_mut().set_session_name(name.clone());
    }
    Ok((session, config))
}

/// Output directory for exports.
pub fn output_dir(explicit: Option<PathBuf>, config: &ClientConfig) -> PathBuf {
    explicit.unwrap_or_else(|| config.output_dir.clone())
}

/// Render the matrix as a console table.
pub fn matrix_table(matrix: &EvaluationMatrix) -> Table {
    let mut table = Table::new();
    let mut header = vec![Cell::new("Matricule"), Cell::new("Participant")];
    header.extend(matrix.competencies().iter().map(|c| Cell::new(&c.label)));
    header.push(Cell::new("Moyenne"));
    header.push(Cell::new("Statut"));
    table.set_header(header);

    for row in matrix.rows() {
        let color = match row.status {
            AdmissionStatus::Admitted => Color::Green,
            AdmissionStatus::NotAdmitted => Color::Red,
            AdmissionStatus::NoData => Color::Reset,
        };
        let mut cells = vec![
            Cell::new(&row.participant.id),
            Cell::new(&row.participant.name),
        ];
        cells.extend(row.scores.iter().map(|s| match s {
            Some(v) => Cell::new(format!("{v}")),
            None => Cell::new("-"),
        }));
        cells.push(Cell::new(format_score(row.average)).fg(color));
        cells.push(Cell::new(row.status.to_string()).fg(color));
        table.add_row(cells);
    }
    table
}
