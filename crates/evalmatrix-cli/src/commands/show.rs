//! The `evalmatrix show` command.

use anyhow::Result;

use evalmatrix_core::report::format_score;

use super::{matrix_table, open_session};
use crate::SourceArgs;

pub async fn execute(source: SourceArgs) -> Result<()> {
    let (session, _config) = open_session(&source).await?;
    let matrix = session.matrix();

    println!(
        "Session: {} ({} participants, {} competencies)",
        matrix.session_name().unwrap_or(matrix.session_id()),
        matrix.participants().len(),
        matrix.competencies().len()
    );
    println!("{}", matrix_table(matrix));

    let summary = matrix.summary();
    println!(
        "Admitted: {} | Not admitted: {} | Ungraded: {} | Class average: {}",
        summary.admitted,
        summary.not_admitted,
        summary.ungraded,
        format_score(summary.class_average)
    );
    println!(
        "Graded cells: {}/{} ({:.0}%)",
        summary.graded_cells,
        summary.participant_count * summary.competency_count,
        summary.completion_rate() * 100.0
    );

    Ok(())
}
