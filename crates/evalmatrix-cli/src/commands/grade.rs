//! The `evalmatrix grade` command.

use anyhow::Result;

use super::{matrix_table, open_session};
use crate::SourceArgs;

/// A parsed `MATRICULE:COMPETENCY=VALUE` edit.
#[derive(Debug, PartialEq)]
struct ScoreEdit {
    participant_id: String,
    competency_id: String,
    raw: String,
}

fn parse_edit(edit: &str) -> Result<ScoreEdit> {
    let (key, raw) = edit
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid edit '{edit}': expected MATRICULE:COMPETENCY=VALUE"))?;
    let (participant_id, competency_id) = key
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("invalid edit '{edit}': expected MATRICULE:COMPETENCY=VALUE"))?;
    anyhow::ensure!(
        !participant_id.trim().is_empty() && !competency_id.trim().is_empty(),
        "invalid edit '{edit}': matricule and competency must not be empty"
    );
    Ok(ScoreEdit {
        participant_id: participant_id.trim().to_string(),
        competency_id: competency_id.trim().to_string(),
        raw: raw.to_string(),
    })
}

pub async fn execute(source: SourceArgs, edits: Vec<String>, dry_run: bool) -> Result<()> {
    let edits = edits
        .iter()
        .map(|e| parse_edit(e))
        .collect::<Result<Vec<_>>>()?;

    let (mut session, _config) = open_session(&source).await?;

    let mut rejected = 0usize;
    for edit in &edits {
        if let Err(e) =
            session
                .matrix_mut()
                .set_score(&edit.participant_id, &edit.competency_id, &edit.raw)
        {
            eprintln!(
                "  Rejected {}:{}: {e}",
                edit.participant_id, edit.competency_id
            );
            rejected += 1;
        }
    }
    if rejected > 0 {
        eprintln!("{rejected} edit(s) rejected, the rest of the matrix is unchanged.");
    }

    if dry_run {
        let batch = session.matrix().to_save_batch();
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    if !session.matrix().is_dirty() {
        println!("No changes to save.");
        return Ok(());
    }

    match session.save().await {
        Ok(outcome) => {
            println!(
                "Saved {} evaluation(s) in {}ms.",
                outcome.saved, outcome.duration_ms
            );
            println!("{}", matrix_table(session.matrix()));
            Ok(())
        }
        Err(e) => anyhow::bail!("{} ({e})", e.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_edit() {
        assert_eq!(
            parse_edit("M001:C1=12,5").unwrap(),
            ScoreEdit {
                participant_id: "M001".into(),
                competency_id: "C1".into(),
                raw: "12,5".into(),
            }
        );
    }

    #[test]
    fn parse_clearing_edit() {
        let edit = parse_edit("M001:7=").unwrap();
        assert_eq!(edit.competency_id, "7");
        assert_eq!(edit.raw, "");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(parse_edit("M001=12").is_err());
        assert!(parse_edit("M001:C1").is_err());
        assert!(parse_edit(":C1=12").is_err());
    }
}
