//! The `evalmatrix attendance` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Color, Table};

use evalmatrix_client::config::{create_client, load_config_from};
use evalmatrix_core::engine::AttendanceSession;
use evalmatrix_core::schedule::{is_training_day, session_status, training_days};
use evalmatrix_core::traits::AttendanceBackend;

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

fn parse_absent(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

pub async fn execute(
    session_id: String,
    date: Option<String>,
    all_present: bool,
    absent: Option<String>,
    dry_run: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let date = date.as_deref().map(parse_date).transpose()?;
    let config = load_config_from(config_path.as_deref())?;
    let backend: Arc<dyn AttendanceBackend> = Arc::new(create_client(&config)?);

    let mut session = AttendanceSession::load(backend, &session_id, date)
        .await
        .map_err(|e| anyhow::anyhow!("{} ({e})", e.user_message()))
        .with_context(|| format!("failed to load attendance for session {session_id}"))?;

    let taken: Vec<String> = session
        .dates()
        .iter()
        .map(|d| {
            let mark = if d.has_presences { "*" } else { " " };
            format!("{mark}{}", d.date.format("%d/%m/%Y"))
        })
        .collect();
    println!("Session days (* = attendance taken): {}", taken.join(" "));
    if let (Some(first), Some(last)) = (session.dates().first(), session.dates().last()) {
        let today = chrono::Local::now().date_naive();
        println!(
            "Status: {} ({} training days)",
            session_status(first.date, last.date, today),
            training_days(first.date, last.date).len()
        );
    }
    if !is_training_day(session.sheet().date()) {
        eprintln!("  {} falls on a weekend", session.sheet().date());
    }

    if all_present {
        session.sheet_mut().mark_all(true);
    }
    for id in parse_absent(absent.as_deref()) {
        if !session.sheet_mut().set_present(&id, false) {
            eprintln!("  Unknown matricule {id}, skipped");
        }
    }

    let sheet = session.sheet();
    let mut table = Table::new();
    table.set_header(vec!["Matricule", "Participant", "Statut"]);
    for p in sheet.roster() {
        let present = sheet.status(&p.id).is_some_and(|s| s.is_present());
        let (label, color) = if present {
            ("Présent", Color::Green)
        } else {
            ("Absent", Color::Red)
        };
        table.add_row(vec![
            Cell::new(&p.id),
            Cell::new(&p.name),
            Cell::new(label).fg(color),
        ]);
    }
    println!("{}", sheet.date().format("%d/%m/%Y"));
    println!("{table}");
    println!(
        "Present: {} | Absent: {}",
        sheet.present_count(),
        sheet.absent_count()
    );

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&sheet.to_save_batch())?);
        return Ok(());
    }

    match session.save().await {
        Ok(count) => {
            println!("Recorded {count} presence(s).");
            Ok(())
        }
        Err(e) => anyhow::bail!("{} ({e})", e.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_iso_date() {
        assert_eq!(
            parse_date("2024-03-11").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
        assert!(parse_date("11/03/2024").is_err());
    }

    #[test]
    fn parse_absent_list() {
        assert_eq!(parse_absent(Some("M001, M002,,")), vec!["M001", "M002"]);
        assert!(parse_absent(None).is_empty());
    }
}
