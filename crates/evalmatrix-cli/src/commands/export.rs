//! The `evalmatrix export` command.

use std::path::PathBuf;

use anyhow::Result;

use evalmatrix_core::report::ResultSheet;
use evalmatrix_report::write_html_report;

use super::{open_session, output_dir};
use crate::SourceArgs;

pub async fn execute(source: SourceArgs, format: String, output: Option<PathBuf>) -> Result<()> {
    let (session, config) = open_session(&source).await?;
    let sheet = ResultSheet::from_matrix(session.matrix());
    let output = output_dir(output, &config);
    std::fs::create_dir_all(&output)?;

    let formats: Vec<&str> = if format == "all" {
        vec!["html", "json"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    for fmt in &formats {
        match *fmt {
            "html" => {
                let path = output.join(format!("{}.html", sheet.file_stem()));
                write_html_report(&sheet, &path)?;
                println!("HTML results: {}", path.display());
            }
            "json" => {
                let path = output.join(format!("{}.json", sheet.file_stem()));
                sheet.save_json(&path)?;
                println!("JSON results: {}", path.display());
            }
            other => anyhow::bail!("unknown format: {other} (expected html, json, or all)"),
        }
    }

    Ok(())
}
