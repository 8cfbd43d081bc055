//! HTML result sheet generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use evalmatrix_core::model::AdmissionStatus;
use evalmatrix_core::report::{format_score, ResultSheet};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn status_class(status: AdmissionStatus) -> &'static str {
    match status {
        AdmissionStatus::Admitted => "success",
        AdmissionStatus::NotAdmitted => "error",
        AdmissionStatus::NoData => "none",
    }
}

/// Generate the HTML results document for a session.
pub fn generate_html(sheet: &ResultSheet) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>Résultats de la session - {}</title>\n",
        html_escape(sheet.title())
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str(&format!(
        "<h1>Résultats de la session - {}</h1>\n",
        html_escape(sheet.title())
    ));
    html.push_str(&format!(
        "<p class=\"meta\">Participants : {} | Compétences : {} | Généré le {}</p>\n",
        sheet.summary.participant_count,
        sheet.summary.competency_count,
        sheet.created_at.format("%d/%m/%Y %H:%M UTC")
    ));

    // Results matrix
    html.push_str("<table>\n<thead>\n<tr>\n");
    html.push_str("<th class=\"header\">Participant</th>\n");
    for c in &sheet.competencies {
        html.push_str(&format!(
            "<th class=\"header\">{}</th>\n",
            html_escape(&c.label)
        ));
    }
    html.push_str("<th class=\"header\">Moyenne</th>\n");
    html.push_str("<th class=\"header\">Statut</th>\n");
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in &sheet.rows {
        let class = status_class(row.status);
        html.push_str("<tr>\n");
        html.push_str(&format!(
            "<td class=\"cell\">{}</td>\n",
            html_escape(&row.participant.name)
        ));
        for score in &row.scores {
            let text = match score {
                Some(v) => format!("{v}"),
                None => "-".to_string(),
            };
            html.push_str(&format!("<td class=\"cell\">{text}</td>\n"));
        }
        html.push_str(&format!(
            "<td class=\"cell average {class}\">{}</td>\n",
            format_score(row.average)
        ));
        html.push_str(&format!(
            "<td class=\"cell status {class}\">{}</td>\n",
            row.status
        ));
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");

    // Summary
    let summary = &sheet.summary;
    html.push_str("<section class=\"summary\">\n<h2>Synthèse</h2>\n<ul>\n");
    html.push_str(&format!("<li>Admis : {}</li>\n", summary.admitted));
    html.push_str(&format!("<li>Non admis : {}</li>\n", summary.not_admitted));
    html.push_str(&format!("<li>Non évalués : {}</li>\n", summary.ungraded));
    html.push_str(&format!(
        "<li>Moyenne générale : {}</li>\n",
        format_score(summary.class_average)
    ));
    if let Some(rate) = summary.admission_rate() {
        html.push_str(&format!(
            "<li>Taux d'admission : {:.1}%</li>\n",
            rate * 100.0
        ));
    }
    html.push_str("</ul>\n</section>\n");

    // Raw JSON, for re-import
    html.push_str("<details>\n<summary>Données brutes</summary>\n<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(sheet).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n</details>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the HTML results document to a file.
pub fn write_html_report(sheet: &ResultSheet, path: &Path) -> Result<()> {
    let html = generate_html(sheet);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
body { font-family: 'Helvetica Neue', 'Helvetica', Arial, sans-serif; color: #333; }
h1 { color: #005a9c; }
.meta { color: #6c757d; }
table { width: 100%; border-collapse: collapse; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: center; }
.header { background-color: #f2f2f2; font-size: 10px; }
.cell { font-size: 12px; }
.average, .status { font-weight: bold; }
.success { color: green; }
.error { color: red; }
.none { color: #6c757d; }
pre { overflow-x: auto; padding: 1rem; background: #f2f2f2; }
@media print { details { display: none; } }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use evalmatrix_core::model::{Competency, Participant};
    use evalmatrix_core::EvaluationMatrix;

    fn make_sheet() -> ResultSheet {
        let mut m = EvaluationMatrix::new(
            "S1",
            vec![
                Participant::new("M001", "Alice <Admin>"),
                Participant::new("M002", "Bob"),
                Participant::new("M003", "Chloé"),
            ],
            vec![
                Competency::new("C1", "Consignation"),
                Competency::new("C2", "Premiers secours"),
            ],
        );
        m.set_session_name("Habilitation électrique");
        m.set_score("M001", "C1", "12").unwrap();
        m.set_score("M001", "C2", "8").unwrap();
        m.set_score("M002", "C1", "9.5").unwrap();
        ResultSheet::from_matrix(&m)
    }

    #[test]
    fn html_contains_matrix() {
        let html = generate_html(&make_sheet());

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Habilitation électrique"));
        assert!(html.contains("Premiers secours"));
        assert!(html.contains("10.00"));
        assert!(html.contains("9.50"));
        assert!(html.contains("Admis"));
        assert!(html.contains("Non admis"));
    }

    #[test]
    fn html_escapes_names() {
        let html = generate_html(&make_sheet());
        assert!(html.contains("Alice &lt;Admin&gt;"));
        assert!(!html.contains("Alice <Admin>"));
    }

    #[test]
    fn ungraded_participant_shows_placeholder() {
        let html = generate_html(&make_sheet());
        assert!(html.contains("<td class=\"cell status none\">—</td>"));
        assert!(html.contains("<li>Non évalués : 1</li>"));
    }

    #[test]
    fn raw_json_is_escaped() {
        let mut sheet = make_sheet();
        sheet.session_name = Some("R&D </code> session".into());
        let html = generate_html(&sheet);
        let raw = html.split("<pre><code>").nth(1).unwrap();
        assert!(raw.contains("R&amp;D &lt;/code&gt; session"));
        assert!(!raw.contains("R&D"));
    }

    #[test]
    fn write_to_file() {
        let sheet = make_sheet();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(format!("{}.html", sheet.file_stem()));

        write_html_report(&sheet, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
