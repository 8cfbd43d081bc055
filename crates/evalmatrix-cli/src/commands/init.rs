//! The `evalmatrix init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("evalmatrix.toml").exists() {
        println!("evalmatrix.toml already exists, skipping.");
    } else {
        std::fs::write("evalmatrix.toml", SAMPLE_CONFIG)?;
        println!("Created evalmatrix.toml");
    }

    std::fs::create_dir_all("matrices")?;
    let example_path = std::path::Path::new("matrices/example.json");
    if example_path.exists() {
        println!("matrices/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_MATRIX)?;
        println!("Created matrices/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit evalmatrix.toml with your API address");
    println!("  2. Run: evalmatrix show --input matrices/example.json");
    println!("  3. Run: evalmatrix grade --input matrices/example.json --set M002:C2=11");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# evalmatrix configuration

base_url = "http://${API_HOST}:3000/api"
timeout_secs = 30
output_dir = "./evalmatrix-results"
"#;

const EXAMPLE_MATRIX: &str = r#"{
  "session_id": "S-EXAMPLE",
  "session_name": "Habilitation électrique",
  "participants": [
    { "id": "M001", "name": "Alice Martin" },
    { "id": "M002", "name": "Bruno Petit" },
    { "id": "M003", "name": "Chloé Durand" }
  ],
  "competencies": [
    { "id": "C1", "label": "Consignation" },
    { "id": "C2", "label": "Premiers secours" }
  ],
  "scores": [
    { "participant_id": "M001", "competency_id": "C1", "score": 12.0 },
    { "participant_id": "M001", "competency_id": "C2", "score": 8.0 },
    { "participant_id": "M002", "competency_id": "C1", "score": 9.5 }
  ]
}
"#;
