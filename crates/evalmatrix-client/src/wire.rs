//! Request and response shapes of the training API.
//!
//! The API mixes French column names, numeric and string ids, and numbers
//! serialized as strings; everything here is converted into the core model
//! before leaving the crate.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use evalmatrix_core::attendance::{PresenceEntry, PresenceRecord, PresenceStatus, SessionDate};
use evalmatrix_core::model::{Competency, MatrixSnapshot, Participant, SaveRecord, ScoreEntry};

/// Every successful response is wrapped in `{ "data": ... }`.
#[derive(Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Error bodies carry an optional `message`.
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Evaluation matrix
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub(crate) struct WireMatrix {
    #[serde(default)]
    competences: Vec<WireCompetence>,
    #[serde(default)]
    participants: Vec<WireParticipant>,
}

#[derive(Deserialize)]
struct WireCompetence {
    #[serde(rename = "ID_de_competence", deserialize_with = "id_string")]
    id: String,
    #[serde(rename = "Competence_a_Acquerir", default)]
    label: Option<String>,
}

#[derive(Deserialize)]
struct WireParticipant {
    #[serde(deserialize_with = "id_string")]
    matricule: String,
    #[serde(default)]
    nom: Option<String>,
    #[serde(default)]
    evaluations: Vec<WireEvaluation>,
}

#[derive(Deserialize)]
struct WireEvaluation {
    #[serde(rename = "competenceId", deserialize_with = "id_string")]
    competence_id: String,
    #[serde(default, deserialize_with = "lenient_number")]
    score: Option<f64>,
}

impl WireMatrix {
    pub fn into_snapshot(self, session_id: &str) -> MatrixSnapshot {
        let mut scores = Vec::new();
        let participants = self
            .participants
            .into_iter()
            .map(|p| {
                for e in p.evaluations {
                    if let Some(score) = e.score {
                        scores.push(ScoreEntry {
                            participant_id: p.matricule.clone(),
                            competency_id: e.competence_id,
                            score,
                        });
                    }
                }
                Participant {
                    name: p.nom.unwrap_or_else(|| p.matricule.clone()),
                    id: p.matricule,
                }
            })
            .collect();

        MatrixSnapshot {
            session_id: session_id.to_string(),
            session_name: None,
            participants,
            competencies: self
                .competences
                .into_iter()
                .map(|c| Competency {
                    label: c.label.unwrap_or_else(|| c.id.clone()),
                    id: c.id,
                })
                .collect(),
            scores,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct SaveEvaluationsBody<'a> {
    evaluations: Vec<WireSaveRecord<'a>>,
}

#[derive(Serialize)]
struct WireSaveRecord<'a> {
    #[serde(rename = "code_de_Session")]
    session: Value,
    #[serde(rename = "Matricule")]
    matricule: &'a str,
    #[serde(rename = "ID_de_competence")]
    competence: Value,
    #[serde(rename = "Score")]
    score: f64,
}

impl<'a> SaveEvaluationsBody<'a> {
    pub fn new(batch: &'a [SaveRecord]) -> Self {
        Self {
            evaluations: batch
                .iter()
                .map(|r| WireSaveRecord {
                    session: id_value(&r.session_id),
                    matricule: &r.participant_id,
                    competence: id_value(&r.competency_id),
                    score: r.score,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub(crate) struct WireDates {
    #[serde(default)]
    pub dates: Vec<WireDate>,
}

#[derive(Deserialize)]
pub(crate) struct WireDate {
    #[serde(deserialize_with = "lenient_date")]
    date: NaiveDate,
    #[serde(rename = "hasPresences", default)]
    has_presences: bool,
}

impl From<WireDate> for SessionDate {
    fn from(d: WireDate) -> Self {
        SessionDate {
            date: d.date,
            has_presences: d.has_presences,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct WirePresence {
    #[serde(rename = "Matricule", deserialize_with = "id_string")]
    matricule: String,
    #[serde(default)]
    nom: Option<String>,
    #[serde(default)]
    prenom: Option<String>,
    #[serde(default)]
    statut: Option<String>,
}

impl From<WirePresence> for PresenceEntry {
    fn from(p: WirePresence) -> Self {
        let status = p.statut.as_deref().and_then(|s| match s.parse::<PresenceStatus>() {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!(participant = %p.matricule, "{e}, treated as not recorded");
                None
            }
        });
        let name = match (p.prenom, p.nom) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (None, Some(last)) => last,
            (Some(first), None) => first,
            (None, None) => p.matricule.clone(),
        };
        PresenceEntry {
            participant: Participant {
                id: p.matricule,
                name,
            },
            status,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct RecordPresencesBody<'a> {
    presences: Vec<WirePresenceRecord<'a>>,
}

#[derive(Serialize)]
struct WirePresenceRecord<'a> {
    #[serde(rename = "Code_de_Session")]
    session: Value,
    #[serde(rename = "Matricule")]
    matricule: &'a str,
    #[serde(rename = "Date")]
    date: String,
    statut: String,
}

impl<'a> RecordPresencesBody<'a> {
    pub fn new(batch: &'a [PresenceRecord]) -> Self {
        Self {
            presences: batch
                .iter()
                .map(|r| WirePresenceRecord {
                    session: id_value(&r.session_id),
                    matricule: &r.participant_id,
                    date: r.date.format("%Y-%m-%d").to_string(),
                    statut: r.status.to_string(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

/// Ids travel as numbers or strings; keep them as strings.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Send ids that are the canonical text of an integer back as numbers,
/// everything else (`"0042"`, `"+5"`, `"C8"`) as the exact string.
fn id_value(id: &str) -> Value {
    match id.parse::<i64>() {
        Ok(n) if n.to_string() == id => Value::from(n),
        _ => Value::from(id),
    }
}

/// Scores may be numbers, numeric strings (decimal columns), empty, or null.
///
/// Anything else is logged and read as no score, so one bad cell does not
/// keep the rest of the matrix from loading.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let score = match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match s.trim().replace(',', ".").parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(score = %s, "unreadable score ignored");
                None
            }
        },
        other => {
            tracing::warn!(score = %other, "unreadable score ignored");
            None
        }
    };
    Ok(score)
}

/// Dates come as `YYYY-MM-DD`, sometimes with a time part appended.
fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_with_mixed_ids_and_scores() {
        let json = serde_json::json!({
            "competences": [
                {"ID_de_competence": 7, "Competence_a_Acquerir": "Consignation"},
                {"ID_de_competence": "C8", "Competence_a_Acquerir": null}
            ],
            "participants": [
                {
                    "matricule": "A123",
                    "nom": "Durand",
                    "evaluations": [
                        {"competenceId": 7, "score": "12.50"},
                        {"competenceId": "C8", "score": null}
                    ]
                },
                {"matricule": 456, "evaluations": [{"competenceId": 7, "score": 9}]}
            ]
        });
        let wire: WireMatrix = serde_json::from_value(json).unwrap();
        let snapshot = wire.into_snapshot("S1");

        assert_eq!(snapshot.competencies[0].id, "7");
        assert_eq!(snapshot.competencies[1].label, "C8");
        assert_eq!(snapshot.participants[1].id, "456");
        assert_eq!(snapshot.participants[1].name, "456");
        assert_eq!(snapshot.scores.len(), 2);
        assert_eq!(snapshot.scores[0].score, 12.5);
        assert_eq!(snapshot.scores[1].participant_id, "456");
    }

    #[test]
    fn save_body_uses_api_field_names() {
        let batch = vec![SaveRecord {
            session_id: "12".into(),
            participant_id: "A123".into(),
            competency_id: "C8".into(),
            score: 14.0,
        }];
        let body = serde_json::to_value(SaveEvaluationsBody::new(&batch)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"evaluations": [{
                "code_de_Session": 12,
                "Matricule": "A123",
                "ID_de_competence": "C8",
                "Score": 14.0
            }]})
        );
    }

    #[test]
    fn unreadable_score_does_not_fail_the_matrix() {
        let json = serde_json::json!({
            "competences": [{"ID_de_competence": 1, "Competence_a_Acquerir": "Consignation"}],
            "participants": [
                {"matricule": "A1", "evaluations": [{"competenceId": 1, "score": "N/A"}]},
                {"matricule": "A2", "evaluations": [{"competenceId": 1, "score": 14}]},
                {"matricule": "A3", "evaluations": [{"competenceId": 1, "score": true}]}
            ]
        });
        let wire: WireMatrix = serde_json::from_value(json).unwrap();
        let snapshot = wire.into_snapshot("S1");

        assert_eq!(snapshot.participants.len(), 3);
        assert_eq!(snapshot.scores.len(), 1);
        assert_eq!(snapshot.scores[0].participant_id, "A2");
        assert_eq!(snapshot.scores[0].score, 14.0);
    }

    #[test]
    fn ids_keep_their_exact_text_on_save() {
        let batch = vec![SaveRecord {
            session_id: "0042".into(),
            participant_id: "A123".into(),
            competency_id: "007".into(),
            score: 11.0,
        }];
        let body = serde_json::to_value(SaveEvaluationsBody::new(&batch)).unwrap();
        assert_eq!(body["evaluations"][0]["code_de_Session"], "0042");
        assert_eq!(body["evaluations"][0]["ID_de_competence"], "007");

        assert_eq!(id_value("12"), serde_json::json!(12));
        assert_eq!(id_value("+5"), serde_json::json!("+5"));
        assert_eq!(id_value("-0"), serde_json::json!("-0"));
    }

    #[test]
    fn leading_zero_session_survives_presence_save() {
        let batch = vec![PresenceRecord {
            session_id: "0042".into(),
            participant_id: "A1".into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            status: PresenceStatus::Present,
        }];
        let body = serde_json::to_value(RecordPresencesBody::new(&batch)).unwrap();
        assert_eq!(body["presences"][0]["Code_de_Session"], "0042");
        assert_eq!(body["presences"][0]["statut"], "present");
    }

    #[test]
    fn dates_accept_timestamps() {
        let wire: WireDates = serde_json::from_value(serde_json::json!({
            "dates": [
                {"date": "2025-03-10", "hasPresences": true},
                {"date": "2025-03-11T00:00:00.000Z"}
            ]
        }))
        .unwrap();
        let dates: Vec<SessionDate> = wire.dates.into_iter().map(SessionDate::from).collect();
        assert_eq!(dates[1].date, NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        assert!(dates[0].has_presences);
        assert!(!dates[1].has_presences);
    }

    #[test]
    fn presence_with_unknown_status() {
        let wire: WirePresence = serde_json::from_value(serde_json::json!({
            "Matricule": "A1", "nom": "Durand", "prenom": "Léa", "statut": "retard"
        }))
        .unwrap();
        let entry = PresenceEntry::from(wire);
        assert_eq!(entry.participant.name, "Léa Durand");
        assert_eq!(entry.status, None);
    }
}
