//! Data model for first-aid guidance requests and results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Triage classification attached to a guidance result.
///
/// Anything the model says that is not clearly "minor" or "emergency" is
/// treated as requiring medical attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SeverityLevel {
    Minor,
    RequiresAttention,
    Emergency,
}

impl SeverityLevel {
    /// Total mapping from free-form severity text. Unrecognized labels fall
    /// back to `RequiresAttention`, the conservative default.
    pub fn from_label(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("emergency") {
            SeverityLevel::Emergency
        } else if text.contains("requires_attention")
            || text.contains("requires attention")
            || text.contains("attention")
        {
            SeverityLevel::RequiresAttention
        } else if text.contains("minor") {
            SeverityLevel::Minor
        } else {
            SeverityLevel::RequiresAttention
        }
    }

}

impl From<String> for SeverityLevel {
    fn from(text: String) -> Self {
        SeverityLevel::from_label(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Severity {
    pub level: SeverityLevel,
    #[serde(default)]
    pub description: String,
}

/// A structured first-aid answer from one provider.
///
/// `steps` and `warnings` are always present; adapters default missing
/// fields instead of propagating absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub assessment: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Patient context supplied by the caller. Read-only; never persisted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistory {
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One guidance request as handed to the fallback chain. The image and
/// audio files are staged by the HTTP handler, which also deletes them;
/// adapters only read them.
#[derive(Debug, Clone, Default)]
pub struct GuidanceRequest {
    pub images: Vec<PathBuf>,
    pub text: String,
    pub audio: Option<PathBuf>,
    pub history: Option<MedicalHistory>,
}

/// The record shape handed back to the browser and to external storage.
/// The storage layer stamps its own `date` at creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    pub assessment: String,
    pub steps: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl GuidanceRecord {
    pub fn from_result(patient_id: Option<String>, result: AssessmentResult) -> Self {
        Self {
            patient_id,
            assessment: result.assessment,
            steps: result.steps,
            warnings: result.warnings,
            severity: result.severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_steps_and_warnings_default_to_empty() {
        let result: AssessmentResult =
            serde_json::from_str(r#"{"assessment": "Small burn on the hand."}"#).unwrap();
        assert_eq!(result.assessment, "Small burn on the hand.");
        assert!(result.steps.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.severity.is_none());
    }

    #[test]
    fn severity_levels_deserialize_by_name() {
        let result: AssessmentResult = serde_json::from_str(
            r#"{
                "assessment": "Deep laceration.",
                "steps": ["Apply pressure."],
                "warnings": [],
                "severity": {"level": "emergency", "description": "Heavy bleeding."}
            }"#,
        )
        .unwrap();
        let severity = result.severity.unwrap();
        assert_eq!(severity.level, SeverityLevel::Emergency);
        assert_eq!(severity.description, "Heavy bleeding.");
    }

    #[test]
    fn unrecognized_severity_maps_to_requires_attention() {
        let severity: Severity =
            serde_json::from_str(r#"{"level": "moderate-ish", "description": "x"}"#).unwrap();
        assert_eq!(severity.level, SeverityLevel::RequiresAttention);
    }

    #[test]
    fn severity_label_variants() {
        assert_eq!(SeverityLevel::from_label("MINOR"), SeverityLevel::Minor);
        assert_eq!(
            SeverityLevel::from_label("requires attention"),
            SeverityLevel::RequiresAttention
        );
        assert_eq!(
            SeverityLevel::from_label("needs attention soon"),
            SeverityLevel::RequiresAttention
        );
        assert_eq!(
            SeverityLevel::from_label("EMERGENCY - call 911"),
            SeverityLevel::Emergency
        );
        assert_eq!(
            SeverityLevel::from_label("no idea"),
            SeverityLevel::RequiresAttention
        );
    }

    #[test]
    fn severity_serializes_snake_case() {
        let json = serde_json::to_string(&SeverityLevel::RequiresAttention).unwrap();
        assert_eq!(json, r#""requires_attention""#);
    }

    #[test]
    fn medical_history_uses_camel_case_wire_names() {
        let history: MedicalHistory = serde_json::from_str(
            r#"{"allergies": ["penicillin"], "bloodType": "O+"}"#,
        )
        .unwrap();
        assert_eq!(history.allergies, vec!["penicillin"]);
        assert_eq!(history.blood_type.as_deref(), Some("O+"));
        assert!(history.medications.is_empty());
        assert!(history.notes.is_none());
    }

    #[test]
    fn guidance_record_keeps_result_untouched() {
        let result = AssessmentResult {
            assessment: "Sprained ankle.".to_string(),
            steps: vec!["Rest and elevate.".to_string()],
            warnings: vec!["See a doctor if swelling persists.".to_string()],
            severity: None,
        };
        let record = GuidanceRecord::from_result(Some("p-1".to_string()), result.clone());
        assert_eq!(record.patient_id.as_deref(), Some("p-1"));
        assert_eq!(record.assessment, result.assessment);
        assert_eq!(record.steps, result.steps);
        assert_eq!(record.warnings, result.warnings);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["patientId"], "p-1");
        assert!(json.get("severity").is_none());
    }
}
