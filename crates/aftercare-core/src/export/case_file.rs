//! Portable case file: the whole case as one JSON document.

use serde::{Deserialize, Serialize};

use crate::models::{NeedItem, PatientDetails};

/// Exported case. Field names match the saved-work document so the same
/// front-ends can read either.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseExport {
    #[serde(default)]
    pub patient_details: PatientDetails,
    #[serde(default)]
    pub needs: Vec<NeedItem>,
    #[serde(default)]
    pub exported_at: String,
}

impl CaseExport {
    /// Create an export of the given state, stamped now.
    pub fn new(details: &PatientDetails, needs: &[NeedItem]) -> Self {
        Self {
            patient_details: details.clone(),
            needs: needs.to_vec(),
            exported_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Export to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Suggested download name for this case.
    pub fn filename(&self) -> String {
        export_filename(&self.patient_details.name)
    }
}

/// `S117_Assessment_<name>.json`, with `Case` standing in for an empty name.
pub fn export_filename(name: &str) -> String {
    let name = if name.is_empty() { "Case" } else { name };
    format!("S117_Assessment_{name}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NeedCategory, NeedDomain, Severity};

    fn sample_need() -> NeedItem {
        NeedItem {
            id: "n1".into(),
            description: "Medication management".into(),
            category: NeedCategory::S117,
            domain: NeedDomain::MentalHealth,
            intervention: "Daily prompts".into(),
            provider: "NHS".into(),
            severity: Severity::High,
            statutory_test_arises: Some(true),
            statutory_test_reduces_risk: Some(true),
        }
    }

    #[test]
    fn test_filename() {
        assert_eq!(export_filename(""), "S117_Assessment_Case.json");
        assert_eq!(export_filename("Jane Doe"), "S117_Assessment_Jane Doe.json");
    }

    #[test]
    fn test_json_shape() {
        let mut details = PatientDetails::default();
        details.name = "Jane Doe".into();
        details.responsible_la = "Leeds".into();
        let export = CaseExport::new(&details, &[sample_need()]);

        let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert_eq!(value["patientDetails"]["name"], "Jane Doe");
        assert_eq!(value["patientDetails"]["responsibleLA"], "Leeds");
        assert_eq!(value["needs"][0]["category"], "S117 After-care");
        assert_eq!(value["needs"][0]["statutoryTestArises"], true);
        assert!(value["exportedAt"].is_string());
    }

    #[test]
    fn test_import_restores_state() {
        let mut details = PatientDetails::default();
        details.name = "Jane Doe".into();
        details.decision_confidence = 85;
        let export = CaseExport::new(&details, &[sample_need()]);

        let imported = CaseExport::from_json(&export.to_json().unwrap()).unwrap();
        assert_eq!(imported.patient_details, details);
        assert_eq!(imported.needs, vec![sample_need()]);
        assert_eq!(imported.filename(), "S117_Assessment_Jane Doe.json");
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(CaseExport::from_json("[1, 2, 3]").is_err());
    }
}
