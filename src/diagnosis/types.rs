use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Model label reported with live diagnosis results.
pub const AI_MODEL_LABEL: &str = "Gemini 2.5 Flash + PubMed Research";
/// Model label reported by the sample-data endpoint.
pub const MOCK_MODEL_LABEL: &str = "Test Mode - Mock Data";

/// Certainty at or above which a diagnosis is reported as `High`.
pub const HIGH_CONFIDENCE: f64 = 0.7;
/// Certainty at or above which a diagnosis is reported as `Moderate`.
pub const MODERATE_CONFIDENCE: f64 = 0.4;

/// Appointment form fields submitted for AI analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    #[serde(default)]
    pub symptom_summary: String,
    #[serde(default)]
    pub appointment_type: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub heartbeat_bpm: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub diagnostic_focus: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub patient_age: Option<u32>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treatment suggestion attached to a diagnosis by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRecommendation {
    #[serde(default)]
    pub medication: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub indication: String,
    #[serde(default)]
    pub monitoring: String,
    #[serde(default)]
    pub contraindications: String,
}

/// One element of the JSON array printed by the diagnosis engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawDiagnosis {
    pub diagnosis: String,
    pub certainty_score: f64,
    #[serde(default)]
    pub supporting_evidence: Vec<String>,
    #[serde(default)]
    pub research_articles: u32,
    #[serde(default)]
    pub key_findings: String,
    #[serde(default)]
    pub medication_recommendations: Option<Vec<MedicationRecommendation>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
}

impl ConfidenceLevel {
    pub fn from_certainty(score: f64) -> Self {
        if score >= HIGH_CONFIDENCE {
            Self::High
        } else if score >= MODERATE_CONFIDENCE {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisItem {
    pub condition: String,
    pub certainty_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub supporting_evidence: Vec<String>,
    pub research_articles_count: u32,
    pub key_findings: String,
    pub medication_recommendations: Vec<MedicationRecommendation>,
}

impl From<RawDiagnosis> for DiagnosisItem {
    fn from(raw: RawDiagnosis) -> Self {
        Self {
            confidence_level: ConfidenceLevel::from_certainty(raw.certainty_score),
            condition: raw.diagnosis,
            certainty_score: raw.certainty_score,
            supporting_evidence: raw.supporting_evidence,
            research_articles_count: raw.research_articles,
            key_findings: raw.key_findings,
            medication_recommendations: raw.medication_recommendations.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    pub success: bool,
    pub symptom_analysis: String,
    pub diagnoses: Vec<DiagnosisItem>,
    pub generated_at: DateTime<Utc>,
    pub ai_model: String,
}

impl DiagnosisResponse {
    pub fn from_raw(
        symptom_analysis: String,
        raw: Vec<RawDiagnosis>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            success: true,
            symptom_analysis,
            diagnoses: raw.into_iter().map(DiagnosisItem::from).collect(),
            generated_at,
            ai_model: AI_MODEL_LABEL.to_string(),
        }
    }
}

fn recommendation(
    medication: &str,
    dosage: &str,
    frequency: &str,
    indication: &str,
    monitoring: &str,
    contraindications: &str,
) -> MedicationRecommendation {
    MedicationRecommendation {
        medication: medication.into(),
        dosage: dosage.into(),
        frequency: frequency.into(),
        route: "oral".into(),
        duration: "long-term".into(),
        indication: indication.into(),
        monitoring: monitoring.into(),
        contraindications: contraindications.into(),
    }
}

/// Fixed response used to exercise result rendering without the engine.
pub fn sample_response(generated_at: DateTime<Utc>) -> DiagnosisResponse {
    DiagnosisResponse {
        success: true,
        symptom_analysis: "Test symptoms for medication display".into(),
        diagnoses: vec![DiagnosisItem {
            condition: "Peripartum Cardiomyopathy".into(),
            certainty_score: 0.75,
            confidence_level: ConfidenceLevel::High,
            supporting_evidence: vec!["Test evidence 1".into(), "Test evidence 2".into()],
            research_articles_count: 5,
            key_findings: "Test findings for cardiomyopathy".into(),
            medication_recommendations: vec![
                recommendation(
                    "Lisinopril",
                    "2.5-5 mg",
                    "once daily",
                    "heart failure and cardioprotection",
                    "blood pressure, kidney function, potassium",
                    "pregnancy, angioedema history",
                ),
                recommendation(
                    "Metoprolol",
                    "12.5-25 mg",
                    "twice daily",
                    "heart rate control and symptoms",
                    "heart rate, blood pressure, heart function",
                    "severe asthma, heart block",
                ),
            ],
        }],
        generated_at,
        ai_model: MOCK_MODEL_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_focus_is_empty() {
        let request: DiagnosisRequest = serde_json::from_value(json!({
            "symptomSummary": "fever",
            "diagnosticFocus": null,
        }))
        .unwrap();
        assert!(request.diagnostic_focus.is_empty());

        let request: DiagnosisRequest =
            serde_json::from_value(json!({"symptomSummary": "fever"})).unwrap();
        assert!(request.diagnostic_focus.is_empty());

        let request: DiagnosisRequest = serde_json::from_value(json!({
            "symptomSummary": "fever",
            "diagnosticFocus": ["cardiac"],
        }))
        .unwrap();
        assert_eq!(request.diagnostic_focus, vec!["cardiac"]);
    }

    #[test]
    fn confidence_thresholds() {
        assert_eq!(ConfidenceLevel::from_certainty(0.95), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_certainty(0.7), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_certainty(0.69), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_certainty(0.4), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_certainty(0.39), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_certainty(0.0), ConfidenceLevel::Low);
    }

    #[test]
    fn raw_diagnosis_maps_to_response_item() {
        let raw: RawDiagnosis = serde_json::from_value(json!({
            "diagnosis": "PCOS",
            "certainty_score": 0.55,
            "supporting_evidence": ["irregular cycles"],
            "research_articles": 4,
            "key_findings": "PCOS presents with irregular periods"
        }))
        .unwrap();
        let item = DiagnosisItem::from(raw);
        assert_eq!(item.condition, "PCOS");
        assert_eq!(item.confidence_level, ConfidenceLevel::Moderate);
        assert_eq!(item.research_articles_count, 4);
        assert!(item.medication_recommendations.is_empty());
    }

    #[test]
    fn response_uses_snake_case_fields() {
        let response = DiagnosisResponse::from_raw("chest pain".into(), Vec::new(), Utc::now());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["symptom_analysis"], "chest pain");
        assert_eq!(value["ai_model"], AI_MODEL_LABEL);
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn sample_response_has_medications() {
        let sample = sample_response(Utc::now());
        assert_eq!(sample.ai_model, MOCK_MODEL_LABEL);
        assert_eq!(sample.diagnoses[0].medication_recommendations.len(), 2);
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(value["diagnoses"][0]["confidence_level"], "High");
    }
}
