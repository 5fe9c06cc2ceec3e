//! AI-recommended medications: adopting diagnosis suggestions into the
//! patient's medication list.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::diagnosis::MedicationRecommendation;
use crate::models::{
    Adherence, Medication, MedicationForm, PatientRecord, TimelineCategory, TimelineEntry,
};

/// Body of `POST /api/patients/:id/medications/recommended`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptRecommendations {
    pub condition: String,
    #[serde(default)]
    pub recommendations: Vec<MedicationRecommendation>,
}

impl AdoptRecommendations {
    pub fn validate(&self) -> Result<(), String> {
        if self.condition.trim().is_empty() {
            return Err("Condition is required".into());
        }
        if self.recommendations.is_empty() {
            return Err("At least one medication recommendation is required".into());
        }
        let unnamed = self
            .recommendations
            .iter()
            .position(|r| r.medication.trim().is_empty());
        if let Some(blank) = unnamed {
            return Err(format!("recommendations[{blank}].medication is required"));
        }
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn to_medication(
    rec: &MedicationRecommendation,
    condition: &str,
    prescribed_at: &str,
) -> Medication {
    Medication {
        name: rec.medication.clone(),
        dosage: rec.dosage.clone(),
        schedule: rec.frequency.clone(),
        adherence: Adherence::OnTrack,
        form: MedicationForm::from_route(&rec.route),
        indication: non_empty(&rec.indication),
        monitoring: non_empty(&rec.monitoring),
        contraindications: non_empty(&rec.contraindications),
        duration: non_empty(&rec.duration),
        prescribed_date: Some(prescribed_at.to_string()),
        prescribed_for_condition: Some(condition.to_string()),
    }
}

/// Append `recommendations` to the patient's medications and log the
/// change as a `medication` timeline entry. Returns the new entry.
pub fn adopt_recommendations(
    record: &mut PatientRecord,
    condition: &str,
    recommendations: &[MedicationRecommendation],
    now: DateTime<Utc>,
) -> TimelineEntry {
    let prescribed_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    record.medications.extend(
        recommendations
            .iter()
            .map(|rec| to_medication(rec, condition, &prescribed_at)),
    );

    let names: Vec<&str> = recommendations.iter().map(|r| r.medication.as_str()).collect();
    let entry = TimelineEntry {
        date: now.date_naive().format("%Y-%m-%d").to_string(),
        title: format!("AI-Recommended Medications for {condition}"),
        description: format!("Added {} medication(s): {}", names.len(), names.join(", ")),
        category: TimelineCategory::Medication,
        appointment_id: None,
        metadata: Some(json!({
            "ai_generated": true,
            "condition": condition,
            "medication_count": names.len(),
        })),
    };
    record.timeline.push(entry.clone());

    tracing::info!(condition, count = names.len(), "Adopted AI medication recommendations");
    entry
}
