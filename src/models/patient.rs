use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{Adherence, MedicationForm, TimelineCategory, VitalStatus};

pub const DEFAULT_PRONOUNS: &str = "she/her";

fn default_pronouns() -> String {
    DEFAULT_PRONOUNS.to_string()
}

/// Patient document body as submitted by clients and stored by the
/// repository. Bookkeeping fields (`id`, timestamps) live on [`Patient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub name: String,
    #[serde(default = "default_pronouns")]
    pub pronouns: String,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub vitals: Vec<Vital>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub research: Vec<ResearchHighlight>,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub metrics: Vec<MetricSeries>,
    #[serde(default)]
    pub appointment_history: Vec<AppointmentRecord>,
}

impl PatientRecord {
    /// Minimal record with schema defaults for everything but the
    /// required fields.
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            pronouns: default_pronouns(),
            age,
            avatar: None,
            conditions: Vec::new(),
            last_visit: None,
            specialty: None,
            notes: String::new(),
            vitals: Vec::new(),
            timeline: Vec::new(),
            medications: Vec::new(),
            research: Vec::new(),
            risk_score: 0.0,
            metrics: Vec::new(),
            appointment_history: Vec::new(),
        }
    }

    /// Checks the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Patient name is required".into());
        }
        if !self.risk_score.is_finite() {
            return Err("riskScore must be a finite number".into());
        }
        Ok(())
    }
}

/// A stored patient: the document plus store-maintained fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    #[serde(flatten)]
    pub record: PatientRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vital {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub status: VitalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: TimelineCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    /// Free-form key/value context attached by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub adherence: Adherence,
    #[serde(rename = "type", default)]
    pub form: MedicationForm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contraindications: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescribed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescribed_for_condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchHighlight {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub url: String,
}

/// A named time series plotted on the dashboard trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub points: Vec<MetricPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub time: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub notes: String,
    /// Snapshot of the appointment form the record was published from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<serde_json::Value>,
}
