//! Appointment publishing: turns a completed appointment form into the
//! patient's history, timeline, metric and vital updates in one step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{
    AppointmentRecord, MetricPoint, PatientRecord, TimelineCategory, TimelineEntry, VitalStatus,
};
use crate::timeline;

/// Metric series id that receives heart-rate readings.
pub const HEART_RATE_METRIC_ID: &str = "heart-rate";
/// Vital label that mirrors the latest heart-rate reading.
pub const HEART_RATE_VITAL_LABEL: &str = "heart rate";
/// Points kept per metric series (one year of monthly readings).
pub const MAX_METRIC_POINTS: usize = 12;

const NO_NOTES: &str = "No additional notes provided.";

/// Appointment form as filled in by the clinician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    pub appointment_type: String,
    #[serde(default)]
    pub symptom_summary: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat_bpm: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub diagnostic_focus: Vec<String>,
}

impl AppointmentDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.appointment_type.trim().is_empty() {
            return Err("Appointment type is required".into());
        }
        for (label, value) in [
            ("weightKg", self.weight_kg),
            ("heightCm", self.height_cm),
            ("heartbeatBpm", self.heartbeat_bpm),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("{label} must be a non-negative number"));
                }
            }
        }
        Ok(())
    }

    /// A reading of zero is treated as "not measured".
    fn heart_rate(&self) -> Option<f64> {
        self.heartbeat_bpm.filter(|bpm| *bpm > 0.0)
    }
}

/// What `publish_appointment` added to the patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedAppointment {
    pub appointment: AppointmentRecord,
    pub timeline_entry: TimelineEntry,
}

fn first_non_blank<'a>(candidates: &[&'a str], fallback: &'a str) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|s| !s.trim().is_empty())
        .unwrap_or(fallback)
}

fn timeline_metadata(draft: &AppointmentDraft) -> Value {
    let mut metadata = Map::new();
    if !draft.duration.trim().is_empty() {
        metadata.insert("duration".into(), Value::String(draft.duration.clone()));
    }
    if let Some(bpm) = draft.heartbeat_bpm {
        metadata.insert("heartbeat".into(), Value::String(format!("{bpm} bpm")));
    }
    if let Some(weight) = draft.weight_kg {
        metadata.insert("weight".into(), Value::String(format!("{weight} kg")));
    }
    if let Some(height) = draft.height_cm {
        metadata.insert("height".into(), Value::String(format!("{height} cm")));
    }
    Value::Object(metadata)
}

/// Record a completed appointment on the patient.
///
/// Prepends the history record, adds an `appointment` timeline entry and
/// re-sorts the timeline newest first. A heart-rate reading is appended to
/// the `heart-rate` metric series (capped at [`MAX_METRIC_POINTS`]) and
/// copied onto the `heart rate` vital.
pub fn publish_appointment(
    record: &mut PatientRecord,
    draft: &AppointmentDraft,
    now: DateTime<Utc>,
) -> PublishedAppointment {
    let today = now.date_naive();
    let date = today.format("%Y-%m-%d").to_string();
    let appointment_id = format!("appt-{}", now.timestamp_millis());

    let notes = first_non_blank(
        &[draft.notes.as_str(), draft.symptom_summary.as_str()],
        NO_NOTES,
    )
    .to_string();
    let appointment = AppointmentRecord {
        id: appointment_id.clone(),
        date: date.clone(),
        summary: draft.appointment_type.clone(),
        notes: notes.clone(),
        draft: serde_json::to_value(draft).ok(),
    };

    let timeline_entry = TimelineEntry {
        date,
        title: draft.appointment_type.clone(),
        description: first_non_blank(&[draft.symptom_summary.as_str()], &notes).to_string(),
        category: TimelineCategory::Appointment,
        appointment_id: Some(appointment_id),
        metadata: Some(timeline_metadata(draft)),
    };

    if let Some(bpm) = draft.heart_rate() {
        let label = timeline::month_label(today);
        for series in record.metrics.iter_mut().filter(|s| s.id == HEART_RATE_METRIC_ID) {
            series.points.push(MetricPoint {
                time: label.to_string(),
                value: bpm,
            });
            if series.points.len() > MAX_METRIC_POINTS {
                let excess = series.points.len() - MAX_METRIC_POINTS;
                series.points.drain(..excess);
            }
        }
        for vital in record.vitals.iter_mut().filter(|v| v.label == HEART_RATE_VITAL_LABEL) {
            vital.value = format!("{bpm}");
            vital.status = VitalStatus::Stable;
        }
    }

    record.appointment_history.insert(0, appointment.clone());
    record.timeline.insert(0, timeline_entry.clone());
    timeline::sort_newest_first(&mut record.timeline);

    PublishedAppointment {
        appointment,
        timeline_entry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricSeries, Vital};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 16, 9, 30, 0).unwrap()
    }

    fn draft() -> AppointmentDraft {
        AppointmentDraft {
            appointment_type: "cardiology follow-up".into(),
            symptom_summary: "palpitations at night".into(),
            duration: "30 min".into(),
            weight_kg: Some(58.0),
            height_cm: Some(165.5),
            heartbeat_bpm: Some(84.0),
            notes: String::new(),
            diagnostic_focus: vec!["cardiac".into()],
        }
    }

    fn patient() -> PatientRecord {
        let mut record = PatientRecord::new("Karina", 24);
        record.vitals.push(Vital {
            label: "heart rate".into(),
            value: "92".into(),
            unit: Some("bpm".into()),
            status: VitalStatus::Elevated,
            trend: Some("up".into()),
        });
        record.metrics.push(MetricSeries {
            id: "heart-rate".into(),
            name: "heart rate".into(),
            unit: "bpm".into(),
            points: (0..12)
                .map(|i| MetricPoint { time: format!("m{i}"), value: 90.0 })
                .collect(),
        });
        record.timeline.push(TimelineEntry {
            date: "Mar 12, 2025".into(),
            title: "older".into(),
            description: String::new(),
            category: TimelineCategory::Lab,
            appointment_id: None,
            metadata: None,
        });
        record
    }

    #[test]
    fn history_record_is_prepended() {
        let mut record = patient();
        record.appointment_history.push(AppointmentRecord {
            id: "appt-001".into(),
            date: "2025-03-12".into(),
            summary: "first".into(),
            notes: String::new(),
            draft: None,
        });

        let published = publish_appointment(&mut record, &draft(), now());

        assert_eq!(record.appointment_history.len(), 2);
        assert_eq!(record.appointment_history[0], published.appointment);
        assert_eq!(published.appointment.id, format!("appt-{}", now().timestamp_millis()));
        assert_eq!(published.appointment.date, "2025-10-16");
        assert_eq!(published.appointment.summary, "cardiology follow-up");
        // blank notes fall back to the symptom summary
        assert_eq!(published.appointment.notes, "palpitations at night");
        assert_eq!(
            published.appointment.draft.as_ref().unwrap()["appointmentType"],
            "cardiology follow-up"
        );
    }

    #[test]
    fn timeline_entry_links_appointment_and_sorts_first() {
        let mut record = patient();
        let published = publish_appointment(&mut record, &draft(), now());

        let entry = &record.timeline[0];
        assert_eq!(entry, &published.timeline_entry);
        assert_eq!(entry.category, TimelineCategory::Appointment);
        assert_eq!(entry.appointment_id.as_deref(), Some(published.appointment.id.as_str()));
        assert_eq!(entry.description, "palpitations at night");
        assert_eq!(record.timeline[1].title, "older");

        let metadata = entry.metadata.as_ref().unwrap();
        assert_eq!(metadata["duration"], "30 min");
        assert_eq!(metadata["heartbeat"], "84 bpm");
        assert_eq!(metadata["weight"], "58 kg");
        assert_eq!(metadata["height"], "165.5 cm");
    }

    #[test]
    fn heart_rate_updates_metric_and_vital() {
        let mut record = patient();
        publish_appointment(&mut record, &draft(), now());

        let points = &record.metrics[0].points;
        assert_eq!(points.len(), MAX_METRIC_POINTS);
        let last = points.last().unwrap();
        assert_eq!(last.time, "oct");
        assert_eq!(last.value, 84.0);
        assert_eq!(points[0].time, "m1");

        assert_eq!(record.vitals[0].value, "84");
        assert_eq!(record.vitals[0].status, VitalStatus::Stable);
    }

    #[test]
    fn missing_heart_rate_leaves_vitals_alone() {
        let mut record = patient();
        let mut without_hr = draft();
        without_hr.heartbeat_bpm = None;
        let published = publish_appointment(&mut record, &without_hr, now());

        assert_eq!(record.vitals[0].value, "92");
        assert_eq!(record.metrics[0].points.len(), 12);
        assert!(published.timeline_entry.metadata.unwrap().get("heartbeat").is_none());
    }

    #[test]
    fn notes_fallback_when_everything_blank() {
        let mut record = PatientRecord::new("Ningning", 22);
        let mut blank = draft();
        blank.symptom_summary = String::new();
        blank.notes = "  ".into();
        let published = publish_appointment(&mut record, &blank, now());
        assert_eq!(published.appointment.notes, "No additional notes provided.");
        assert_eq!(published.timeline_entry.description, "No additional notes provided.");
    }

    #[test]
    fn validate_rejects_blank_type_and_negative_numbers() {
        let mut bad = draft();
        bad.appointment_type = " ".into();
        assert!(bad.validate().is_err());

        let mut negative = draft();
        negative.weight_kg = Some(-1.0);
        assert!(negative.validate().is_err());

        assert!(draft().validate().is_ok());
    }
}
