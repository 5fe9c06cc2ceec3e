use super::types::DiagnosisRequest;
use super::DiagnosisError;

/// Zero and non-finite readings count as "not measured".
fn measured(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Body-mass index from kilograms and centimetres.
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// One decimal place, ties rounded away from zero.
fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

fn format_measurement(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| format!("{v}{unit}"))
}

/// Build the single-sentence symptom description handed to the engine.
///
/// Starts from the symptom summary and appends whichever optional form
/// fields carry a value, in a fixed order.
pub fn build_symptom_description(request: &DiagnosisRequest) -> Result<String, DiagnosisError> {
    if request.symptom_summary.trim().is_empty() {
        return Err(DiagnosisError::MissingSymptoms);
    }

    let mut description = request.symptom_summary.clone();

    if let Some(appointment_type) = non_blank(request.appointment_type.as_deref()) {
        description.push_str(&format!(" Patient scheduled for {appointment_type}."));
    }

    let weight = measured(request.weight_kg);
    let height = measured(request.height_cm);
    if weight.is_some() || height.is_some() {
        description.push_str(&format!(
            " Physical measurements: weight {}, height {}",
            format_measurement(weight, "kg"),
            format_measurement(height, "cm"),
        ));
        if let (Some(w), Some(h)) = (weight, height) {
            description.push_str(&format!(", BMI {}", one_decimal(body_mass_index(w, h))));
        }
        description.push('.');
    }

    if let Some(bpm) = measured(request.heartbeat_bpm) {
        description.push_str(&format!(" Heart rate: {bpm} bpm."));
    }

    if let Some(age) = request.patient_age.filter(|age| *age > 0) {
        description.push_str(&format!(" Patient age: {age} years."));
    }

    if !request.diagnostic_focus.is_empty() {
        description.push_str(&format!(
            " Areas of focus: {}.",
            request.diagnostic_focus.join(", ")
        ));
    }

    if let Some(notes) = non_blank(request.notes.as_deref()) {
        description.push_str(&format!(" Additional notes: {notes}"));
    }

    Ok(description)
}
