/// Exercise guidance folded into every chat prompt.
pub const EXERCISE_GUIDELINE: &str =
    "Latest public exercise guideline suggests moderate aerobic activity for 30 min/day.";

const PREAMBLE: &str = "You are a supportive health information assistant.";

/// Compose the prompt sent to the model for one chat turn.
pub fn build_chat_prompt(user_message: &str, heart_rate: Option<f64>) -> String {
    let heart_rate = heart_rate
        .filter(|bpm| bpm.is_finite() && *bpm > 0.0)
        .map_or_else(|| "unknown".to_string(), |bpm| format!("{bpm} bpm"));

    format!(
        "{PREAMBLE}\n\
         User's latest heart rate: {heart_rate}.\n\
         Supplemental guideline from external source: {EXERCISE_GUIDELINE}\n\
         \n\
         User: {}\n",
        user_message.trim()
    )
}
