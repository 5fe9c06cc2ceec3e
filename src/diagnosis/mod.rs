//! AI-assisted differential diagnosis.
//!
//! Flow: appointment form → symptom description → external engine →
//! JSON array scraped from the engine's stdout → response with confidence
//! levels.

pub mod engine;
pub mod parser;
pub mod prompt;
pub mod types;

pub use engine::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use chrono::Utc;
use thiserror::Error;
use tracing::Instrument;

#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error("Symptom summary is required for AI diagnosis")]
    MissingSymptoms,

    #[error("Failed to start diagnosis engine {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Diagnosis engine exited with status {code:?}: {stderr}")]
    ProcessFailed { code: Option<i32>, stderr: String },

    #[error("Diagnosis engine timed out after {0}s")]
    TimedOut(u64),

    #[error("No JSON data found in diagnosis engine output")]
    NoJsonFound,

    #[error("Diagnosis engine returned invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run a full diagnosis request against `engine`.
pub async fn diagnose(
    engine: &dyn DiagnosisEngine,
    request: &DiagnosisRequest,
) -> Result<DiagnosisResponse, DiagnosisError> {
    let description = build_symptom_description(request)?;
    let span = tracing::info_span!("ai_diagnosis", description_len = description.len());

    async {
        tracing::info!("Processing AI diagnosis request");
        tracing::debug!(%description, "Full symptom description");

        let stdout = engine.run(&description).await?;
        let raw = parse_diagnoses(&stdout).inspect_err(|e| {
            tracing::warn!(
                error = %e,
                output_len = stdout.len(),
                "Unparseable diagnosis engine output"
            );
        })?;

        tracing::info!(count = raw.len(), "AI diagnosis completed");
        Ok(DiagnosisResponse::from_raw(description.clone(), raw, Utc::now()))
    }
    .instrument(span)
    .await
}
