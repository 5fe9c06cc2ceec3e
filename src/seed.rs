//! Demo patients bundled with the binary.

use rusqlite::Connection;
use thiserror::Error;

use crate::db::{self, DatabaseError, UpsertOutcome};
use crate::models::PatientRecord;

const SEED_PATIENTS: &str = include_str!("../resources/seed/patients.json");

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Bundled seed data is invalid: {0}")]
    InvalidSeed(#[from] serde_json::Error),

    #[error("Seed patient {name:?} is invalid: {reason}")]
    InvalidPatient { name: String, reason: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub removed: usize,
    pub inserted: usize,
    pub updated: usize,
}

pub fn load_seed_patients() -> Result<Vec<PatientRecord>, SeedError> {
    let patients: Vec<PatientRecord> = serde_json::from_str(SEED_PATIENTS)?;
    for patient in &patients {
        patient.validate().map_err(|reason| SeedError::InvalidPatient {
            name: patient.name.clone(),
            reason,
        })?;
    }
    Ok(patients)
}

/// Upsert the bundled patients by name. With `reset`, patients carrying a
/// bundled name are removed first.
pub fn seed_database(conn: &Connection, reset: bool) -> Result<SeedSummary, SeedError> {
    let patients = load_seed_patients()?;
    let mut summary = SeedSummary::default();

    if reset {
        let names: Vec<&str> = patients.iter().map(|p| p.name.as_str()).collect();
        summary.removed = db::delete_patients_by_name(conn, &names)?;
        tracing::info!(removed = summary.removed, "Removed existing demo patients");
    }

    for patient in &patients {
        match db::upsert_patient_by_name(conn, patient)? {
            UpsertOutcome::Inserted(_) => summary.inserted += 1,
            UpsertOutcome::Updated(_) => summary.updated += 1,
        }
    }

    tracing::info!(
        inserted = summary.inserted,
        updated = summary.updated,
        "Seeded demo patients"
    );
    Ok(summary)
}
