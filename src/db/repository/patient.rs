use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{AppointmentRecord, Patient, PatientRecord, TimelineEntry};

/// Result of a name-keyed upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(String),
    Updated(String),
}

/// Current time at the precision the table stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width timestamps so `ORDER BY created_at` is chronological.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptDocument(format!("bad timestamp {raw:?}: {e}")))
}

struct PatientRow {
    id: String,
    document: String,
    created_at: String,
    updated_at: String,
}

fn patient_row_from_rusqlite(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        document: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    let record: PatientRecord = serde_json::from_str(&row.document)
        .map_err(|e| DatabaseError::CorruptDocument(format!("patient {}: {e}", row.id)))?;
    Ok(Patient {
        id: row.id,
        record,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}

pub fn insert_patient(conn: &Connection, record: &PatientRecord) -> Result<Patient, DatabaseError> {
    let timestamp = now();
    let patient = Patient {
        id: Uuid::new_v4().to_string(),
        record: record.clone(),
        created_at: timestamp,
        updated_at: timestamp,
    };
    conn.execute(
        "INSERT INTO patients (id, name, document, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            patient.id,
            patient.record.name,
            serde_json::to_string(&patient.record)?,
            format_timestamp(&patient.created_at),
            format_timestamp(&patient.updated_at),
        ],
    )?;
    Ok(patient)
}

pub fn get_patient(conn: &Connection, id: &str) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, document, created_at, updated_at FROM patients WHERE id = ?1",
            params![id],
            patient_row_from_rusqlite,
        )
        .optional()?;
    row.map(patient_from_row).transpose()
}

/// All patients, most recently created first.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, document, created_at, updated_at FROM patients
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map([], patient_row_from_rusqlite)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

fn write_document(
    conn: &Connection,
    id: &str,
    record: &PatientRecord,
    updated_at: &DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients SET name = ?2, document = ?3, updated_at = ?4 WHERE id = ?1",
        params![
            id,
            record.name,
            serde_json::to_string(record)?,
            format_timestamp(updated_at),
        ],
    )?;
    Ok(changed)
}

/// Replace the whole document. `id` and `created_at` are kept.
pub fn replace_patient(
    conn: &Connection,
    id: &str,
    record: &PatientRecord,
) -> Result<Option<Patient>, DatabaseError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let Some(existing) = get_patient(&tx, id)? else {
        return Ok(None);
    };
    let updated_at = now();
    write_document(&tx, id, record, &updated_at)?;
    tx.commit()?;

    Ok(Some(Patient {
        id: existing.id,
        record: record.clone(),
        created_at: existing.created_at,
        updated_at,
    }))
}

/// Returns `false` when no patient had this id.
pub fn delete_patient(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let deleted = conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

/// Read-modify-write of one patient inside an immediate transaction.
///
/// The closure sees the current document and may mutate it; its return
/// value is handed back with the stored patient. `None` means no such id.
pub fn update_patient_with<R>(
    conn: &Connection,
    id: &str,
    mutate: impl FnOnce(&mut PatientRecord) -> R,
) -> Result<Option<(Patient, R)>, DatabaseError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let Some(mut patient) = get_patient(&tx, id)? else {
        return Ok(None);
    };
    let output = mutate(&mut patient.record);
    patient.updated_at = now();
    write_document(&tx, id, &patient.record, &patient.updated_at)?;
    tx.commit()?;
    Ok(Some((patient, output)))
}

/// Append a timeline entry and return it as stored.
pub fn push_timeline_entry(
    conn: &Connection,
    id: &str,
    entry: &TimelineEntry,
) -> Result<Option<TimelineEntry>, DatabaseError> {
    let result = update_patient_with(conn, id, |record| {
        record.timeline.push(entry.clone());
        record.timeline.last().cloned()
    })?;
    Ok(result.and_then(|(_, stored)| stored))
}

/// Prepend an appointment record (history is kept newest first).
pub fn unshift_appointment(
    conn: &Connection,
    id: &str,
    appointment: &AppointmentRecord,
) -> Result<Option<AppointmentRecord>, DatabaseError> {
    let result = update_patient_with(conn, id, |record| {
        record.appointment_history.insert(0, appointment.clone());
        record.appointment_history.first().cloned()
    })?;
    Ok(result.and_then(|(_, stored)| stored))
}

fn find_patient_id_by_name(conn: &Connection, name: &str) -> Result<Option<String>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM patients WHERE name = ?1 ORDER BY created_at ASC LIMIT 1",
            params![name],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(id)
}

/// Insert, or overwrite the document of the first patient with the same name.
pub fn upsert_patient_by_name(
    conn: &Connection,
    record: &PatientRecord,
) -> Result<UpsertOutcome, DatabaseError> {
    match find_patient_id_by_name(conn, &record.name)? {
        Some(id) => {
            write_document(conn, &id, record, &now())?;
            Ok(UpsertOutcome::Updated(id))
        }
        None => {
            let patient = insert_patient(conn, record)?;
            Ok(UpsertOutcome::Inserted(patient.id))
        }
    }
}

/// Delete every patient whose name is in `names`. Returns the row count.
pub fn delete_patients_by_name(conn: &Connection, names: &[&str]) -> Result<usize, DatabaseError> {
    let mut total = 0;
    for name in names {
        total += conn.execute("DELETE FROM patients WHERE name = ?1", params![name])?;
    }
    Ok(total)
}
