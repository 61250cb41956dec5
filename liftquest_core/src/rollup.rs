//! CSV rollup functionality for archiving WAL workout records.
//!
//! This module implements atomic WAL-to-CSV conversion with proper error
//! handling to prevent data loss.

use crate::types::{BodyPart, Grade};
use crate::{Error, Result, WorkoutEntry};
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    subject_id: String,
    exercise_id: String,
    body_part: &'static str,
    sets: u32,
    reps: u32,
    weight_kg: f64,
    estimated_max: f64,
    grade: String,
    exp_gained: i64,
    calories: f64,
    performed_at: String,
    verified: bool,
}

impl From<&WorkoutEntry> for CsvRow {
    fn from(entry: &WorkoutEntry) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            subject_id: entry.subject_id.clone(),
            exercise_id: entry.exercise_id.clone(),
            body_part: entry.body_part.code(),
            sets: entry.sets,
            reps: entry.reps,
            weight_kg: entry.weight_kg,
            estimated_max: entry.estimated_max,
            grade: format!("{:?}", entry.grade).to_lowercase(),
            exp_gained: entry.exp_gained,
            calories: entry.calories,
            performed_at: entry.performed_at.to_rfc3339(),
            verified: entry.verified,
        }
    }
}

/// A row read back from the CSV archive
#[derive(Debug, serde::Deserialize)]
struct ArchivedRow {
    id: String,
    subject_id: String,
    exercise_id: String,
    body_part: String,
    sets: u32,
    reps: u32,
    weight_kg: f64,
    estimated_max: f64,
    grade: String,
    exp_gained: i64,
    calories: f64,
    performed_at: String,
    verified: bool,
}

fn parse_grade(code: &str) -> Option<Grade> {
    Grade::ALL
        .into_iter()
        .find(|g| format!("{g:?}").eq_ignore_ascii_case(code))
}

impl ArchivedRow {
    fn into_entry(self) -> Result<WorkoutEntry> {
        let id = Uuid::parse_str(&self.id).map_err(|e| {
            Error::State(format!("archived record has a bad id {}: {e}", self.id))
        })?;
        let body_part = BodyPart::parse(&self.body_part).ok_or_else(|| {
            Error::State(format!(
                "archived record {id} has unknown body part {}",
                self.body_part
            ))
        })?;
        let grade = parse_grade(&self.grade).ok_or_else(|| {
            Error::State(format!(
                "archived record {id} has unknown grade {}",
                self.grade
            ))
        })?;
        let performed_at = DateTime::parse_from_rfc3339(&self.performed_at)
            .map_err(|e| {
                Error::State(format!("archived record {id} has a bad timestamp: {e}"))
            })?
            .with_timezone(&Utc);

        Ok(WorkoutEntry {
            id,
            subject_id: self.subject_id,
            exercise_id: self.exercise_id,
            body_part,
            sets: self.sets,
            reps: self.reps,
            weight_kg: self.weight_kg,
            estimated_max: self.estimated_max,
            grade,
            exp_gained: self.exp_gained,
            calories: self.calories,
            performed_at,
            verified: self.verified,
        })
    }
}

/// Look up an archived workout record by id in the CSV log.
///
/// Records leave the WAL on rollup but stay referenceable, e.g. as
/// certification proof submitted after an archive cycle.
pub fn find_archived(csv_path: &Path, entry_id: Uuid) -> Result<Option<WorkoutEntry>> {
    if !csv_path.exists() {
        return Ok(None);
    }

    let wanted = entry_id.to_string();
    let mut reader = csv::Reader::from_path(csv_path)?;
    for row in reader.deserialize::<ArchivedRow>() {
        let row = row?;
        if row.id == wanted {
            return row.into_entry().map(Some);
        }
    }
    Ok(None)
}

/// Roll up WAL workout records into CSV and archive the WAL atomically
///
/// This function:
/// 1. Reads all entries from the WAL
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the WAL to .processed
/// 5. Returns the number of entries processed
///
/// # Safety
/// - CSV is fsynced before WAL is renamed
/// - WAL is renamed (not deleted) to allow manual recovery if needed
/// - Processed WAL files can be cleaned up manually
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let entries = crate::records::read_entries(wal_path)?;

    if entries.is_empty() {
        tracing::info!("No workouts in WAL to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only when the file is fresh
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for entry in &entries {
        let row = CsvRow::from(entry);
        writer.serialize(row)?;
    }

    // Flush and sync to disk before touching the WAL
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} workouts to CSV", entries.len());

    // Atomically archive the WAL by renaming it
    let processed_path = wal_path.with_extension("wal.processed");
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived WAL to {:?}", processed_path);

    Ok(entries.len())
}

/// Clean up old processed WAL files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed WAL: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed WAL files", count);
    }

    Ok(count)
}
