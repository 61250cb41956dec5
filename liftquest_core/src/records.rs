//! Write-Ahead Log (WAL) for workout record persistence.
//!
//! Workout entries are appended to a JSONL (JSON Lines) file with file
//! locking to ensure safe concurrent access.

use crate::{Result, WorkoutEntry};
use chrono::{Duration, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Record sink trait for persisting workout entries
pub trait RecordSink {
    fn append(&mut self, entry: &WorkoutEntry) -> Result<()>;
}

/// JSONL-based record sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl RecordSink for JsonlSink {
    fn append(&mut self, entry: &WorkoutEntry) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        // Lock is automatically released when file is dropped
        file.unlock()?;

        tracing::debug!("Appended workout {} to WAL", entry.id);
        Ok(())
    }
}

/// Read all workout entries from a WAL file
pub fn read_entries(path: &Path) -> Result<Vec<WorkoutEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Failed to parse workout at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} workouts from WAL", entries.len());
    Ok(entries)
}

/// Recent history for one subject and exercise, oldest first.
///
/// Entries older than `window_days` are excluded. The WAL is append-only
/// and not guaranteed sorted when multiple processes interleave, so the
/// result is sorted here.
pub fn load_recent(
    path: &Path,
    subject_id: &str,
    exercise_id: &str,
    window_days: u32,
) -> Result<Vec<WorkoutEntry>> {
    let cutoff = Utc::now() - Duration::days(i64::from(window_days));
    let normalized = exercise_id.to_lowercase();

    let mut entries: Vec<WorkoutEntry> = read_entries(path)?
        .into_iter()
        .filter(|e| {
            e.subject_id == subject_id
                && e.exercise_id.to_lowercase() == normalized
                && e.performed_at >= cutoff
        })
        .collect();
    entries.sort_by_key(|e| e.performed_at);
    Ok(entries)
}
