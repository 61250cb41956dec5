//! Game state persistence with file locking.
//!
//! All mutable progression data lives in a single state file: subject
//! profiles, per-body-part progress, certification attempts and rewards.
//! Keeping it in one file makes every mutation all-or-nothing through one
//! atomic rename. Cross-process read-modify-write cycles are serialized
//! with an exclusive lock on a sidecar `.lock` file.

use crate::types::{
    BodyPart, BodyPartProgress, CertificationAttempt, LevelRewards, SubjectProfile,
};
use crate::{Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// The complete persisted game state
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub profiles: HashMap<String, SubjectProfile>,
    /// Keyed by `progress_key(subject_id, body_part)`
    #[serde(default)]
    pub progress: HashMap<String, BodyPartProgress>,
    #[serde(default)]
    pub attempts: HashMap<Uuid, CertificationAttempt>,
    /// Accrued level-up rewards, keyed by subject id
    #[serde(default)]
    pub rewards: HashMap<String, LevelRewards>,
}

/// Stable key for one (subject, body part) aggregate
pub fn progress_key(subject_id: &str, body_part: BodyPart) -> String {
    format!("{}:{}", subject_id, body_part.code())
}

impl GameState {
    pub fn profile(&self, subject_id: &str) -> Result<&SubjectProfile> {
        self.profiles
            .get(subject_id)
            .ok_or_else(|| Error::NotFound(format!("no profile for subject {subject_id}")))
    }

    /// Progress aggregate, or the level-1 default when never trained
    pub fn progress_for(&self, subject_id: &str, body_part: BodyPart) -> BodyPartProgress {
        self.progress
            .get(&progress_key(subject_id, body_part))
            .cloned()
            .unwrap_or_default()
    }

    pub fn progress_mut(
        &mut self,
        subject_id: &str,
        body_part: BodyPart,
    ) -> &mut BodyPartProgress {
        self.progress
            .entry(progress_key(subject_id, body_part))
            .or_default()
    }

    /// The single non-terminal attempt for a (subject, body part), if any
    pub fn active_attempt(
        &self,
        subject_id: &str,
        body_part: BodyPart,
    ) -> Option<&CertificationAttempt> {
        self.attempts.values().find(|a| {
            a.subject_id == subject_id && a.body_part == body_part && !a.status.is_terminal()
        })
    }

    pub fn rewards_mut(&mut self, subject_id: &str) -> &mut LevelRewards {
        self.rewards.entry(subject_id.to_string()).or_default()
    }

    /// Load game state from a file with shared locking.
    ///
    /// Returns default state if the file doesn't exist. A file that exists
    /// but fails to parse is an error: defaulting here would wipe real
    /// progression on the next save.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No state file found, using default state");
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        let state = serde_json::from_str::<GameState>(&contents).map_err(|e| {
            Error::State(format!("state file {path:?} is corrupt: {e}"))
        })?;
        tracing::debug!("Loaded game state from {:?}", path);
        Ok(state)
    }

    /// Save game state to a file with exclusive locking
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "state path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace old state file
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved game state to {:?}", path);
        Ok(())
    }

    /// Load state, modify it, and save it back as one serialized cycle.
    ///
    /// The whole read-modify-write runs under an exclusive lock on a
    /// sidecar `.lock` file, so two processes mutating concurrently cannot
    /// interleave and lose updates. The closure's error aborts the cycle
    /// without saving.
    pub fn update<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut GameState) -> Result<T>,
    {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock_path = path.with_extension("json.lock");
        let lock_file = File::create(&lock_path)?;
        lock_file.lock_exclusive()?;

        let result = (|| {
            let mut state = Self::load(path)?;
            let out = f(&mut state)?;
            state.save(path)?;
            Ok(out)
        })();

        lock_file.unlock()?;
        result
    }
}
