//! Workout submission engine.
//!
//! Ties the pure scoring components together with persistence: a
//! submitted workout is estimated, graded, scored for experience and
//! calories, appended to the record log, and applied to the subject's
//! body-part progression in one locked state update. Certification
//! lifecycle operations run through the same store so their mutations
//! are just as atomic.

use crate::advisor::{self, AdvisorOptions, CurrentWorkout, Recommendation};
use crate::calories::{self, CalorieEstimate, HeartRateData, WorkoutEffort};
use crate::catalog;
use crate::certification::{self, SubmitOutcome};
use crate::config::Config;
use crate::estimator;
use crate::experience::{self, ExpBreakdown, ExpInput};
use crate::grader;
use crate::progression::{self, LevelUpResult};
use crate::records::{self, JsonlSink, RecordSink};
use crate::store::GameState;
use crate::types::{
    BodyPart, BodyPartProgress, CertificationAttempt, CertificationState, SubjectProfile,
    WorkoutEntry,
};
use crate::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

/// A raw workout submission before scoring
#[derive(Clone, Debug)]
pub struct WorkoutSubmission {
    pub subject_id: String,
    pub exercise_id: String,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    pub rpe: Option<u8>,
    pub duration_min: Option<f64>,
    pub heart_rate: Option<HeartRateData>,
    /// Required when the exercise is not in the catalog
    pub body_part: Option<BodyPart>,
}

/// Everything derived from one processed submission
#[derive(Clone, Debug)]
pub struct SubmissionSummary {
    pub entry: WorkoutEntry,
    pub exp: ExpBreakdown,
    pub calories: CalorieEstimate,
    pub level_up: LevelUpResult,
    pub personal_record: bool,
    pub progress: BodyPartProgress,
}

/// Certification status snapshot for one (subject, body part)
#[derive(Clone, Debug)]
pub struct CertificationStatus {
    pub progress: BodyPartProgress,
    pub active_attempt: Option<CertificationAttempt>,
}

/// The scoring and progression engine
pub struct Engine {
    config: Config,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register or replace a subject profile
    pub fn set_profile(&self, profile: SubjectProfile) -> Result<()> {
        GameState::update(&self.config.state_path(), |state| {
            state
                .profiles
                .insert(profile.subject_id.clone(), profile.clone());
            Ok(())
        })?;
        tracing::info!(subject = profile.subject_id, "profile saved");
        Ok(())
    }

    pub fn profile(&self, subject_id: &str) -> Result<SubjectProfile> {
        let state = GameState::load(&self.config.state_path())?;
        state.profile(subject_id).cloned()
    }

    /// Process one workout submission end to end.
    ///
    /// The derived metrics are computed against the subject's profile and
    /// current progression, the entry is appended to the record log, and
    /// the progression mutation (experience, level-ups, rewards, best-max,
    /// certification eligibility) commits as a single atomic state update.
    pub fn submit_workout(&self, submission: &WorkoutSubmission) -> Result<SubmissionSummary> {
        if submission.sets == 0 || submission.reps == 0 {
            return Err(Error::Validation(
                "sets and reps must be at least 1".into(),
            ));
        }

        let body_part = match catalog::exercise_body_part(&submission.exercise_id) {
            Some(part) => part,
            None => submission.body_part.ok_or_else(|| {
                Error::Validation(format!(
                    "unknown exercise {} requires an explicit body part",
                    submission.exercise_id
                ))
            })?,
        };
        let difficulty = catalog::exercise_difficulty(&submission.exercise_id);
        let lift_class = catalog::find_exercise(&submission.exercise_id).map(|e| e.class);

        let wal_path = self.config.wal_path();
        let gate_level_ups = self.config.certification.gate_level_ups;

        GameState::update(&self.config.state_path(), |state| {
            let profile = state.profile(&submission.subject_id)?.clone();
            let progress = state.progress_for(&submission.subject_id, body_part);

            let estimated_max =
                estimator::estimate_max(submission.weight_kg, submission.reps, lift_class)?;
            let personal_record = estimated_max > progress.best_estimated_max;

            let grade = grader::evaluate_grade(
                profile.bodyweight_kg,
                submission.weight_kg,
                &submission.exercise_id,
                submission.reps,
            )?;

            let exp = experience::calculate_exp(&ExpInput {
                sets: submission.sets,
                reps: submission.reps,
                weight_kg: submission.weight_kg,
                difficulty,
                grade,
                personal_record,
                level: progress.level,
            })?;

            let effort = WorkoutEffort {
                exercise_id: submission.exercise_id.clone(),
                sets: submission.sets,
                reps: submission.reps,
                weight_kg: submission.weight_kg,
                rpe: submission.rpe,
                duration_min: submission.duration_min,
                rest_seconds: None,
            };
            let calorie_estimate = calories::estimate_calories(
                profile.bodyweight_kg,
                profile.age,
                &effort,
                submission.heart_rate.as_ref(),
            )?;

            let entry = WorkoutEntry {
                id: Uuid::new_v4(),
                subject_id: submission.subject_id.clone(),
                exercise_id: submission.exercise_id.to_lowercase(),
                body_part,
                sets: submission.sets,
                reps: submission.reps,
                weight_kg: submission.weight_kg,
                estimated_max,
                grade,
                exp_gained: exp.total,
                calories: calorie_estimate.total_kcal,
                performed_at: Utc::now(),
                verified: false,
            };

            // Log the record before mutating progression; the entry is
            // the source of truth the state can be rebuilt from.
            JsonlSink::new(&wal_path).append(&entry)?;

            let progress = state.progress_mut(&submission.subject_id, body_part);
            let level_up = if gate_level_ups {
                progression::accrue_exp(progress, exp.total);
                LevelUpResult {
                    old_level: progress.level,
                    new_level: progress.level,
                    remaining_exp: progress.current_exp,
                    ..Default::default()
                }
            } else {
                progression::apply_exp(progress, exp.total)
            };

            if personal_record {
                progress.best_estimated_max = estimated_max;
            }
            progress.last_workout_at = Some(entry.performed_at);

            if level_up.did_level_up() {
                let rewards = state.rewards_mut(&submission.subject_id);
                rewards.skill_points += level_up.rewards.skill_points;
                rewards.titles.extend(level_up.rewards.titles.iter().cloned());
            }

            certification::recompute_eligibility(state, &submission.subject_id, body_part);
            let progress = state.progress_for(&submission.subject_id, body_part);

            tracing::info!(
                subject = submission.subject_id,
                exercise = entry.exercise_id,
                grade = ?grade,
                exp = exp.total,
                levels_gained = level_up.levels_gained,
                "workout processed"
            );

            Ok(SubmissionSummary {
                entry,
                exp,
                calories: calorie_estimate,
                level_up,
                personal_record,
                progress,
            })
        })
    }

    /// Progressive overload recommendation for the subject's next session
    /// with an exercise. `None` when there is no history.
    pub fn recommend_next(
        &self,
        subject_id: &str,
        exercise_id: &str,
    ) -> Result<Option<Recommendation>> {
        let history = records::load_recent(
            &self.config.wal_path(),
            subject_id,
            exercise_id,
            self.config.advisor.history_days,
        )?;

        let Some(latest) = history.last() else {
            return Ok(None);
        };
        let current = CurrentWorkout {
            exercise_id: exercise_id.to_string(),
            sets: latest.sets,
            reps: latest.reps,
            weight_kg: latest.weight_kg,
            rpe: None,
        };
        let options = AdvisorOptions {
            window_days: self.config.advisor.history_days,
            volume_ceiling: self.config.advisor.volume_ceiling,
        };
        advisor::recommend(&history, &current, &options)
    }

    /// Start a certification attempt for a body part
    pub fn start_certification(
        &self,
        subject_id: &str,
        body_part: BodyPart,
    ) -> Result<CertificationAttempt> {
        let min_weight = self.config.certification.min_required_weight_kg;
        GameState::update(&self.config.state_path(), |state| {
            certification::start_attempt(state, subject_id, body_part, min_weight)
        })
    }

    /// Submit a previously logged workout entry as certification proof
    pub fn submit_certification(
        &self,
        subject_id: &str,
        attempt_id: Uuid,
        entry_id: Uuid,
    ) -> Result<SubmitOutcome> {
        let entry = self.find_entry(entry_id)?;
        let auto_approve = self.config.certification.auto_approve;
        GameState::update(&self.config.state_path(), |state| {
            certification::submit_attempt(state, subject_id, attempt_id, &entry, auto_approve)
        })
    }

    /// Manually approve a submitted attempt
    pub fn approve_certification(&self, attempt_id: Uuid) -> Result<certification::ApproveResult> {
        GameState::update(&self.config.state_path(), |state| {
            certification::approve_attempt(state, attempt_id)
        })
    }

    /// Certification snapshot for one (subject, body part)
    pub fn certification_status(
        &self,
        subject_id: &str,
        body_part: BodyPart,
    ) -> Result<CertificationStatus> {
        let state = GameState::load(&self.config.state_path())?;
        Ok(CertificationStatus {
            progress: state.progress_for(subject_id, body_part),
            active_attempt: state.active_attempt(subject_id, body_part).cloned(),
        })
    }

    /// Archive the record WAL into the CSV log
    pub fn rollup(&self) -> Result<usize> {
        crate::rollup::wal_to_csv_and_archive(&self.config.wal_path(), &self.config.csv_path())
    }

    /// Look up a logged entry by id, in the active WAL first and then in
    /// the CSV archive (records stay referenceable after rollup)
    fn find_entry(&self, entry_id: Uuid) -> Result<WorkoutEntry> {
        if let Some(entry) = records::read_entries(&self.config.wal_path())?
            .into_iter()
            .find(|e| e.id == entry_id)
        {
            return Ok(entry);
        }
        crate::rollup::find_archived(&self.config.csv_path(), entry_id)?
            .ok_or_else(|| Error::NotFound(format!("workout entry {entry_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gender;

    fn test_engine(dir: &std::path::Path) -> Engine {
        let mut config = Config::default();
        config.data.data_dir = dir.to_path_buf();
        Engine::new(config)
    }

    fn gated_engine(dir: &std::path::Path) -> Engine {
        let mut config = Config::default();
        config.data.data_dir = dir.to_path_buf();
        config.certification.gate_level_ups = true;
        Engine::new(config)
    }

    fn register_profile(engine: &Engine, subject: &str) {
        engine
            .set_profile(SubjectProfile {
                subject_id: subject.into(),
                bodyweight_kg: 70.0,
                gender: Gender::Male,
                age: Some(30),
            })
            .unwrap();
    }

    fn submission(subject: &str, exercise: &str, sets: u32, reps: u32, weight: f64) -> WorkoutSubmission {
        WorkoutSubmission {
            subject_id: subject.into(),
            exercise_id: exercise.into(),
            sets,
            reps,
            weight_kg: weight,
            rpe: None,
            duration_min: None,
            heart_rate: None,
            body_part: None,
        }
    }

    #[test]
    fn test_submit_workout_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        register_profile(&engine, "s1");

        let summary = engine
            .submit_workout(&submission("s1", "deadlift", 3, 10, 60.0))
            .unwrap();

        // Deadlift is a lower compound, so the estimate uses Brzycki:
        // 60 * 36 / 27 = 80.0. 60x10 at 70kg bodyweight grades Gold.
        assert_eq!(summary.entry.estimated_max, 80.0);
        assert_eq!(summary.entry.grade, crate::types::Grade::Gold);
        assert!(summary.personal_record); // first entry is always a PR
        assert!(summary.exp.total > 0);
        assert!(summary.calories.total_kcal > 0.0);
        assert_eq!(summary.entry.body_part, BodyPart::Back);

        // Entry landed in the WAL
        let entries = records::read_entries(&engine.config().wal_path()).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_unknown_subject_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());

        let result = engine.submit_workout(&submission("ghost", "squat", 3, 10, 60.0));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_unknown_exercise_needs_body_part() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        register_profile(&engine, "s1");

        let mut sub = submission("s1", "zercher_carry", 3, 10, 60.0);
        assert!(matches!(
            engine.submit_workout(&sub),
            Err(Error::Validation(_))
        ));

        sub.body_part = Some(BodyPart::Back);
        assert!(engine.submit_workout(&sub).is_ok());
    }

    #[test]
    fn test_automatic_level_up_with_remainder() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        register_profile(&engine, "s1");

        // base = round(3*10*60*0.8) = 1440, Gold +25% = 360 -> 1800 total
        let summary = engine
            .submit_workout(&submission("s1", "deadlift", 3, 10, 60.0))
            .unwrap();

        // First entry is a PR: +720, total 2520 -> clears gates 1000 and 1150
        assert_eq!(summary.exp.total, 2520);
        assert_eq!(summary.level_up.levels_gained, 2);
        assert_eq!(summary.progress.level, 3);
        assert_eq!(summary.progress.current_exp, 370);
    }

    #[test]
    fn test_progress_invariant_after_many_submissions() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        register_profile(&engine, "s1");

        for _ in 0..10 {
            let summary = engine
                .submit_workout(&submission("s1", "squat", 3, 10, 80.0))
                .unwrap();
            assert!(
                summary.progress.current_exp
                    < progression::required_exp_for_level(summary.progress.level)
            );
        }
    }

    #[test]
    fn test_personal_record_tracking() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        register_profile(&engine, "s1");

        engine
            .submit_workout(&submission("s1", "bench_press", 3, 10, 60.0))
            .unwrap();
        let lighter = engine
            .submit_workout(&submission("s1", "bench_press", 3, 10, 50.0))
            .unwrap();
        assert!(!lighter.personal_record);

        let heavier = engine
            .submit_workout(&submission("s1", "bench_press", 3, 10, 70.0))
            .unwrap();
        assert!(heavier.personal_record);
        assert!(heavier.progress.best_estimated_max > lighter.progress.best_estimated_max);
    }

    #[test]
    fn test_gated_mode_banks_exp_and_certifies() {
        let dir = tempfile::tempdir().unwrap();
        let engine = gated_engine(dir.path());
        register_profile(&engine, "s1");

        let summary = engine
            .submit_workout(&submission("s1", "deadlift", 3, 10, 60.0))
            .unwrap();
        assert_eq!(summary.level_up.levels_gained, 0);
        assert_eq!(summary.progress.level, 1);
        assert!(summary.progress.current_exp >= 1000);
        assert_eq!(summary.progress.certification, CertificationState::Eligible);
        assert_eq!(summary.progress.target_level, Some(2));

        // Start and pass the certification
        let attempt = engine.start_certification("s1", BodyPart::Back).unwrap();
        assert_eq!(attempt.conditions.exercise_id, "deadlift");

        let proof = engine
            .submit_workout(&submission(
                "s1",
                "deadlift",
                attempt.conditions.required_sets,
                attempt.conditions.required_reps,
                attempt.conditions.required_weight_kg,
            ))
            .unwrap();
        let outcome = engine
            .submit_certification("s1", attempt.id, proof.entry.id)
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Approved { new_level: 2 });

        let status = engine.certification_status("s1", BodyPart::Back).unwrap();
        assert_eq!(status.progress.level, 2);
        assert_eq!(status.progress.current_exp, 0);
        assert!(status.active_attempt.is_none());
    }

    #[test]
    fn test_certification_accepts_archived_proof() {
        let dir = tempfile::tempdir().unwrap();
        let engine = gated_engine(dir.path());
        register_profile(&engine, "s1");

        engine
            .submit_workout(&submission("s1", "deadlift", 3, 10, 60.0))
            .unwrap();
        let attempt = engine.start_certification("s1", BodyPart::Back).unwrap();
        let proof = engine
            .submit_workout(&submission(
                "s1",
                "deadlift",
                attempt.conditions.required_sets,
                attempt.conditions.required_reps,
                attempt.conditions.required_weight_kg,
            ))
            .unwrap();

        // Rollup moves the proof entry out of the WAL before submission
        engine.rollup().unwrap();
        assert!(!engine.config().wal_path().exists());

        let outcome = engine
            .submit_certification("s1", attempt.id, proof.entry.id)
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Approved { new_level: 2 });
    }

    #[test]
    fn test_recommend_next_needs_history() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        register_profile(&engine, "s1");

        assert!(engine.recommend_next("s1", "squat").unwrap().is_none());

        engine
            .submit_workout(&submission("s1", "squat", 3, 8, 80.0))
            .unwrap();
        let rec = engine.recommend_next("s1", "squat").unwrap().unwrap();
        assert!(rec.next_weight_kg >= 80.0);
    }

    #[test]
    fn test_rollup_archives_wal() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        register_profile(&engine, "s1");

        engine
            .submit_workout(&submission("s1", "squat", 3, 8, 80.0))
            .unwrap();
        let count = engine.rollup().unwrap();
        assert_eq!(count, 1);
        assert!(engine.config().csv_path().exists());
        assert!(!engine.config().wal_path().exists());
    }
}
