//! Certification workflow: gated level-up challenges.
//!
//! Once a body part has banked enough experience, the subject may start a
//! certification attempt: a concrete lift (exercise, weight, reps, sets)
//! derived from their bodyweight, gender and target level. Passing the
//! lift advances the level. Attempts move through a validated state
//! machine; at most one non-terminal attempt exists per (subject, body
//! part), enforced at the persistence boundary by the state store's
//! locked read-modify-write.
//!
//! All functions here mutate an in-memory [`GameState`]; callers wrap
//! them in [`GameState::update`] to make each operation atomic on disk.

use crate::catalog::{certification_coefficient, certification_exercise};
use crate::progression::required_exp_for_level;
use crate::store::GameState;
use crate::types::{
    AttemptStatus, BodyPart, CertificationAttempt, CertificationState, Gender,
    PassConditions, WorkoutEntry,
};
use crate::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

/// Default floor for required certification weight
pub const DEFAULT_MIN_REQUIRED_WEIGHT_KG: f64 = 5.0;

/// Result of submitting a workout against an attempt
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Conditions met and the attempt was auto-approved
    Approved { new_level: u32 },
    /// Conditions met; the attempt waits for manual review
    AwaitingReview,
    /// Conditions unmet; the attempt stays in progress and can be retried
    ConditionsNotMet { shortfalls: Vec<String> },
}

/// Result of an approval
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApproveResult {
    pub new_level: u32,
    /// True when the attempt had already been approved earlier
    pub already_approved: bool,
}

/// Deterministic pass conditions for a certification attempt.
///
/// `required_weight = round(bodyweight x family coefficient x
/// (1 + 0.1 x target) x gender factor)`, floored at `min_weight_kg`.
/// Reps and sets step down in coarse bands as the target level rises.
pub fn generate_conditions(
    body_part: BodyPart,
    target_level: u32,
    bodyweight_kg: f64,
    gender: Gender,
    min_weight_kg: f64,
) -> PassConditions {
    let exercise = certification_exercise(body_part);
    let coefficient = certification_coefficient(body_part);
    let level_multiplier = 1.0 + f64::from(target_level) * 0.1;

    let required_weight =
        (bodyweight_kg * coefficient * level_multiplier * gender.certification_factor())
            .round()
            .max(min_weight_kg);

    let required_reps = if target_level <= 5 {
        10
    } else if target_level <= 10 {
        8
    } else {
        5
    };
    let required_sets = if target_level <= 10 { 3 } else { 5 };

    PassConditions {
        exercise_id: exercise.id.to_string(),
        exercise_name: exercise.name.to_string(),
        required_weight_kg: required_weight,
        required_reps,
        required_sets,
    }
}

/// Validated status transition; sets the matching timestamp
fn transition(attempt: &mut CertificationAttempt, to: AttemptStatus) -> Result<()> {
    if !attempt.status.can_transition(to) {
        return Err(Error::InvalidTransition {
            from: attempt.status,
            to,
        });
    }
    attempt.status = to;
    match to {
        AttemptStatus::Submitted => attempt.submitted_at = Some(Utc::now()),
        AttemptStatus::Approved | AttemptStatus::Rejected => {
            attempt.reviewed_at = Some(Utc::now())
        }
        _ => {}
    }
    Ok(())
}

/// Recompute certification eligibility for one (subject, body part).
///
/// Called after every experience award. Enough banked experience with no
/// open attempt makes the body part eligible for the next level; dropping
/// below the gate (after an approval reset) clears it. An open attempt
/// owns the state until it terminates.
pub fn recompute_eligibility(state: &mut GameState, subject_id: &str, body_part: BodyPart) {
    if state.active_attempt(subject_id, body_part).is_some() {
        return;
    }

    let progress = state.progress_mut(subject_id, body_part);
    if progress.current_exp >= required_exp_for_level(progress.level) {
        if progress.certification != CertificationState::Eligible {
            tracing::info!(
                subject = subject_id,
                body_part = body_part.code(),
                target = progress.level + 1,
                "certification now available"
            );
        }
        progress.certification = CertificationState::Eligible;
        progress.target_level = Some(progress.level + 1);
    } else if progress.certification == CertificationState::Eligible {
        progress.certification = CertificationState::None;
        progress.target_level = None;
    }
}

/// Start a certification attempt.
///
/// Requires the body part to be eligible and no other non-terminal
/// attempt to exist for the same key; the second of two racing starts
/// fails with [`Error::Conflict`] because the store serializes the
/// surrounding read-modify-write.
pub fn start_attempt(
    state: &mut GameState,
    subject_id: &str,
    body_part: BodyPart,
    min_weight_kg: f64,
) -> Result<CertificationAttempt> {
    let profile = state.profile(subject_id)?;
    let (bodyweight, gender) = (profile.bodyweight_kg, profile.gender);

    if state.active_attempt(subject_id, body_part).is_some() {
        return Err(Error::Conflict(format!(
            "an open certification attempt already exists for {subject_id}/{}",
            body_part.code()
        )));
    }

    let progress = state.progress_for(subject_id, body_part);
    if progress.certification != CertificationState::Eligible {
        return Err(Error::Validation(format!(
            "{subject_id}/{} is not eligible for certification",
            body_part.code()
        )));
    }
    let target_level = progress.target_level.unwrap_or(progress.level + 1);

    let conditions =
        generate_conditions(body_part, target_level, bodyweight, gender, min_weight_kg);

    let mut attempt = CertificationAttempt {
        id: Uuid::new_v4(),
        subject_id: subject_id.to_string(),
        body_part,
        current_level: progress.level,
        target_level,
        conditions,
        status: AttemptStatus::Pending,
        workout_entry_id: None,
        created_at: Utc::now(),
        submitted_at: None,
        reviewed_at: None,
    };
    transition(&mut attempt, AttemptStatus::InProgress)?;

    let progress = state.progress_mut(subject_id, body_part);
    progress.certification = CertificationState::InProgress;

    state.attempts.insert(attempt.id, attempt.clone());
    tracing::info!(
        subject = subject_id,
        body_part = body_part.code(),
        target = target_level,
        attempt = %attempt.id,
        "certification attempt started"
    );
    Ok(attempt)
}

/// Check a workout entry against an attempt's pass conditions
fn check_conditions(conditions: &PassConditions, entry: &WorkoutEntry) -> Vec<String> {
    let mut shortfalls = Vec::new();
    if !entry
        .exercise_id
        .eq_ignore_ascii_case(&conditions.exercise_id)
    {
        shortfalls.push(format!(
            "wrong exercise: need {}, got {}",
            conditions.exercise_id, entry.exercise_id
        ));
    }
    if entry.sets < conditions.required_sets {
        shortfalls.push(format!(
            "sets: need {}, got {}",
            conditions.required_sets, entry.sets
        ));
    }
    if entry.reps < conditions.required_reps {
        shortfalls.push(format!(
            "reps: need {}, got {}",
            conditions.required_reps, entry.reps
        ));
    }
    if entry.weight_kg < conditions.required_weight_kg {
        shortfalls.push(format!(
            "weight: need {}kg, got {}kg",
            conditions.required_weight_kg, entry.weight_kg
        ));
    }
    shortfalls
}

/// Submit a workout entry as proof for an in-progress attempt.
///
/// An entry that misses any required figure produces a structured
/// [`SubmitOutcome::ConditionsNotMet`] and leaves the attempt retryable.
/// A passing entry moves the attempt to Submitted and, with
/// `auto_approve`, straight through approval.
pub fn submit_attempt(
    state: &mut GameState,
    subject_id: &str,
    attempt_id: Uuid,
    entry: &WorkoutEntry,
    auto_approve: bool,
) -> Result<SubmitOutcome> {
    let attempt = state
        .attempts
        .get(&attempt_id)
        .ok_or_else(|| Error::NotFound(format!("certification attempt {attempt_id}")))?;

    if attempt.subject_id != subject_id {
        return Err(Error::Validation(format!(
            "attempt {attempt_id} does not belong to {subject_id}"
        )));
    }
    // Proof must be the subject's own lift
    if entry.subject_id != attempt.subject_id {
        return Err(Error::Validation(format!(
            "workout entry {} does not belong to {subject_id}",
            entry.id
        )));
    }
    if attempt.status != AttemptStatus::InProgress {
        return Err(Error::Conflict(format!(
            "attempt {attempt_id} is {:?}, not in progress",
            attempt.status
        )));
    }

    let shortfalls = check_conditions(&attempt.conditions, entry);
    if !shortfalls.is_empty() {
        tracing::debug!(attempt = %attempt_id, ?shortfalls, "certification conditions not met");
        return Ok(SubmitOutcome::ConditionsNotMet { shortfalls });
    }

    let attempt = state
        .attempts
        .get_mut(&attempt_id)
        .ok_or_else(|| Error::NotFound(format!("certification attempt {attempt_id}")))?;
    attempt.workout_entry_id = Some(entry.id);
    transition(attempt, AttemptStatus::Submitted)?;

    if auto_approve {
        let result = approve_attempt(state, attempt_id)?;
        return Ok(SubmitOutcome::Approved {
            new_level: result.new_level,
        });
    }
    Ok(SubmitOutcome::AwaitingReview)
}

/// Approve a submitted attempt, applying the level-up.
///
/// All-or-nothing with respect to the surrounding state update: level
/// moves to the target, banked experience resets to zero, eligibility
/// clears. Approving an already-approved attempt is a no-op.
pub fn approve_attempt(state: &mut GameState, attempt_id: Uuid) -> Result<ApproveResult> {
    let attempt = state
        .attempts
        .get_mut(&attempt_id)
        .ok_or_else(|| Error::NotFound(format!("certification attempt {attempt_id}")))?;

    if attempt.status == AttemptStatus::Approved {
        return Ok(ApproveResult {
            new_level: attempt.target_level,
            already_approved: true,
        });
    }
    transition(attempt, AttemptStatus::Approved)?;
    let (subject_id, body_part, target_level) = (
        attempt.subject_id.clone(),
        attempt.body_part,
        attempt.target_level,
    );

    let progress = state.progress_mut(&subject_id, body_part);
    progress.level = target_level;
    progress.current_exp = 0;
    progress.certification = CertificationState::None;
    progress.target_level = None;

    tracing::info!(
        subject = subject_id,
        body_part = body_part.code(),
        level = target_level,
        "certification approved"
    );
    Ok(ApproveResult {
        new_level: target_level,
        already_approved: false,
    })
}

/// Reject an attempt (manual review path). Terminal.
pub fn reject_attempt(state: &mut GameState, attempt_id: Uuid) -> Result<()> {
    let attempt = state
        .attempts
        .get_mut(&attempt_id)
        .ok_or_else(|| Error::NotFound(format!("certification attempt {attempt_id}")))?;
    transition(attempt, AttemptStatus::Rejected)?;

    let (subject_id, body_part) = (attempt.subject_id.clone(), attempt.body_part);
    let progress = state.progress_mut(&subject_id, body_part);
    progress.certification = CertificationState::None;
    progress.target_level = None;
    recompute_eligibility(state, &subject_id, body_part);
    Ok(())
}
