//! Calorie expenditure estimation.
//!
//! Three estimation paths, chosen by available data and ordered by
//! confidence: heart-rate based (Katch-McArdle), METs-based personalized,
//! and a flat per-rep fallback. Exactly one path runs per estimate.

use crate::catalog::exercise_mets;
use crate::{Error, Result};

/// Which estimation path produced a result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalorieMethod {
    Basic,
    Personalized,
    HeartRate,
}

/// Calorie estimate with its component split and confidence
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalorieEstimate {
    pub total_kcal: f64,
    pub active_kcal: f64,
    pub rest_kcal: f64,
    /// Post-exercise oxygen consumption surcharge
    pub epoc_kcal: f64,
    pub method: CalorieMethod,
    /// 0-1, higher means the inputs pin the estimate down better
    pub confidence: f64,
}

/// Observed effort for one logged workout
#[derive(Clone, Debug)]
pub struct WorkoutEffort {
    pub exercise_id: String,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    /// Rate of perceived exertion, 1-10
    pub rpe: Option<u8>,
    /// Measured active minutes; estimated from sets when absent
    pub duration_min: Option<f64>,
    /// Seconds of rest between sets, default 60
    pub rest_seconds: Option<f64>,
}

/// Wearable heart-rate capture for a session
#[derive(Clone, Copy, Debug)]
pub struct HeartRateData {
    pub average_bpm: f64,
    pub duration_min: f64,
}

const DEFAULT_RPE: u8 = 5;
const DEFAULT_REST_SECONDS: f64 = 60.0;
const BASIC_KCAL_PER_REP_KG: f64 = 0.05;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Katch-McArdle heart-rate path. Needs the subject's age.
fn estimate_heart_rate(
    bodyweight_kg: f64,
    age: u32,
    hr: &HeartRateData,
) -> CalorieEstimate {
    let kcal_per_minute = (0.6309 * hr.average_bpm + 0.1988 * bodyweight_kg
        + 0.2017 * f64::from(age)
        - 55.0969)
        / 4.184;
    let total = (kcal_per_minute * hr.duration_min).max(0.0);

    CalorieEstimate {
        total_kcal: round1(total),
        active_kcal: round1(total),
        rest_kcal: 0.0,
        epoc_kcal: 0.0,
        method: CalorieMethod::HeartRate,
        confidence: 0.95,
    }
}

/// METs path: `METs x bodyweight x hours x 3.5 / 200`, with RPE-adjusted
/// intensity, a rest-period term at 1 MET, an EPOC surcharge, and a load
/// factor for heavy relative weights.
fn estimate_personalized(bodyweight_kg: f64, effort: &WorkoutEffort) -> CalorieEstimate {
    let rpe = f64::from(effort.rpe.unwrap_or(DEFAULT_RPE));
    let rest_seconds = effort.rest_seconds.unwrap_or(DEFAULT_REST_SECONDS);

    let base_mets = exercise_mets(&effort.exercise_id);
    let intensity_multiplier = 1.0 + (rpe - 5.0) * 0.1;
    let adjusted_mets = base_mets * intensity_multiplier;

    // Lifting near bodyweight costs more; capped at +30%
    let weight_ratio = effort.weight_kg / bodyweight_kg;
    let weight_factor = 1.0 + (weight_ratio * 0.1).min(0.3);

    // About two active minutes per set when no measured duration exists
    let active_minutes = effort
        .duration_min
        .unwrap_or_else(|| f64::from(effort.sets) * 2.0);
    let rest_minutes = rest_seconds * f64::from(effort.sets) / 60.0;

    let active = adjusted_mets * bodyweight_kg * (active_minutes / 60.0) * 3.5 / 200.0;
    let rest = 1.0 * bodyweight_kg * (rest_minutes / 60.0) * 3.5 / 200.0;

    let epoc_factor = 1.0 + (rpe / 10.0) * 0.15;
    let epoc = active * (epoc_factor - 1.0);

    let total = (active + rest + epoc) * weight_factor;

    CalorieEstimate {
        total_kcal: round1(total),
        active_kcal: round1(active),
        rest_kcal: round1(rest),
        epoc_kcal: round1(epoc),
        method: CalorieMethod::Personalized,
        confidence: if effort.duration_min.is_some() { 0.9 } else { 0.7 },
    }
}

/// Flat per-rep fallback when no physiology is known
fn estimate_basic(effort: &WorkoutEffort) -> CalorieEstimate {
    let total_reps = f64::from(effort.sets) * f64::from(effort.reps);
    let total = round1(total_reps * effort.weight_kg * BASIC_KCAL_PER_REP_KG);

    CalorieEstimate {
        total_kcal: total,
        active_kcal: total,
        rest_kcal: 0.0,
        epoc_kcal: 0.0,
        method: CalorieMethod::Basic,
        confidence: 0.5,
    }
}

/// Estimate calories burned by one workout.
///
/// Heart-rate data wins when present (and the subject's age is known),
/// then the personalized METs path when bodyweight is known, then the
/// flat fallback.
pub fn estimate_calories(
    bodyweight_kg: f64,
    age: Option<u32>,
    effort: &WorkoutEffort,
    heart_rate: Option<&HeartRateData>,
) -> Result<CalorieEstimate> {
    if effort.sets == 0 || effort.reps == 0 {
        return Err(Error::Validation(
            "sets and reps must be at least 1".into(),
        ));
    }
    if !effort.weight_kg.is_finite() || effort.weight_kg < 0.0 {
        return Err(Error::Validation(format!(
            "weight must be a non-negative number, got {}",
            effort.weight_kg
        )));
    }
    if let Some(rpe) = effort.rpe {
        if !(1..=10).contains(&rpe) {
            return Err(Error::Validation(format!(
                "rpe must be between 1 and 10, got {rpe}"
            )));
        }
    }

    if let Some(hr) = heart_rate {
        let age = age.ok_or_else(|| {
            Error::Validation("heart-rate estimation requires the subject's age".into())
        })?;
        if hr.average_bpm <= 0.0 || hr.duration_min <= 0.0 {
            return Err(Error::Validation(
                "heart-rate data must have positive bpm and duration".into(),
            ));
        }
        return Ok(estimate_heart_rate(bodyweight_kg, age, hr));
    }

    if bodyweight_kg > 0.0 {
        return Ok(estimate_personalized(bodyweight_kg, effort));
    }

    Ok(estimate_basic(effort))
}
