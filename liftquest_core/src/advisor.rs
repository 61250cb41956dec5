//! Progressive overload recommendations.
//!
//! Looks at an exercise's recent history plus the latest session and
//! suggests the next session's weight, reps and sets. The decision is
//! driven by RPE (reported or estimated) with conservative growth caps
//! and overreach warnings.

use crate::types::WorkoutEntry;
use crate::{Error, Result};

/// The latest performed session for one exercise
#[derive(Clone, Debug)]
pub struct CurrentWorkout {
    pub exercise_id: String,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    /// Reported rate of perceived exertion, 1-10
    pub rpe: Option<u8>,
}

/// Which variable the recommendation progresses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressionType {
    Weight,
    Reps,
    Maintain,
}

/// Direction of a metric over the analysis window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
}

/// Analysis of the recent history window
#[derive(Clone, Copy, Debug)]
pub struct ProgressionAnalysis {
    pub weight_trend: Trend,
    pub volume_trend: Trend,
    /// Fractional weight growth per week over the window
    pub weekly_growth: f64,
}

/// Next-session recommendation
#[derive(Clone, Debug)]
pub struct Recommendation {
    pub next_weight_kg: f64,
    pub next_reps: u32,
    pub next_sets: u32,
    pub progression: ProgressionType,
    pub reason: String,
    pub warnings: Vec<String>,
    /// Predicted RPE at the recommended load, 1-10
    pub expected_rpe: u8,
}

/// Tunables for recommendation generation
#[derive(Clone, Copy, Debug)]
pub struct AdvisorOptions {
    /// History window length in days
    pub window_days: u32,
    /// sets x reps above this triggers an overwork warning
    pub volume_ceiling: u32,
}

impl Default for AdvisorOptions {
    fn default() -> Self {
        Self {
            window_days: 28,
            volume_ceiling: 25,
        }
    }
}

/// First-half/second-half mean comparison; more than +-5% counts as a trend
fn calculate_trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::Stable;
    }
    let mid = values.len() / 2;
    let first_avg = values[..mid].iter().sum::<f64>() / mid as f64;
    let second_avg = values[mid..].iter().sum::<f64>() / (values.len() - mid) as f64;
    if first_avg == 0.0 {
        return Trend::Stable;
    }

    let change = (second_avg - first_avg) / first_avg;
    if change > 0.05 {
        Trend::Increasing
    } else if change < -0.05 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Analyze a window of history, oldest entry first
pub fn analyze_progression(history: &[WorkoutEntry], window_days: u32) -> ProgressionAnalysis {
    let weights: Vec<f64> = history.iter().map(|e| e.weight_kg).collect();
    let volumes: Vec<f64> = history
        .iter()
        .map(|e| f64::from(e.sets) * f64::from(e.reps) * e.weight_kg)
        .collect();

    let weeks = f64::from(window_days.max(7)) / 7.0;
    let weekly_growth = match (weights.first(), weights.last()) {
        (Some(&first), Some(&last)) if first > 0.0 => ((last - first) / first) / weeks,
        _ => 0.0,
    };

    ProgressionAnalysis {
        weight_trend: calculate_trend(&weights),
        volume_trend: calculate_trend(&volumes),
        weekly_growth,
    }
}

/// Estimate RPE when the subject did not report one.
///
/// Proximity to the recent max is the strongest signal; without a known
/// max, high-rep sets are assumed easier than low-rep ones.
fn estimate_rpe(weight: f64, reps: u32, recent_max: Option<f64>) -> u8 {
    if let Some(max) = recent_max {
        if max > 0.0 {
            let ratio = weight / max;
            return if ratio >= 0.95 {
                9
            } else if ratio >= 0.90 {
                8
            } else if ratio >= 0.85 {
                7
            } else if ratio >= 0.80 {
                6
            } else {
                5
            };
        }
    }

    if reps >= 12 {
        6
    } else if reps >= 8 {
        7
    } else if reps >= 5 {
        8
    } else {
        9
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Recommend the next session for an exercise.
///
/// Returns `None` when there is no history to reason from; a first
/// session gives the advisor nothing to anchor on.
pub fn recommend(
    history: &[WorkoutEntry],
    current: &CurrentWorkout,
    options: &AdvisorOptions,
) -> Result<Option<Recommendation>> {
    if current.sets == 0 || current.reps == 0 {
        return Err(Error::Validation(
            "sets and reps must be at least 1".into(),
        ));
    }
    if !current.weight_kg.is_finite() || current.weight_kg <= 0.0 {
        return Err(Error::Validation(format!(
            "weight must be positive, got {}",
            current.weight_kg
        )));
    }
    if let Some(rpe) = current.rpe {
        if !(1..=10).contains(&rpe) {
            return Err(Error::Validation(format!(
                "rpe must be between 1 and 10, got {rpe}"
            )));
        }
    }
    if history.is_empty() {
        return Ok(None);
    }

    let analysis = analyze_progression(history, options.window_days);
    let recent_max = history
        .iter()
        .map(|e| e.weight_kg)
        .fold(f64::MIN, f64::max)
        .max(current.weight_kg);

    let rpe = current
        .rpe
        .unwrap_or_else(|| estimate_rpe(current.weight_kg, current.reps, Some(recent_max)));

    let mut warnings = Vec::new();
    let (next_weight, next_reps, progression, reason) = if rpe <= 7 && current.reps >= 12 {
        (
            current.weight_kg * 1.025,
            current.reps.saturating_sub(2).max(8),
            ProgressionType::Weight,
            "low RPE at high reps: add 2.5% weight and drop reps".to_string(),
        )
    } else if rpe <= 7 {
        (
            current.weight_kg,
            current.reps + 1,
            ProgressionType::Reps,
            "low RPE: add a rep at the same weight".to_string(),
        )
    } else if rpe >= 9 {
        warnings.push(
            "current intensity is very high; elevated injury risk".to_string(),
        );
        (
            current.weight_kg,
            current.reps,
            ProgressionType::Maintain,
            "very high RPE: hold the current load".to_string(),
        )
    } else {
        // Slow the increase down when the window already grew fast
        let rate = if analysis.weekly_growth > 0.05 { 0.01 } else { 0.02 };
        (
            current.weight_kg * (1.0 + rate),
            current.reps,
            ProgressionType::Weight,
            "moderate RPE: small linear weight increase".to_string(),
        )
    };

    if analysis.weekly_growth > 0.05 {
        warnings.push(
            "weekly load growth exceeds 5%; slow the progression down".to_string(),
        );
    }
    if current.sets * current.reps > options.volume_ceiling {
        warnings.push(format!(
            "sets x reps exceeds {}; overwork risk",
            options.volume_ceiling
        ));
    }
    if next_weight > recent_max * 1.1 {
        warnings.push(
            "recommended weight is more than 10% over the recent max".to_string(),
        );
    }

    let weight_ratio = next_weight / current.weight_kg;
    let expected = f64::from(rpe) + (weight_ratio - 1.0) * 5.0;
    let expected_rpe = expected.round().clamp(1.0, 10.0) as u8;

    Ok(Some(Recommendation {
        next_weight_kg: round1(next_weight),
        next_reps,
        next_sets: current.sets,
        progression,
        reason,
        warnings,
        expected_rpe,
    }))
}
