//! Bodyweight-relative performance grading.
//!
//! A set is graded Bronze through Challenger by comparing the lifted weight
//! against per-exercise threshold tables anchored at 10 reps. Thresholds are
//! interpolated linearly between bodyweight anchor rows and rescaled for the
//! nearest rep bucket.

use crate::types::Grade;
use crate::{Error, Result};

/// Exercise families with dedicated threshold tables.
///
/// Everything else is graded against the deadlift table, which sits in the
/// middle of the three strength-wise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExerciseFamily {
    Deadlift,
    BenchPress,
    Squat,
}

impl ExerciseFamily {
    /// Classify an exercise identifier by normalized substring match
    pub fn from_exercise_id(exercise_id: &str) -> ExerciseFamily {
        let normalized: String = exercise_id
            .to_lowercase()
            .chars()
            .filter(|c| *c != '_')
            .collect();
        if normalized.contains("deadlift") {
            ExerciseFamily::Deadlift
        } else if normalized.contains("bench") || normalized.contains("press") {
            ExerciseFamily::BenchPress
        } else if normalized.contains("squat") {
            ExerciseFamily::Squat
        } else {
            ExerciseFamily::Deadlift
        }
    }
}

/// One bodyweight anchor row: thresholds indexed Bronze..Challenger
struct ThresholdRow {
    bodyweight: f64,
    grades: [f64; 7],
}

// 10-rep anchor tables. Rows are ordered by bodyweight.

const DEADLIFT_THRESHOLDS: [ThresholdRow; 5] = [
    ThresholdRow { bodyweight: 55.0, grades: [20.0, 30.0, 40.0, 60.0, 80.0, 90.0, 100.0] },
    ThresholdRow { bodyweight: 60.0, grades: [20.0, 35.0, 50.0, 65.0, 85.0, 100.0, 130.0] },
    ThresholdRow { bodyweight: 65.0, grades: [20.0, 40.0, 50.0, 70.0, 85.0, 110.0, 140.0] },
    ThresholdRow { bodyweight: 70.0, grades: [20.0, 45.0, 60.0, 70.0, 90.0, 115.0, 155.0] },
    ThresholdRow { bodyweight: 75.0, grades: [20.0, 50.0, 65.0, 80.0, 100.0, 120.0, 160.0] },
];

const BENCH_PRESS_THRESHOLDS: [ThresholdRow; 5] = [
    ThresholdRow { bodyweight: 55.0, grades: [15.0, 25.0, 35.0, 45.0, 55.0, 65.0, 80.0] },
    ThresholdRow { bodyweight: 60.0, grades: [15.0, 30.0, 40.0, 50.0, 60.0, 70.0, 90.0] },
    ThresholdRow { bodyweight: 65.0, grades: [15.0, 35.0, 45.0, 55.0, 65.0, 80.0, 100.0] },
    ThresholdRow { bodyweight: 70.0, grades: [15.0, 40.0, 50.0, 60.0, 70.0, 85.0, 110.0] },
    ThresholdRow { bodyweight: 75.0, grades: [15.0, 45.0, 55.0, 65.0, 80.0, 95.0, 120.0] },
];

const SQUAT_THRESHOLDS: [ThresholdRow; 5] = [
    ThresholdRow { bodyweight: 55.0, grades: [20.0, 35.0, 50.0, 65.0, 80.0, 95.0, 110.0] },
    ThresholdRow { bodyweight: 60.0, grades: [20.0, 40.0, 55.0, 70.0, 90.0, 105.0, 130.0] },
    ThresholdRow { bodyweight: 65.0, grades: [20.0, 45.0, 60.0, 80.0, 95.0, 115.0, 145.0] },
    ThresholdRow { bodyweight: 70.0, grades: [20.0, 50.0, 70.0, 85.0, 105.0, 125.0, 160.0] },
    ThresholdRow { bodyweight: 75.0, grades: [20.0, 55.0, 75.0, 95.0, 115.0, 135.0, 175.0] },
];

fn table_for(family: ExerciseFamily) -> &'static [ThresholdRow; 5] {
    match family {
        ExerciseFamily::Deadlift => &DEADLIFT_THRESHOLDS,
        ExerciseFamily::BenchPress => &BENCH_PRESS_THRESHOLDS,
        ExerciseFamily::Squat => &SQUAT_THRESHOLDS,
    }
}

/// Snap a rep count to the nearest bucket the anchor tables understand
fn rep_bucket(reps: u32) -> u32 {
    match reps {
        0..=6 => 5,
        7..=9 => 8,
        10..=11 => 10,
        12..=13 => 12,
        _ => 15,
    }
}

/// Scale factor applied to 10-rep thresholds for other rep buckets.
///
/// Fewer reps at the same weight means a heavier set, so the bar moves up;
/// more reps moves it down, more gently.
fn rep_scale(bucket: u32) -> f64 {
    if bucket < 10 {
        1.0 + f64::from(10 - bucket) / 30.0
    } else if bucket > 10 {
        1.0 - f64::from(bucket - 10) / 40.0
    } else {
        1.0
    }
}

/// Thresholds for one bodyweight, interpolated between anchor rows.
///
/// Bodyweights outside the table clamp to the nearest edge row rather than
/// extrapolating.
fn thresholds_at_bodyweight(family: ExerciseFamily, bodyweight: f64) -> [f64; 7] {
    let table = table_for(family);

    if bodyweight <= table[0].bodyweight {
        return table[0].grades;
    }
    let last = &table[table.len() - 1];
    if bodyweight >= last.bodyweight {
        return last.grades;
    }

    // Find the surrounding rows
    let mut grades = last.grades;
    for pair in table.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        if bodyweight >= lower.bodyweight && bodyweight <= upper.bodyweight {
            let ratio =
                (bodyweight - lower.bodyweight) / (upper.bodyweight - lower.bodyweight);
            for i in 0..7 {
                grades[i] = lower.grades[i] + (upper.grades[i] - lower.grades[i]) * ratio;
            }
            break;
        }
    }
    grades
}

/// Effective thresholds for a bodyweight and rep count
pub fn grade_thresholds(family: ExerciseFamily, bodyweight: f64, reps: u32) -> [f64; 7] {
    let scale = rep_scale(rep_bucket(reps));
    let mut grades = thresholds_at_bodyweight(family, bodyweight);
    for g in &mut grades {
        *g *= scale;
    }
    grades
}

/// Grade a set against the subject's bodyweight.
///
/// Comparison walks from Challenger down; a lift below every threshold is
/// Bronze.
pub fn evaluate_grade(
    bodyweight: f64,
    weight: f64,
    exercise_id: &str,
    reps: u32,
) -> Result<Grade> {
    if !bodyweight.is_finite() || bodyweight <= 0.0 {
        return Err(Error::Validation(format!(
            "bodyweight must be positive, got {bodyweight}"
        )));
    }
    if !weight.is_finite() || weight < 0.0 {
        return Err(Error::Validation(format!(
            "weight must be a non-negative number, got {weight}"
        )));
    }

    let family = ExerciseFamily::from_exercise_id(exercise_id);
    let thresholds = grade_thresholds(family, bodyweight, reps);

    for (grade, threshold) in Grade::ALL.iter().zip(thresholds.iter()).rev() {
        if weight >= *threshold {
            return Ok(*grade);
        }
    }
    Ok(Grade::Bronze)
}
